//!
//! # Application errors
//!
//! `AppError` is the single error type handlers, services and stores return.
//! It implements `actix_web::ResponseError`, so a handler returning
//! `Result<_, AppError>` gets a JSON body of the form `{"error": "..."}` with
//! the matching status code.
//!
//! Server-side failures (database, hashing, signing) are logged here and
//! answered with a generic message; their details never reach the client.

use actix_web::{error::BlockingError, http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::auth::token::TokenError;

/// Message sent to clients for every 5xx response.
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    /// Authentication failed or is missing (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// The request body could not be parsed (HTTP 400).
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// The request failed the CSRF check (HTTP 403).
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// The requested row does not exist for the caller (HTTP 404).
    #[error("Not Found: {0}")]
    NotFound(String),
    /// The store rejected a write because of a uniqueness constraint (HTTP 409).
    #[error("Conflict: {0}")]
    Conflict(String),
    /// The handler did not finish within the request time limit (HTTP 408).
    #[error("Request Timeout: {0}")]
    RequestTimeout(String),
    /// The request body parsed but failed field validation (HTTP 422).
    #[error("Validation Error: {0}")]
    ValidationError(String),
    /// Any other store failure (HTTP 500).
    #[error("Database Error: {0}")]
    DatabaseError(String),
    /// Unexpected server-side failure (HTTP 500).
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl AppError {
    /// The message placed in the response body.
    fn client_message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::RequestTimeout(msg)
            | AppError::ValidationError(msg) => msg,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => INTERNAL_MESSAGE,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RequestTimeout(_) => StatusCode::REQUEST_TIMEOUT,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }
        HttpResponse::build(status).json(json!({
            "error": self.client_message()
        }))
    }
}

/// Name Postgres gives the `UNIQUE` constraint on `users.email`.
pub const USERS_EMAIL_KEY: &str = "users_email_key";

/// `RowNotFound` becomes `NotFound`, unique violations become `Conflict`, a
/// foreign key violation (a task written for a deleted user) becomes
/// `NotFound`, everything else is a `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                if db.constraint() == Some(USERS_EMAIL_KEY) {
                    AppError::Conflict("Email already registered".into())
                } else {
                    AppError::Conflict("Record already exists".into())
                }
            }
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                AppError::NotFound("User not found".into())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Encoding(msg) => {
                AppError::InternalServerError(format!("Failed to sign token: {}", msg))
            }
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

impl From<BlockingError> for AppError {
    fn from(error: BlockingError) -> AppError {
        AppError::InternalServerError(format!("Blocking task failed: {}", error))
    }
}
