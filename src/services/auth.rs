use std::sync::Arc;

use actix_web::web;
use log::{info, warn};

use crate::auth::{PasswordHasher, TokenIssuer};
use crate::error::AppError;
use crate::models::{Credentials, SignupRequest, User};
use crate::store::UserRepository;

/// Token handed back after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: i32,
    pub token: String,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".into())
}

/// Signup, login and account lookups.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenIssuer>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<TokenIssuer>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
        }
    }

    /// Hashes the password and stores the account.
    pub async fn signup(&self, request: SignupRequest) -> Result<User, AppError> {
        let SignupRequest { email, password } = request;
        let hasher = self.hasher;
        let password_hash = web::block(move || hasher.hash(&password)).await??;

        let user = self.users.insert(&email, &password_hash).await?;
        info!("user {} signed up", user.id);
        Ok(user)
    }

    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, credentials: Credentials) -> Result<Session, AppError> {
        let Credentials { email, password } = credentials;
        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!("login rejected");
            return Err(invalid_credentials());
        };

        let hasher = self.hasher;
        let password_hash = user.password_hash.clone();
        let verified = web::block(move || hasher.verify(&password, &password_hash)).await?;
        if !verified {
            warn!("login rejected");
            return Err(invalid_credentials());
        }

        let token = self.tokens.issue(user.id)?;
        info!("user {} logged in", user.id);
        Ok(Session {
            user_id: user.id,
            token,
        })
    }

    pub async fn current_user(&self, user_id: i32) -> Result<User, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    /// Deletes the account together with all of its tasks.
    pub async fn delete_user(&self, user_id: i32) -> Result<(), AppError> {
        if !self.users.delete(user_id).await? {
            return Err(AppError::NotFound("User not found".into()));
        }
        info!("user {} deleted", user_id);
        Ok(())
    }
}
