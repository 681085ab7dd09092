use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    auth::{new_csrf_token, CSRF_COOKIE},
    error::AppError,
    models::{Credentials, SignupRequest, UserResponse},
    state::AppState,
};

/// Body returned by a successful login, alongside the session cookie.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user_id: i32,
    /// Same value as the cookie, for clients that send `Authorization: Bearer`.
    pub token: String,
}

/// Body of `GET /auth/csrf`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CsrfResponse {
    pub csrf_token: String,
}

/// Hand out a CSRF token
///
/// Sets the `_csrf` cookie and returns the same value, which the client sends
/// back in `X-CSRF-Token` on every POST, PUT and DELETE. An existing cookie's
/// token is reused.
#[get("/csrf")]
pub async fn csrf_token(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let token = req
        .cookie(CSRF_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(new_csrf_token);

    HttpResponse::Ok()
        .cookie(state.cookies.csrf(token.clone()))
        .json(CsrfResponse { csrf_token: token })
}

/// Create an account
///
/// ## Responses:
/// - `201 Created`: `{id, email}` of the new user.
/// - `400 Bad Request`: body is not valid JSON for this shape.
/// - `409 Conflict`: email already registered.
/// - `422 Unprocessable Entity`: bad email or password length.
#[post("/signup")]
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;
    let user = state.auth.signup(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// Log in
///
/// Sets the `auth_token` cookie for 24 hours.
///
/// ## Responses:
/// - `200 OK`: `{user_id, token}`.
/// - `401 Unauthorized`: unknown email or wrong password (same body for both).
/// - `422 Unprocessable Entity`: malformed email or empty password.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<Credentials>,
) -> Result<impl Responder, AppError> {
    body.validate()?;
    let session = state.auth.login(body.into_inner()).await?;
    let cookie = state
        .cookies
        .session(session.token.clone(), state.tokens.ttl().num_seconds());

    Ok(HttpResponse::Ok().cookie(cookie).json(AuthResponse {
        user_id: session.user_id,
        token: session.token,
    }))
}

/// Log out
///
/// Tokens are stateless, so this only tells the browser to drop the cookie.
#[post("/logout")]
pub async fn logout(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().cookie(state.cookies.cleared()).finish()
}
