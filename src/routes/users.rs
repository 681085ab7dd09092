use actix_web::{delete, get, web, HttpResponse, Responder};

use crate::{
    auth::AuthenticatedUserId, error::AppError, models::UserResponse, state::AppState,
};

/// Returns the logged-in user.
#[get("")]
pub async fn current_user(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let user = state.auth.current_user(user_id.0).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// Deletes the logged-in user and their tasks, then clears the session cookie.
#[delete("")]
pub async fn delete_user(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    state.auth.delete_user(user_id.0).await?;
    Ok(HttpResponse::NoContent()
        .cookie(state.cookies.cleared())
        .finish())
}
