use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{NewTask, TaskPatch},
    state::AppState,
};

/// Lists the caller's tasks in id order.
///
/// ## Responses:
/// - `200 OK`: JSON array of tasks.
/// - `401 Unauthorized`: missing or invalid session.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list(user_id.0).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the caller.
///
/// The owner is always the authenticated user; a `user_id` in the body is ignored.
///
/// ## Responses:
/// - `201 Created`: the new task.
/// - `401 Unauthorized`: missing or invalid session.
/// - `422 Unprocessable Entity`: title empty or longer than 200 characters.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
    body: web::Json<NewTask>,
) -> Result<impl Responder, AppError> {
    body.validate()?;
    let task = state.tasks.create(user_id.0, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Fetches one of the caller's tasks.
///
/// ## Responses:
/// - `200 OK`: the task.
/// - `404 Not Found`: no such task for this user, including tasks owned by others.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.get(user_id.0, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Applies a partial update; fields missing from the body are kept.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `404 Not Found`: no such task for this user.
/// - `422 Unprocessable Entity`: title present but empty or too long.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
    task_id: web::Path<i32>,
    body: web::Json<TaskPatch>,
) -> Result<impl Responder, AppError> {
    body.validate()?;
    let task = state
        .tasks
        .update(user_id.0, task_id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes one of the caller's tasks.
///
/// ## Responses:
/// - `204 No Content`: deleted.
/// - `404 Not Found`: no such task for this user.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    state.tasks.delete(user_id.0, task_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
