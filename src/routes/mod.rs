pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::auth::{AuthMiddleware, CsrfMiddleware};
use crate::error::AppError;
use crate::state::AppState;
use crate::timeout::RequestTimeout;

/// Registers the `/api/v1` routes. Everything under `/api/v1` has a time
/// limit and the CSRF check; `/users` and `/tasks` also sit behind
/// [`AuthMiddleware`].
pub fn config(cfg: &mut web::ServiceConfig, state: web::Data<AppState>) {
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into());
    let path_config = web::PathConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into());

    cfg.app_data(state.clone())
        .app_data(json_config)
        .app_data(path_config)
        .service(
            web::scope("/api/v1")
                .wrap(CsrfMiddleware)
                .wrap(RequestTimeout::new(state.request_timeout))
                .service(
                    web::scope("/auth")
                        .service(auth::csrf_token)
                        .service(auth::signup)
                        .service(auth::login)
                        .service(auth::logout),
                )
                .service(
                    web::scope("/users")
                        .wrap(AuthMiddleware::new(state.tokens.clone()))
                        .service(users::current_user)
                        .service(users::delete_user),
                )
                .service(
                    web::scope("/tasks")
                        .wrap(AuthMiddleware::new(state.tokens.clone()))
                        .service(tasks::get_tasks)
                        .service(tasks::create_task)
                        .service(tasks::get_task)
                        .service(tasks::update_task)
                        .service(tasks::delete_task),
                ),
        );
}
