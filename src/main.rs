use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{http::header, web, App, HttpServer};
use log::info;

use todoforge::auth::CSRF_HEADER;
use todoforge::config::Config;
use todoforge::routes::{self, health};
use todoforge::state::AppState;
use todoforge::store::PgStore;

fn to_io_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    if std::env::var("APP_ENV").map_or(true, |env| env == "development") {
        dotenv::from_filename(".env.development").ok();
    }
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(to_io_error)?;

    let store = PgStore::connect(&config.database_url)
        .await
        .map_err(to_io_error)?;
    store.migrate().await.map_err(to_io_error)?;
    info!("database ready");

    let state = web::Data::new(AppState::from_config(Arc::new(store), &config));
    let origins = config.cors_allow_origins.clone();

    info!("starting server at {} ({})", config.server_url(), config.app_env);
    HttpServer::new(move || {
        let cors = origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .supports_credentials()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .allowed_header(CSRF_HEADER)
            .max_age(3600);

        let state = state.clone();
        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .service(health::health)
            .configure(move |cfg| routes::config(cfg, state))
    })
    .shutdown_timeout(2)
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
