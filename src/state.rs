use std::sync::Arc;
use std::time::Duration;

use crate::auth::{CookieSettings, PasswordHasher, TokenIssuer};
use crate::config::Config;
use crate::services::{AuthService, TaskService};
use crate::store::{TaskRepository, UserRepository};
use crate::timeout::DEFAULT_REQUEST_TIMEOUT;

/// Everything the handlers need, built once at startup and shared through
/// `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub tasks: TaskService,
    pub tokens: Arc<TokenIssuer>,
    pub cookies: CookieSettings,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new<S>(
        store: Arc<S>,
        tokens: Arc<TokenIssuer>,
        hasher: PasswordHasher,
        cookies: CookieSettings,
    ) -> Self
    where
        S: UserRepository + TaskRepository + 'static,
    {
        let users: Arc<dyn UserRepository> = store.clone();
        let tasks: Arc<dyn TaskRepository> = store;
        Self {
            auth: AuthService::new(users, Arc::clone(&tokens), hasher),
            tasks: TaskService::new(tasks),
            tokens,
            cookies,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn from_config<S>(store: Arc<S>, config: &Config) -> Self
    where
        S: UserRepository + TaskRepository + 'static,
    {
        let state = Self::new(
            store,
            Arc::new(TokenIssuer::new(&config.secret)),
            PasswordHasher::new(config.bcrypt_cost),
            CookieSettings {
                domain: config.api_domain.clone(),
                secure: config.cookie_secure,
            },
        );
        Self {
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            ..state
        }
    }
}
