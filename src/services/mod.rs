pub mod auth;
pub mod tasks;

pub use auth::{AuthService, Session};
pub use tasks::TaskService;
