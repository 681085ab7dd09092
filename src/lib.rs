#![doc = "The `todoforge` library crate."]
#![doc = ""]
#![doc = "Account signup and login with cookie-carried JWT sessions, plus per-user"]
#![doc = "task CRUD. The binary (`main.rs`) wires these pieces into an HTTP server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod timeout;

pub use crate::error::AppError;
pub use crate::state::AppState;
