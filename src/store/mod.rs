//! Persistence seams.
//!
//! Services talk to storage only through [`UserRepository`] and
//! [`TaskRepository`]. Every task method takes the owner's id and must never
//! read or write a row belonging to anyone else.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Task, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `AppError::Conflict` when the email is taken.
    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, AppError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError>;

    /// Exact, case-sensitive match.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Removes the user and every task they own. Returns `false` if no such user.
    async fn delete(&self, id: i32) -> Result<bool, AppError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn insert(&self, user_id: i32, title: &str) -> Result<Task, AppError>;

    async fn find_owned(&self, user_id: i32, task_id: i32) -> Result<Option<Task>, AppError>;

    /// Ordered by id.
    async fn list_owned(&self, user_id: i32) -> Result<Vec<Task>, AppError>;

    /// Writes `task` back, matching on both `task.id` and `task.user_id`.
    async fn save_owned(&self, task: &Task) -> Result<Option<Task>, AppError>;

    async fn delete_owned(&self, user_id: i32, task_id: i32) -> Result<bool, AppError>;
}
