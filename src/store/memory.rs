use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::models::{Task, User};
use crate::store::{TaskRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    tasks: Vec<Task>,
    next_user_id: i32,
    next_task_id: i32,
}

/// In-process store with the same contract as [`crate::store::PgStore`].
///
/// Rows are kept in insertion order, which is also id order. Used by the test
/// suites.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|user| user.email == email) {
            return Err(AppError::Conflict("Email already registered".into()));
        }
        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|user| user.email == email).cloned())
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.users.len();
        tables.users.retain(|user| user.id != id);
        if tables.users.len() == before {
            return Ok(false);
        }
        tables.tasks.retain(|task| task.user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn insert(&self, user_id: i32, title: &str) -> Result<Task, AppError> {
        let mut tables = self.tables.write().await;
        // mirrors the foreign key on tasks.user_id
        if !tables.users.iter().any(|user| user.id == user_id) {
            return Err(AppError::NotFound("User not found".into()));
        }
        tables.next_task_id += 1;
        let task = Task {
            id: tables.next_task_id,
            title: title.to_string(),
            user_id,
        };
        tables.tasks.push(task.clone());
        Ok(task)
    }

    async fn find_owned(&self, user_id: i32, task_id: i32) -> Result<Option<Task>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .find(|task| task.id == task_id && task.user_id == user_id)
            .cloned())
    }

    async fn list_owned(&self, user_id: i32) -> Result<Vec<Task>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .filter(|task| task.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn save_owned(&self, task: &Task) -> Result<Option<Task>, AppError> {
        let mut tables = self.tables.write().await;
        match tables
            .tasks
            .iter_mut()
            .find(|stored| stored.id == task.id && stored.user_id == task.user_id)
        {
            Some(stored) => {
                stored.title = task.title.clone();
                Ok(Some(stored.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_owned(&self, user_id: i32, task_id: i32) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.tasks.len();
        tables
            .tasks
            .retain(|task| !(task.id == task_id && task.user_id == user_id));
        Ok(tables.tasks.len() < before)
    }
}
