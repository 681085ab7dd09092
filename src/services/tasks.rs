use std::sync::Arc;

use crate::error::AppError;
use crate::models::{NewTask, Task, TaskPatch};
use crate::store::TaskRepository;

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

/// Task CRUD for a single, already authenticated owner.
///
/// A task that belongs to someone else is reported exactly like a task that
/// does not exist.
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepository>) -> Self {
        Self { tasks }
    }

    pub async fn create(&self, user_id: i32, input: NewTask) -> Result<Task, AppError> {
        self.tasks.insert(user_id, &input.title).await
    }

    pub async fn get(&self, user_id: i32, task_id: i32) -> Result<Task, AppError> {
        self.tasks
            .find_owned(user_id, task_id)
            .await?
            .ok_or_else(task_not_found)
    }

    pub async fn list(&self, user_id: i32) -> Result<Vec<Task>, AppError> {
        self.tasks.list_owned(user_id).await
    }

    pub async fn update(
        &self,
        user_id: i32,
        task_id: i32,
        patch: TaskPatch,
    ) -> Result<Task, AppError> {
        let mut task = self.get(user_id, task_id).await?;
        task.apply(patch);
        // the row can vanish between the read and the write
        self.tasks
            .save_owned(&task)
            .await?
            .ok_or_else(task_not_found)
    }

    pub async fn delete(&self, user_id: i32, task_id: i32) -> Result<(), AppError> {
        if self.tasks.delete_owned(user_id, task_id).await? {
            Ok(())
        } else {
            Err(task_not_found())
        }
    }
}
