use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents a task as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i32,
    pub title: String,
    /// Owner; always taken from the authenticated session.
    pub user_id: i32,
}

/// Body of `POST /tasks`. Unknown fields, including any `user_id`, are ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct NewTask {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
}

/// Body of `PUT /tasks/{id}`. Fields left out keep their stored value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TaskPatch {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
}

impl Task {
    /// Copies every field present in `patch` onto this task.
    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
    }
}
