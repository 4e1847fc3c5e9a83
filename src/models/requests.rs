//! Request DTOs for the todo API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::config::CompletionUpdate;
use crate::models::TodoEntity;

/// Request body for creating a todo (POST /todo)
///
/// # Fields
/// - `task_description`: Required, non-empty
/// - `is_completed`: Accepted but ignored; new todos start incomplete
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub task_description: Option<String>,
    #[serde(default)]
    pub is_completed: Option<bool>,
}

impl CreateTodoRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match self.task_description.as_deref() {
            Some(description) if !description.is_empty() => None,
            _ => Some("The request must have a TaskDescription.".to_string()),
        }
    }
}

/// Request body for updating a todo (PUT /todo/{id})
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    /// Replaces the description when present and non-empty
    #[serde(default)]
    pub task_description: Option<String>,
    #[serde(default)]
    pub is_completed: Option<bool>,
}

impl UpdateTodoRequest {
    /// Applies this update to `todo`.
    ///
    /// Under `CompletionUpdate::Overwrite` an omitted `isCompleted` is
    /// written as `false`; under `Preserve` it leaves the flag alone.
    pub fn apply_to(&self, todo: &mut TodoEntity, policy: CompletionUpdate) {
        match (self.is_completed, policy) {
            (Some(flag), _) => todo.is_completed = flag,
            (None, CompletionUpdate::Overwrite) => todo.is_completed = false,
            (None, CompletionUpdate::Preserve) => {}
        }

        if let Some(description) = self.task_description.as_deref() {
            if !description.is_empty() {
                todo.task_description = description.to_string();
            }
        }
    }
}
