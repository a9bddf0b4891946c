use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::error::AppError;

/// A to-do item owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// System-assigned identifier.
    pub id: i64,
    /// Owner of the task. Fixed at creation.
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewTask {
    /// Must be between 1 and 200 characters and not only whitespace.
    #[validate(
        length(min = 1, max = 200, message = "title must be between 1 and 200 characters"),
        custom = "validate_title_not_blank"
    )]
    pub title: String,

    /// Optional, at most 1000 characters.
    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    pub description: Option<String>,

    /// Defaults to `false`.
    #[serde(default)]
    pub completed: bool,
}

/// Partial update of a task.
///
/// Omitted fields keep their stored value. For `description`, an explicit
/// `null` clears the stored text while omission leaves it alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TaskUpdate {
    #[validate(
        length(min = 1, max = 200, message = "title must be between 1 and 200 characters"),
        custom = "validate_title_not_blank"
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskUpdate {
    /// Applies the present fields to `task` and stamps `updated_at` with `now`.
    pub fn apply_to(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        task.updated_at = now;
    }
}

/// Rejects titles made only of whitespace.
pub fn validate_title_not_blank(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        let mut error = ValidationError::new("blank_title");
        error.message = Some("title must not be blank".into());
        return Err(error);
    }
    Ok(())
}

/// Distinguishes a field that is present (even as `null`) from one that is absent.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Reads the `completed` flag of a set-completion body.
///
/// The field must be present and a JSON boolean; strings such as `"yes"` or
/// numbers such as `1` are rejected rather than coerced.
pub fn parse_completion(payload: &Value) -> Result<bool, AppError> {
    match payload.get("completed") {
        None => Err(AppError::InvalidPayload(
            "request must include 'completed' field with boolean value".into(),
        )),
        Some(Value::Bool(completed)) => Ok(*completed),
        Some(_) => Err(AppError::InvalidPayload(
            "'completed' field must be a boolean value".into(),
        )),
    }
}
