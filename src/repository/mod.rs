//! Owner-scoped task storage.
//!
//! Every method takes the owner id and only ever touches rows belonging to
//! that owner. A task owned by someone else is indistinguishable from one that
//! does not exist.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewTask, Task, TaskUpdate};

pub use memory::InMemoryTaskRepository;
pub use postgres::PgTaskRepository;

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task for `owner_id` and returns it with its assigned id and timestamps.
    async fn insert(&self, owner_id: i64, input: NewTask) -> Result<Task, AppError>;

    /// All tasks of `owner_id`, newest first.
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Task>, AppError>;

    async fn find_by_owner(&self, owner_id: i64, task_id: i64) -> Result<Option<Task>, AppError>;

    /// Applies a partial update. `Ok(None)` when the task is absent or foreign.
    async fn update(
        &self,
        owner_id: i64,
        task_id: i64,
        changes: TaskUpdate,
    ) -> Result<Option<Task>, AppError>;

    /// Sets the completion flag. Leaves the row untouched, `updated_at`
    /// included, when the flag already has the requested value.
    async fn set_completed(
        &self,
        owner_id: i64,
        task_id: i64,
        completed: bool,
    ) -> Result<Option<Task>, AppError>;

    /// Returns `true` if a row was removed.
    async fn delete(&self, owner_id: i64, task_id: i64) -> Result<bool, AppError>;

    /// Checks that the storage backend is reachable.
    async fn ping(&self) -> Result<(), AppError>;

    /// Short name of the backend, reported by the health endpoint.
    fn backend(&self) -> &'static str;
}
