use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use super::TaskRepository;
use crate::error::AppError;
use crate::models::{NewTask, Task, TaskUpdate};

#[derive(Debug, Default)]
struct Store {
    next_id: i64,
    tasks: BTreeMap<i64, Task>,
}

impl Store {
    fn owned_mut(&mut self, owner_id: i64, task_id: i64) -> Option<&mut Task> {
        self.tasks
            .get_mut(&task_id)
            .filter(|task| task.user_id == owner_id)
    }
}

/// Process-local task storage.
///
/// Used when no database is configured and by the test suite. Data does not
/// survive a restart.
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    store: RwLock<Store>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A timestamp strictly later than `previous`, so that `updated_at` always
/// advances even when the clock has not.
fn advance(previous: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(previous + Duration::microseconds(1))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn insert(&self, owner_id: i64, input: NewTask) -> Result<Task, AppError> {
        let mut store = self.store.write().await;
        store.next_id += 1;

        let now = Utc::now();
        let task = Task {
            id: store.next_id,
            user_id: owner_id,
            title: input.title,
            description: input.description,
            completed: input.completed,
            created_at: now,
            updated_at: now,
        };
        store.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Task>, AppError> {
        let store = self.store.read().await;
        // Ids grow with insertion order, so reverse id order is newest first.
        Ok(store
            .tasks
            .values()
            .rev()
            .filter(|task| task.user_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_by_owner(&self, owner_id: i64, task_id: i64) -> Result<Option<Task>, AppError> {
        let store = self.store.read().await;
        Ok(store
            .tasks
            .get(&task_id)
            .filter(|task| task.user_id == owner_id)
            .cloned())
    }

    async fn update(
        &self,
        owner_id: i64,
        task_id: i64,
        changes: TaskUpdate,
    ) -> Result<Option<Task>, AppError> {
        let mut store = self.store.write().await;
        Ok(store.owned_mut(owner_id, task_id).map(|task| {
            let now = advance(task.updated_at);
            changes.apply_to(task, now);
            task.clone()
        }))
    }

    async fn set_completed(
        &self,
        owner_id: i64,
        task_id: i64,
        completed: bool,
    ) -> Result<Option<Task>, AppError> {
        let mut store = self.store.write().await;
        Ok(store.owned_mut(owner_id, task_id).map(|task| {
            if task.completed != completed {
                task.completed = completed;
                task.updated_at = advance(task.updated_at);
            }
            task.clone()
        }))
    }

    async fn delete(&self, owner_id: i64, task_id: i64) -> Result<bool, AppError> {
        let mut store = self.store.write().await;
        if store.owned_mut(owner_id, task_id).is_none() {
            return Ok(false);
        }
        Ok(store.tasks.remove(&task_id).is_some())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
