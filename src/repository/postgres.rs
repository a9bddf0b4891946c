use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::TaskRepository;
use crate::error::AppError;
use crate::models::{NewTask, Task, TaskUpdate};

const TASK_COLUMNS: &str = "id, user_id, title, description, completed, created_at, updated_at";

/// Postgres-backed task storage.
///
/// Every statement filters on `user_id`, so a foreign task never matches.
#[derive(Debug, Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool and applies pending migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn insert(&self, owner_id: i64, input: NewTask) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks (user_id, title, description, completed) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {}",
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(owner_id)
            .bind(input.title)
            .bind(input.description)
            .bind(input.completed)
            .fetch_one(&self.pool)
            .await?;

        Ok(task)
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            TASK_COLUMNS
        );

        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(tasks)
    }

    async fn find_by_owner(&self, owner_id: i64, task_id: i64) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(task_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(task)
    }

    async fn update(
        &self,
        owner_id: i64,
        task_id: i64,
        changes: TaskUpdate,
    ) -> Result<Option<Task>, AppError> {
        // $2 flags whether description was sent at all; $3 may then be NULL to clear it.
        let sql = format!(
            "UPDATE tasks SET \
                 title = COALESCE($1, title), \
                 description = CASE WHEN $2 THEN $3 ELSE description END, \
                 completed = COALESCE($4, completed), \
                 updated_at = now() \
             WHERE id = $5 AND user_id = $6 \
             RETURNING {}",
            TASK_COLUMNS
        );

        let description_present = changes.description.is_some();
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(changes.title)
            .bind(description_present)
            .bind(changes.description.flatten())
            .bind(changes.completed)
            .bind(task_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(task)
    }

    async fn set_completed(
        &self,
        owner_id: i64,
        task_id: i64,
        completed: bool,
    ) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "UPDATE tasks SET \
                 updated_at = CASE WHEN completed = $1 THEN updated_at ELSE now() END, \
                 completed = $1 \
             WHERE id = $2 AND user_id = $3 \
             RETURNING {}",
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(completed)
            .bind(task_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(task)
    }

    async fn delete(&self, owner_id: i64, task_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(task_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
