//! Task operations with ownership enforcement.
//!
//! Every operation runs the same pipeline: validate path identifiers, check
//! that the verified claims belong to the path owner, validate the payload,
//! call the repository and turn absence into `AppError::TaskNotFound`. The
//! ownership check is repeated on every call.
//!
//! Create and list answer a foreign path owner with `OwnershipMismatch`.
//! The single-task operations answer it with `TaskNotFound`, the same
//! outcome as a task that does not exist.
//!
//! Update, delete and set-completion read the task before mutating it. A
//! concurrent delete between the read and the write surfaces as
//! `TaskNotFound`.

use std::sync::Arc;

use serde_json::Value;
use validator::Validate;

use crate::auth::{authorize, require_positive_id, Claims};
use crate::error::AppError;
use crate::models::{parse_completion, NewTask, Task, TaskUpdate};
use crate::repository::TaskRepository;

#[derive(Clone)]
pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self { repo }
    }

    pub fn backend(&self) -> &'static str {
        self.repo.backend()
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.repo.ping().await
    }

    pub async fn create(
        &self,
        claims: &Claims,
        owner_id: i64,
        input: NewTask,
    ) -> Result<Task, AppError> {
        self.admit_owner(claims, owner_id)?;
        input.validate()?;

        let task = self.repo.insert(owner_id, input).await?;
        log::info!("created task {} for user {}", task.id, owner_id);
        Ok(task)
    }

    /// Lists the owner's tasks. An owner without tasks gets an empty list.
    pub async fn list(&self, claims: &Claims, owner_id: i64) -> Result<Vec<Task>, AppError> {
        self.admit_owner(claims, owner_id)?;
        self.repo.list_by_owner(owner_id).await
    }

    pub async fn get(&self, claims: &Claims, owner_id: i64, task_id: i64) -> Result<Task, AppError> {
        self.admit_task(claims, owner_id, task_id)?;
        self.existing(owner_id, task_id).await
    }

    /// Applies a partial update. Fields missing from `changes` keep their value.
    pub async fn update(
        &self,
        claims: &Claims,
        owner_id: i64,
        task_id: i64,
        changes: TaskUpdate,
    ) -> Result<Task, AppError> {
        self.admit_task(claims, owner_id, task_id)?;
        changes.validate()?;
        self.existing(owner_id, task_id).await?;

        self.repo
            .update(owner_id, task_id, changes)
            .await?
            .ok_or(AppError::TaskNotFound)
    }

    pub async fn delete(&self, claims: &Claims, owner_id: i64, task_id: i64) -> Result<(), AppError> {
        self.admit_task(claims, owner_id, task_id)?;
        self.existing(owner_id, task_id).await?;

        if !self.repo.delete(owner_id, task_id).await? {
            return Err(AppError::TaskNotFound);
        }
        log::info!("deleted task {} of user {}", task_id, owner_id);
        Ok(())
    }

    /// Sets the completion flag from a raw JSON body.
    ///
    /// The body must contain `completed` as a JSON boolean. Repeating the call
    /// with the same value returns the same task unchanged.
    pub async fn set_completion(
        &self,
        claims: &Claims,
        owner_id: i64,
        task_id: i64,
        payload: &Value,
    ) -> Result<Task, AppError> {
        self.admit_task(claims, owner_id, task_id)?;
        let completed = parse_completion(payload)?;
        self.existing(owner_id, task_id).await?;

        self.repo
            .set_completed(owner_id, task_id, completed)
            .await?
            .ok_or(AppError::TaskNotFound)
    }

    /// Identifier and ownership checks for operations on the owner's collection.
    pub fn admit_owner(&self, claims: &Claims, owner_id: i64) -> Result<(), AppError> {
        require_positive_id(owner_id, "User ID")?;
        authorize(owner_id, claims)
    }

    /// Identifier and ownership checks shared by the single-task operations.
    ///
    /// A foreign path owner is reported as `TaskNotFound` so these routes never
    /// tell "not yours" apart from "does not exist".
    pub fn admit_task(&self, claims: &Claims, owner_id: i64, task_id: i64) -> Result<(), AppError> {
        require_positive_id(owner_id, "User ID")?;
        require_positive_id(task_id, "Task ID")?;
        authorize(owner_id, claims).map_err(|err| match err {
            AppError::OwnershipMismatch => AppError::TaskNotFound,
            other => other,
        })
    }

    async fn existing(&self, owner_id: i64, task_id: i64) -> Result<Task, AppError> {
        log::debug!("looking up task {} of user {}", task_id, owner_id);
        self.repo
            .find_by_owner(owner_id, task_id)
            .await?
            .ok_or(AppError::TaskNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SubjectId;
    use crate::repository::InMemoryTaskRepository;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn claims_for(user_id: i64) -> Claims {
        Claims {
            user_id: Some(SubjectId::Numeric(user_id)),
            sub: None,
            exp: None,
        }
    }

    fn service() -> TaskService {
        TaskService::new(Arc::new(InMemoryTaskRepository::new()))
    }

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.into(),
            description: Some("original description".into()),
            completed: false,
        }
    }

    /// Fails the test if any storage method is reached.
    struct UnreachableRepository;

    #[async_trait]
    impl TaskRepository for UnreachableRepository {
        async fn insert(&self, _: i64, _: NewTask) -> Result<Task, AppError> {
            panic!("insert must not be reached")
        }
        async fn list_by_owner(&self, _: i64) -> Result<Vec<Task>, AppError> {
            panic!("list_by_owner must not be reached")
        }
        async fn find_by_owner(&self, _: i64, _: i64) -> Result<Option<Task>, AppError> {
            panic!("find_by_owner must not be reached")
        }
        async fn update(&self, _: i64, _: i64, _: TaskUpdate) -> Result<Option<Task>, AppError> {
            panic!("update must not be reached")
        }
        async fn set_completed(&self, _: i64, _: i64, _: bool) -> Result<Option<Task>, AppError> {
            panic!("set_completed must not be reached")
        }
        async fn delete(&self, _: i64, _: i64) -> Result<bool, AppError> {
            panic!("delete must not be reached")
        }
        async fn ping(&self) -> Result<(), AppError> {
            Ok(())
        }
        fn backend(&self) -> &'static str {
            "unreachable"
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let service = service();
        let claims = claims_for(1);

        let created = service.create(&claims, 1, new_task("T")).await.unwrap();
        let fetched = service.get(&claims, 1, created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.user_id, 1);
        assert_eq!(fetched.title, "T");
        assert_eq!(fetched.description.as_deref(), Some("original description"));
        assert!(!fetched.completed);
    }

    #[tokio::test]
    async fn test_foreign_tasks_look_missing() {
        let service = service();
        let task = service.create(&claims_for(1), 1, new_task("A's")).await.unwrap();
        let intruder = claims_for(2);

        assert!(matches!(
            service.get(&intruder, 2, task.id).await,
            Err(AppError::TaskNotFound)
        ));
        assert!(matches!(
            service.update(&intruder, 2, task.id, TaskUpdate::default()).await,
            Err(AppError::TaskNotFound)
        ));
        assert!(matches!(
            service
                .set_completion(&intruder, 2, task.id, &json!({ "completed": true }))
                .await,
            Err(AppError::TaskNotFound)
        ));
        assert!(matches!(
            service.delete(&intruder, 2, task.id).await,
            Err(AppError::TaskNotFound)
        ));
        assert!(service.list(&intruder, 2).await.unwrap().is_empty());

        // Still intact for the owner.
        assert_eq!(service.get(&claims_for(1), 1, task.id).await.unwrap(), task);
    }

    #[tokio::test]
    async fn test_path_owner_must_match_subject() {
        let service = service();
        assert!(matches!(
            service.list(&claims_for(2), 1).await,
            Err(AppError::OwnershipMismatch)
        ));
        assert!(matches!(
            service.create(&claims_for(2), 1, new_task("x")).await,
            Err(AppError::OwnershipMismatch)
        ));
    }

    #[tokio::test]
    async fn test_foreign_path_owner_looks_missing_on_single_task_routes() {
        let service = service();
        let task = service.create(&claims_for(1), 1, new_task("A's")).await.unwrap();
        let intruder = claims_for(2);

        assert!(matches!(
            service.get(&intruder, 1, task.id).await,
            Err(AppError::TaskNotFound)
        ));
        assert!(matches!(
            service.update(&intruder, 1, task.id, TaskUpdate::default()).await,
            Err(AppError::TaskNotFound)
        ));
        assert!(matches!(
            service
                .set_completion(&intruder, 1, task.id, &json!({ "completed": true }))
                .await,
            Err(AppError::TaskNotFound)
        ));
        assert!(matches!(
            service.delete(&intruder, 1, task.id).await,
            Err(AppError::TaskNotFound)
        ));

        assert_eq!(service.get(&claims_for(1), 1, task.id).await.unwrap(), task);
    }

    #[tokio::test]
    async fn test_non_positive_ids_never_reach_storage() {
        let service = TaskService::new(Arc::new(UnreachableRepository));
        let claims = claims_for(1);
        let body = json!({ "completed": true });

        for owner in [0, -5] {
            assert!(matches!(
                service.create(&claims, owner, new_task("x")).await,
                Err(AppError::InvalidIdentifier(_))
            ));
            assert!(matches!(
                service.list(&claims, owner).await,
                Err(AppError::InvalidIdentifier(_))
            ));
            assert!(matches!(
                service.get(&claims, owner, 1).await,
                Err(AppError::InvalidIdentifier(_))
            ));
            assert!(matches!(
                service.update(&claims, owner, 1, TaskUpdate::default()).await,
                Err(AppError::InvalidIdentifier(_))
            ));
            assert!(matches!(
                service.delete(&claims, owner, 1).await,
                Err(AppError::InvalidIdentifier(_))
            ));
            assert!(matches!(
                service.set_completion(&claims, owner, 1, &body).await,
                Err(AppError::InvalidIdentifier(_))
            ));
        }

        assert!(matches!(
            service.get(&claims, 1, 0).await,
            Err(AppError::InvalidIdentifier(_))
        ));
        // Bad ids win over a foreign owner.
        assert!(matches!(
            service.get(&claims_for(2), 1, -1).await,
            Err(AppError::InvalidIdentifier(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let service = service();
        let result = service.create(&claims_for(1), 1, new_task("")).await;
        assert!(matches!(result, Err(AppError::InvalidPayload(_))));
    }

    #[tokio::test]
    async fn test_partial_update_keeps_description() {
        let service = service();
        let claims = claims_for(1);
        let task = service.create(&claims, 1, new_task("before")).await.unwrap();

        let changes = TaskUpdate {
            title: Some("after".into()),
            description: None,
            completed: Some(true),
        };
        let updated = service.update(&claims, 1, task.id, changes).await.unwrap();

        assert_eq!(updated.title, "after");
        assert!(updated.completed);
        assert_eq!(updated.description, task.description);
        assert!(updated.updated_at > task.updated_at);
    }

    #[tokio::test]
    async fn test_update_rejects_empty_title() {
        let service = service();
        let claims = claims_for(1);
        let task = service.create(&claims, 1, new_task("t")).await.unwrap();

        let changes = TaskUpdate {
            title: Some(String::new()),
            ..TaskUpdate::default()
        };
        assert!(matches!(
            service.update(&claims, 1, task.id, changes).await,
            Err(AppError::InvalidPayload(_))
        ));
    }

    #[tokio::test]
    async fn test_set_completion_idempotent_and_strict() {
        let service = service();
        let claims = claims_for(1);
        let task = service.create(&claims, 1, new_task("t")).await.unwrap();
        let body = json!({ "completed": true });

        let first = service.set_completion(&claims, 1, task.id, &body).await.unwrap();
        let second = service.set_completion(&claims, 1, task.id, &body).await.unwrap();
        assert_eq!(first, second);
        assert!(second.completed);

        assert!(matches!(
            service
                .set_completion(&claims, 1, task.id, &json!({ "completed": "yes" }))
                .await,
            Err(AppError::InvalidPayload(_))
        ));
        assert!(matches!(
            service.set_completion(&claims, 1, 999, &body).await,
            Err(AppError::TaskNotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let service = service();
        let claims = claims_for(1);
        let task = service.create(&claims, 1, new_task("t")).await.unwrap();

        service.delete(&claims, 1, task.id).await.unwrap();
        assert!(matches!(
            service.get(&claims, 1, task.id).await,
            Err(AppError::TaskNotFound)
        ));
        assert!(matches!(
            service.delete(&claims, 1, task.id).await,
            Err(AppError::TaskNotFound)
        ));
    }
}
