/// Persistence seam
///
/// Services talk to storage only through the [`Store`] trait. Two backends
/// implement it:
///
/// - [`PgStore`]: PostgreSQL via the queries on the model types
/// - [`MemoryStore`]: process-local maps, used by tests and `DATABASE_URL=memory://`
///
/// Every mutating method is a single atomic step on one record. Owner-scoped
/// project writes take the caller's id and only succeed when it matches the
/// stored owner at the moment of the write, so a concurrent ownership check
/// can never be stale.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::refresh_token::{CreateRefreshToken, RefreshToken};
use crate::models::task::{CreateTask, Task, TaskPatch};
use crate::models::user::{CreateUser, User};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (constraint name attached)
    #[error("duplicate value violates {0}")]
    Duplicate(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                let constraint = db.constraint().unwrap_or("unique constraint").to_string();
                return StoreError::Duplicate(constraint);
            }
        }
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend-neutral persistence for users, refresh tokens, projects and tasks
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for health output
    fn backend(&self) -> &'static str;

    /// Verifies the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    // Users

    /// Fails with [`StoreError::Duplicate`] if the email is taken
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    // Refresh tokens

    async fn create_refresh_token(&self, data: CreateRefreshToken) -> StoreResult<RefreshToken>;

    /// Live (unexpired) record for a hash
    async fn find_refresh_token(&self, token_hash: &str) -> StoreResult<Option<RefreshToken>>;

    /// Removes and returns the live record for a hash in one step
    async fn consume_refresh_token(&self, token_hash: &str) -> StoreResult<Option<RefreshToken>>;

    /// Removes the record for a hash; `false` if there was none
    async fn delete_refresh_token(&self, token_hash: &str) -> StoreResult<bool>;

    // Projects

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project>;
    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>>;

    /// Projects where the user is owner or member, most recently updated first
    async fn list_projects_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Project>>;

    /// `None` when absent or not owned by `owner_id`
    async fn update_project(
        &self,
        id: Uuid,
        owner_id: Uuid,
        data: UpdateProject,
    ) -> StoreResult<Option<Project>>;

    /// `false` when absent or not owned by `owner_id`
    async fn delete_project(&self, id: Uuid, owner_id: Uuid) -> StoreResult<bool>;

    /// Set insertion of `member_id`; `None` when absent or not owned by `owner_id`
    ///
    /// `updated_at` moves only when `member_id` was not already a member.
    async fn add_project_member(
        &self,
        id: Uuid,
        owner_id: Uuid,
        member_id: Uuid,
    ) -> StoreResult<Option<Project>>;

    // Tasks

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task>;
    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Tasks of a project, most recently updated first
    async fn list_tasks_for_project(&self, project_id: Uuid) -> StoreResult<Vec<Task>>;
    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> StoreResult<Option<Task>>;
    async fn delete_task(&self, id: Uuid) -> StoreResult<bool>;
}
