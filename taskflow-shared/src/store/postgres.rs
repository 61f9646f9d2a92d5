use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreResult};
use crate::db::pool::health_check;
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::refresh_token::{CreateRefreshToken, RefreshToken};
use crate::models::task::{CreateTask, Task, TaskPatch};
use crate::models::user::{CreateUser, User};

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn create_refresh_token(&self, data: CreateRefreshToken) -> StoreResult<RefreshToken> {
        Ok(RefreshToken::create(&self.pool, data).await?)
    }

    async fn find_refresh_token(&self, token_hash: &str) -> StoreResult<Option<RefreshToken>> {
        Ok(RefreshToken::find_live(&self.pool, token_hash).await?)
    }

    async fn consume_refresh_token(&self, token_hash: &str) -> StoreResult<Option<RefreshToken>> {
        Ok(RefreshToken::consume(&self.pool, token_hash).await?)
    }

    async fn delete_refresh_token(&self, token_hash: &str) -> StoreResult<bool> {
        Ok(RefreshToken::delete_by_hash(&self.pool, token_hash).await?)
    }

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        Ok(Project::create(&self.pool, data).await?)
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(Project::find_by_id(&self.pool, id).await?)
    }

    async fn list_projects_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Project>> {
        Ok(Project::list_for_user(&self.pool, user_id).await?)
    }

    async fn update_project(
        &self,
        id: Uuid,
        owner_id: Uuid,
        data: UpdateProject,
    ) -> StoreResult<Option<Project>> {
        Ok(Project::update_owned(&self.pool, id, owner_id, data).await?)
    }

    async fn delete_project(&self, id: Uuid, owner_id: Uuid) -> StoreResult<bool> {
        Ok(Project::delete_owned(&self.pool, id, owner_id).await?)
    }

    async fn add_project_member(
        &self,
        id: Uuid,
        owner_id: Uuid,
        member_id: Uuid,
    ) -> StoreResult<Option<Project>> {
        Ok(Project::add_member(&self.pool, id, owner_id, member_id).await?)
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn list_tasks_for_project(&self, project_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_project(&self.pool, project_id).await?)
    }

    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> StoreResult<Option<Task>> {
        Ok(Task::update(&self.pool, id, patch).await?)
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Task::delete(&self.pool, id).await?)
    }
}
