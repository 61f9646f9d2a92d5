use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::auth::authorization::is_owner;
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::refresh_token::{CreateRefreshToken, RefreshToken};
use crate::models::task::{CreateTask, Task, TaskPatch};
use crate::models::user::{CreateUser, User, UserRole};

/// In-memory store
///
/// All state sits behind one `RwLock`, so each trait call observes and
/// mutates a consistent snapshot. Timestamps come from a monotonic clock:
/// two writes never share an `updated_at`, which keeps "most recently
/// updated first" ordering deterministic.
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    refresh_tokens: HashMap<String, RefreshToken>,
    projects: HashMap<Uuid, Project>,
    tasks: HashMap<Uuid, Task>,
    last_tick: Option<DateTime<Utc>>,
}

impl Inner {
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_tick {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_tick = Some(next);
        next
    }

    fn live_token(&self, token_hash: &str) -> Option<&RefreshToken> {
        self.refresh_tokens
            .get(token_hash)
            .filter(|token| !token.is_expired())
    }

    fn owned_project_mut(&mut self, id: Uuid, owner_id: Uuid) -> Option<&mut Project> {
        self.projects
            .get_mut(&id)
            .filter(|project| is_owner(owner_id, project))
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tasks, including ones whose project is gone
    pub async fn task_count(&self) -> usize {
        self.inner.read().await.tasks.len()
    }
}

fn newest_first<T>(items: &mut [T], updated_at: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by(|a, b| updated_at(b).cmp(&updated_at(a)));
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut inner = self.inner.write().await;

        if inner.users.values().any(|u| u.email == data.email) {
            return Err(StoreError::Duplicate("users_email_key".to_string()));
        }

        let now = inner.tick();
        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            role: UserRole::default(),
            teams: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_refresh_token(&self, data: CreateRefreshToken) -> StoreResult<RefreshToken> {
        let mut inner = self.inner.write().await;

        if inner.refresh_tokens.contains_key(&data.token_hash) {
            return Err(StoreError::Duplicate(
                "refresh_tokens_token_hash_key".to_string(),
            ));
        }

        let now = inner.tick();
        let token = RefreshToken {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            token_hash: data.token_hash,
            user_agent: data.user_agent,
            created_at: now,
            expires_at: data.expires_at,
        };
        inner
            .refresh_tokens
            .insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn find_refresh_token(&self, token_hash: &str) -> StoreResult<Option<RefreshToken>> {
        Ok(self.inner.read().await.live_token(token_hash).cloned())
    }

    async fn consume_refresh_token(&self, token_hash: &str) -> StoreResult<Option<RefreshToken>> {
        let mut inner = self.inner.write().await;
        if inner.live_token(token_hash).is_none() {
            return Ok(None);
        }
        Ok(inner.refresh_tokens.remove(token_hash))
    }

    async fn delete_refresh_token(&self, token_hash: &str) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.refresh_tokens.remove(token_hash).is_some())
    }

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        let mut inner = self.inner.write().await;
        let now = inner.tick();
        let project = Project {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            owner_id: data.owner_id,
            members: vec![data.owner_id],
            created_at: now,
            updated_at: now,
        };
        inner.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(self.inner.read().await.projects.get(&id).cloned())
    }

    async fn list_projects_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Project>> {
        let inner = self.inner.read().await;
        let mut projects: Vec<Project> = inner
            .projects
            .values()
            .filter(|p| p.owner_id == user_id || p.members.contains(&user_id))
            .cloned()
            .collect();
        newest_first(&mut projects, |p| p.updated_at);
        Ok(projects)
    }

    async fn update_project(
        &self,
        id: Uuid,
        owner_id: Uuid,
        data: UpdateProject,
    ) -> StoreResult<Option<Project>> {
        let mut inner = self.inner.write().await;
        let now = inner.tick();
        let Some(project) = inner.owned_project_mut(id, owner_id) else {
            return Ok(None);
        };

        if let Some(name) = data.name {
            project.name = name;
        }
        if let Some(description) = data.description {
            project.description = Some(description);
        }
        project.updated_at = now;
        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, id: Uuid, owner_id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.owned_project_mut(id, owner_id).is_none() {
            return Ok(false);
        }
        Ok(inner.projects.remove(&id).is_some())
    }

    async fn add_project_member(
        &self,
        id: Uuid,
        owner_id: Uuid,
        member_id: Uuid,
    ) -> StoreResult<Option<Project>> {
        let mut inner = self.inner.write().await;
        let now = inner.tick();
        let Some(project) = inner.owned_project_mut(id, owner_id) else {
            return Ok(None);
        };

        if !project.members.contains(&member_id) {
            project.members.push(member_id);
            project.updated_at = now;
        }
        Ok(Some(project.clone()))
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        let mut inner = self.inner.write().await;
        let now = inner.tick();
        let task = Task {
            id: Uuid::new_v4(),
            project_id: data.project_id,
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            due_date: data.due_date,
            assignee: data.assignee,
            tags: data.tags,
            created_at: now,
            updated_at: now,
        };
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(self.inner.read().await.tasks.get(&id).cloned())
    }

    async fn list_tasks_for_project(&self, project_id: Uuid) -> StoreResult<Vec<Task>> {
        let inner = self.inner.read().await;
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect();
        newest_first(&mut tasks, |t| t.updated_at);
        Ok(tasks)
    }

    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> StoreResult<Option<Task>> {
        let mut inner = self.inner.write().await;
        let now = inner.tick();
        let Some(task) = inner.tasks.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply_to(task, now);
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.tasks.remove(&id).is_some())
    }
}
