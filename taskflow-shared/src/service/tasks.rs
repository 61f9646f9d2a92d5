/// Task operations
///
/// Every task operation requires membership in the task's project. For
/// update and delete the project is taken from the stored task itself, never
/// from the request, so knowing a task id from another project grants
/// nothing.
///
/// Membership failures are `Forbidden("Not authorized for this project")`; a
/// missing task is `NotFound("Task not found")`.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::auth::authorization::{member_project, AuthzError};
use crate::models::project::Project;
use crate::models::task::{trim_optional, NewTask, Task, TaskPatch};
use crate::store::Store;

const NOT_AUTHORIZED: &str = "Not authorized for this project";
const TASK_NOT_FOUND: &str = "Task not found";

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn Store>,
}

impl TaskService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Tasks of a project, most recently updated first
    pub async fn list(&self, project_id: Uuid, user_id: Uuid) -> ServiceResult<Vec<Task>> {
        self.require_member(project_id, user_id).await?;
        Ok(self.store.list_tasks_for_project(project_id).await?)
    }

    pub async fn create(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        fields: NewTask,
    ) -> ServiceResult<Task> {
        if fields.title.trim().is_empty() {
            return Err(ServiceError::Validation("title is required".to_string()));
        }
        self.require_member(project_id, user_id).await?;

        let task = self.store.create_task(fields.into_create(project_id)).await?;

        info!(task_id = %task.id, project_id = %project_id, user_id = %user_id, "Task created");
        Ok(task)
    }

    /// Partial update; `projectId` cannot be changed
    pub async fn update(&self, task_id: Uuid, user_id: Uuid, patch: TaskPatch) -> ServiceResult<Task> {
        let patch = normalize_patch(patch)?;
        let task = self.authorized_task(task_id, user_id).await?;

        let updated = self
            .store
            .update_task(task.id, patch)
            .await?
            .ok_or_else(|| ServiceError::NotFound(TASK_NOT_FOUND.to_string()))?;

        info!(task_id = %task_id, project_id = %updated.project_id, user_id = %user_id, "Task updated");
        Ok(updated)
    }

    pub async fn delete(&self, task_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        let task = self.authorized_task(task_id, user_id).await?;

        if !self.store.delete_task(task.id).await? {
            return Err(ServiceError::NotFound(TASK_NOT_FOUND.to_string()));
        }

        info!(task_id = %task_id, project_id = %task.project_id, user_id = %user_id, "Task deleted");
        Ok(())
    }

    async fn require_member(&self, project_id: Uuid, user_id: Uuid) -> ServiceResult<Project> {
        member_project(self.store.as_ref(), project_id, user_id)
            .await
            .map_err(|e| match e {
                AuthzError::Store(e) => e.into(),
                _ => ServiceError::Forbidden(NOT_AUTHORIZED.to_string()),
            })
    }

    /// Loads the task and checks membership in its own project
    async fn authorized_task(&self, task_id: Uuid, user_id: Uuid) -> ServiceResult<Task> {
        let task = self
            .store
            .find_task(task_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(TASK_NOT_FOUND.to_string()))?;

        self.require_member(task.project_id, user_id).await?;
        Ok(task)
    }
}

fn normalize_patch(mut patch: TaskPatch) -> ServiceResult<TaskPatch> {
    if let Some(title) = patch.title.take() {
        let title = title.trim();
        if title.is_empty() {
            return Err(ServiceError::Validation("title cannot be empty".to_string()));
        }
        patch.title = Some(title.to_string());
    }
    if let Some(description) = patch.description.take() {
        patch.description = Some(trim_optional(description));
    }
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::CreateProject;
    use crate::models::task::{Assignee, TaskPriority, TaskStatus};
    use crate::store::MemoryStore;

    struct Fixture {
        store: MemoryStore,
        tasks: TaskService,
        owner: Uuid,
        project: Project,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let project = store
            .create_project(CreateProject {
                name: "Launch".to_string(),
                description: None,
                owner_id: owner,
            })
            .await
            .unwrap();

        Fixture {
            tasks: TaskService::new(Arc::new(store.clone())),
            store,
            owner,
            project,
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let f = fixture().await;

        let created = f
            .tasks
            .create(
                f.project.id,
                f.owner,
                NewTask {
                    title: "Fix bug".to_string(),
                    status: Some(TaskStatus::Todo),
                    priority: Some(TaskPriority::High),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let listed = f.tasks.list(f.project.id, f.owner).await.unwrap();
        assert_eq!(listed, vec![created.clone()]);
        assert_eq!(created.title, "Fix bug");
        assert_eq!(created.priority, TaskPriority::High);
        assert!(created.tags.is_empty());
        assert_eq!(created.assignee, Assignee::Unassigned);
    }

    #[tokio::test]
    async fn test_create_requires_title() {
        let f = fixture().await;
        let err = f
            .tasks
            .create(f.project.id, f.owner, NewTask::titled("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_non_member_forbidden_everywhere() {
        let f = fixture().await;
        let stranger = Uuid::new_v4();
        let task = f
            .tasks
            .create(f.project.id, f.owner, NewTask::titled("Secret"))
            .await
            .unwrap();

        assert!(matches!(
            f.tasks.list(f.project.id, stranger).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            f.tasks.create(f.project.id, stranger, NewTask::titled("x")).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            f.tasks.update(task.id, stranger, TaskPatch::status(TaskStatus::Done)).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            f.tasks.delete(task.id, stranger).await,
            Err(ServiceError::Forbidden(_))
        ));

        let unchanged = f.store.find_task(task.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, TaskStatus::Todo);
    }

    #[tokio::test]
    async fn test_update_uses_tasks_own_project() {
        let f = fixture().await;
        let other_owner = Uuid::new_v4();
        f.store
            .create_project(CreateProject {
                name: "Other".to_string(),
                description: None,
                owner_id: other_owner,
            })
            .await
            .unwrap();

        let task = f
            .tasks
            .create(f.project.id, f.owner, NewTask::titled("Mine"))
            .await
            .unwrap();

        let err = f
            .tasks
            .update(task.id, other_owner, TaskPatch::priority(TaskPriority::Low))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(ref m) if m == NOT_AUTHORIZED));
    }

    #[tokio::test]
    async fn test_missing_task_not_found() {
        let f = fixture().await;
        assert!(matches!(
            f.tasks.update(Uuid::new_v4(), f.owner, TaskPatch::default()).await,
            Err(ServiceError::NotFound(ref m)) if m == TASK_NOT_FOUND
        ));
        assert!(matches!(
            f.tasks.delete(Uuid::new_v4(), f.owner).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let f = fixture().await;
        let task = f
            .tasks
            .create(
                f.project.id,
                f.owner,
                NewTask {
                    title: "Fix bug".to_string(),
                    priority: Some(TaskPriority::High),
                    tags: vec!["backend".to_string()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let moved = f
            .tasks
            .update(task.id, f.owner, TaskPatch::status(TaskStatus::Done))
            .await
            .unwrap();
        assert_eq!(moved.status, TaskStatus::Done);
        assert_eq!(moved.priority, TaskPriority::High);
        assert_eq!(moved.tags, vec!["backend".to_string()]);
        assert_eq!(moved.project_id, f.project.id);

        let err = f
            .tasks
            .update(
                task.id,
                f.owner,
                TaskPatch {
                    title: Some("  ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_orphaned_tasks_unreachable() {
        let f = fixture().await;
        let task = f
            .tasks
            .create(f.project.id, f.owner, NewTask::titled("Orphan"))
            .await
            .unwrap();

        f.store.delete_project(f.project.id, f.owner).await.unwrap();

        assert!(matches!(
            f.tasks.update(task.id, f.owner, TaskPatch::default()).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert_eq!(f.store.task_count().await, 1);
    }
}
