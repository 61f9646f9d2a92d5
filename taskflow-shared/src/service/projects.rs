/// Project operations
///
/// Reads require membership; rename, delete and add-member require
/// ownership. Every failure of those checks, including "no such project",
/// is reported as `NotFound`.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::auth::authorization::{member_project, AuthzError};
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::task::trim_optional;
use crate::store::Store;

#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn Store>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Creates a project owned by `owner_id`, who becomes its only member
    pub async fn create(
        &self,
        owner_id: Uuid,
        name: &str,
        description: Option<String>,
    ) -> ServiceResult<Project> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("Project name is required".to_string()));
        }

        let project = self
            .store
            .create_project(CreateProject {
                name: name.to_string(),
                description: trim_optional(description),
                owner_id,
            })
            .await?;

        info!(project_id = %project.id, user_id = %owner_id, "Project created");
        Ok(project)
    }

    /// Projects the user owns or belongs to, most recently updated first
    pub async fn list(&self, user_id: Uuid) -> ServiceResult<Vec<Project>> {
        Ok(self.store.list_projects_for_user(user_id).await?)
    }

    pub async fn get(&self, id: Uuid, user_id: Uuid) -> ServiceResult<Project> {
        Ok(member_project(self.store.as_ref(), id, user_id).await?)
    }

    /// Owner-only rename / re-describe; blank fields are left unchanged
    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        data: UpdateProject,
    ) -> ServiceResult<Project> {
        let data = UpdateProject {
            name: trim_optional(data.name),
            description: trim_optional(data.description),
        };

        let project = self
            .store
            .update_project(id, user_id, data)
            .await?
            .ok_or(AuthzError::NoPermission)?;

        info!(project_id = %id, user_id = %user_id, "Project updated");
        Ok(project)
    }

    /// Owner-only delete; the project's tasks are left in storage
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        if !self.store.delete_project(id, user_id).await? {
            return Err(AuthzError::NoPermission.into());
        }

        info!(project_id = %id, user_id = %user_id, "Project deleted");
        Ok(())
    }

    /// Owner-only, idempotent member insertion
    pub async fn add_member(
        &self,
        id: Uuid,
        user_id: Uuid,
        member_id: Uuid,
    ) -> ServiceResult<Project> {
        let project = self
            .store
            .add_project_member(id, user_id, member_id)
            .await?
            .ok_or(AuthzError::NoPermission)?;

        info!(project_id = %id, user_id = %user_id, member_id = %member_id, "Project member added");
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> ProjectService {
        ProjectService::new(Arc::new(MemoryStore::new()))
    }

    fn rename(name: &str) -> UpdateProject {
        UpdateProject {
            name: Some(name.to_string()),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_trims_and_sets_owner_member() {
        let projects = service();
        let owner = Uuid::new_v4();

        let project = projects
            .create(owner, "  Launch  ", Some("  Q3 release ".to_string()))
            .await
            .unwrap();

        assert_eq!(project.name, "Launch");
        assert_eq!(project.description.as_deref(), Some("Q3 release"));
        assert_eq!(project.owner_id, owner);
        assert_eq!(project.members, vec![owner]);
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let projects = service();
        let err = projects.create(Uuid::new_v4(), "   ", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == "Project name is required"));
    }

    #[tokio::test]
    async fn test_stranger_sees_not_found() {
        let projects = service();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let project = projects.create(owner, "Launch", None).await.unwrap();

        let hidden = projects.get(project.id, stranger).await.unwrap_err();
        let missing = projects.get(Uuid::new_v4(), stranger).await.unwrap_err();
        assert!(matches!(hidden, ServiceError::NotFound(_)));
        assert_eq!(hidden.to_string(), missing.to_string());
        assert!(projects.list(stranger).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_member_cannot_administer() {
        let projects = service();
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let project = projects.create(owner, "Launch", None).await.unwrap();
        projects.add_member(project.id, owner, member).await.unwrap();

        assert_eq!(projects.get(project.id, member).await.unwrap().id, project.id);
        assert!(matches!(
            projects.update(project.id, member, rename("Mine")).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            projects.delete(project.id, member).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            projects.add_member(project.id, member, Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        ));

        let unchanged = projects.get(project.id, owner).await.unwrap();
        assert_eq!(unchanged.name, "Launch");
        assert_eq!(unchanged.members, vec![owner, member]);
    }

    #[tokio::test]
    async fn test_update_ignores_blank_fields() {
        let projects = service();
        let owner = Uuid::new_v4();
        let project = projects
            .create(owner, "Launch", Some("desc".to_string()))
            .await
            .unwrap();

        let updated = projects
            .update(
                project.id,
                owner,
                UpdateProject {
                    name: Some("  ".to_string()),
                    description: Some("".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Launch");
        assert_eq!(updated.description.as_deref(), Some("desc"));

        let renamed = projects.update(project.id, owner, rename("Liftoff")).await.unwrap();
        assert_eq!(renamed.name, "Liftoff");
        assert!(renamed.updated_at > project.updated_at);
    }

    #[tokio::test]
    async fn test_owner_always_member_after_add() {
        let projects = service();
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let project = projects.create(owner, "Launch", None).await.unwrap();

        let once = projects.add_member(project.id, owner, member).await.unwrap();
        let twice = projects.add_member(project.id, owner, member).await.unwrap();
        let self_add = projects.add_member(project.id, owner, owner).await.unwrap();

        assert_eq!(once.members, twice.members);
        assert_eq!(self_add.members, vec![owner, member]);
        assert!(self_add.members.contains(&self_add.owner_id));
    }

    #[tokio::test]
    async fn test_delete() {
        let projects = service();
        let owner = Uuid::new_v4();
        let project = projects.create(owner, "Launch", None).await.unwrap();

        projects.delete(project.id, owner).await.unwrap();
        assert!(matches!(
            projects.get(project.id, owner).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            projects.delete(project.id, owner).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
