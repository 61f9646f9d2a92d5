/// Project membership guard
///
/// Access to a project and everything inside it is decided by two rules:
///
/// 1. **Member**: the owner, or anyone in `members`, may read the project and
///    read or write its tasks.
/// 2. **Owner**: only the owner may rename, delete, or add members.
///
/// Owner-only writes apply [`is_owner`] inside the store, in the same step
/// as the write itself (see [`crate::store::Store::update_project`]).
///
/// Checks are evaluated against the project as currently stored and fail
/// closed. A project that does not exist is reported exactly like one the
/// caller may not see, so ids cannot be probed.
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::auth::authorization::{member_project, AuthzError};
/// use taskflow_shared::store::Store;
/// use uuid::Uuid;
///
/// # async fn example(store: &dyn Store, project_id: Uuid, user_id: Uuid) -> Result<(), AuthzError> {
/// let project = member_project(store, project_id, user_id).await?;
/// println!("{} can see {}", user_id, project.name);
/// # Ok(())
/// # }
/// ```

use uuid::Uuid;

use crate::models::project::Project;
use crate::store::{Store, StoreError};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller is not a member, or the project does not exist
    #[error("Project not found or no access")]
    NoAccess,

    /// Caller is not the owner, or the project does not exist
    #[error("Project not found or no permission")]
    NoPermission,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// `owner == user_id || members ∋ user_id`
pub fn is_member(user_id: Uuid, project: &Project) -> bool {
    project.owner_id == user_id || project.members.contains(&user_id)
}

pub fn is_owner(user_id: Uuid, project: &Project) -> bool {
    project.owner_id == user_id
}

/// Passes the project through if `user_id` is a member
pub fn require_member(user_id: Uuid, project: Option<Project>) -> Result<Project, AuthzError> {
    project
        .filter(|p| is_member(user_id, p))
        .ok_or(AuthzError::NoAccess)
}

/// Loads a project and requires membership
pub async fn member_project(
    store: &dyn Store,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<Project, AuthzError> {
    let project = store.find_project(project_id).await?;
    require_member(user_id, project)
}
