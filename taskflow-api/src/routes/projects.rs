/// Project endpoints (bearer)
///
/// - `GET /api/projects` - Projects the caller owns or belongs to
/// - `POST /api/projects` - Create (caller becomes owner and only member)
/// - `GET /api/projects/:id` - Read (members)
/// - `PATCH /api/projects/:id` - Rename / re-describe (owner)
/// - `POST /api/projects/:id/add-member` - Add a member (owner)
/// - `DELETE /api/projects/:id` - Delete (owner)
///
/// A caller without the required access gets the same 404 as for a project
/// that does not exist. An id that is not a UUID is also a 404.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidJson},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use taskflow_shared::{
    auth::{authorization::AuthzError, middleware::AuthContext},
    models::project::{Project, UpdateProject},
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[serde(default)]
    #[validate(length(max = 100, message = "Project name must be at most 100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[serde(default)]
    #[validate(length(max = 100, message = "Project name must be at most 100 characters"))]
    pub name: Option<String>,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    #[serde(default)]
    pub member_id: Option<String>,
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(state.projects.list(auth.user_id).await?))
}

pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(req): ValidJson<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = state
        .projects
        .create(auth.user_id, &req.name, req.description)
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Project>> {
    let id = project_id(&id, AuthzError::NoAccess)?;
    Ok(Json(state.projects.get(id, auth.user_id).await?))
}

pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    let id = project_id(&id, AuthzError::NoPermission)?;

    let project = state
        .projects
        .update(
            id,
            auth.user_id,
            UpdateProject {
                name: req.name,
                description: req.description,
            },
        )
        .await?;

    Ok(Json(project))
}

/// # Errors
///
/// - `400`: `memberId` missing or not a UUID
/// - `404`: project missing or caller is not the owner
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<AddMemberRequest>,
) -> ApiResult<Json<Project>> {
    let id = project_id(&id, AuthzError::NoPermission)?;

    let member_id = req
        .member_id
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::BadRequest("memberId required".to_string()))?;
    let member_id = Uuid::parse_str(member_id)
        .map_err(|_| ApiError::BadRequest("Invalid memberId".to_string()))?;

    Ok(Json(state.projects.add_member(id, auth.user_id, member_id).await?))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = project_id(&id, AuthzError::NoPermission)?;
    state.projects.delete(id, auth.user_id).await?;
    Ok(Json(json!({ "ok": true })))
}

/// Parses a path id; a malformed id reads as the given not-found error
fn project_id(raw: &str, not_found: AuthzError) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(not_found.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_id_is_not_found() {
        let err = project_id("not-a-uuid", AuthzError::NoAccess).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "Project not found or no access"));
        assert!(project_id(&Uuid::new_v4().to_string(), AuthzError::NoAccess).is_ok());
    }

    #[test]
    fn test_add_member_request_shape() {
        let req: AddMemberRequest =
            serde_json::from_str(r#"{"memberId":"6f1c1b64-3f4e-4c39-9d0a-1e2f3a4b5c6d"}"#).unwrap();
        assert!(req.member_id.is_some());

        let empty: AddMemberRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.member_id.is_none());
    }
}
