/// Task endpoints (bearer)
///
/// - `GET /api/tasks?projectId=` - Tasks of a project (members)
/// - `POST /api/tasks` - Create in `projectId` (members)
/// - `PATCH /api/tasks/:id` - Partial update (members of the task's project)
/// - `DELETE /api/tasks/:id` - Delete (members of the task's project)
///
/// # Create body
///
/// ```json
/// {
///   "projectId": "uuid",
///   "title": "Fix bug",
///   "status": "todo",
///   "priority": "high",
///   "dueDate": 1767225600000,
///   "assignee": { "name": "Grace" },
///   "tags": ["backend"]
/// }
/// ```
///
/// Unknown `status`/`priority` values are rejected with 400.

use std::borrow::Cow;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidJson},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use taskflow_shared::{
    auth::middleware::AuthContext,
    models::task::{NewTask, Task, TaskPatch},
};
use uuid::Uuid;
use validator::{Validate, ValidationError};

const MAX_TITLE: usize = 200;
const MAX_DESCRIPTION: usize = 5000;
const MAX_TAGS: usize = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(flatten)]
    #[validate(custom(function = "validate_new_task"))]
    pub task: NewTask,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[serde(flatten)]
    #[validate(custom(function = "validate_patch"))]
    pub patch: TaskPatch,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let project_id = required_project_id(query.project_id.as_deref())?;
    Ok(Json(state.tasks.list(project_id, auth.user_id).await?))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(req): ValidJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let project_id = required_project_id(req.project_id.as_deref())?;
    let task = state.tasks.create(project_id, auth.user_id, req.task).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let id = task_id(&id)?;
    Ok(Json(state.tasks.update(id, auth.user_id, req.patch).await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = task_id(&id)?;
    state.tasks.delete(id, auth.user_id).await?;
    Ok(Json(json!({ "ok": true })))
}

fn required_project_id(raw: Option<&str>) -> ApiResult<Uuid> {
    let raw = raw
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("projectId required".to_string()))?;

    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid projectId".to_string()))
}

fn task_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Task not found".to_string()))
}

fn validate_new_task(task: &NewTask) -> Result<(), ValidationError> {
    check_fields(Some(&task.title), task.description.as_deref(), Some(&task.tags))
}

fn validate_patch(patch: &TaskPatch) -> Result<(), ValidationError> {
    check_fields(
        patch.title.as_ref(),
        patch.description.as_ref().and_then(|d| d.as_deref()),
        patch.tags.as_ref(),
    )
}

fn check_fields(
    title: Option<&String>,
    description: Option<&str>,
    tags: Option<&Vec<String>>,
) -> Result<(), ValidationError> {
    if title.map(|t| t.chars().count() > MAX_TITLE).unwrap_or(false) {
        return Err(invalid("title", "Title must be at most 200 characters"));
    }
    if description
        .map(|d| d.chars().count() > MAX_DESCRIPTION)
        .unwrap_or(false)
    {
        return Err(invalid("description", "Description must be at most 5000 characters"));
    }
    if tags.map(|t| t.len() > MAX_TAGS).unwrap_or(false) {
        return Err(invalid("tags", "At most 20 tags per task"));
    }
    Ok(())
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}
