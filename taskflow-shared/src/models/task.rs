/// Task model and database operations
///
/// Tasks are the cards on a project's Kanban board. A task belongs to exactly
/// one project for its whole life; `project_id` is never rewritten. There is
/// deliberately no foreign key on `project_id`: deleting a project leaves its
/// tasks stored but unreachable through any membership check.
///
/// # Board columns
///
/// ```text
/// todo ⇄ inprogress ⇄ done
/// ```
///
/// Any status may move to any other status; the board is not a state machine.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'inprogress', 'done');
/// CREATE TYPE task_priority AS ENUM ('high', 'medium', 'low');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL,
///     title TEXT NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'todo',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     due_date TIMESTAMPTZ,
///     assignee JSONB NOT NULL DEFAULT 'null',
///     tags TEXT[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Wire format
///
/// Fields are camelCase. `dueDate` is epoch milliseconds (or `null`);
/// `createdAt`/`updatedAt` are RFC 3339 strings. `assignee` is `null`,
/// `{"name": ..}` or `{"id": .., "name": ..}`; a bare string is accepted on
/// input as a named assignee.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

/// Kanban column a task sits in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// All statuses in board column order
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "inprogress",
            TaskStatus::Done => "done",
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::High => "high",
            TaskPriority::Medium => "medium",
            TaskPriority::Low => "low",
        }
    }

    /// Sort rank: high sorts first
    pub fn rank(&self) -> u8 {
        match self {
            TaskPriority::High => 0,
            TaskPriority::Medium => 1,
            TaskPriority::Low => 2,
        }
    }
}

/// Who a task is assigned to
///
/// # Example
///
/// ```
/// use taskflow_shared::models::task::Assignee;
///
/// let a: Assignee = serde_json::from_str(r#""Grace""#).unwrap();
/// assert_eq!(a, Assignee::Named("Grace".to_string()));
///
/// let a: Assignee = serde_json::from_str("null").unwrap();
/// assert_eq!(a, Assignee::Unassigned);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Assignee {
    #[default]
    Unassigned,
    /// Free-form display name with no account behind it
    Named(String),
    /// A user account plus the name shown on the card
    Referenced { id: Uuid, name: String },
}

impl Assignee {
    /// Display name, if any
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Assignee::Unassigned => None,
            Assignee::Named(name) => Some(name),
            Assignee::Referenced { name, .. } => Some(name),
        }
    }

    pub fn is_unassigned(&self) -> bool {
        matches!(self, Assignee::Unassigned)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AssigneeRepr {
    Name(String),
    Object {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<Uuid>,
        #[serde(default)]
        name: Option<String>,
    },
}

impl Serialize for Assignee {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self {
            Assignee::Unassigned => None,
            Assignee::Named(name) => Some(AssigneeRepr::Object {
                id: None,
                name: Some(name.clone()),
            }),
            Assignee::Referenced { id, name } => Some(AssigneeRepr::Object {
                id: Some(*id),
                name: Some(name.clone()),
            }),
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Assignee {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let assignee = match Option::<AssigneeRepr>::deserialize(deserializer)? {
            None => Assignee::Unassigned,
            Some(AssigneeRepr::Name(name)) => named(name),
            Some(AssigneeRepr::Object { id: Some(id), name }) => Assignee::Referenced {
                id,
                name: name.map(|n| n.trim().to_string()).unwrap_or_default(),
            },
            Some(AssigneeRepr::Object { id: None, name }) => named(name.unwrap_or_default()),
        };
        Ok(assignee)
    }
}

fn named(name: String) -> Assignee {
    let name = name.trim();
    if name.is_empty() {
        Assignee::Unassigned
    } else {
        Assignee::Named(name.to_string())
    }
}

/// Kanban task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,

    /// Parent project; immutable after creation
    pub project_id: Uuid,

    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: TaskPriority,

    /// Due time, epoch milliseconds on the wire
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub assignee: Assignee,

    #[serde(default)]
    pub tags: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    project_id: Uuid,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    priority: TaskPriority,
    due_date: Option<DateTime<Utc>>,
    assignee: Json<Assignee>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            title: row.title,
            description: row.description,
            status: row.status,
            priority: row.priority,
            due_date: row.due_date,
            assignee: row.assignee.0,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Caller-supplied fields for a new task
///
/// Everything except the title is optional; defaults are applied by
/// [`NewTask::into_create`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,

    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Assignee::is_unassigned")]
    pub assignee: Assignee,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewTask {
    /// Task with only a title; every other field takes its default
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Applies defaults and trimming, producing the storage input
    pub fn into_create(self, project_id: Uuid) -> CreateTask {
        CreateTask {
            project_id,
            title: self.title.trim().to_string(),
            description: trim_optional(self.description),
            status: self.status.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            due_date: self.due_date,
            assignee: self.assignee,
            tags: self.tags,
        }
    }
}

/// Trims an optional text field, mapping blank to `None`
pub fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Input for storing a new task, all defaults resolved
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub assignee: Assignee,
    pub tags: Vec<String>,
}

/// Partial task update
///
/// An absent field is left unchanged. For the nullable fields
/// (`description`, `dueDate`, `assignee`) an explicit `null` clears the
/// value, so those are `Some(None)` / `Some(Assignee::Unassigned)`.
/// `projectId` is not part of the patch; if a client sends it, it is
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,

    #[serde(default, with = "patch_due_date", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<DateTime<Utc>>>,

    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub assignee: Option<Assignee>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    /// Patch that only changes the status
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Patch that only changes the priority
    pub fn priority(priority: TaskPriority) -> Self {
        Self {
            priority: Some(priority),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &TaskPatch::default()
    }

    /// Applies the patch to a task in place, bumping `updated_at`
    pub fn apply_to(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(assignee) = &self.assignee {
            task.assignee = assignee.clone();
        }
        if let Some(tags) = &self.tags {
            task.tags = tags.clone();
        }
        task.updated_at = now;
    }
}

/// Deserializes a field that is present in the payload, even when `null`
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

mod patch_due_date {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Option<DateTime<Utc>>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(Some(due)) => serializer.serialize_i64(due.timestamp_millis()),
            _ => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<DateTime<Utc>>>, D::Error> {
        match Option::<i64>::deserialize(deserializer)? {
            None => Ok(Some(None)),
            Some(millis) => DateTime::from_timestamp_millis(millis)
                .map(|due| Some(Some(due)))
                .ok_or_else(|| de::Error::custom("dueDate out of range")),
        }
    }
}

const TASK_COLUMNS: &str = "id, project_id, title, description, status, priority, due_date, \
                            assignee, tags, created_at, updated_at";

impl Task {
    /// Creates a task
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (project_id, title, description, status, priority, due_date, assignee, tags) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            TASK_COLUMNS
        );

        let row = sqlx::query_as::<_, TaskRow>(&query)
            .bind(data.project_id)
            .bind(data.title)
            .bind(data.description)
            .bind(data.status)
            .bind(data.priority)
            .bind(data.due_date)
            .bind(Json(data.assignee))
            .bind(data.tags)
            .fetch_one(pool)
            .await?;

        Ok(row.into())
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);

        let row = sqlx::query_as::<_, TaskRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(Task::from))
    }

    /// Lists a project's tasks, most recently updated first
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks WHERE project_id = $1 ORDER BY updated_at DESC",
            TASK_COLUMNS
        );

        let rows = sqlx::query_as::<_, TaskRow>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(Task::from).collect())
    }

    /// Applies a partial update
    ///
    /// Only the fields present in the patch are written; `project_id` is
    /// never touched.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        patch: TaskPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if patch.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if patch.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if patch.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if patch.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if patch.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }
        if patch.assignee.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assignee = ${}", bind_count));
        }
        if patch.tags.is_some() {
            bind_count += 1;
            query.push_str(&format!(", tags = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", TASK_COLUMNS));

        let mut q = sqlx::query_as::<_, TaskRow>(&query).bind(id);

        if let Some(title) = patch.title {
            q = q.bind(title);
        }
        if let Some(description) = patch.description {
            q = q.bind(description);
        }
        if let Some(status) = patch.status {
            q = q.bind(status);
        }
        if let Some(priority) = patch.priority {
            q = q.bind(priority);
        }
        if let Some(due_date) = patch.due_date {
            q = q.bind(due_date);
        }
        if let Some(assignee) = patch.assignee {
            q = q.bind(Json(assignee));
        }
        if let Some(tags) = patch.tags {
            q = q.bind(tags);
        }

        let row = q.fetch_optional(pool).await?;

        Ok(row.map(Task::from))
    }

    /// Deletes a task
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
