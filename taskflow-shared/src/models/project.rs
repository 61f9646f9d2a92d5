/// Project model and database operations
///
/// A project has a single owner and a member set. The owner is always a
/// member; the table carries a CHECK constraint so no write can break that.
/// Owner-only writes are expressed as a single `UPDATE ... WHERE owner_id`
/// statement, which keeps them atomic per row without a transaction.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name TEXT NOT NULL,
///     description TEXT,
///     owner_id UUID NOT NULL REFERENCES users(id),
///     members UUID[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT projects_owner_is_member CHECK (owner_id = ANY(members))
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::models::project::{CreateProject, Project};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner: Uuid, teammate: Uuid) -> Result<(), sqlx::Error> {
/// let project = Project::create(&pool, CreateProject {
///     name: "Launch".to_string(),
///     description: None,
///     owner_id: owner,
/// }).await?;
///
/// let project = Project::add_member(&pool, project.id, owner, teammate).await?;
/// assert!(project.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project with owner and member set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Project name (trimmed, non-empty)
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Owning user
    #[sqlx(rename = "owner_id")]
    #[serde(rename = "owner")]
    pub owner_id: Uuid,

    /// Member user IDs; always contains the owner
    pub members: Vec<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
}

/// Owner-only field update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
}

const PROJECT_COLUMNS: &str = "id, name, description, owner_id, members, created_at, updated_at";

impl Project {
    /// Creates a project whose member set is exactly `{owner}`
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (name, description, owner_id, members) \
             VALUES ($1, $2, $3, ARRAY[$3]::uuid[]) RETURNING {}",
            PROJECT_COLUMNS
        );

        let project = sqlx::query_as::<_, Project>(&query)
            .bind(data.name)
            .bind(data.description)
            .bind(data.owner_id)
            .fetch_one(pool)
            .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS);

        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(project)
    }

    /// Lists projects the user owns or belongs to, most recently updated first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM projects \
             WHERE owner_id = $1 OR $1 = ANY(members) \
             ORDER BY updated_at DESC",
            PROJECT_COLUMNS
        );

        let projects = sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(projects)
    }

    /// Updates name/description if `owner_id` owns the project
    ///
    /// Returns `None` when the project is absent or owned by someone else.
    pub async fn update_owned(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET \
                 name = COALESCE($3, name), \
                 description = COALESCE($4, description), \
                 updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {}",
            PROJECT_COLUMNS
        );

        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(data.name)
            .bind(data.description)
            .fetch_optional(pool)
            .await?;

        Ok(project)
    }

    /// Deletes the project if `owner_id` owns it
    ///
    /// Tasks referencing the project are left in place.
    pub async fn delete_owned(pool: &PgPool, id: Uuid, owner_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Adds a member if `owner_id` owns the project (set semantics)
    ///
    /// Re-adding an existing member leaves the row untouched, `updated_at`
    /// included.
    pub async fn add_member(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET \
                 members = CASE WHEN $3 = ANY(members) THEN members \
                                ELSE array_append(members, $3) END, \
                 updated_at = CASE WHEN $3 = ANY(members) THEN updated_at \
                                   ELSE NOW() END \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {}",
            PROJECT_COLUMNS
        );

        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(member_id)
            .fetch_optional(pool)
            .await?;

        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_wire_shape() {
        let owner = Uuid::new_v4();
        let project = Project {
            id: Uuid::new_v4(),
            name: "Launch".to_string(),
            description: None,
            owner_id: owner,
            members: vec![owner],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["owner"], owner.to_string());
        assert_eq!(json["members"][0], owner.to_string());
        assert!(json.get("ownerId").is_none());
        assert!(json.get("createdAt").is_some());
    }
}
