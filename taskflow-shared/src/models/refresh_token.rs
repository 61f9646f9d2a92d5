/// Refresh token records
///
/// Only the SHA-256 hash of a refresh token is stored. A record is live until
/// `expires_at`; expired records are excluded from every lookup and are never
/// swept actively.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE refresh_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     token_hash TEXT NOT NULL UNIQUE,
///     user_agent TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     expires_at TIMESTAMPTZ NOT NULL
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Stored refresh token
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RefreshToken {
    /// Record ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Hex SHA-256 of the raw token
    pub token_hash: String,

    /// User-Agent of the client the token was issued to
    pub user_agent: Option<String>,

    /// Issuance time
    pub created_at: DateTime<Utc>,

    /// Absolute expiry; the record is not honored afterwards
    pub expires_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Checks whether the record is past its absolute expiry
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Input for storing a new refresh token
#[derive(Debug, Clone)]
pub struct CreateRefreshToken {
    pub user_id: Uuid,
    pub token_hash: String,
    pub user_agent: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Stores a refresh token hash
    pub async fn create(pool: &PgPool, data: CreateRefreshToken) -> Result<Self, sqlx::Error> {
        let token = sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, user_agent, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, token_hash, user_agent, created_at, expires_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.token_hash)
        .bind(data.user_agent)
        .bind(data.expires_at)
        .fetch_one(pool)
        .await?;

        Ok(token)
    }

    /// Finds a live (unexpired) record by hash
    pub async fn find_live(pool: &PgPool, token_hash: &str) -> Result<Option<Self>, sqlx::Error> {
        let token = sqlx::query_as::<_, RefreshToken>(
            r#"
            SELECT id, user_id, token_hash, user_agent, created_at, expires_at
            FROM refresh_tokens
            WHERE token_hash = $1 AND expires_at > NOW()
            "#,
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;

        Ok(token)
    }

    /// Atomically deletes a live record and returns it
    ///
    /// Two concurrent callers presenting the same token cannot both receive
    /// the record.
    pub async fn consume(pool: &PgPool, token_hash: &str) -> Result<Option<Self>, sqlx::Error> {
        let token = sqlx::query_as::<_, RefreshToken>(
            r#"
            DELETE FROM refresh_tokens
            WHERE token_hash = $1 AND expires_at > NOW()
            RETURNING id, user_id, token_hash, user_agent, created_at, expires_at
            "#,
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;

        Ok(token)
    }

    /// Deletes a record by hash regardless of expiry
    pub async fn delete_by_hash(pool: &PgPool, token_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = $1")
            .bind(token_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
