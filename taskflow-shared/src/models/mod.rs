/// Data models for TaskFlow
///
/// This module contains the persisted entities and their PostgreSQL CRUD
/// operations. Backend-neutral access goes through [`crate::store::Store`].
///
/// # Models
///
/// - `user`: User accounts and the public user projection
/// - `refresh_token`: Hashed refresh token records
/// - `project`: Projects with owner and member set
/// - `task`: Kanban tasks scoped to a project
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::models::user::{User, CreateUser};
/// use taskflow_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     name: "Ada".to_string(),
///     email: "ada@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod project;
pub mod refresh_token;
pub mod task;
pub mod user;
