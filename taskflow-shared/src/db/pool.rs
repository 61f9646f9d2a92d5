/// Database connection pool
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), sqlx::Error> {
/// let pool = create_pool(DatabaseConfig::new("postgres://localhost/taskflow")).await?;
/// let one: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&pool).await?;
/// assert_eq!(one.0, 1);
/// # Ok(())
/// # }
/// ```

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

/// Pool settings; timeouts are in seconds so they map straight onto env vars
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL URL
    pub url: String,

    /// Upper bound on open connections
    pub max_connections: u32,

    /// Connections kept warm when idle
    pub min_connections: u32,

    /// How long a request waits for a free connection
    pub acquire_timeout_seconds: u64,

    /// Idle connections older than this are closed
    pub idle_timeout_seconds: Option<u64>,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_seconds: 10,
            idle_timeout_seconds: Some(600),
        }
    }
}

/// Connects the pool and verifies the database answers
pub async fn create_pool(config: DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Creating database connection pool"
    );

    let mut options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds));

    if let Some(idle) = config.idle_timeout_seconds {
        options = options.idle_timeout(Duration::from_secs(idle));
    }

    let pool = options.connect(&config.url).await?;
    health_check(&pool).await?;

    info!("Database connection pool ready");
    Ok(pool)
}

/// Runs `SELECT 1` against the pool
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    let (one,): (i32,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;
    if one != 1 {
        return Err(sqlx::Error::Protocol(format!(
            "health check returned {}",
            one
        )));
    }
    debug!("Database health check passed");
    Ok(())
}

/// Closes every connection; called on shutdown
pub async fn close_pool(pool: &PgPool) {
    info!("Closing database connection pool");
    pool.close().await;
}
