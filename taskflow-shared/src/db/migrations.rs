/// Schema migrations
///
/// The SQL files under `taskflow-shared/migrations/` are embedded at compile
/// time with `sqlx::migrate!` and applied in version order on startup.
///
/// ```no_run
/// use taskflow_shared::db::{migrations, pool};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let url = std::env::var("DATABASE_URL")?;
/// migrations::ensure_database_exists(&url).await?;
/// let pool = pool::create_pool(pool::DatabaseConfig::new(url)).await?;
/// migrations::run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{error, info};

/// Applies all pending migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        error!(error = %e, "Migration failed");
        e
    })?;

    info!("Database schema is up to date");
    Ok(())
}

/// Versions of the migrations that have been applied successfully
pub async fn applied_versions(pool: &PgPool) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success = true ORDER BY version")
        .fetch_all(pool)
        .await
}

/// Creates the target database when it is missing (development helper)
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    }
    Ok(())
}
