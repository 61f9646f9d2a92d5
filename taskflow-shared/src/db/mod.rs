/// PostgreSQL plumbing for TaskFlow
///
/// - `pool`: connection pool creation and health check
/// - `migrations`: embedded schema migrations
///
/// Queries themselves live on the models; [`crate::store::PgStore`] is the
/// backend that ties them to the [`crate::store::Store`] trait.

pub mod migrations;
pub mod pool;
