/// API route handlers
///
/// - `health`: `/healthz`
/// - `auth`: signup, login, me, refresh, logout
/// - `projects`: project CRUD and membership
/// - `tasks`: task CRUD

pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;
