/// Middleware for the API server
///
/// - `auth`: bearer token authentication
/// - `security`: security response headers

pub mod auth;
pub mod security;
