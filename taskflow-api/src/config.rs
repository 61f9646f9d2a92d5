/// Configuration management for the API server
///
/// Loaded from environment variables (a `.env` file is honored in
/// development).
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 4000)
/// - `DATABASE_URL`: PostgreSQL connection string, or `memory://` for the in-memory store (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: HS256 signing secret, at least 32 characters (required)
/// - `CORS_ORIGINS`: Comma-separated allowed origins; `*` allows any, `*.example.app`
///   allows any host under that suffix (default: http://localhost:5173)
/// - `PRODUCTION` / `NODE_ENV=production`: Secure cookies and HSTS
/// - `LOG_FORMAT`: `json` for JSON logs, anything else for pretty output
///
/// # Example
///
/// ```no_run
/// use taskflow_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::env;
use taskflow_shared::auth::{jwt::default_access_ttl, refresh_token};

/// `DATABASE_URL` value selecting the in-memory store
pub const MEMORY_DATABASE_URL: &str = "memory://";

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins
    pub cors_origins: Vec<String>,

    /// Production mode: `Secure` cookies and HSTS
    pub production: bool,

    /// Emit JSON logs
    pub json_logs: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url == MEMORY_DATABASE_URL
    }
}

/// Token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub jwt_secret: String,

    /// Access token lifetime, seconds
    pub access_ttl_seconds: i64,

    /// Refresh record lifetime in storage, seconds
    pub refresh_ttl_seconds: i64,

    /// `Max-Age` of the refresh cookie, seconds
    pub refresh_cookie_max_age_seconds: i64,
}

impl AuthConfig {
    /// Default lifetimes (15 minutes / 8 days / 7 days) around a secret
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_ttl_seconds: default_access_ttl().num_seconds(),
            refresh_ttl_seconds: refresh_token::default_storage_ttl().num_seconds(),
            refresh_cookie_max_age_seconds: refresh_token::default_cookie_ttl().num_seconds(),
        }
    }

    pub fn access_ttl(&self) -> Duration {
        Duration::seconds(self.access_ttl_seconds)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::seconds(self.refresh_ttl_seconds)
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, a number does not
    /// parse, or `JWT_SECRET` is shorter than 32 characters.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "4000".to_string())
            .parse::<u16>()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let cors_origins = parse_origins(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".to_string()),
        );

        let production = env::var("PRODUCTION").map(|v| is_truthy(&v)).unwrap_or(false)
            || env::var("NODE_ENV").map(|v| v == "production").unwrap_or(false);

        let json_logs = env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
                json_logs,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            auth: AuthConfig::with_secret(jwt_secret),
        })
    }

    /// Configuration for tests and local tooling: in-memory store, default lifetimes
    pub fn for_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["http://localhost:5173".to_string()],
                production: false,
                json_logs: false,
            },
            database: DatabaseConfig {
                url: MEMORY_DATABASE_URL.to_string(),
                max_connections: 1,
            },
            auth: AuthConfig::with_secret(jwt_secret),
        }
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let mut config = Config::for_memory("test-secret-key-at-least-32-bytes-long");
        config.api.port = 4000;
        assert_eq!(config.bind_address(), "127.0.0.1:4000");
        assert!(config.database.is_memory());
    }

    #[test]
    fn test_auth_defaults() {
        let auth = AuthConfig::with_secret("s");
        assert_eq!(auth.access_ttl_seconds, 15 * 60);
        assert_eq!(auth.refresh_ttl_seconds, 8 * 24 * 3600);
        assert_eq!(auth.refresh_cookie_max_age_seconds, 604800);
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" http://localhost:5173/ , *.vercel.app,,"),
            vec!["http://localhost:5173".to_string(), "*.vercel.app".to_string()]
        );
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("1"));
        assert!(!is_truthy("no"));
    }
}
