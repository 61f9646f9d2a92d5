/// Client configuration
///
/// The API base URL comes from `TASKFLOW_API_URL` when set, otherwise the
/// local development server.

use std::time::Duration;

/// Base URL used when `TASKFLOW_API_URL` is unset
pub const DEFAULT_BASE_URL: &str = "http://localhost:4000/api";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`crate::api::ApiClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root including the `/api` prefix, without a trailing slash
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize(base_url.into()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads `TASKFLOW_API_URL`, falling back to [`DEFAULT_BASE_URL`]
    pub fn from_env() -> Self {
        let base_url = std::env::var("TASKFLOW_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn normalize(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_strips_trailing_slash() {
        let config = ClientConfig::new(" http://api.example.com/api/ ");
        assert_eq!(config.base_url, "http://api.example.com/api");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_default_points_at_local_server() {
        assert_eq!(ClientConfig::default().base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_with_timeout() {
        let config = ClientConfig::default().with_timeout(Duration::from_secs(2));
        assert_eq!(config.timeout, Duration::from_secs(2));
    }
}
