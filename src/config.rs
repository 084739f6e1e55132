use std::time::Duration;

pub const DEFAULT_CACHE_ENDPOINT: &str = "https://api.pass-planner.app/rest/v1/plans";
pub const DEFAULT_OPTIMIZER_ENDPOINT: &str = "https://api.pass-planner.app/optimize";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote endpoints and transport limits, fixed at startup and carried by
/// the application context instead of read from globals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub cache_endpoint: String,
    pub optimizer_endpoint: String,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_endpoint: DEFAULT_CACHE_ENDPOINT.to_string(),
            optimizer_endpoint: DEFAULT_OPTIMIZER_ENDPOINT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl AppConfig {
    pub fn new(cache_endpoint: impl Into<String>, optimizer_endpoint: impl Into<String>) -> Self {
        Self {
            cache_endpoint: cache_endpoint.into(),
            optimizer_endpoint: optimizer_endpoint.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Reads `PASS_PLANNER_CACHE_URL` and `PASS_PLANNER_OPTIMIZER_URL`,
    /// falling back to the built-in endpoints.
    pub fn from_env() -> Self {
        let cache_endpoint = std::env::var("PASS_PLANNER_CACHE_URL")
            .unwrap_or_else(|_| DEFAULT_CACHE_ENDPOINT.to_string());
        let optimizer_endpoint = std::env::var("PASS_PLANNER_OPTIMIZER_URL")
            .unwrap_or_else(|_| DEFAULT_OPTIMIZER_ENDPOINT.to_string());
        Self::new(cache_endpoint, optimizer_endpoint)
    }
}
