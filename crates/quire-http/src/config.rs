//! Client configuration.

use std::time::Duration;

use quire_core::ApiUrl;

/// Applied to every request; a timeout surfaces as a network error.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for [`Client`](crate::Client).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: ApiUrl,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    /// Defaults for the given backend.
    pub fn new(api_url: ApiUrl) -> Self {
        Self {
            api_url,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("quire/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::new(ApiUrl::new("https://books.example.com").unwrap());
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.user_agent.starts_with("quire/"));
    }

    #[test]
    fn setters_override() {
        let config = ClientConfig::new(ApiUrl::new("https://books.example.com").unwrap())
            .with_timeout(Duration::from_millis(250))
            .with_user_agent("tests");
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.user_agent, "tests");
    }
}
