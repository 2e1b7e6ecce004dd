//! Configuration module
//!
//! Connection settings and polling timing for the CLI.

use anyhow::Context;
use lro_client::{PollOptions, ResourceManagerClient};
use lro_core::{DEFAULT_DROPPED_CONNECTIONS_TO_ALLOW, PollContext};
use std::time::Duration;

/// Longest overall polling deadline accepted (7 days)
pub const MAX_TIMEOUT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Resource Manager endpoint (e.g., "https://management.azure.com")
    pub endpoint: String,

    /// Bearer token used to authorize requests
    pub access_token: Option<String>,

    /// api-version query parameter appended to resource paths
    pub api_version: Option<String>,

    /// Overall deadline for polling
    pub timeout: Duration,

    /// Wait before the first poll
    pub initial_delay: Duration,

    /// Consecutive dropped connections tolerated before giving up
    pub max_dropped_connections: usize,

    /// Timeout applied to each individual HTTP request
    pub request_timeout: Duration,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.endpoint.is_empty() {
            anyhow::bail!("endpoint cannot be empty");
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            anyhow::bail!("endpoint must start with http:// or https://");
        }

        if self.timeout.is_zero() {
            anyhow::bail!("timeout must be greater than 0");
        }

        if self.timeout > MAX_TIMEOUT {
            anyhow::bail!("timeout must be at most {} seconds", MAX_TIMEOUT.as_secs());
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }

    /// Polling timing derived from this configuration
    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            initial_delay: self.initial_delay,
            max_dropped_connections: self.max_dropped_connections,
        }
    }

    /// Builds the Resource Manager client
    pub fn client(&self) -> anyhow::Result<ResourceManagerClient> {
        let http_client = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let mut client = ResourceManagerClient::with_client(self.endpoint.clone(), http_client)
            .with_poll_options(self.poll_options());
        if let Some(api_version) = &self.api_version {
            client = client.with_api_version(api_version);
        }
        if let Some(token) = &self.access_token {
            client = client.with_bearer_token(token);
        }

        Ok(client)
    }

    /// A fresh polling context carrying the configured deadline
    pub fn context(&self) -> PollContext {
        PollContext::with_timeout(self.timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "https://management.azure.com".to_string(),
            access_token: None,
            api_version: None,
            timeout: Duration::from_secs(1800), // 30 minutes
            initial_delay: Duration::from_secs(5),
            max_dropped_connections: DEFAULT_DROPPED_CONNECTIONS_TO_ALLOW,
            request_timeout: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.timeout, Duration::from_secs(1800));
        assert_eq!(config.max_dropped_connections, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.endpoint = "management.azure.com".to_string();
        assert!(config.validate().is_err());

        config.endpoint = "http://localhost:8080".to_string();
        assert!(config.validate().is_ok());

        config.timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        config.timeout = Duration::from_secs(u64::MAX);
        assert!(config.validate().is_err());

        config.timeout = MAX_TIMEOUT;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_poll_options() {
        let config = Config {
            initial_delay: Duration::from_secs(2),
            max_dropped_connections: 5,
            ..Config::default()
        };
        let options = config.poll_options();
        assert_eq!(options.initial_delay, Duration::from_secs(2));
        assert_eq!(options.max_dropped_connections, 5);
    }

    #[test]
    fn test_client_applies_settings() {
        let config = Config {
            endpoint: "http://localhost:8080/".to_string(),
            api_version: Some("2023-01-01".to_string()),
            ..Config::default()
        };
        let client = config.client().unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.api_version(), Some("2023-01-01"));
        assert_eq!(client.poll_options(), &config.poll_options());
    }

    #[tokio::test]
    async fn test_context_has_deadline() {
        let config = Config::default();
        assert!(config.context().deadline().is_some());
    }
}
