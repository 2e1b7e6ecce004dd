//! LRO Resource Manager Client
//!
//! A small HTTP client for submitting long-running Resource Manager operations
//! and polling them to completion.
//!
//! The client sends the initial request, inspects the response for the
//! long-running operation convention in use (`Azure-AsyncOperation` header,
//! `Location` header, or the resource's `provisioningState`), and hands back a
//! `PollerType` for that convention which `lro_core::Poller` drives.
//!
//! # Example
//!
//! ```no_run
//! use lro_client::ResourceManagerClient;
//! use lro_core::PollContext;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ResourceManagerClient::new("https://management.azure.com")
//!         .with_api_version("2023-01-01")
//!         .with_bearer_token("token");
//!
//!     let ctx = PollContext::with_timeout(Duration::from_secs(1800));
//!     let response = client
//!         .delete_then_poll(&ctx, "/subscriptions/0000/resourceGroups/example")
//!         .await?;
//!
//!     println!("Finished with status {}", response.status);
//!     Ok(())
//! }
//! ```

pub mod error;
mod operation;
pub mod pollers;
mod retry_after;
mod snapshot;

// Re-export commonly used types
pub use error::{ClientError, OperationError, Result};
pub use operation::{LongRunningResponse, PollOptions, then_poll};
pub use pollers::{
    AsyncOperationPoller, DEFAULT_POLL_INTERVAL, DeletePoller, LocationPoller,
    ProvisioningStatePoller, poller_from_response,
};
pub use reqwest::Method;
pub use retry_after::retry_after;

use lro_core::{PollContext, ResponseSnapshot};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

/// HTTP client for the Resource Manager API
///
/// Cloning is cheap; pollers keep their own clone.
#[derive(Debug, Clone)]
pub struct ResourceManagerClient {
    /// Base URL of the API (e.g., "https://management.azure.com")
    base_url: String,
    /// `api-version` query parameter appended to every request path
    api_version: Option<String>,
    /// Bearer token sent in the Authorization header
    bearer_token: Option<String>,
    /// Timing used by the `*_then_poll` operations
    poll_options: PollOptions,
    /// HTTP client instance
    client: Client,
}

impl ResourceManagerClient {
    /// Create a new client
    ///
    /// # Example
    /// ```
    /// use lro_client::ResourceManagerClient;
    ///
    /// let client = ResourceManagerClient::new("https://management.azure.com");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version: None,
            bearer_token: None,
            poll_options: PollOptions::default(),
            client,
        }
    }

    /// Sets the `api-version` query parameter
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Sets the bearer token used to authorize requests
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Sets the polling timing used by the `*_then_poll` operations
    pub fn with_poll_options(mut self, poll_options: PollOptions) -> Self {
        self.poll_options = poll_options;
        self
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the configured api-version
    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    /// Get the polling timing
    pub fn poll_options(&self) -> &PollOptions {
        &self.poll_options
    }

    /// Builds the full URL for a resource path, including `api-version`
    pub fn endpoint(&self, path: &str) -> String {
        let mut url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        if let Some(api_version) = &self.api_version {
            let separator = if url.contains('?') { '&' } else { '?' };
            url.push(separator);
            url.push_str("api-version=");
            url.push_str(api_version);
        }
        url
    }

    /// Resolves a URL advertised by the API
    ///
    /// Absolute URLs are used as-is; paths are joined onto the base URL.
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        }
    }

    /// Get a resource and deserialize it
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        let response = self.authorize(self.client.get(&url)).send().await?;

        self.handle_response(response).await
    }

    /// Sends the initial request of a long-running operation
    ///
    /// # Returns
    /// The initial response, plus a poller when the operation has not finished yet
    pub async fn begin(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<LongRunningResponse> {
        if path.trim_matches('/').is_empty() {
            return Err(ClientError::InvalidRequest(
                "resource path cannot be empty".to_string(),
            ));
        }

        let url = self.endpoint(path);
        debug!("{} {}", method, url);

        let mut request = self.authorize(self.client.request(method.clone(), &url));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let response = self.handle_snapshot(response).await?;

        let poller_type = poller_from_response(self, &method, &url, &response);
        Ok(LongRunningResponse {
            response,
            poller_type,
        })
    }

    /// Issues one polling GET, giving up as soon as `ctx` is done
    ///
    /// Transport failures that happen before any HTTP response is received are
    /// reported as dropped connections.
    pub async fn poll_get(
        &self,
        ctx: &PollContext,
        url: &str,
    ) -> lro_core::Result<ResponseSnapshot> {
        let request = self.authorize(self.client.get(url)).send();

        let response = tokio::select! {
            response = request => response.map_err(error::polling_transport_error)?,
            err = ctx.done() => return Err(err),
        };

        snapshot::capture(response)
            .await
            .map_err(error::polling_transport_error)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let snapshot = self.handle_snapshot(response).await?;

        serde_json::from_str(&snapshot.body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Capture an API response, returning an error for non-2xx statuses
    async fn handle_snapshot(&self, response: reqwest::Response) -> Result<ResponseSnapshot> {
        let snapshot = snapshot::capture(response).await?;

        if !snapshot.is_success() {
            let message = if snapshot.body.is_empty() {
                "Unknown error".to_string()
            } else {
                snapshot.body.clone()
            };
            return Err(ClientError::api_error(snapshot.status, message));
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = ResourceManagerClient::new("https://management.azure.com/");
        assert_eq!(client.base_url(), "https://management.azure.com");
    }

    #[test]
    fn test_endpoint_appends_api_version() {
        let client =
            ResourceManagerClient::new("https://management.azure.com").with_api_version("2023-01-01");
        assert_eq!(
            client.endpoint("/subscriptions/0000"),
            "https://management.azure.com/subscriptions/0000?api-version=2023-01-01"
        );
        assert_eq!(
            client.endpoint("subscriptions/0000?$expand=all"),
            "https://management.azure.com/subscriptions/0000?$expand=all&api-version=2023-01-01"
        );
    }

    #[test]
    fn test_endpoint_without_api_version() {
        let client = ResourceManagerClient::new("http://localhost:8080");
        assert_eq!(client.endpoint("widgets/a"), "http://localhost:8080/widgets/a");
    }

    #[test]
    fn test_resolve() {
        let client = ResourceManagerClient::new("http://localhost:8080");
        assert_eq!(
            client.resolve("https://elsewhere/operations/1"),
            "https://elsewhere/operations/1"
        );
        assert_eq!(
            client.resolve("/operations/1"),
            "http://localhost:8080/operations/1"
        );
    }

    #[tokio::test]
    async fn test_begin_rejects_empty_path() {
        let client = ResourceManagerClient::new("http://localhost:8080");
        let err = client.begin(Method::PUT, "/", None).await.err().unwrap();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }
}
