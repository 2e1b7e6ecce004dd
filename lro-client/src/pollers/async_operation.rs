//! Azure-AsyncOperation poller

use async_trait::async_trait;
use lro_core::{PollContext, PollResult, PollerType, PollingError};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{DEFAULT_POLL_INTERVAL, classify_status, unexpected_status};
use crate::ResourceManagerClient;
use crate::retry_after::poll_interval;

/// Polls the operation resource named by an `Azure-AsyncOperation` header
///
/// The operation resource carries a `status` field (`InProgress`,
/// `Succeeded`, `Failed`, `Canceled`, ...) and, on failure, an `error` object.
#[derive(Debug, Clone)]
pub struct AsyncOperationPoller {
    client: ResourceManagerClient,
    url: String,
    default_interval: Duration,
}

impl AsyncOperationPoller {
    /// Creates a poller for the given operation URL
    pub fn new(client: ResourceManagerClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            default_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the interval used when no `Retry-After` is sent
    pub fn with_default_interval(mut self, interval: Duration) -> Self {
        self.default_interval = interval;
        self
    }
}

#[async_trait]
impl PollerType for AsyncOperationPoller {
    async fn poll(&self, ctx: &PollContext) -> lro_core::Result<Option<PollResult>> {
        let response = self.client.poll_get(ctx, &self.url).await?;
        let interval = poll_interval(&response, self.default_interval);

        debug!("Operation {} returned {}", self.url, response.status);

        if !matches!(response.status, 200 | 201 | 202 | 204) {
            return Err(unexpected_status(response));
        }

        let body = match response.json() {
            Some(Ok(body)) => body,
            Some(Err(e)) => {
                let message = format!("decoding operation status: {}", e);
                return Err(PollingError::unexpected(Some(response), message));
            }
            None if response.status == 202 => {
                return Ok(Some(PollResult::in_progress(interval).with_response(response)));
            }
            None => {
                return Err(PollingError::unexpected(
                    Some(response),
                    "operation status response had no body",
                ));
            }
        };

        match body.get("status").and_then(Value::as_str) {
            Some(status) => classify_status(status, response, interval, Some(&body)),
            None if response.status == 202 => {
                Ok(Some(PollResult::in_progress(interval).with_response(response)))
            }
            None => Err(PollingError::unexpected(
                Some(response),
                "operation status response did not contain a `status` field",
            )),
        }
    }
}
