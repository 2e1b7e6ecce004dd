//! Provisioning state poller

use async_trait::async_trait;
use lro_core::{PollContext, PollResult, PollerType, PollingError};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{DEFAULT_POLL_INTERVAL, classify_status, unexpected_status};
use crate::ResourceManagerClient;
use crate::retry_after::poll_interval;

/// Re-reads a resource until its `properties.provisioningState` is terminal
///
/// Resources that do not report a provisioning state are considered
/// provisioned as soon as they can be read.
#[derive(Debug, Clone)]
pub struct ProvisioningStatePoller {
    client: ResourceManagerClient,
    url: String,
    default_interval: Duration,
}

impl ProvisioningStatePoller {
    /// Creates a poller for the resource at `url`
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
impl PollerType for ProvisioningStatePoller {
    async fn poll(&self, ctx: &PollContext) -> lro_core::Result<Option<PollResult>> {
        let response = self.client.poll_get(ctx, &self.url).await?;
        let interval = poll_interval(&response, self.default_interval);

        match response.status {
            200 => {}
            201 | 202 => return Ok(Some(PollResult::in_progress(interval).with_response(response))),
            _ => return Err(unexpected_status(response)),
        }

        let body = match response.json() {
            Some(Ok(body)) => body,
            Some(Err(e)) => {
                let message = format!("decoding resource: {}", e);
                return Err(PollingError::unexpected(Some(response), message));
            }
            None => return Ok(Some(PollResult::succeeded().with_response(response))),
        };

        let state = body
            .pointer("/properties/provisioningState")
            .and_then(Value::as_str)
            .map(str::to_string);

        debug!("Resource {} has provisioning state {:?}", self.url, state);

        match state {
            Some(state) => classify_status(&state, response, interval, Some(&body)),
            None => Ok(Some(PollResult::succeeded().with_response(response))),
        }
    }
}
