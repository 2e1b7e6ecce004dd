//! Delete poller

use async_trait::async_trait;
use lro_core::{PollContext, PollResult, PollerType};
use std::time::Duration;
use tracing::debug;

use super::{DEFAULT_POLL_INTERVAL, unexpected_status};
use crate::ResourceManagerClient;
use crate::retry_after::poll_interval;

/// Re-reads a deleted resource until it is gone
///
/// The deletion has completed once the resource answers 404.
#[derive(Debug, Clone)]
pub struct DeletePoller {
    client: ResourceManagerClient,
    url: String,
    default_interval: Duration,
}

impl DeletePoller {
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
impl PollerType for DeletePoller {
    async fn poll(&self, ctx: &PollContext) -> lro_core::Result<Option<PollResult>> {
        let response = self.client.poll_get(ctx, &self.url).await?;

        debug!("Deleted resource {} returned {}", self.url, response.status);

        match response.status {
            404 => Ok(Some(PollResult::succeeded().with_response(response))),
            200 | 202 => {
                let interval = poll_interval(&response, self.default_interval);
                Ok(Some(PollResult::in_progress(interval).with_response(response)))
            }
            _ => Err(unexpected_status(response)),
        }
    }
}
