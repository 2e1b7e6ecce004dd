//! Poll result domain model

use std::time::Duration;

use super::{PollingStatus, ResponseSnapshot};

/// Outcome of one successful poll
///
/// Terminal failure and cancellation are not expressed here; pollers report
/// those through `PollingError::Failed` and `PollingError::Cancelled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollResult {
    /// Response the poll was classified from, if any
    pub response: Option<ResponseSnapshot>,

    /// How long to wait before the next poll
    pub poll_interval: Duration,

    /// Observed status
    pub status: PollingStatus,
}

impl PollResult {
    /// The operation is still running; poll again after `poll_interval`
    pub fn in_progress(poll_interval: Duration) -> Self {
        Self {
            response: None,
            poll_interval,
            status: PollingStatus::InProgress,
        }
    }

    /// The operation completed successfully
    pub fn succeeded() -> Self {
        Self {
            response: None,
            poll_interval: Duration::ZERO,
            status: PollingStatus::Succeeded,
        }
    }

    /// Placeholder recorded by the driver after a tolerated dropped connection
    pub(crate) fn unknown(poll_interval: Duration) -> Self {
        Self {
            response: None,
            poll_interval,
            status: PollingStatus::Unknown,
        }
    }

    /// Attaches the response this result was built from
    pub fn with_response(mut self, response: ResponseSnapshot) -> Self {
        self.response = Some(response);
        self
    }
}
