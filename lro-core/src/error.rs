//! Error types for long-running operation polling

use thiserror::Error;

use crate::domain::ResponseSnapshot;

/// Result type alias for polling operations
pub type Result<T> = std::result::Result<T, PollingError>;

/// Errors surfaced by pollers and by the polling driver
#[derive(Debug, Clone, Error)]
pub enum PollingError {
    /// The remote operation was cancelled
    #[error("polling was cancelled: {message}")]
    Cancelled {
        /// Response that reported the cancellation
        response: Option<ResponseSnapshot>,
        /// Human-readable detail
        message: String,
    },

    /// The remote operation reached a failed terminal state
    #[error("polling failed: {message}")]
    Failed {
        /// Response that reported the failure
        response: Option<ResponseSnapshot>,
        /// Human-readable detail
        message: String,
    },

    /// Connectivity was lost while polling
    #[error("experienced a dropped connection when polling: {message}")]
    DroppedConnection {
        /// Human-readable detail
        message: String,
    },

    /// The caller's deadline passed before the operation finished
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// The caller cancelled the context
    #[error("context canceled")]
    ContextCancelled,

    /// A poller or caller broke the polling contract
    #[error("internal-error: {0}")]
    Internal(String),

    /// The poller could not classify what it observed
    #[error("unexpected response while polling: {message}")]
    Unexpected {
        /// Response that could not be classified
        response: Option<ResponseSnapshot>,
        /// Human-readable detail
        message: String,
    },
}

impl PollingError {
    /// Create a cancellation error
    pub fn cancelled(response: Option<ResponseSnapshot>, message: impl Into<String>) -> Self {
        Self::Cancelled {
            response,
            message: message.into(),
        }
    }

    /// Create a failure error
    pub fn failed(response: Option<ResponseSnapshot>, message: impl Into<String>) -> Self {
        Self::Failed {
            response,
            message: message.into(),
        }
    }

    /// Create a dropped connection error
    pub fn dropped_connection(message: impl Into<String>) -> Self {
        Self::DroppedConnection {
            message: message.into(),
        }
    }

    /// Create an unexpected response error
    pub fn unexpected(response: Option<ResponseSnapshot>, message: impl Into<String>) -> Self {
        Self::Unexpected {
            response,
            message: message.into(),
        }
    }

    /// The response snapshot attached to this error, if any
    pub fn response(&self) -> Option<&ResponseSnapshot> {
        match self {
            Self::Cancelled { response, .. }
            | Self::Failed { response, .. }
            | Self::Unexpected { response, .. } => response.as_ref(),
            _ => None,
        }
    }

    /// Check if the remote operation itself ended in failure or cancellation
    pub fn is_terminal_remote(&self) -> bool {
        matches!(self, Self::Cancelled { .. } | Self::Failed { .. })
    }

    /// Check if this error came from the caller's context rather than the operation
    pub fn is_context_error(&self) -> bool {
        matches!(self, Self::DeadlineExceeded | Self::ContextCancelled)
    }

    /// Check if this is a dropped connection
    pub fn is_dropped_connection(&self) -> bool {
        matches!(self, Self::DroppedConnection { .. })
    }
}
