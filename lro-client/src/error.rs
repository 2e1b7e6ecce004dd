//! Error types for the Resource Manager client

use lro_core::PollingError;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when sending requests through the client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}

/// Failure of a submit-then-poll operation, tagged with the phase that failed
#[derive(Debug, Error)]
pub enum OperationError {
    /// The initial request was rejected or never completed
    #[error("performing {operation}: {source}")]
    Performing {
        /// Operation name, e.g. `CreateOrUpdate`
        operation: String,
        /// Underlying client error
        source: ClientError,
    },

    /// The request was accepted but the operation did not complete successfully
    #[error("polling after {operation}: {source}")]
    Polling {
        /// Operation name, e.g. `CreateOrUpdate`
        operation: String,
        /// Underlying polling error
        source: PollingError,
    },
}

impl OperationError {
    /// The polling error, when the failure happened after submission
    pub fn polling_error(&self) -> Option<&PollingError> {
        match self {
            Self::Polling { source, .. } => Some(source),
            Self::Performing { .. } => None,
        }
    }
}

/// Classifies a transport failure observed while polling
///
/// Failures before any HTTP semantics apply count as dropped connections.
pub(crate) fn polling_transport_error(err: reqwest::Error) -> PollingError {
    if err.is_connect() || err.is_timeout() || err.is_body() || err.is_request() {
        PollingError::dropped_connection(err.to_string())
    } else {
        PollingError::unexpected(None, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_classification() {
        let err = ClientError::api_error(404, "missing");
        assert!(err.is_not_found());
        assert!(err.is_client_error());
        assert!(!err.is_server_error());

        let err = ClientError::api_error(503, "unavailable");
        assert!(err.is_server_error());
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_operation_error_names_the_phase() {
        let err = OperationError::Performing {
            operation: "CreateOrUpdate".to_string(),
            source: ClientError::api_error(400, "bad request"),
        };
        assert_eq!(
            err.to_string(),
            "performing CreateOrUpdate: API error (status 400): bad request"
        );
        assert!(err.polling_error().is_none());

        let err = OperationError::Polling {
            operation: "Delete".to_string(),
            source: PollingError::failed(None, "quota exceeded"),
        };
        assert_eq!(
            err.to_string(),
            "polling after Delete: polling failed: quota exceeded"
        );
        assert!(err.polling_error().is_some());
    }
}
