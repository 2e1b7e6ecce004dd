//! Polling status domain model

use serde::{Deserialize, Serialize};

/// Status of a long-running operation as observed by one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PollingStatus {
    /// The operation is still running
    InProgress,

    /// The operation completed successfully
    Succeeded,

    /// The operation reached a failed terminal state
    Failed,

    /// The operation was cancelled remotely
    Cancelled,

    /// Nothing usable has been observed yet
    #[default]
    Unknown,
}

impl PollingStatus {
    /// Returns true for Succeeded, Failed and Cancelled
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollingStatus::Succeeded | PollingStatus::Failed | PollingStatus::Cancelled
        )
    }
}

impl std::fmt::Display for PollingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollingStatus::InProgress => write!(f, "InProgress"),
            PollingStatus::Succeeded => write!(f, "Succeeded"),
            PollingStatus::Failed => write!(f, "Failed"),
            PollingStatus::Cancelled => write!(f, "Cancelled"),
            PollingStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(PollingStatus::Succeeded.is_terminal());
        assert!(PollingStatus::Failed.is_terminal());
        assert!(PollingStatus::Cancelled.is_terminal());
        assert!(!PollingStatus::InProgress.is_terminal());
        assert!(!PollingStatus::Unknown.is_terminal());
    }

    #[test]
    fn test_default_is_unknown() {
        assert_eq!(PollingStatus::default(), PollingStatus::Unknown);
    }

    #[test]
    fn test_serialized_form_matches_display() {
        let json = serde_json::to_string(&PollingStatus::InProgress).unwrap();
        assert_eq!(json, "\"InProgress\"");
        assert_eq!(PollingStatus::InProgress.to_string(), "InProgress");
    }
}
