//! HTTP response snapshot
//!
//! An owned capture of one HTTP response, detached from any client library so
//! that errors and poll results can carry it around and clone it freely.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Captured status, headers and body of an HTTP response
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    /// HTTP status code
    pub status: u16,

    /// Response headers, keyed by lower-cased name
    pub headers: BTreeMap<String, String>,

    /// Response body as text (empty when there was none)
    pub body: String,
}

impl ResponseSnapshot {
    /// Creates a snapshot with the given status and no headers or body
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    /// Adds a header, normalising the name to lower case
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Sets the body text
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns true for 2xx status codes
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as JSON
    ///
    /// Returns `None` for an empty body.
    pub fn json(&self) -> Option<serde_json::Result<serde_json::Value>> {
        if self.body.trim().is_empty() {
            return None;
        }
        Some(serde_json::from_str(&self.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let snapshot = ResponseSnapshot::new(202).with_header("Azure-AsyncOperation", "https://x");
        assert_eq!(snapshot.header("azure-asyncoperation"), Some("https://x"));
        assert_eq!(snapshot.header("AZURE-ASYNCOPERATION"), Some("https://x"));
        assert_eq!(snapshot.header("location"), None);
    }

    #[test]
    fn test_is_success() {
        assert!(ResponseSnapshot::new(204).is_success());
        assert!(!ResponseSnapshot::new(404).is_success());
    }

    #[test]
    fn test_json_body() {
        let snapshot = ResponseSnapshot::new(200).with_body(r#"{"status":"Succeeded"}"#);
        let value = snapshot.json().unwrap().unwrap();
        assert_eq!(value["status"], "Succeeded");

        assert!(ResponseSnapshot::new(202).json().is_none());
        assert!(ResponseSnapshot::new(200).with_body("{").json().unwrap().is_err());
    }
}
