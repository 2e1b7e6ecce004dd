//! Pollers for each long-running operation convention
//!
//! Resource Manager signals long-running operations in one of several ways.
//! Each convention gets its own `PollerType`:
//!
//! - `AsyncOperationPoller`: follows the `Azure-AsyncOperation` header and
//!   reads the operation's `status`
//! - `LocationPoller`: follows the `Location` header until it stops returning 202
//! - `ProvisioningStatePoller`: re-reads the resource's `properties.provisioningState`
//! - `DeletePoller`: re-reads the resource until it returns 404

mod async_operation;
mod delete;
mod location;
mod provisioning_state;

pub use async_operation::AsyncOperationPoller;
pub use delete::DeletePoller;
pub use location::LocationPoller;
pub use provisioning_state::ProvisioningStatePoller;

use lro_core::{PollResult, PollerType, PollingError, ResponseSnapshot};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::ResourceManagerClient;

/// Interval between polls when the API does not send `Retry-After`
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Picks the poller for an operation from its initial response
///
/// # Arguments
/// * `client` - Client the poller will issue its requests through
/// * `method` - Method of the initial request
/// * `url` - URL of the initial request
/// * `initial` - Response to the initial request
///
/// # Returns
/// `None` when the initial response shows the operation already completed
pub fn poller_from_response(
    client: &ResourceManagerClient,
    method: &Method,
    url: &str,
    initial: &ResponseSnapshot,
) -> Option<Arc<dyn PollerType>> {
    if let Some(operation_url) = initial.header("azure-asyncoperation") {
        return Some(Arc::new(AsyncOperationPoller::new(
            client.clone(),
            client.resolve(operation_url),
        )));
    }

    if let Some(location) = initial
        .header("location")
        .filter(|_| matches!(initial.status, 201 | 202))
    {
        return Some(Arc::new(LocationPoller::new(
            client.clone(),
            client.resolve(location),
        )));
    }

    if *method == Method::DELETE {
        return (initial.status == 202)
            .then(|| Arc::new(DeletePoller::new(client.clone(), url)) as Arc<dyn PollerType>);
    }

    if *method == Method::PUT || *method == Method::PATCH {
        let pending = match initial.status {
            201 | 202 => true,
            200 => provisioning_state(initial)
                .is_some_and(|state| !state.eq_ignore_ascii_case("Succeeded")),
            _ => false,
        };
        if pending {
            return Some(Arc::new(ProvisioningStatePoller::new(client.clone(), url)));
        }
    }

    None
}

/// Reads `properties.provisioningState` from a resource body
fn provisioning_state(response: &ResponseSnapshot) -> Option<String> {
    let body = response.json()?.ok()?;
    body.pointer("/properties/provisioningState")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Maps an operation or provisioning status string onto a poll outcome
///
/// Anything other than a terminal state is treated as still running.
fn classify_status(
    status: &str,
    response: ResponseSnapshot,
    poll_interval: Duration,
    body: Option<&Value>,
) -> lro_core::Result<Option<PollResult>> {
    match status.to_ascii_lowercase().as_str() {
        "succeeded" => Ok(Some(PollResult::succeeded().with_response(response))),
        "failed" => {
            let message = body
                .and_then(error_message)
                .unwrap_or_else(|| "the operation reported status `Failed`".to_string());
            Err(PollingError::failed(Some(response), message))
        }
        "canceled" | "cancelled" => {
            let message = body
                .and_then(error_message)
                .unwrap_or_else(|| format!("the operation reported status `{}`", status));
            Err(PollingError::cancelled(Some(response), message))
        }
        _ => Ok(Some(
            PollResult::in_progress(poll_interval).with_response(response),
        )),
    }
}

/// Extracts `error.code` / `error.message` from an error body
fn error_message(body: &Value) -> Option<String> {
    let error = body
        .get("error")
        .or_else(|| body.pointer("/properties/error"))?;
    let message = error.get("message").and_then(Value::as_str)?;
    match error.get("code").and_then(Value::as_str) {
        Some(code) => Some(format!("{}: {}", code, message)),
        None => Some(message.to_string()),
    }
}

fn unexpected_status(response: ResponseSnapshot) -> PollingError {
    let message = format!("unexpected status {}", response.status);
    PollingError::unexpected(Some(response), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lro_core::PollingStatus;

    fn client() -> ResourceManagerClient {
        ResourceManagerClient::new("http://localhost:8080")
    }

    const URL: &str = "http://localhost:8080/widgets/a";

    #[test]
    fn test_async_operation_header_wins() {
        let initial = ResponseSnapshot::new(201)
            .with_header("Azure-AsyncOperation", "/operations/1")
            .with_header("Location", "/locations/1");
        assert!(poller_from_response(&client(), &Method::PUT, URL, &initial).is_some());
    }

    #[test]
    fn test_location_header_requires_accepted() {
        let accepted = ResponseSnapshot::new(202).with_header("Location", "/locations/1");
        assert!(poller_from_response(&client(), &Method::POST, URL, &accepted).is_some());

        let ok = ResponseSnapshot::new(200).with_header("Location", "/locations/1");
        assert!(poller_from_response(&client(), &Method::POST, URL, &ok).is_none());
    }

    #[test]
    fn test_delete_without_headers() {
        let accepted = ResponseSnapshot::new(202);
        assert!(poller_from_response(&client(), &Method::DELETE, URL, &accepted).is_some());

        let done = ResponseSnapshot::new(200);
        assert!(poller_from_response(&client(), &Method::DELETE, URL, &done).is_none());
        let gone = ResponseSnapshot::new(204);
        assert!(poller_from_response(&client(), &Method::DELETE, URL, &gone).is_none());
    }

    #[test]
    fn test_put_provisioning_state() {
        let creating = ResponseSnapshot::new(200)
            .with_body(r#"{"properties":{"provisioningState":"Creating"}}"#);
        assert!(poller_from_response(&client(), &Method::PUT, URL, &creating).is_some());

        let done = ResponseSnapshot::new(200)
            .with_body(r#"{"properties":{"provisioningState":"Succeeded"}}"#);
        assert!(poller_from_response(&client(), &Method::PUT, URL, &done).is_none());

        let plain = ResponseSnapshot::new(200).with_body(r#"{"name":"a"}"#);
        assert!(poller_from_response(&client(), &Method::PUT, URL, &plain).is_none());

        let created = ResponseSnapshot::new(201);
        assert!(poller_from_response(&client(), &Method::PATCH, URL, &created).is_some());
    }

    #[test]
    fn test_classify_status() {
        let response = ResponseSnapshot::new(200);
        let interval = Duration::from_secs(5);

        let result = classify_status("Succeeded", response.clone(), interval, None)
            .unwrap()
            .unwrap();
        assert_eq!(result.status, PollingStatus::Succeeded);

        let result = classify_status("Updating", response.clone(), interval, None)
            .unwrap()
            .unwrap();
        assert_eq!(result.status, PollingStatus::InProgress);
        assert_eq!(result.poll_interval, interval);

        let err = classify_status("Canceled", response.clone(), interval, None).unwrap_err();
        assert!(matches!(err, PollingError::Cancelled { .. }));

        let body: Value = serde_json::json!({
            "status": "Failed",
            "error": { "code": "QuotaExceeded", "message": "no cores left" }
        });
        let err = classify_status("Failed", response, interval, Some(&body)).unwrap_err();
        assert_eq!(err.to_string(), "polling failed: QuotaExceeded: no cores left");
        assert!(err.response().is_some());
    }
}
