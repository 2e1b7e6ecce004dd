//! Submit-then-poll operations

use lro_core::{
    DEFAULT_DROPPED_CONNECTIONS_TO_ALLOW, PollContext, Poller, PollerType, ResponseSnapshot,
};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{OperationError, Result};
use crate::{Method, ResourceManagerClient};

/// Timing for driving a long-running operation to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOptions {
    /// Wait before the first poll
    pub initial_delay: Duration,

    /// Consecutive dropped connections tolerated before giving up
    pub max_dropped_connections: usize,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_dropped_connections: DEFAULT_DROPPED_CONNECTIONS_TO_ALLOW,
        }
    }
}

/// Response to the initial request of a long-running operation
pub struct LongRunningResponse {
    /// The initial response
    pub response: ResponseSnapshot,

    /// Poller for the operation, `None` if it completed synchronously
    pub poller_type: Option<Arc<dyn PollerType>>,
}

impl LongRunningResponse {
    /// Returns true if the operation finished with the initial request
    pub fn is_done(&self) -> bool {
        self.poller_type.is_none()
    }

    /// Builds the driver for the remaining work, if any
    pub fn poller(&self, options: &PollOptions) -> Option<Poller> {
        self.poller_type.as_ref().map(|poller_type| {
            Poller::new(
                Arc::clone(poller_type),
                options.initial_delay,
                options.max_dropped_connections,
            )
        })
    }
}

/// Submits an operation and polls it until it completes
///
/// Errors are tagged with the phase that failed, so callers can tell a
/// rejected submission from an operation that was accepted and then failed.
///
/// # Arguments
/// * `ctx` - Deadline and cancellation for the polling phase
/// * `operation` - Name used in error messages, e.g. `CreateOrUpdate`
/// * `options` - Polling timing
/// * `submit` - Sends the initial request
///
/// # Returns
/// The last response observed: the final poll, or the initial response when
/// the operation completed synchronously
pub async fn then_poll<F>(
    ctx: &PollContext,
    operation: &str,
    options: &PollOptions,
    submit: F,
) -> std::result::Result<ResponseSnapshot, OperationError>
where
    F: Future<Output = Result<LongRunningResponse>>,
{
    let initial = submit.await.map_err(|source| OperationError::Performing {
        operation: operation.to_string(),
        source,
    })?;

    let Some(mut poller) = initial.poller(options) else {
        debug!("{} completed without polling", operation);
        return Ok(initial.response);
    };

    poller
        .poll_until_done(ctx)
        .await
        .map_err(|source| OperationError::Polling {
            operation: operation.to_string(),
            source,
        })?;

    info!("{} completed", operation);
    Ok(poller.latest_response().unwrap_or(initial.response))
}

impl ResourceManagerClient {
    // =============================================================================
    // Long-Running Operations
    // =============================================================================

    /// Create or update a resource
    ///
    /// # Arguments
    /// * `path` - Resource path
    /// * `body` - Resource payload
    pub async fn create_or_update(&self, path: &str, body: &Value) -> Result<LongRunningResponse> {
        self.begin(Method::PUT, path, Some(body)).await
    }

    /// Create or update a resource and wait for it to finish provisioning
    pub async fn create_or_update_then_poll(
        &self,
        ctx: &PollContext,
        path: &str,
        body: &Value,
    ) -> std::result::Result<ResponseSnapshot, OperationError> {
        then_poll(
            ctx,
            "CreateOrUpdate",
            self.poll_options(),
            self.create_or_update(path, body),
        )
        .await
    }

    /// Delete a resource
    ///
    /// # Arguments
    /// * `path` - Resource path
    pub async fn delete(&self, path: &str) -> Result<LongRunningResponse> {
        self.begin(Method::DELETE, path, None).await
    }

    /// Delete a resource and wait for the deletion to complete
    pub async fn delete_then_poll(
        &self,
        ctx: &PollContext,
        path: &str,
    ) -> std::result::Result<ResponseSnapshot, OperationError> {
        then_poll(ctx, "Delete", self.poll_options(), self.delete(path)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientError;
    use async_trait::async_trait;
    use lro_core::{PollResult, PollingError};

    struct Scripted(std::sync::Mutex<Vec<lro_core::Result<Option<PollResult>>>>);

    #[async_trait]
    impl PollerType for Scripted {
        async fn poll(&self, _ctx: &PollContext) -> lro_core::Result<Option<PollResult>> {
            self.0.lock().unwrap().remove(0)
        }
    }

    fn options() -> PollOptions {
        PollOptions {
            initial_delay: Duration::from_secs(1),
            max_dropped_connections: 3,
        }
    }

    fn ctx() -> PollContext {
        PollContext::with_timeout(Duration::from_secs(600))
    }

    fn pending(steps: Vec<lro_core::Result<Option<PollResult>>>) -> LongRunningResponse {
        LongRunningResponse {
            response: ResponseSnapshot::new(202),
            poller_type: Some(Arc::new(Scripted(std::sync::Mutex::new(steps)))),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_error_is_tagged_performing() {
        let err = then_poll(&ctx(), "CreateOrUpdate", &options(), async {
            Err::<LongRunningResponse, _>(ClientError::api_error(409, "conflict"))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, OperationError::Performing { .. }));
        assert!(err.to_string().starts_with("performing CreateOrUpdate"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_error_is_tagged_polling() {
        let initial = pending(vec![Err(PollingError::failed(None, "quota exceeded"))]);

        let submit = async { Ok::<_, ClientError>(initial) };
        let err = then_poll(&ctx(), "Delete", &options(), submit)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "polling after Delete: polling failed: quota exceeded"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_final_response() {
        let done = ResponseSnapshot::new(200).with_body("{}");
        let initial = pending(vec![
            Ok(Some(PollResult::in_progress(Duration::from_secs(2)))),
            Ok(Some(PollResult::succeeded().with_response(done.clone()))),
        ]);

        let submit = async { Ok::<_, ClientError>(initial) };
        let response = then_poll(&ctx(), "CreateOrUpdate", &options(), submit)
            .await
            .unwrap();

        assert_eq!(response, done);
    }

    #[tokio::test]
    async fn test_synchronous_completion_skips_polling() {
        let initial = LongRunningResponse {
            response: ResponseSnapshot::new(200),
            poller_type: None,
        };
        assert!(initial.is_done());

        let response = then_poll(
            &PollContext::background(),
            "CreateOrUpdate",
            &options(),
            async { Ok::<_, ClientError>(initial) },
        )
        .await
        .unwrap();

        assert_eq!(response.status, 200);
    }
}
