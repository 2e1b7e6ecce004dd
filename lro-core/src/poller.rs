//! Long-running operation poller
//!
//! `PollerType` performs exactly one poll against a specific long-running
//! operation convention. `Poller` drives a `PollerType` until the operation
//! reaches a terminal state, the connection drops too many times in a row, or
//! the caller's context is done.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time;
use tracing::{debug, info, warn};

use crate::context::PollContext;
use crate::domain::{PollResult, PollingStatus, ResponseSnapshot};
use crate::error::{PollingError, Result};

/// Consecutive dropped connections tolerated by default before giving up
pub const DEFAULT_DROPPED_CONNECTIONS_TO_ALLOW: usize = 3;

/// Performs one poll of a long-running operation
///
/// Implementations must not sleep or retry; scheduling belongs to `Poller`.
///
/// - Still running: `Ok(Some(result))` with `PollingStatus::InProgress` and
///   the interval to wait before the next poll.
/// - Finished successfully: `Ok(Some(result))` with `PollingStatus::Succeeded`.
/// - Cancelled remotely: `Err(PollingError::Cancelled { .. })`.
/// - Failed remotely: `Err(PollingError::Failed { .. })`.
/// - Connection lost: `Ok(None)`, or `Err(PollingError::DroppedConnection { .. })`
///   when there is more detail to report.
#[async_trait]
pub trait PollerType: Send + Sync {
    /// Polls the operation once
    async fn poll(&self, ctx: &PollContext) -> Result<Option<PollResult>>;
}

#[derive(Debug, Default)]
struct Observation {
    result: Option<PollResult>,
    error: Option<PollingError>,
    // Set once `poll_until_done` returns; late writes from an aborted loop are ignored.
    closed: bool,
}

type SharedObservation = Arc<Mutex<Observation>>;

fn lock(observation: &SharedObservation) -> MutexGuard<'_, Observation> {
    observation.lock().unwrap_or_else(PoisonError::into_inner)
}

fn record(observation: &SharedObservation, result: Option<PollResult>, error: Option<PollingError>) {
    let mut latest = lock(observation);
    if latest.closed {
        return;
    }
    latest.result = result;
    latest.error = error;
}

/// Read-only view of a poller's latest observation
///
/// Can be cloned and read from another task while `poll_until_done` runs.
/// Values only change when a poll completes.
#[derive(Debug, Clone)]
pub struct PollerObserver {
    latest: SharedObservation,
}

impl PollerObserver {
    /// Response from the most recent poll, if it produced one
    pub fn latest_response(&self) -> Option<ResponseSnapshot> {
        lock(&self.latest)
            .result
            .as_ref()
            .and_then(|result| result.response.clone())
    }

    /// Status from the most recent poll, `Unknown` when there is none
    pub fn latest_status(&self) -> PollingStatus {
        lock(&self.latest)
            .result
            .as_ref()
            .map(|result| result.status)
            .unwrap_or_default()
    }

    /// Error from the most recent poll, if it failed
    pub fn latest_error(&self) -> Option<PollingError> {
        lock(&self.latest).error.clone()
    }
}

/// Drives a `PollerType` until the long-running operation completes
///
/// A poller tracks exactly one operation: construct it, call
/// `poll_until_done` once, then inspect the outcome.
pub struct Poller {
    poller_type: Arc<dyn PollerType>,
    initial_delay: Duration,
    max_dropped_connections: usize,
    latest: SharedObservation,
}

impl Poller {
    /// Creates a new poller
    ///
    /// # Arguments
    /// * `poller_type` - Performs individual polls for one operation convention
    /// * `initial_delay` - Wait before the first poll, and between polls until a
    ///   result advertises its own interval
    /// * `max_dropped_connections` - Consecutive dropped connections tolerated
    pub fn new(
        poller_type: Arc<dyn PollerType>,
        initial_delay: Duration,
        max_dropped_connections: usize,
    ) -> Self {
        Self {
            poller_type,
            initial_delay,
            max_dropped_connections,
            latest: SharedObservation::default(),
        }
    }

    /// Returns a handle for reading the latest observation mid-flight
    pub fn observer(&self) -> PollerObserver {
        PollerObserver {
            latest: Arc::clone(&self.latest),
        }
    }

    /// Response from the most recent poll, if it produced one
    pub fn latest_response(&self) -> Option<ResponseSnapshot> {
        self.observer().latest_response()
    }

    /// Status from the most recent poll, `Unknown` when there is none
    pub fn latest_status(&self) -> PollingStatus {
        self.observer().latest_status()
    }

    /// Error from the most recent poll, if it failed
    pub fn latest_error(&self) -> Option<PollingError> {
        self.observer().latest_error()
    }

    /// Polls until the operation succeeds or a terminal error occurs
    ///
    /// `ctx` must carry a deadline. If it is done before the operation
    /// finishes, the in-flight poll is abandoned and the context error is
    /// returned; the remote operation's state is then unknown.
    ///
    /// Calling it again after it has returned fails with an internal error.
    pub async fn poll_until_done(&mut self, ctx: &PollContext) -> Result<()> {
        if ctx.deadline().is_none() {
            return Err(PollingError::Internal(
                "`ctx` should have a deadline".to_string(),
            ));
        }
        if lock(&self.latest).closed {
            return Err(PollingError::Internal("poller already used".to_string()));
        }

        let mut task = tokio::spawn(run_loop(
            Arc::clone(&self.poller_type),
            self.initial_delay,
            self.max_dropped_connections,
            Arc::clone(&self.latest),
            ctx.clone(),
        ));

        let outcome = tokio::select! {
            joined = &mut task => joined.unwrap_or_else(|e| {
                Err(PollingError::Internal(format!("polling task did not complete: {}", e)))
            }),
            err = ctx.done() => {
                task.abort();
                debug!("Context finished before polling completed: {}", err);
                Err(err)
            }
        };

        let mut latest = lock(&self.latest);
        if let Err(err) = &outcome {
            latest.result = None;
            latest.error = Some(err.clone());
        }
        latest.closed = true;

        outcome
    }
}

/// The polling loop, run on its own task by `poll_until_done`
async fn run_loop(
    poller_type: Arc<dyn PollerType>,
    initial_delay: Duration,
    max_dropped_connections: usize,
    latest: SharedObservation,
    ctx: PollContext,
) -> Result<()> {
    let mut retry_interval = initial_delay;
    let mut dropped_connections = 0usize;
    let mut attempt = 0u32;

    loop {
        time::sleep(retry_interval).await;
        attempt += 1;

        debug!("Polling long-running operation (attempt {})", attempt);

        match poller_type.poll(&ctx).await {
            outcome @ (Ok(None) | Err(PollingError::DroppedConnection { .. })) => {
                dropped_connections += 1;
                if dropped_connections < max_dropped_connections {
                    warn!(
                        "Dropped connection while polling ({}/{}), retrying in {:?}",
                        dropped_connections, max_dropped_connections, retry_interval
                    );
                    record(&latest, Some(PollResult::unknown(retry_interval)), None);
                    continue;
                }

                let err = match outcome {
                    Err(err) => err,
                    _ => PollingError::dropped_connection(format!(
                        "no response after {} consecutive attempts",
                        dropped_connections
                    )),
                };
                warn!("Giving up after {} dropped connections", dropped_connections);
                record(
                    &latest,
                    Some(PollResult::unknown(retry_interval)),
                    Some(err.clone()),
                );
                return Err(err);
            }
            Err(err) => {
                debug!("Polling stopped with error: {}", err);
                record(&latest, None, Some(err.clone()));
                return Err(err);
            }
            Ok(Some(result)) => {
                dropped_connections = 0;
                let status = result.status;
                let poll_interval = result.poll_interval;
                record(&latest, Some(result), None);

                match status {
                    PollingStatus::InProgress => {
                        debug!("Operation in progress, next poll in {:?}", poll_interval);
                        retry_interval = poll_interval;
                    }
                    PollingStatus::Succeeded => {
                        info!("Long-running operation succeeded after {} poll(s)", attempt);
                        return Ok(());
                    }
                    PollingStatus::Cancelled => {
                        return Err(contract_violation(
                            &latest,
                            "a polling status of `Cancelled` should be surfaced as a PollingError::Cancelled",
                        ));
                    }
                    PollingStatus::Failed => {
                        return Err(contract_violation(
                            &latest,
                            "a polling status of `Failed` should be surfaced as a PollingError::Failed",
                        ));
                    }
                    PollingStatus::Unknown => {
                        return Err(contract_violation(
                            &latest,
                            "unimplemented polling status `Unknown`",
                        ));
                    }
                }
            }
        }
    }
}

fn contract_violation(latest: &SharedObservation, message: &str) -> PollingError {
    let err = PollingError::Internal(message.to_string());
    let mut observation = lock(latest);
    if !observation.closed {
        observation.result = None;
        observation.error = Some(err.clone());
    }
    err
}
