//! LRO Core
//!
//! Polling primitives for long-running operations.
//!
//! This crate contains:
//! - Domain types: one polling observation (`PollResult`, `PollingStatus`, `ResponseSnapshot`)
//! - Errors: the terminal outcomes a poll can surface (`PollingError`)
//! - Context: caller deadline and cancellation (`PollContext`)
//! - Poller: the `PollerType` capability and the `Poller` driver
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use lro_core::{PollContext, PollResult, Poller, PollerType};
//!
//! struct AlwaysDone;
//!
//! #[async_trait]
//! impl PollerType for AlwaysDone {
//!     async fn poll(&self, _ctx: &PollContext) -> lro_core::Result<Option<PollResult>> {
//!         Ok(Some(PollResult::succeeded()))
//!     }
//! }
//!
//! # async fn example() -> lro_core::Result<()> {
//! let mut poller = Poller::new(Arc::new(AlwaysDone), Duration::from_secs(1), 3);
//! poller.poll_until_done(&PollContext::with_timeout(Duration::from_secs(60))).await?;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod domain;
pub mod error;
pub mod poller;

pub use context::PollContext;
pub use domain::{PollResult, PollingStatus, ResponseSnapshot};
pub use error::{PollingError, Result};
pub use poller::{DEFAULT_DROPPED_CONNECTIONS_TO_ALLOW, Poller, PollerObserver, PollerType};
