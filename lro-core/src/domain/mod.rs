//! Core domain types
//!
//! Value types describing a single polling observation. These are produced by
//! `PollerType` implementations and consumed by the `Poller` driver; the client
//! crate builds them from HTTP responses.

pub mod response;
pub mod result;
pub mod status;

pub use response::ResponseSnapshot;
pub use result::PollResult;
pub use status::PollingStatus;
