//! Retry and backoff for flaky Pet Store calls.
//!
//! Failures are classified into categories, each category carries its own
//! retryability and delay shape, and [`run_with_retry`] drives an operation
//! through a bounded attempt budget while recording what every failed
//! attempt looked like.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{
    classify, classify_http, classify_transport, ErrorAnalysis, ErrorCategory, NotFoundHandling,
};
pub use error::ApiError;
pub use policy::{RetryDecision, RetryPolicy};
pub use run::{run_with_retry, AttemptError, RetrySuccess, TerminalFailure};
