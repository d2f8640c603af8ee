//! Retry budget and backoff shaping.

use std::time::Duration;

use crate::retry::classify::{ErrorAnalysis, ErrorCategory};

/// Linear backoff for transient failures never waits longer than this
/// regardless of how deep into the budget we are.
const TRANSIENT_DELAY_CAP: Duration = Duration::from_secs(5);

/// Decision for one failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Give up: budget spent or the failure is not retryable.
    NoRetry,
    /// Sleep this long, then try again.
    RetryAfter(Duration),
}

/// Bounds on how often and how fast an operation is retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts including the first. Always >= 1; a value of 0
    /// behaves like 1.
    pub max_attempts: u32,
    /// Starting delay that the per-category shaping scales up from.
    pub base_delay: Duration,
    /// Hard ceiling applied to every computed delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Decide what to do after attempt number `attempt` (1-based) failed
    /// with the given analysis.
    ///
    /// Network errors back off exponentially, rate limits honor the server
    /// hint, and everything else retryable backs off linearly up to a cap.
    pub fn decide(&self, attempt: u32, analysis: &ErrorAnalysis) -> RetryDecision {
        if !analysis.retryable {
            return RetryDecision::NoRetry;
        }
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }
        let delay = match analysis.category {
            ErrorCategory::RateLimited => {
                analysis.suggested_delay.unwrap_or(self.base_delay)
            }
            ErrorCategory::NetworkError => {
                let shift = attempt.saturating_sub(1).min(8);
                self.base_delay.saturating_mul(1u32 << shift)
            }
            _ => self
                .base_delay
                .saturating_mul(attempt)
                .min(TRANSIENT_DELAY_CAP),
        };
        RetryDecision::RetryAfter(delay.min(self.max_delay))
    }
}
