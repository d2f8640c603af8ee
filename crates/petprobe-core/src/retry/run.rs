//! The retry loop: run an operation until it succeeds or the policy says stop.

use std::error::Error as StdError;
use std::fmt;
use std::thread;

use crate::retry::classify::{classify, ErrorAnalysis, ErrorCategory, NotFoundHandling};
use crate::retry::error::ApiError;
use crate::retry::policy::{RetryDecision, RetryPolicy};

/// One failed attempt, kept so callers can see what the retries chewed
/// through even when the operation eventually succeeded.
#[derive(Debug, Clone)]
pub struct AttemptError {
    /// 1-based attempt number.
    pub attempt: u32,
    pub category: ErrorCategory,
    pub description: String,
}

/// Successful outcome plus the cost of getting there.
#[derive(Debug)]
pub struct RetrySuccess<T> {
    pub value: T,
    /// Retries spent, i.e. attempts beyond the first.
    pub retry_count: u32,
    /// Every failure that preceded the success.
    pub history: Vec<AttemptError>,
}

/// Terminal failure of a retried operation.
#[derive(Debug)]
pub enum TerminalFailure {
    /// Every attempt in the budget failed with retryable errors.
    Exhausted {
        attempts: u32,
        last_error: ApiError,
        analysis: ErrorAnalysis,
        history: Vec<AttemptError>,
    },
    /// A non-retryable error ended the sequence early.
    Fatal {
        attempts: u32,
        error: ApiError,
        analysis: ErrorAnalysis,
        history: Vec<AttemptError>,
    },
}

impl TerminalFailure {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TerminalFailure::Exhausted { analysis, .. }
            | TerminalFailure::Fatal { analysis, .. } => analysis.category,
        }
    }

    /// Attempts actually made, including the first.
    pub fn attempts(&self) -> u32 {
        match self {
            TerminalFailure::Exhausted { attempts, .. }
            | TerminalFailure::Fatal { attempts, .. } => *attempts,
        }
    }

    pub fn retry_count(&self) -> u32 {
        self.attempts().saturating_sub(1)
    }

    pub fn history(&self) -> &[AttemptError] {
        match self {
            TerminalFailure::Exhausted { history, .. }
            | TerminalFailure::Fatal { history, .. } => history,
        }
    }

    /// True when the operation ended because a 404 was the expected answer.
    pub fn is_expected_absence(&self) -> bool {
        matches!(
            self,
            TerminalFailure::Fatal { analysis, .. }
                if analysis.category == ErrorCategory::ExpectedNotFound
        )
    }
}

impl fmt::Display for TerminalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalFailure::Exhausted {
                attempts,
                last_error,
                ..
            } => write!(f, "gave up after {} attempts: {}", attempts, last_error),
            TerminalFailure::Fatal {
                attempts, error, ..
            } => write!(f, "{} (not retryable, attempt {})", error, attempts),
        }
    }
}

impl StdError for TerminalFailure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TerminalFailure::Exhausted { last_error, .. } => Some(last_error),
            TerminalFailure::Fatal { error, .. } => Some(error),
        }
    }
}

/// Run `op` under the policy, sleeping between attempts.
///
/// The sleep happens only when another attempt will follow; once the budget
/// is spent or the failure is non-retryable the caller gets the outcome
/// immediately.
pub fn run_with_retry<T, F>(
    policy: &RetryPolicy,
    not_found: NotFoundHandling,
    mut op: F,
) -> Result<RetrySuccess<T>, TerminalFailure>
where
    F: FnMut() -> Result<T, ApiError>,
{
    let mut history: Vec<AttemptError> = Vec::new();
    let mut attempt: u32 = 1;
    loop {
        match op() {
            Ok(value) => {
                return Ok(RetrySuccess {
                    value,
                    retry_count: attempt - 1,
                    history,
                });
            }
            Err(e) => {
                let analysis = classify(&e, not_found);
                history.push(AttemptError {
                    attempt,
                    category: analysis.category,
                    description: analysis.description.clone(),
                });
                match policy.decide(attempt, &analysis) {
                    RetryDecision::NoRetry => {
                        return Err(if analysis.retryable {
                            TerminalFailure::Exhausted {
                                attempts: attempt,
                                last_error: e,
                                analysis,
                                history,
                            }
                        } else {
                            TerminalFailure::Fatal {
                                attempts: attempt,
                                error: e,
                                analysis,
                                history,
                            }
                        });
                    }
                    RetryDecision::RetryAfter(delay) => {
                        thread::sleep(delay);
                        attempt += 1;
                    }
                }
            }
        }
    }
}
