//! Classify HTTP status and transport errors into retry categories.
//!
//! Classification is pure: one failure signal in, one `ErrorAnalysis` out.
//! The only context is the caller-supplied 404 handling flag, because a 404
//! means "keep polling" while a write propagates but "assertion satisfied"
//! when the test is checking for absence.

use std::time::Duration;

use crate::retry::error::ApiError;

/// Semantic category of one failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Transport-level failure: timeout, connection reset, DNS.
    NetworkError,
    /// 5xx from the backend; expected to clear on its own.
    TransientServerError,
    /// 429; the server asked us to slow down.
    RateLimited,
    /// 401/403; retrying cannot help.
    AuthError,
    /// 400 or a locally rejected request; retrying cannot help.
    ValidationError,
    /// 404 on a read.
    ExpectedNotFound,
    /// Anything unmatched.
    UnknownError,
}

impl ErrorCategory {
    /// Whether the category is worth retrying absent other context.
    /// `ExpectedNotFound` defaults to the polling case; the classifier
    /// overrides it for absence checks.
    pub fn is_retryable(self) -> bool {
        match self {
            ErrorCategory::NetworkError
            | ErrorCategory::TransientServerError
            | ErrorCategory::RateLimited
            | ErrorCategory::ExpectedNotFound
            | ErrorCategory::UnknownError => true,
            ErrorCategory::AuthError | ErrorCategory::ValidationError => false,
        }
    }

    /// Default delay before the next attempt, for categories that have one.
    pub fn base_delay(self) -> Option<Duration> {
        match self {
            ErrorCategory::NetworkError => Some(Duration::from_secs(2)),
            ErrorCategory::TransientServerError => Some(Duration::from_secs(1)),
            ErrorCategory::RateLimited => Some(Duration::from_secs(60)),
            ErrorCategory::ExpectedNotFound | ErrorCategory::UnknownError => {
                Some(Duration::from_secs(1))
            }
            ErrorCategory::AuthError | ErrorCategory::ValidationError => None,
        }
    }

    /// Lowercase name used in summaries and report counters.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::NetworkError => "network_error",
            ErrorCategory::TransientServerError => "transient_server_error",
            ErrorCategory::RateLimited => "rate_limited",
            ErrorCategory::AuthError => "auth_error",
            ErrorCategory::ValidationError => "validation_error",
            ErrorCategory::ExpectedNotFound => "expected_not_found",
            ErrorCategory::UnknownError => "unknown_error",
        }
    }
}

/// How a 404 on a read is treated. Supplied by the caller per operation,
/// never inferred from the operation's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundHandling {
    /// The record should exist (e.g. polling right after a write): retry.
    ExpectPresent,
    /// Absence is the assertion itself: terminal, no retries.
    ExpectAbsent,
}

/// Outcome of classifying one failure.
#[derive(Debug, Clone)]
pub struct ErrorAnalysis {
    pub category: ErrorCategory,
    pub retryable: bool,
    /// Confidence that the category is right, in [0, 1].
    pub confidence: f64,
    pub description: String,
    /// Delay hint for the next attempt; authoritative for `RateLimited`.
    pub suggested_delay: Option<Duration>,
}

/// Classify a failed attempt into a category plus retry recommendation.
pub fn classify(error: &ApiError, not_found: NotFoundHandling) -> ErrorAnalysis {
    match error {
        ApiError::Transport(e) => classify_transport(e),
        ApiError::Http {
            status,
            retry_after,
            ..
        } => classify_http(*status, *retry_after, not_found),
        ApiError::Encode(e) => ErrorAnalysis {
            category: ErrorCategory::ValidationError,
            retryable: false,
            confidence: 1.0,
            description: format!("request body could not be encoded: {}", e),
            suggested_delay: None,
        },
    }
}

/// Classify an HTTP error status.
pub fn classify_http(
    status: u32,
    retry_after: Option<Duration>,
    not_found: NotFoundHandling,
) -> ErrorAnalysis {
    match status {
        500..=599 => ErrorAnalysis {
            category: ErrorCategory::TransientServerError,
            retryable: true,
            confidence: 0.9,
            description: format!("server error HTTP {}", status),
            suggested_delay: ErrorCategory::TransientServerError.base_delay(),
        },
        429 => ErrorAnalysis {
            category: ErrorCategory::RateLimited,
            retryable: true,
            confidence: 0.95,
            description: match retry_after {
                Some(d) => format!("rate limited, retry after {:.1}s", d.as_secs_f64()),
                None => "rate limited, no Retry-After hint".to_string(),
            },
            suggested_delay: retry_after.or_else(|| ErrorCategory::RateLimited.base_delay()),
        },
        401 | 403 => ErrorAnalysis {
            category: ErrorCategory::AuthError,
            retryable: false,
            confidence: 0.95,
            description: format!("authentication rejected with HTTP {}", status),
            suggested_delay: None,
        },
        400 => ErrorAnalysis {
            category: ErrorCategory::ValidationError,
            retryable: false,
            confidence: 0.9,
            description: "request rejected as malformed (HTTP 400)".to_string(),
            suggested_delay: None,
        },
        404 => {
            let retryable = matches!(not_found, NotFoundHandling::ExpectPresent);
            ErrorAnalysis {
                category: ErrorCategory::ExpectedNotFound,
                retryable,
                confidence: 0.85,
                description: if retryable {
                    "record not visible yet (HTTP 404)".to_string()
                } else {
                    "record absent (HTTP 404)".to_string()
                },
                suggested_delay: if retryable {
                    ErrorCategory::ExpectedNotFound.base_delay()
                } else {
                    None
                },
            }
        }
        _ => ErrorAnalysis {
            category: ErrorCategory::UnknownError,
            retryable: true,
            confidence: 0.3,
            description: format!("unexpected HTTP {}", status),
            suggested_delay: ErrorCategory::UnknownError.base_delay(),
        },
    }
}

/// Classify a curl transport error.
pub fn classify_transport(e: &curl::Error) -> ErrorAnalysis {
    let network = e.is_operation_timedout()
        || e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing();
    if network {
        ErrorAnalysis {
            category: ErrorCategory::NetworkError,
            retryable: true,
            confidence: 0.9,
            description: format!("network failure: {}", e),
            suggested_delay: ErrorCategory::NetworkError.base_delay(),
        }
    } else {
        ErrorAnalysis {
            category: ErrorCategory::UnknownError,
            retryable: true,
            confidence: 0.3,
            description: format!("transport failure: {}", e),
            suggested_delay: ErrorCategory::UnknownError.base_delay(),
        }
    }
}
