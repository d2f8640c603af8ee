//! Request failure signal used for retry classification.

use std::fmt;
use std::time::Duration;

/// Error produced by one request attempt (transport failure, HTTP error
/// status, or a body that could not be encoded). Kept structured so the
/// classifier can decide retries before anything is converted to anyhow at
/// the application layer.
#[derive(Debug)]
pub enum ApiError {
    /// Curl reported an error (timeout, connection refused, DNS, ...).
    Transport(curl::Error),
    /// HTTP response with a non-2xx status.
    Http {
        status: u32,
        /// Leading bytes of the response body, for diagnostics.
        body: String,
        /// Parsed `Retry-After` header, when the server sent one.
        retry_after: Option<Duration>,
    },
    /// Request body could not be encoded. Never retried.
    Encode(serde_json::Error),
}

impl ApiError {
    /// Status code for HTTP errors, None otherwise.
    pub fn status(&self) -> Option<u32> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Transport(_) | ApiError::Encode(_) => None,
        }
    }
}

impl From<curl::Error> for ApiError {
    fn from(e: curl::Error) -> Self {
        ApiError::Transport(e)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(e) => write!(f, "{}", e),
            ApiError::Http { status, body, .. } => {
                if body.is_empty() {
                    write!(f, "HTTP {}", status)
                } else {
                    write!(f, "HTTP {}: {}", status, body)
                }
            }
            ApiError::Encode(e) => write!(f, "encode request body: {}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(e) => Some(e),
            ApiError::Encode(e) => Some(e),
            ApiError::Http { .. } => None,
        }
    }
}
