//! Error types.
//!
//! `AppError` is what the binary turns into an exit code. The typed enums below
//! are returned by the core (fetch, normalize, forecast) so callers can decide
//! how much of a failure to absorb.
//!
//! Exit codes:
//! - 2: configuration or file I/O
//! - 3: no usable data
//! - 4: fetch or compute failure

use thiserror::Error;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failure of a single HTTP request against the indicator API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// 5xx status that was still failing after the retry budget ran out.
    #[error("server error {status} after {attempts} attempts")]
    Transient { status: u16, attempts: u32 },

    /// Non-retryable status (4xx and anything else that is not 200).
    #[error("request rejected with status {status}")]
    Permanent { status: u16 },

    /// The request never produced a response (connect, TLS, timeout).
    #[error("transport error after {attempts} attempts: {message}")]
    Transport { message: String, attempts: u32 },

    /// A 200 response whose body is not the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// HTTP status carried by the failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Transient { status, .. } | FetchError::Permanent { status } => Some(*status),
            FetchError::Transport { .. } | FetchError::Malformed(_) => None,
        }
    }
}

/// Per-entry normalization failure. The entry is dropped; the batch continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("invalid year '{0}'")]
    InvalidYear(String),

    #[error("invalid value '{0}'")]
    InvalidValue(String),
}

/// Why a forecast is unavailable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error("need at least {required} annual observations, found {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("model fit failed: {0}")]
    ModelFit(String),
}

impl ForecastError {
    /// Message shown to end users. Identical for every cause.
    pub fn user_message(&self) -> &'static str {
        "Not enough data to produce a forecast for this selection."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_exposes_status() {
        assert_eq!(FetchError::Transient { status: 503, attempts: 4 }.status(), Some(503));
        assert_eq!(FetchError::Permanent { status: 404 }.status(), Some(404));
        assert_eq!(FetchError::Malformed("x".into()).status(), None);
    }

    #[test]
    fn forecast_errors_share_user_message() {
        let a = ForecastError::InsufficientHistory { required: 5, actual: 4 };
        let b = ForecastError::ModelFit("degenerate".into());
        assert_eq!(a.user_message(), b.user_message());
    }
}
