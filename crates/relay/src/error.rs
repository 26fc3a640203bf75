//! Relay error types.

use saga::SagaError;
use thiserror::Error;

/// Errors raised by the relay host.
#[derive(Debug, Error)]
pub enum RelayError {
    /// An input line is not a `<channel>\t<body>` frame.
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// The saga core rejected the message.
    #[error(transparent)]
    Saga(#[from] SagaError),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Returns true if the error needs an operator's attention.
    pub fn is_operator_alert(&self) -> bool {
        matches!(self, RelayError::Saga(e) if e.is_operator_alert())
    }
}

/// Convenience type alias for relay results.
pub type Result<T> = std::result::Result<T, RelayError>;
