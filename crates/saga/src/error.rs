//! Saga error types.

use domain::PayloadError;
use thiserror::Error;

use crate::outcome::Outcome;
use crate::party::Party;

/// Errors that can occur while routing a saga.
#[derive(Debug, Error)]
pub enum SagaError {
    /// The inbound envelope is unusable and was rejected before lookup.
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The topology has no rule for this party/outcome pair.
    #[error("Undefined transition for {party} reporting {outcome}")]
    UndefinedTransition { party: Party, outcome: Outcome },

    /// A channel name is not part of the registry.
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    /// The same party/outcome pair appears twice in the topology.
    #[error("Duplicate transition for {party} reporting {outcome}")]
    DuplicateTransition { party: Party, outcome: Outcome },

    /// The topology configuration is inconsistent.
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// A value could not be encoded for publication.
    #[error("Encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// A message body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// The payload violates one of its invariants.
    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),

    /// The external publisher refused the message.
    #[error("Publish error: {0}")]
    Publish(String),

    /// Reading configuration from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SagaError {
    /// Returns true if the error indicates a misconfigured deployment that an
    /// operator has to look at.
    pub fn is_operator_alert(&self) -> bool {
        matches!(
            self,
            SagaError::UndefinedTransition { .. }
                | SagaError::UnknownChannel(_)
                | SagaError::DuplicateTransition { .. }
                | SagaError::InvalidTopology(_)
        )
    }

    /// Returns true if the error stems from unusable input.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            SagaError::MalformedEnvelope(_) | SagaError::Decode(_) | SagaError::Payload(_)
        )
    }
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let undefined = SagaError::UndefinedTransition {
            party: Party::Orchestrator,
            outcome: Outcome::InProgress,
        };
        assert!(undefined.is_operator_alert());
        assert!(!undefined.is_malformed());

        let malformed = SagaError::MalformedEnvelope("missing transactionId".into());
        assert!(malformed.is_malformed());
        assert!(!malformed.is_operator_alert());

        let publish = SagaError::Publish("broker down".into());
        assert!(!publish.is_malformed());
        assert!(!publish.is_operator_alert());
    }

    #[test]
    fn test_display() {
        let err = SagaError::UndefinedTransition {
            party: Party::service("DOCUMENT_BOT_SERVICE"),
            outcome: Outcome::Started,
        };
        assert_eq!(
            err.to_string(),
            "Undefined transition for DOCUMENT_BOT_SERVICE reporting STARTED"
        );
    }
}
