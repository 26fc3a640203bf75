//! Saga lifecycle status, as derived from an envelope history.

use serde::{Deserialize, Serialize};

/// Where a saga stands in its lifecycle.
///
/// State transitions:
/// ```text
/// NotStarted ──► Running ──┬──► Succeeded
///                          ├──► Compensating ──► Failed
///                          └──► Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SagaStatus {
    /// No step has been routed yet.
    #[default]
    NotStarted,

    /// Participants are doing their work.
    Running,

    /// A participant was asked to undo its work.
    Compensating,

    /// The saga reached final success (terminal state).
    Succeeded,

    /// The saga reached final failure or was dead-lettered (terminal state).
    Failed,
}

impl SagaStatus {
    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SagaStatus::Succeeded | SagaStatus::Failed)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaStatus::NotStarted => "NotStarted",
            SagaStatus::Running => "Running",
            SagaStatus::Compensating => "Compensating",
            SagaStatus::Succeeded => "Succeeded",
            SagaStatus::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for SagaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
