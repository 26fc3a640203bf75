//! Outcome reported by a party for its step of the saga.

use serde::{Deserialize, Serialize};

/// Result classification of a saga step.
///
/// `Started` and `InProgress` are markers the orchestrator uses while
/// initiating a saga; participants report `Success`, `Fail` or
/// `RollbackPending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Success,
    Fail,
    /// Instructs a party to undo its prior local work.
    RollbackPending,
    Started,
    InProgress,
}

impl Outcome {
    /// Every outcome, in declaration order.
    pub const ALL: [Outcome; 5] = [
        Outcome::Success,
        Outcome::Fail,
        Outcome::RollbackPending,
        Outcome::Started,
        Outcome::InProgress,
    ];

    /// Returns true for the outcomes that steer the saga toward failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Fail | Outcome::RollbackPending)
    }

    /// Returns the wire name of the outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "SUCCESS",
            Outcome::Fail => "FAIL",
            Outcome::RollbackPending => "ROLLBACK_PENDING",
            Outcome::Started => "STARTED",
            Outcome::InProgress => "IN_PROGRESS",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Outcome::ALL
            .into_iter()
            .find(|outcome| outcome.as_str() == s)
            .ok_or_else(|| format!("unknown outcome '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_outcomes() {
        assert!(!Outcome::Success.is_failure());
        assert!(Outcome::Fail.is_failure());
        assert!(Outcome::RollbackPending.is_failure());
        assert!(!Outcome::Started.is_failure());
        assert!(!Outcome::InProgress.is_failure());
    }

    #[test]
    fn test_display_matches_wire_name() {
        for outcome in Outcome::ALL {
            let json = serde_json::to_string(&outcome).unwrap();
            assert_eq!(json, format!("\"{}\"", outcome));
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "ROLLBACK_PENDING".parse::<Outcome>(),
            Ok(Outcome::RollbackPending)
        );
        assert!("UNKNOWN_OUTCOME".parse::<Outcome>().is_err());
    }

    #[test]
    fn test_unknown_outcome_does_not_deserialize() {
        let result: Result<Outcome, _> = serde_json::from_str("\"UNKNOWN_OUTCOME\"");
        assert!(result.is_err());
    }
}
