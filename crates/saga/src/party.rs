//! Identity of whoever reported an outcome.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire name of the orchestrator party.
pub const ORCHESTRATOR: &str = "ORCHESTRATOR";

/// The producer of an envelope: the orchestrator or a participant service.
///
/// Participants are deployment data, so any non-orchestrator name decodes to
/// [`Party::Service`]; whether that service belongs to the active topology is
/// checked by the engine, not by the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Party {
    Orchestrator,
    Service(String),
}

impl Party {
    /// Creates a participant party from its wire name.
    pub fn service(name: impl Into<String>) -> Self {
        Party::Service(name.into())
    }

    /// Parses a wire name.
    pub fn from_name(name: &str) -> Self {
        if name == ORCHESTRATOR {
            Party::Orchestrator
        } else {
            Party::Service(name.to_string())
        }
    }

    pub fn is_orchestrator(&self) -> bool {
        matches!(self, Party::Orchestrator)
    }

    /// Returns the wire name.
    pub fn as_str(&self) -> &str {
        match self {
            Party::Orchestrator => ORCHESTRATOR,
            Party::Service(name) => name,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Party {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Party {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Party::from_name(&name))
    }
}
