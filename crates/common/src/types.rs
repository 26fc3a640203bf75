use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one saga instance, carried unchanged across every hop.
///
/// Kept as an opaque string because initiators mint their own formats
/// (e.g. `"<uuid>_<epoch millis>"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Creates a transaction ID from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mints a fresh random transaction ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the ID is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TransactionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TransactionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for TransactionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Unique identifier of a single envelope (one saga hop).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Namespace for IDs derived from envelopes that arrived without one.
    pub const SAGA_NAMESPACE: EventId =
        EventId(Uuid::from_u128(0x5a6a_0c1e_7f3b_4d2e_9c41_8e0b_2d7f_a913));

    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an event ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Derives a stable event ID from a name within the given namespace.
    ///
    /// Used where the same input must always yield the same ID.
    pub fn derived(namespace: EventId, name: &str) -> Self {
        Self(Uuid::new_v5(&namespace.0, name.as_bytes()))
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EventId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<EventId> for Uuid {
    fn from(id: EventId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_id_generate_creates_unique_ids() {
        let id1 = TransactionId::generate();
        let id2 = TransactionId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn transaction_id_serializes_as_plain_string() {
        let id = TransactionId::new("abc_1700000000000");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc_1700000000000\"");
        let deserialized: TransactionId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn transaction_id_blank_detection() {
        assert!(TransactionId::new("").is_blank());
        assert!(TransactionId::new("   ").is_blank());
        assert!(!TransactionId::new("tx-1").is_blank());
    }

    #[test]
    fn event_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = EventId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn event_id_derived_is_stable() {
        let ns = EventId::new();
        assert_eq!(EventId::derived(ns, "tx-1:3"), EventId::derived(ns, "tx-1:3"));
        assert_ne!(EventId::derived(ns, "tx-1:3"), EventId::derived(ns, "tx-1:4"));
    }

    #[test]
    fn event_id_serialization_roundtrip() {
        let id = EventId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: EventId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
