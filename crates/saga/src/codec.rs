//! JSON serialization at the broker boundary.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::envelope::Envelope;
use crate::error::{Result, SagaError};

/// Encodes and decodes envelopes and payloads as UTF-8 JSON text.
///
/// Constructed once and handed to whoever needs it; holds no mutable state.
/// Output is compact, single-line JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        Self
    }

    /// Encodes a value for publication. Failures propagate.
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<String> {
        serde_json::to_string(value).map_err(SagaError::Encode)
    }

    /// Encodes a value for logging; on failure logs the error and returns an
    /// empty string. Never use on the publish path.
    pub fn encode_lossy<T: Serialize>(&self, value: &T) -> String {
        self.encode(value).unwrap_or_else(|error| {
            tracing::error!(%error, "failed to encode value for logging");
            String::new()
        })
    }

    /// Decodes a value of the requested shape.
    pub fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
        serde_json::from_str(text).map_err(SagaError::Decode)
    }

    /// Decodes an inbound envelope; any decode failure is reported as a
    /// malformed envelope.
    pub fn decode_envelope(&self, text: &str) -> Result<Envelope> {
        self.decode(text)
            .map_err(|e| SagaError::MalformedEnvelope(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    /// Serializing a map with non-string keys fails in `serde_json`.
    fn unencodable() -> BTreeMap<(u8, u8), u8> {
        BTreeMap::from([((1, 2), 3)])
    }

    #[test]
    fn test_encode_failure_propagates() {
        let codec = JsonCodec::new();
        assert!(matches!(
            codec.encode(&unencodable()),
            Err(SagaError::Encode(_))
        ));
    }

    #[test]
    fn test_encode_lossy_returns_empty_on_failure() {
        let codec = JsonCodec::new();
        assert_eq!(codec.encode_lossy(&unencodable()), "");
        assert_eq!(codec.encode_lossy(&vec![1, 2]), "[1,2]");
    }

    #[test]
    fn test_output_is_single_line() {
        let codec = JsonCodec::new();
        let text = codec.encode(&serde_json::json!({"text": "a\nb"})).unwrap();
        assert!(!text.contains('\n'));
    }

    #[test]
    fn test_decode_failure_is_distinguishable() {
        let codec = JsonCodec::new();
        assert!(matches!(
            codec.decode::<Vec<u32>>("{not json"),
            Err(SagaError::Decode(_))
        ));
        assert_eq!(codec.decode::<Vec<u32>>("[1]").unwrap(), vec![1]);
    }

    #[test]
    fn test_decode_envelope_maps_to_malformed() {
        let codec = JsonCodec::new();
        let err = codec.decode_envelope(r#"{"party":"ORCHESTRATOR"}"#).unwrap_err();
        assert!(matches!(err, SagaError::MalformedEnvelope(_)));
        assert!(err.is_malformed());
    }
}
