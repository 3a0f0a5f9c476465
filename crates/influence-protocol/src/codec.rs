//! Codec trait and the JSON implementation.
//!
//! A "codec" (coder/decoder) converts between Rust values and raw bytes.
//! Match records, sessions and request bodies all pass through a
//! [`Codec`], so the store never has to know what it is holding.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes values to bytes and decodes them back.
///
/// - `Send + Sync + 'static` → one codec instance is shared by every
///   request task for the lifetime of the server.
/// - `decode` uses `DeserializeOwned` so the result never borrows the
///   input buffer; callers drop the raw bytes right after decoding.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// ```rust
/// use influence_protocol::{Codec, JsonCodec, MatchId};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&MatchId::new("m-1")).unwrap();
/// assert_eq!(bytes, br#""m-1""#);
///
/// let back: MatchId = codec.decode(&bytes).unwrap();
/// assert_eq!(back, MatchId::new("m-1"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeclareActionRequest;

    #[test]
    fn test_decode_malformed_bytes_returns_decode_error() {
        let result: Result<DeclareActionRequest, _> = JsonCodec.decode(b"{not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_missing_field_returns_decode_error() {
        let result: Result<DeclareActionRequest, _> = JsonCodec.decode(br#"{}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
