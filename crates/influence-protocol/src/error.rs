//! Error types for the protocol layer.
//!
//! Each crate in the workspace defines its own error enum. A
//! `ProtocolError` always means the problem is in turning values into
//! bytes (or back), or in a name outside a closed set, never in the store
//! or the game rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust value).
    ///
    /// Common causes: malformed JSON, missing required fields, or a
    /// stored record written by an incompatible schema.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// An action name outside the closed set of declarable actions.
    #[error("unknown action: {0}")]
    UnknownAction(String),
}
