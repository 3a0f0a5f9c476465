//! Error types for the session layer.

use influence_protocol::ProtocolError;
use influence_store::StoreError;

/// Errors that can occur while issuing or resolving sessions and join
/// codes.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The token is unknown, expired, or was issued for another match.
    ///
    /// All three cases collapse into one variant on purpose: a caller
    /// probing tokens learns nothing about which check failed.
    #[error("invalid session")]
    InvalidSession,

    /// No live match is registered under this join code.
    #[error("no match for join code {0}")]
    JoinCodeNotFound(String),

    /// The join-code entry exists but doesn't hold a valid match id.
    #[error("join code {0} maps to a corrupt match id")]
    CorruptJoinCode(String),

    /// The store failed underneath us.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A stored session record couldn't be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
