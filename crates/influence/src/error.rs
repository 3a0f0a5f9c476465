//! Unified error type for the Influence facade.

use influence_match::{ErrorKind, GameError};
use influence_protocol::ProtocolError;
use influence_store::StoreError;
use serde::{Deserialize, Serialize};

/// Top-level error that wraps all crate-specific errors.
///
/// Callers of the facade deal with this single type. The `#[from]`
/// attributes let `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum InfluenceError {
    /// A rule, session or lookup failure from the match layer.
    #[error(transparent)]
    Game(#[from] GameError),

    /// A request body that couldn't be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The store failed outside of a match operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl InfluenceError {
    /// The stable code the routing layer hands to clients.
    pub fn code(&self) -> &'static str {
        match self {
            InfluenceError::Game(e) => e.code(),
            InfluenceError::Protocol(_) => "malformed_request",
            InfluenceError::Store(_) => "store_unavailable",
        }
    }

    /// The failure family, for mapping to transport status codes.
    pub fn kind(&self) -> ErrorKind {
        match self {
            InfluenceError::Game(e) => e.kind(),
            InfluenceError::Protocol(_) => ErrorKind::Validation,
            InfluenceError::Store(_) => ErrorKind::Transient,
        }
    }
}

/// What a client sees when a request fails. Only the code, no detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
}

impl From<&InfluenceError> for ErrorBody {
    fn from(err: &InfluenceError) -> Self {
        Self {
            code: err.code().to_string(),
        }
    }
}
