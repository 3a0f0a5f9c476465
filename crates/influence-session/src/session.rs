//! Session and join-code record types and their configuration.
//!
//! A "session" binds an opaque bearer token to exactly one seat: a
//! player in a match. It's written once when the player creates or joins
//! a match and is read-only afterwards.

use std::time::Duration;

use influence_protocol::{MatchId, PlayerId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The identity a session token resolves to.
///
/// Stored under `session:<token>` as `{"playerId": .., "matchId": ..}`.
/// It holds both ids by value: the session outlives nothing, and must
/// keep working (or fail cleanly) even if the match record is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub player_id: PlayerId,
    pub match_id: MatchId,
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long a token stays valid, counted from creation. There is no
    /// renewal: expiry is absolute.
    ///
    /// Default: 24 hours.
    pub ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

// ---------------------------------------------------------------------------
// JoinCodeConfig
// ---------------------------------------------------------------------------

/// Alphabet without the look-alikes `0/O` and `1/I`. 32 symbols, so a
/// 6-character code has 32^6 ≈ 1.07 × 10^9 possible values.
pub const DEFAULT_JOIN_CODE_ALPHABET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Configuration for room-discovery join codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinCodeConfig {
    /// How long a code keeps resolving after it was reserved.
    ///
    /// Default: 1 hour.
    pub ttl: Duration,

    /// Number of characters per code. Default: 6. Zero falls back to
    /// the default.
    pub length: usize,

    /// Symbols codes are drawn from. Only printable ASCII is used, and it
    /// is upper-cased so codes survive case-insensitive lookup.
    pub alphabet: String,
}

impl Default for JoinCodeConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            length: 6,
            alphabet: DEFAULT_JOIN_CODE_ALPHABET.to_string(),
        }
    }
}
