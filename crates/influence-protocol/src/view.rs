//! Redacted, viewer-safe views of a match.
//!
//! The authoritative match record knows every card. These types are what
//! leaves the server: a [`PublicMatchState`] that is safe to broadcast to
//! everyone, and a [`PrivateHand`] that only its owner ever receives.

use serde::{Deserialize, Serialize};

use crate::{MatchId, PlayerId, Role};

/// An influence slot as seen by everybody.
///
/// An unrevealed influence exposes only `revealed: false`. The `role`
/// field is omitted from the JSON entirely (not `null`) so an unrevealed
/// role can't be recovered from the shape of the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicInfluence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub revealed: bool,
}

/// Public information about one seated player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPublicInfo {
    pub id: PlayerId,
    pub nickname: String,
    pub coins: u32,
    pub alive: bool,
    pub influences: Vec<PublicInfluence>,
}

/// The broadcast view of a match. One shared view for every viewer.
///
/// The deck is exposed only as `deckLength`, never its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicMatchState {
    #[serde(rename = "matchID")]
    pub match_id: MatchId,
    #[serde(rename = "joinCode")]
    pub join_code: String,
    pub started: bool,
    #[serde(rename = "adminID")]
    pub admin_id: PlayerId,
    pub finished: bool,
    #[serde(rename = "turnIndex")]
    pub turn_index: usize,
    pub players: Vec<PlayerPublicInfo>,
    #[serde(rename = "deckLength")]
    pub deck_length: usize,
}

/// One of the caller's own influences, role included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnInfluence {
    pub role: Role,
    pub revealed: bool,
}

/// A player's own hand. Sent only to that player, never broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateHand {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub influences: Vec<OwnInfluence>,
}
