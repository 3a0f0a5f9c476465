//! Request bodies, the declared action record, and the event envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ActionKind, EventType, MatchId, PlayerId, PublicMatchState, Role};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of a "create a room" request. The creator becomes the admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMatchRequest {
    pub nickname: String,
}

/// Body of a "join by code" request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinMatchRequest {
    pub join_code: String,
    pub nickname: String,
}

/// Body of an action declaration.
///
/// `action_name` is kept as a raw string here: the closed set is
/// enforced when the engine parses it, so an unknown name surfaces as a
/// domain `invalid_action` error instead of a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclareActionRequest {
    pub action_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_player_id: Option<PlayerId>,
}

// ---------------------------------------------------------------------------
// DeclaredAction: the immutable action log entry
// ---------------------------------------------------------------------------

/// The record produced by every accepted declaration.
///
/// It merges the dynamic part (fresh id, actor, target, timestamp) with
/// the static [`ActionRules`](crate::ActionRules) of its kind, so clients
/// can render legal responses without a second lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredAction {
    pub id: String,
    pub action_name: ActionKind,
    pub actor_player_id: PlayerId,
    pub actor_nickname: String,
    pub requires_target: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_player_id: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_nickname: Option<String>,
    pub is_immediate: bool,
    pub blockable_roles: Vec<Role>,
    pub is_contestable: bool,
    pub declared_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// ServerEvent: the envelope handed to the publisher
// ---------------------------------------------------------------------------

/// A self-contained notification for connected clients.
///
/// ```text
/// ┌─────────────────────────────────────────┐
/// │ eventType: "action_declared"            │
/// │ matchID:   "0b6f…"                      │
/// │ timestamp: 2026-01-01T12:00:00Z         │
/// │ state:     { public view }   (optional) │
/// │ payload:   { free-form }     (optional) │
/// └─────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerEvent {
    #[serde(rename = "eventType")]
    pub event_type: EventType,
    #[serde(rename = "matchID")]
    pub match_id: MatchId,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<PublicMatchState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl ServerEvent {
    /// Creates an event stamped with the current UTC time.
    pub fn new(event_type: EventType, match_id: MatchId) -> Self {
        Self {
            event_type,
            match_id,
            timestamp: Utc::now(),
            state: None,
            payload: None,
        }
    }

    /// Attaches a public state snapshot.
    pub fn with_state(mut self, state: PublicMatchState) -> Self {
        self.state = Some(state);
        self
    }

    /// Attaches a free-form payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}
