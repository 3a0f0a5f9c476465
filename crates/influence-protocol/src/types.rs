//! Core protocol types: identities, roles, and action kinds.
//!
//! Everything in this module travels "on the wire" or sits inside a
//! persisted record, so every type derives `Serialize` and `Deserialize`
//! and has a stable JSON shape that clients depend on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a match (one game instance).
///
/// A "newtype wrapper" around the string id. You can't accidentally pass
/// a `PlayerId` where a `MatchId` is expected, even though both are
/// strings underneath.
///
/// `#[serde(transparent)]` serializes this as the bare string, so a
/// `MatchId("abc")` becomes `"abc"` in JSON rather than `{ "0": "abc" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub String);

impl MatchId {
    /// Wraps any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `tracing::info!(%match_id, "match created")` prints the raw id.
impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A unique identifier for a player within a match.
///
/// Player ids are generated server-side at create/join time. They are
/// only meaningful together with the match they were issued for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Wraps any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Role: the five influence cards
// ---------------------------------------------------------------------------

/// One of the five influence roles. A fresh deck holds three of each.
///
/// Serialized by name (`"Duke"`, `"Assassin"`, ...). The order of
/// [`Role::ALL`] is the order the unshuffled deck is built in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Duke,
    Assassin,
    Ambassador,
    Captain,
    Contessa,
}

impl Role {
    /// Every role, in deck-building order.
    pub const ALL: [Role; 5] = [
        Role::Duke,
        Role::Assassin,
        Role::Ambassador,
        Role::Captain,
        Role::Contessa,
    ];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Duke => "Duke",
            Role::Assassin => "Assassin",
            Role::Ambassador => "Ambassador",
            Role::Captain => "Captain",
            Role::Contessa => "Contessa",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// ActionKind: the closed set of declarable moves
// ---------------------------------------------------------------------------

/// Static metadata describing how an action kind behaves.
///
/// This never changes per declaration; it's looked up from
/// [`ActionKind::rules`]. Clients use it to render which responses
/// (block, challenge) are legal after an action is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionRules {
    /// Resolves at once, with no response window.
    pub immediate: bool,
    /// Roles that may claim to block this action. Empty = unblockable.
    pub blockable_by: &'static [Role],
    /// Whether the actor's implied role claim can be challenged.
    pub contestable: bool,
    /// Whether the action needs a target player.
    pub requires_target: bool,
    /// Whether a successful declaration passes the turn.
    pub advances_turn: bool,
}

/// The closed set of actions a player may declare on their turn.
///
/// `#[serde(rename_all = "snake_case")]` makes `ForeignAid` travel as
/// `"foreign_aid"`, matching the action names clients send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Take one coin from the treasury.
    Income,
    /// Declare intent to take two coins; opens a block window.
    ForeignAid,
    /// Pay seven coins to make a target lose an influence.
    Coup,
}

/// Foreign aid may only be blocked by a player claiming the Duke.
const FOREIGN_AID_BLOCKERS: &[Role] = &[Role::Duke];

impl ActionKind {
    /// Every declarable action kind.
    pub const ALL: [ActionKind; 3] =
        [ActionKind::Income, ActionKind::ForeignAid, ActionKind::Coup];

    /// The wire name of this action (`"income"`, `"foreign_aid"`, `"coup"`).
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Income => "income",
            ActionKind::ForeignAid => "foreign_aid",
            ActionKind::Coup => "coup",
        }
    }

    /// Looks up the static metadata for this action kind.
    pub fn rules(self) -> ActionRules {
        match self {
            ActionKind::Income => ActionRules {
                immediate: true,
                blockable_by: &[],
                contestable: false,
                requires_target: false,
                advances_turn: true,
            },
            ActionKind::ForeignAid => ActionRules {
                immediate: false,
                blockable_by: FOREIGN_AID_BLOCKERS,
                contestable: false,
                requires_target: false,
                advances_turn: false,
            },
            ActionKind::Coup => ActionRules {
                immediate: true,
                blockable_by: &[],
                contestable: false,
                requires_target: true,
                advances_turn: true,
            },
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses a client-supplied action name.
///
/// Anything outside the closed set is rejected with
/// [`ProtocolError::UnknownAction`] carrying the offending name.
impl FromStr for ActionKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ProtocolError::UnknownAction(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// EventType: what happened
// ---------------------------------------------------------------------------

/// Tag carried by every [`ServerEvent`](crate::ServerEvent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A new player took a seat. Payload: `{ "newPlayer": { id, nickname } }`.
    PlayerJoined,
    /// The admin started the match; the state snapshot shows the deal.
    MatchStarted,
    /// Private: the receiving player's own influences after the deal.
    HandDealt,
    /// A player declared an action. Payload: the declared action record.
    ActionDeclared,
    /// Only one player remains alive. Payload: `{ "winnerId": ... }`.
    MatchFinished,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&MatchId::new("m-1")).unwrap();
        assert_eq!(json, r#""m-1""#);
    }

    #[test]
    fn test_player_id_display_is_raw_id() {
        assert_eq!(PlayerId::new("p-7").to_string(), "p-7");
    }

    #[test]
    fn test_role_serializes_by_name() {
        let json = serde_json::to_string(&Role::Ambassador).unwrap();
        assert_eq!(json, r#""Ambassador""#);
    }

    #[test]
    fn test_action_kind_from_str_known_names() {
        assert_eq!("income".parse::<ActionKind>().unwrap(), ActionKind::Income);
        assert_eq!(
            "foreign_aid".parse::<ActionKind>().unwrap(),
            ActionKind::ForeignAid
        );
        assert_eq!("coup".parse::<ActionKind>().unwrap(), ActionKind::Coup);
    }

    #[test]
    fn test_action_kind_from_str_unknown_returns_error() {
        let result = "assassinate".parse::<ActionKind>();
        assert!(
            matches!(result, Err(ProtocolError::UnknownAction(ref name)) if name == "assassinate")
        );
    }

    #[test]
    fn test_action_kind_serde_name_matches_name() {
        for kind in ActionKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.name()));
        }
    }

    #[test]
    fn test_action_rules_table() {
        let income = ActionKind::Income.rules();
        assert!(income.immediate && income.advances_turn);
        assert!(income.blockable_by.is_empty());

        let aid = ActionKind::ForeignAid.rules();
        assert!(!aid.immediate && !aid.advances_turn);
        assert_eq!(aid.blockable_by, &[Role::Duke]);

        let coup = ActionKind::Coup.rules();
        assert!(coup.requires_target && coup.immediate);
        assert!(!coup.contestable);
    }

    #[test]
    fn test_event_type_serializes_snake_case() {
        let json = serde_json::to_string(&EventType::ActionDeclared).unwrap();
        assert_eq!(json, r#""action_declared""#);
    }
}
