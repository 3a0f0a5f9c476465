//! The authoritative match record.
//!
//! A [`Match`] is the single owned aggregate: players, their influences
//! and the deck are only reachable through it and have no lifecycle of
//! their own. It is stored whole under `match:<id>` and every mutation
//! replaces it whole.

use chrono::{DateTime, Utc};
use influence_protocol::{MatchId, PlayerId, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a fresh random identifier (UUID v4, hyphenated).
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// Influence
// ---------------------------------------------------------------------------

/// One influence card. Once revealed it stays revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Influence {
    pub role: Role,
    pub revealed: bool,
}

impl Influence {
    /// A face-down card.
    pub fn hidden(role: Role) -> Self {
        Self {
            role,
            revealed: false,
        }
    }
}

/// Builds an unshuffled deck: `copies_per_role` of each of the five roles.
pub fn fresh_deck(copies_per_role: usize) -> Vec<Influence> {
    Role::ALL
        .iter()
        .flat_map(|&role| std::iter::repeat_n(Influence::hidden(role), copies_per_role))
        .collect()
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A seat in a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub nickname: String,
    pub coins: u32,
    pub alive: bool,
    pub influences: Vec<Influence>,
}

impl Player {
    /// A freshly seated player with no cards yet.
    pub fn new(nickname: impl Into<String>, coins: u32) -> Self {
        Self {
            id: PlayerId::new(new_id()),
            nickname: nickname.into(),
            coins,
            alive: true,
            influences: Vec::new(),
        }
    }

    /// Number of influences still face-down.
    pub fn hidden_influences(&self) -> usize {
        self.influences.iter().filter(|inf| !inf.revealed).count()
    }

    /// Reveals the first face-down influence and returns its role.
    ///
    /// A player left with nothing face-down is out: `alive` becomes
    /// `false`. Returns `None` if every influence was already revealed.
    pub fn lose_influence(&mut self) -> Option<Role> {
        let lost = self.influences.iter_mut().find(|inf| !inf.revealed)?;
        lost.revealed = true;
        let role = lost.role;
        if self.hidden_influences() == 0 {
            self.alive = false;
        }
        Some(role)
    }
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// The stored state of one game instance.
///
/// ## Invariants
///
/// - `players` keeps join order; `players[0]` is the admin.
/// - once started, `turn_index` always points at a living player.
/// - `started` and `finished` only ever go from `false` to `true`.
/// - cards in the deck plus cards in hands never changes after the deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "adminID")]
    pub admin_id: PlayerId,
    #[serde(rename = "joinCode")]
    pub join_code: String,
    pub players: Vec<Player>,
    #[serde(rename = "turnIndex")]
    pub turn_index: usize,
    pub started: bool,
    pub finished: bool,
    pub deck: Vec<Influence>,
}

impl Match {
    /// A new lobby with the admin as its only player.
    pub fn new(id: MatchId, join_code: impl Into<String>, admin: Player) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            admin_id: admin.id.clone(),
            join_code: join_code.into(),
            players: vec![admin],
            turn_index: 0,
            started: false,
            finished: false,
            deck: Vec::new(),
        }
    }

    /// Finds a player by id.
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == *id)
    }

    /// Position of a player in join order.
    pub fn player_index(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == *id)
    }

    /// The player whose turn it is.
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.turn_index)
    }

    /// Living players, in join order.
    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.alive)
    }

    /// Total influence cards in play: the deck plus every hand.
    pub fn card_count(&self) -> usize {
        self.deck.len()
            + self
                .players
                .iter()
                .map(|p| p.influences.len())
                .sum::<usize>()
    }
}
