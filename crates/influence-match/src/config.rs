//! Match configuration.

use influence_session::{JoinCodeConfig, SessionConfig};
use serde::{Deserialize, Serialize};

/// Fewest seats a started match may have.
pub const MIN_PLAYERS: usize = 2;

/// Most seats a started match may have.
pub const MAX_PLAYERS: usize = 6;

/// Rules knobs for a match.
///
/// The defaults are the standard game: 2-6 players, two coins and two
/// influences each, three copies of every role, and a coup costs seven.
/// Tests shrink or stretch these to reach edge cases quickly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Minimum players required to start.
    pub min_players: usize,

    /// Maximum players allowed to sit down.
    pub max_players: usize,

    /// Coins every player holds when the match starts.
    pub starting_coins: u32,

    /// Influence cards dealt to each player at start.
    pub influences_per_player: usize,

    /// Copies of each of the five roles in a fresh deck.
    pub copies_per_role: usize,

    /// Coins spent to launch a coup.
    pub coup_cost: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 6,
            starting_coins: 2,
            influences_per_player: 2,
            copies_per_role: 3,
            coup_cost: 7,
        }
    }
}

impl MatchConfig {
    /// Clamps the player-count range into
    /// [`MIN_PLAYERS`]..=[`MAX_PLAYERS`], keeping `min_players` at or
    /// below `max_players`. Other knobs are left alone.
    pub fn normalized(mut self) -> Self {
        let max_players = self.max_players.clamp(MIN_PLAYERS, MAX_PLAYERS);
        let min_players = self.min_players.clamp(MIN_PLAYERS, max_players);
        if (min_players, max_players) != (self.min_players, self.max_players) {
            tracing::warn!(
                requested_min = self.min_players,
                requested_max = self.max_players,
                min_players,
                max_players,
                "player range clamped"
            );
        }
        self.min_players = min_players;
        self.max_players = max_players;
        self
    }
}

/// Everything a [`MatchService`](crate::MatchService) needs to know.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Session token lifetime.
    pub session: SessionConfig,

    /// Join-code lifetime, length and alphabet.
    pub join_code: JoinCodeConfig,

    /// Game rules.
    pub rules: MatchConfig,
}
