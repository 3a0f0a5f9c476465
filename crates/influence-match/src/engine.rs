//! The turn engine: match setup and action resolution.
//!
//! Every function here is a synchronous mutation of a `&mut Match` with
//! no I/O. The repository runs them inside its optimistic retry, so they
//! may be called several times on successive snapshots; only the last,
//! committed call is ever observed.
//!
//! Every check happens before the first write. A function that returns
//! `Err` has left the match untouched.
//!
//! ## Turn lifecycle
//!
//! ```text
//!   lobby ──start_match()──→ started ──declare_action()*──→ finished
//!     ↑                        │                              │
//!  add_player()          turn_index moves to the next   one player
//!                        living player after income      left alive
//!                        and coup
//! ```

use chrono::Utc;
use influence_protocol::{ActionKind, DeclaredAction, PlayerId, Role};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::{new_id, Player};
use crate::{fresh_deck, GameError, Match, MatchConfig};

/// What a successful declaration did, beyond the action record itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResolution {
    /// The immutable log entry for the declaration.
    pub action: DeclaredAction,
    /// The role a coup forced the target to reveal.
    pub revealed: Option<Role>,
    /// Set when the target lost their last influence.
    pub eliminated: Option<PlayerId>,
    /// Set when the action left one player alive and ended the match.
    pub winner: Option<PlayerId>,
}

// ---------------------------------------------------------------------------
// Lobby
// ---------------------------------------------------------------------------

/// Seats a new player in a match that hasn't started yet.
///
/// # Errors
/// - [`GameError::NicknameRequired`]: blank nickname
/// - [`GameError::AlreadyStarted`] / [`GameError::AlreadyFinished`]
/// - [`GameError::NicknameTaken`]: another seat already uses the name
/// - [`GameError::MatchFull`]: `max_players` are already seated
pub fn add_player(
    m: &mut Match,
    nickname: &str,
    config: &MatchConfig,
) -> Result<Player, GameError> {
    let nickname = nickname.trim();
    if nickname.is_empty() {
        return Err(GameError::NicknameRequired);
    }
    if m.finished {
        return Err(GameError::AlreadyFinished);
    }
    if m.started {
        return Err(GameError::AlreadyStarted);
    }
    if m.players.iter().any(|p| p.nickname == nickname) {
        return Err(GameError::NicknameTaken(nickname.to_string()));
    }
    if m.players.len() >= config.max_players {
        return Err(GameError::MatchFull {
            max: config.max_players,
        });
    }

    let player = Player::new(nickname, config.starting_coins);
    m.players.push(player.clone());
    Ok(player)
}

/// Moves a lobby to the started state and deals the cards.
///
/// Every player gets `starting_coins` and is alive again. A fresh deck
/// is shuffled, `influences_per_player` cards go to each player from the
/// top in join order, and a random player goes first.
///
/// # Errors
/// - [`GameError::AlreadyStarted`] / [`GameError::AlreadyFinished`]
/// - [`GameError::NotAdmin`]: only the first joiner may start
/// - [`GameError::NotEnoughPlayers`] / [`GameError::TooManyPlayers`]
/// - [`GameError::NotEnoughInfluences`]: the configured deck is too
///   small to deal every hand
pub fn start_match(
    m: &mut Match,
    requested_by: &PlayerId,
    config: &MatchConfig,
    rng: &mut impl Rng,
) -> Result<(), GameError> {
    if m.finished {
        return Err(GameError::AlreadyFinished);
    }
    if m.started {
        return Err(GameError::AlreadyStarted);
    }
    if *requested_by != m.admin_id {
        return Err(GameError::NotAdmin);
    }

    let count = m.players.len();
    if count < config.min_players {
        return Err(GameError::NotEnoughPlayers {
            count,
            min: config.min_players,
        });
    }
    if count > config.max_players {
        return Err(GameError::TooManyPlayers {
            count,
            max: config.max_players,
        });
    }

    let mut deck = fresh_deck(config.copies_per_role);
    let needed = count * config.influences_per_player;
    if deck.len() < needed {
        return Err(GameError::NotEnoughInfluences {
            deck: deck.len(),
            needed,
        });
    }
    deck.shuffle(rng);

    let mut cards = deck.into_iter();
    for player in &mut m.players {
        player.coins = config.starting_coins;
        player.alive = true;
        player.influences = cards.by_ref().take(config.influences_per_player).collect();
    }
    m.deck = cards.collect();
    m.turn_index = rng.random_range(0..count);
    m.started = true;
    Ok(())
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Validates and applies one action declared by `actor`.
///
/// Checks run in a fixed order: match state, actor identity, turn order,
/// target shape, then the action's own cost. The first failure wins and
/// nothing is written.
///
/// | action        | effect                         | turn advances |
/// |---------------|--------------------------------|---------------|
/// | `income`      | actor +1 coin                  | yes           |
/// | `foreign_aid` | none, declaration only         | no            |
/// | `coup`        | actor −`coup_cost`, target loses an influence | yes |
pub fn declare_action(
    m: &mut Match,
    actor: &PlayerId,
    kind: ActionKind,
    target: Option<&PlayerId>,
    config: &MatchConfig,
) -> Result<ActionResolution, GameError> {
    if !m.started {
        return Err(GameError::NotStarted);
    }
    if m.finished {
        return Err(GameError::AlreadyFinished);
    }

    let actor_index = m
        .player_index(actor)
        .ok_or_else(|| GameError::PlayerNotFound(actor.clone()))?;
    if actor_index != m.turn_index {
        let expected = m
            .current_player()
            .map(|p| p.id.clone())
            .ok_or_else(|| GameError::PlayerNotFound(actor.clone()))?;
        return Err(GameError::NotYourTurn {
            expected,
            actual: actor.clone(),
        });
    }

    let rules = kind.rules();
    let target_index = match (rules.requires_target, target) {
        (true, None) => return Err(GameError::MissingTarget),
        (false, Some(_)) => return Err(GameError::UnexpectedTarget),
        (false, None) => None,
        (true, Some(target)) => {
            if target == actor {
                return Err(GameError::InvalidTarget);
            }
            let index = m
                .player_index(target)
                .ok_or_else(|| GameError::PlayerNotFound(target.clone()))?;
            if !m.players[index].alive {
                return Err(GameError::TargetNotAlive(target.clone()));
            }
            Some(index)
        }
    };

    if kind == ActionKind::Coup {
        let available = m.players[actor_index].coins;
        if available < config.coup_cost {
            return Err(GameError::InsufficientCoins {
                required: config.coup_cost,
                available,
            });
        }
    }

    // Validation done; from here on every step succeeds.
    let action = DeclaredAction {
        id: new_id(),
        action_name: kind,
        actor_player_id: actor.clone(),
        actor_nickname: m.players[actor_index].nickname.clone(),
        requires_target: rules.requires_target,
        target_player_id: target_index.map(|i| m.players[i].id.clone()),
        target_nickname: target_index.map(|i| m.players[i].nickname.clone()),
        is_immediate: rules.immediate,
        blockable_roles: rules.blockable_by.to_vec(),
        is_contestable: rules.contestable,
        declared_at: Utc::now(),
    };

    let mut revealed = None;
    let mut eliminated = None;
    match kind {
        ActionKind::Income => m.players[actor_index].coins += 1,
        ActionKind::ForeignAid => {}
        ActionKind::Coup => {
            m.players[actor_index].coins -= config.coup_cost;
            if let Some(index) = target_index {
                let target = &mut m.players[index];
                revealed = target.lose_influence();
                if !target.alive {
                    eliminated = Some(target.id.clone());
                }
            }
        }
    }

    let mut winner = None;
    if m.alive_players().count() <= 1 {
        m.finished = true;
        winner = m.alive_players().next().map(|p| p.id.clone());
    } else if rules.advances_turn {
        advance_turn(m);
    }

    Ok(ActionResolution {
        action,
        revealed,
        eliminated,
        winner,
    })
}

/// Moves `turn_index` to the next living player, wrapping around.
///
/// Leaves the index alone if nobody else is alive.
fn advance_turn(m: &mut Match) {
    let count = m.players.len();
    for step in 1..=count {
        let next = (m.turn_index + step) % count;
        if m.players[next].alive {
            m.turn_index = next;
            return;
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
