//! Error types for the match layer.
//!
//! Every failure a caller can see is a [`GameError`]. Each variant
//! belongs to one [`ErrorKind`] and carries a stable string
//! [`code`](GameError::code) that the routing layer hands to clients.
//! The `Display` text is for logs only and may change freely.

use std::fmt;

use influence_protocol::{MatchId, PlayerId, ProtocolError};
use influence_session::SessionError;
use influence_store::StoreError;
use serde::{Deserialize, Serialize};

/// The four failure families.
///
/// - **NotFound**: the match, player, session or join code doesn't exist
/// - **StateViolation**: the request is well-formed but the match is in
///   the wrong state for it (not your turn, not enough coins, ...)
/// - **Validation**: the request itself is malformed
/// - **Transient**: the store failed; nothing was written, retry is safe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    StateViolation,
    Validation,
    Transient,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::StateViolation => "state_violation",
            ErrorKind::Validation => "validation",
            ErrorKind::Transient => "transient",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while creating, joining, starting or playing a
/// match.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    // -- NotFound --
    #[error("match {0} not found")]
    MatchNotFound(MatchId),

    #[error("no match for join code {0}")]
    JoinCodeNotFound(String),

    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    /// Unknown, expired, or wrong-match session token.
    #[error("invalid session")]
    InvalidSession,

    // -- StateViolation --
    #[error("match already started")]
    AlreadyStarted,

    #[error("match not started")]
    NotStarted,

    #[error("match already finished")]
    AlreadyFinished,

    #[error("not {actual}'s turn, waiting on {expected}")]
    NotYourTurn { expected: PlayerId, actual: PlayerId },

    #[error("only the admin can start the match")]
    NotAdmin,

    #[error("need {required} coins, have {available}")]
    InsufficientCoins { required: u32, available: u32 },

    #[error("target {0} is not alive")]
    TargetNotAlive(PlayerId),

    #[error("nickname {0:?} already taken in this match")]
    NicknameTaken(String),

    #[error("match is full ({max} players)")]
    MatchFull { max: usize },

    #[error("need at least {min} players, have {count}")]
    NotEnoughPlayers { count: usize, min: usize },

    #[error("at most {max} players allowed, have {count}")]
    TooManyPlayers { count: usize, max: usize },

    #[error("deck of {deck} cannot deal {needed} influences")]
    NotEnoughInfluences { deck: usize, needed: usize },

    // -- Validation --
    #[error("invalid action {0:?}")]
    InvalidAction(String),

    #[error("action requires a target")]
    MissingTarget,

    #[error("action does not take a target")]
    UnexpectedTarget,

    #[error("a player cannot target themselves")]
    InvalidTarget,

    #[error("nickname is required")]
    NicknameRequired,

    // -- Transient --
    #[error("join code {0} maps to a corrupt match id")]
    CorruptJoinCode(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl GameError {
    /// Which failure family this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        use GameError::*;
        match self {
            MatchNotFound(_) | JoinCodeNotFound(_) | PlayerNotFound(_) | InvalidSession => {
                ErrorKind::NotFound
            }
            AlreadyStarted
            | NotStarted
            | AlreadyFinished
            | NotYourTurn { .. }
            | NotAdmin
            | InsufficientCoins { .. }
            | TargetNotAlive(_)
            | NicknameTaken(_)
            | MatchFull { .. }
            | NotEnoughPlayers { .. }
            | TooManyPlayers { .. }
            | NotEnoughInfluences { .. } => ErrorKind::StateViolation,
            InvalidAction(_) | MissingTarget | UnexpectedTarget | InvalidTarget
            | NicknameRequired => ErrorKind::Validation,
            CorruptJoinCode(_) | Store(_) | Protocol(_) => ErrorKind::Transient,
        }
    }

    /// The stable error code handed to clients.
    ///
    /// Codes never include ids or internal detail.
    pub fn code(&self) -> &'static str {
        use GameError::*;
        match self {
            MatchNotFound(_) | JoinCodeNotFound(_) => "match_not_found",
            PlayerNotFound(_) => "player_not_found",
            InvalidSession => "invalid_session",
            AlreadyStarted => "match_already_started",
            NotStarted => "match_not_started",
            AlreadyFinished => "match_already_finished",
            NotYourTurn { .. } => "not_your_turn",
            NotAdmin => "only_admin_can_start_match",
            InsufficientCoins { .. } => "insufficient_coins",
            TargetNotAlive(_) => "target_not_alive",
            NicknameTaken(_) => "nickname_taken",
            MatchFull { .. } => "match_full",
            NotEnoughPlayers { .. } => "not_enough_players",
            TooManyPlayers { .. } => "too_many_players",
            NotEnoughInfluences { .. } => "not_enough_influences",
            InvalidAction(_) => "invalid_action",
            MissingTarget => "missing_target",
            UnexpectedTarget => "unexpected_target",
            InvalidTarget => "invalid_target",
            NicknameRequired => "nickname_is_required",
            CorruptJoinCode(_) | Store(_) | Protocol(_) => "store_unavailable",
        }
    }
}

impl From<SessionError> for GameError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidSession => GameError::InvalidSession,
            SessionError::JoinCodeNotFound(code) => GameError::JoinCodeNotFound(code),
            SessionError::CorruptJoinCode(code) => GameError::CorruptJoinCode(code),
            SessionError::Store(e) => GameError::Store(e),
            SessionError::Protocol(e) => GameError::Protocol(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_session_error_invalid_session() {
        let err: GameError = SessionError::InvalidSession.into();
        assert!(matches!(err, GameError::InvalidSession));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_from_session_error_join_code_maps_to_match_not_found_code() {
        let err: GameError = SessionError::JoinCodeNotFound("ABCDEF".into()).into();
        assert_eq!(err.code(), "match_not_found");
    }

    #[test]
    fn test_store_error_is_transient() {
        let err: GameError = StoreError::Unavailable("down".into()).into();
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert_eq!(err.code(), "store_unavailable");
    }

    #[test]
    fn test_code_does_not_leak_ids() {
        let err = GameError::NotYourTurn {
            expected: PlayerId::new("secret-a"),
            actual: PlayerId::new("secret-b"),
        };
        assert_eq!(err.code(), "not_your_turn");
        assert_eq!(err.kind(), ErrorKind::StateViolation);
    }

    #[test]
    fn test_validation_kinds() {
        for err in [
            GameError::InvalidAction("x".into()),
            GameError::MissingTarget,
            GameError::UnexpectedTarget,
            GameError::InvalidTarget,
            GameError::NicknameRequired,
        ] {
            assert_eq!(err.kind(), ErrorKind::Validation, "{err}");
        }
    }
}
