//! The match service: one entry point per player intent.
//!
//! Each operation follows the same path:
//!
//! ```text
//! (match_id, token, intent)
//!     → SessionManager::resolve_session     who is asking?
//!     → MatchRepository::with_match_lock    engine runs inside the retry
//!     → project_public                      redacted view
//!     → EventPublisher                      fire-and-forget
//! ```
//!
//! The service itself is stateless. Any number of instances can share a
//! store.

use std::sync::Arc;

use influence_protocol::{
    ActionKind, DeclareActionRequest, DeclaredAction, EventType, MatchId, PlayerId,
    PlayerPublicInfo, PrivateHand, PublicMatchState, ServerEvent,
};
use influence_session::{JoinCodeAllocator, SessionManager};
use influence_store::KvStore;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::model::new_id;
use crate::{
    engine, project_hand, project_player, project_public, EventPublisher, GameError, Match,
    MatchRepository, Player, ServiceConfig,
};

/// What a player gets back after creating or joining a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingResult {
    /// The public state right after the player took their seat.
    #[serde(rename = "match")]
    pub state: PublicMatchState,
    /// The seat that was created.
    pub player: PlayerPublicInfo,
    /// Bearer token for every later request on this match.
    pub token: String,
}

/// Orchestrates sessions, join codes, the repository and the publisher.
pub struct MatchService<S: KvStore, P: EventPublisher> {
    repo: MatchRepository<S>,
    sessions: SessionManager<S>,
    join_codes: JoinCodeAllocator<S>,
    publisher: Arc<P>,
    config: ServiceConfig,
}

impl<S: KvStore, P: EventPublisher> MatchService<S, P> {
    /// Creates a service over a shared store and publisher.
    ///
    /// The player-count range in `config.rules` is clamped to what the
    /// game supports (see [`MatchConfig::normalized`](crate::MatchConfig::normalized)).
    pub fn new(store: Arc<S>, publisher: Arc<P>, mut config: ServiceConfig) -> Self {
        config.rules = config.rules.normalized();
        Self {
            repo: MatchRepository::new(Arc::clone(&store)),
            sessions: SessionManager::new(Arc::clone(&store), config.session.clone()),
            join_codes: JoinCodeAllocator::new(store, config.join_code.clone()),
            publisher,
            config,
        }
    }

    /// The repository, for callers that need raw record access.
    pub fn repository(&self) -> &MatchRepository<S> {
        &self.repo
    }

    /// The publisher events are handed to.
    pub fn publisher(&self) -> &Arc<P> {
        &self.publisher
    }

    /// The configuration this service was built with.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // -----------------------------------------------------------------
    // Lobby
    // -----------------------------------------------------------------

    /// Opens a new match with the caller as admin and only player.
    ///
    /// Reserves a join code, stores the record and issues a session. If
    /// either write fails, whatever was already stored is removed again.
    pub async fn create_match(&self, nickname: &str) -> Result<OnboardingResult, GameError> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(GameError::NicknameRequired);
        }

        let match_id = MatchId::new(new_id());
        let join_code = self.join_codes.reserve(&match_id).await?;
        let admin = Player::new(nickname, self.config.rules.starting_coins);
        let m = Match::new(match_id.clone(), join_code.clone(), admin);

        if let Err(e) = self.repo.insert(&m).await {
            self.release_join_code(&match_id, &join_code).await;
            return Err(e);
        }

        let admin = &m.players[0];
        let token = match self.sessions.create_session(&match_id, &admin.id).await {
            Ok(token) => token,
            Err(e) => {
                if let Err(delete_err) = self.repo.delete(&match_id).await {
                    tracing::warn!(%match_id, error = %delete_err, "failed to remove orphaned match");
                }
                self.release_join_code(&match_id, &join_code).await;
                return Err(e.into());
            }
        };
        tracing::info!(%match_id, admin_id = %admin.id, %join_code, "match created");

        Ok(OnboardingResult {
            state: project_public(&m),
            player: project_player(admin),
            token,
        })
    }

    /// Seats a new player in the match behind `join_code`.
    ///
    /// Broadcasts `player_joined` with the new seat in the payload.
    pub async fn join_match(
        &self,
        join_code: &str,
        nickname: &str,
    ) -> Result<OnboardingResult, GameError> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(GameError::NicknameRequired);
        }

        let match_id = self.join_codes.resolve(join_code).await?;
        let rules = &self.config.rules;
        let (m, player) = self
            .repo
            .with_match_lock(&match_id, |m| engine::add_player(m, nickname, rules))
            .await
            .inspect_err(|e| tracing::debug!(%match_id, error = %e, "join rejected"))?;

        let token = self.sessions.create_session(&match_id, &player.id).await?;
        tracing::info!(%match_id, player_id = %player.id, nickname, "player joined");

        let state = project_public(&m);
        let event = ServerEvent::new(EventType::PlayerJoined, match_id.clone())
            .with_state(state.clone())
            .with_payload(json!({
                "newPlayer": { "id": player.id, "nickname": player.nickname }
            }));
        self.broadcast(&match_id, &event).await;

        Ok(OnboardingResult {
            state,
            player: project_player(&player),
            token,
        })
    }

    /// Starts the match. Only the admin may do this.
    ///
    /// After the commit the join code is released, `match_started` is
    /// broadcast, and each player is sent their own hand as `hand_dealt`.
    pub async fn start_match(
        &self,
        match_id: &MatchId,
        token: &str,
    ) -> Result<PublicMatchState, GameError> {
        let session = self.sessions.resolve_session(match_id, token).await?;
        let rules = &self.config.rules;
        let (m, ()) = self
            .repo
            .with_match_lock(match_id, |m| {
                engine::start_match(m, &session.player_id, rules, &mut rand::rng())
            })
            .await
            .inspect_err(|e| tracing::debug!(%match_id, error = %e, "start rejected"))?;

        tracing::info!(
            %match_id,
            players = m.players.len(),
            first = %m.players[m.turn_index].id,
            "match started"
        );

        self.release_join_code(match_id, &m.join_code).await;

        let state = project_public(&m);
        let event =
            ServerEvent::new(EventType::MatchStarted, match_id.clone()).with_state(state.clone());
        self.broadcast(match_id, &event).await;

        for player in &m.players {
            if let Some(hand) = project_hand(&m, &player.id) {
                self.send_hand(match_id, &player.id, &hand).await;
            }
        }

        Ok(state)
    }

    // -----------------------------------------------------------------
    // Play
    // -----------------------------------------------------------------

    /// Declares an action on the caller's turn.
    ///
    /// Broadcasts `action_declared` with the action record as payload,
    /// and `match_finished` if the action ended the game.
    pub async fn declare_action(
        &self,
        match_id: &MatchId,
        token: &str,
        request: &DeclareActionRequest,
    ) -> Result<DeclaredAction, GameError> {
        let session = self.sessions.resolve_session(match_id, token).await?;
        let kind: ActionKind = request
            .action_name
            .parse()
            .map_err(|_| GameError::InvalidAction(request.action_name.clone()))?;

        let rules = &self.config.rules;
        let target = request.target_player_id.as_ref();
        let (m, resolution) = self
            .repo
            .with_match_lock(match_id, |m| {
                engine::declare_action(m, &session.player_id, kind, target, rules)
            })
            .await
            .inspect_err(|e| {
                tracing::debug!(
                    %match_id,
                    player_id = %session.player_id,
                    action = %kind,
                    error = %e,
                    "action rejected"
                );
            })?;

        tracing::info!(
            %match_id,
            player_id = %session.player_id,
            action = %kind,
            turn_index = m.turn_index,
            "action declared"
        );
        if let Some(eliminated) = &resolution.eliminated {
            tracing::info!(%match_id, player_id = %eliminated, "player eliminated");
        }

        let state = project_public(&m);
        match serde_json::to_value(&resolution.action) {
            Ok(payload) => {
                let event = ServerEvent::new(EventType::ActionDeclared, match_id.clone())
                    .with_state(state.clone())
                    .with_payload(payload);
                self.broadcast(match_id, &event).await;
            }
            Err(e) => tracing::warn!(%match_id, error = %e, "failed to encode action event"),
        }

        if let Some(winner) = &resolution.winner {
            tracing::info!(%match_id, winner = %winner, "match finished");
            let event = ServerEvent::new(EventType::MatchFinished, match_id.clone())
                .with_state(state)
                .with_payload(json!({ "winnerId": winner }));
            self.broadcast(match_id, &event).await;
        }

        Ok(resolution.action)
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// The public view of a match, for any seated player.
    pub async fn public_state(
        &self,
        match_id: &MatchId,
        token: &str,
    ) -> Result<PublicMatchState, GameError> {
        self.sessions.resolve_session(match_id, token).await?;
        let m = self.repo.load(match_id).await?;
        Ok(project_public(&m))
    }

    /// The caller's own hand, roles included.
    pub async fn private_hand(
        &self,
        match_id: &MatchId,
        token: &str,
    ) -> Result<PrivateHand, GameError> {
        let session = self.sessions.resolve_session(match_id, token).await?;
        let m = self.repo.load(match_id).await?;
        project_hand(&m, &session.player_id)
            .ok_or_else(|| GameError::PlayerNotFound(session.player_id.clone()))
    }

    /// Best-effort: a code that outlives its match only resolves to a
    /// record that is gone or already started.
    async fn release_join_code(&self, match_id: &MatchId, join_code: &str) {
        if let Err(e) = self.join_codes.release(join_code).await {
            tracing::warn!(%match_id, error = %e, "failed to release join code");
        }
    }

    // -----------------------------------------------------------------
    // Publishing
    // -----------------------------------------------------------------

    /// Hands an event to the publisher. Failures are logged, never returned:
    /// the state change is already committed.
    async fn broadcast(&self, match_id: &MatchId, event: &ServerEvent) {
        if let Err(e) = self.publisher.broadcast(match_id, event).await {
            tracing::warn!(%match_id, event_type = ?event.event_type, error = %e, "broadcast failed");
        }
    }

    async fn send_hand(&self, match_id: &MatchId, player_id: &PlayerId, hand: &PrivateHand) {
        let payload = match serde_json::to_value(hand) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(%match_id, %player_id, error = %e, "failed to encode hand");
                return;
            }
        };
        let event = ServerEvent::new(EventType::HandDealt, match_id.clone()).with_payload(payload);
        if let Err(e) = self.publisher.send_to_player(match_id, player_id, &event).await {
            tracing::warn!(%match_id, %player_id, error = %e, "hand delivery failed");
        }
    }
}
