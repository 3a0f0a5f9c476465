//! Event publishing: the seam between committed state and connected
//! clients.
//!
//! The match layer hands every event to an [`EventPublisher`] after the
//! mutation is committed and never looks back. Delivery failures are
//! the publisher's problem; they never roll back game state.

use std::collections::HashMap;
use std::future::Future;

use influence_protocol::{MatchId, PlayerId, ServerEvent};
use tokio::sync::{mpsc, Mutex};

/// Errors a publisher may report. The match layer only logs them.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Nobody is listening for this player in this match.
    #[error("player {player_id} is not subscribed to match {match_id}")]
    NotSubscribed {
        match_id: MatchId,
        player_id: PlayerId,
    },

    /// The underlying transport refused the event.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Delivers events to the clients of a match.
///
/// Implementations own subscriber lifecycle, transport and any retries.
pub trait EventPublisher: Send + Sync + 'static {
    /// Delivers `event` to every subscriber of `match_id`.
    fn broadcast(
        &self,
        match_id: &MatchId,
        event: &ServerEvent,
    ) -> impl Future<Output = Result<(), PublishError>> + Send;

    /// Delivers `event` to exactly one player's subscription.
    fn send_to_player(
        &self,
        match_id: &MatchId,
        player_id: &PlayerId,
        event: &ServerEvent,
    ) -> impl Future<Output = Result<(), PublishError>> + Send;
}

/// Channel sender for delivering events to one subscriber.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// An in-process [`EventPublisher`] backed by unbounded mpsc channels.
///
/// A transport layer calls [`subscribe`](Self::subscribe) when a client
/// connects and forwards whatever arrives on the receiver. Subscribers
/// whose receiver was dropped are pruned the next time an event is sent
/// their way.
#[derive(Debug, Default)]
pub struct ChannelPublisher {
    subscribers: Mutex<HashMap<MatchId, HashMap<PlayerId, EventSender>>>,
}

impl ChannelPublisher {
    /// Creates a publisher with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `player_id` as a listener on `match_id`.
    ///
    /// A second subscription for the same player replaces the first; the
    /// old receiver stops getting events.
    pub async fn subscribe(
        &self,
        match_id: &MatchId,
        player_id: &PlayerId,
    ) -> mpsc::UnboundedReceiver<ServerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut subscribers = self.subscribers.lock().await;
        subscribers
            .entry(match_id.clone())
            .or_default()
            .insert(player_id.clone(), tx);
        tracing::debug!(%match_id, %player_id, "subscriber registered");
        rx
    }

    /// Removes a listener. Returns `true` if it was registered.
    pub async fn unsubscribe(&self, match_id: &MatchId, player_id: &PlayerId) -> bool {
        let mut subscribers = self.subscribers.lock().await;
        let Some(players) = subscribers.get_mut(match_id) else {
            return false;
        };
        let removed = players.remove(player_id).is_some();
        if players.is_empty() {
            subscribers.remove(match_id);
        }
        removed
    }

    /// Number of live subscriptions on a match.
    pub async fn subscriber_count(&self, match_id: &MatchId) -> usize {
        self.subscribers
            .lock()
            .await
            .get(match_id)
            .map_or(0, HashMap::len)
    }
}

impl EventPublisher for ChannelPublisher {
    async fn broadcast(&self, match_id: &MatchId, event: &ServerEvent) -> Result<(), PublishError> {
        let mut subscribers = self.subscribers.lock().await;
        let Some(players) = subscribers.get_mut(match_id) else {
            return Ok(());
        };

        players.retain(|player_id, tx| {
            let delivered = tx.send(event.clone()).is_ok();
            if !delivered {
                tracing::debug!(%match_id, %player_id, "pruning closed subscriber");
            }
            delivered
        });
        if players.is_empty() {
            subscribers.remove(match_id);
        }
        Ok(())
    }

    async fn send_to_player(
        &self,
        match_id: &MatchId,
        player_id: &PlayerId,
        event: &ServerEvent,
    ) -> Result<(), PublishError> {
        let mut subscribers = self.subscribers.lock().await;
        let not_subscribed = || PublishError::NotSubscribed {
            match_id: match_id.clone(),
            player_id: player_id.clone(),
        };

        let players = subscribers.get_mut(match_id).ok_or_else(not_subscribed)?;
        let tx = players.get(player_id).ok_or_else(not_subscribed)?;
        if tx.send(event.clone()).is_ok() {
            return Ok(());
        }

        tracing::debug!(%match_id, %player_id, "pruning closed subscriber");
        players.remove(player_id);
        if players.is_empty() {
            subscribers.remove(match_id);
        }
        Err(not_subscribed())
    }
}
