//! `GameServer` builder and request entry point.
//!
//! Ties the layers together: store → sessions and join codes → match
//! repository and engine → publisher.

use std::sync::Arc;

use influence_match::{ErrorKind, EventPublisher, MatchConfig, MatchService, ServiceConfig};
use influence_protocol::JsonCodec;
use influence_session::{JoinCodeConfig, SessionConfig};
use influence_store::KvStore;

use crate::handler::{dispatch, Request, Response};
use crate::ErrorBody;

/// Builder for configuring a [`GameServer`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use influence::prelude::*;
///
/// let server = GameServerBuilder::new()
///     .match_config(MatchConfig {
///         max_players: 4,
///         ..MatchConfig::default()
///     })
///     .build(Arc::new(MemoryStore::new()), Arc::new(ChannelPublisher::new()));
/// assert_eq!(server.config().rules.max_players, 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GameServerBuilder {
    config: ServiceConfig,
}

impl GameServerBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.config.session = config;
        self
    }

    /// Sets the join-code configuration.
    pub fn join_code_config(mut self, config: JoinCodeConfig) -> Self {
        self.config.join_code = config;
        self
    }

    /// Sets the game rules.
    pub fn match_config(mut self, config: MatchConfig) -> Self {
        self.config.rules = config;
        self
    }

    /// Builds the server over a shared store and publisher.
    pub fn build<S, P>(self, store: Arc<S>, publisher: Arc<P>) -> GameServer<S, P>
    where
        S: KvStore,
        P: EventPublisher,
    {
        GameServer {
            service: Arc::new(MatchService::new(store, publisher, self.config)),
            codec: JsonCodec,
        }
    }
}

/// A configured game server.
///
/// Cheap to clone: clones share the same service.
pub struct GameServer<S: KvStore, P: EventPublisher> {
    service: Arc<MatchService<S, P>>,
    codec: JsonCodec,
}

impl<S: KvStore, P: EventPublisher> Clone for GameServer<S, P> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            codec: self.codec,
        }
    }
}

impl<S: KvStore, P: EventPublisher> GameServer<S, P> {
    /// The underlying service, for callers that want typed access.
    pub fn service(&self) -> &MatchService<S, P> {
        &self.service
    }

    /// The configuration the server was built with.
    pub fn config(&self) -> &ServiceConfig {
        self.service.config()
    }

    /// The publisher events are delivered through.
    pub fn publisher(&self) -> &Arc<P> {
        self.service.publisher()
    }

    /// Handles one request.
    ///
    /// Failures come back as an [`ErrorBody`] holding only the stable
    /// code; the full error goes to the log.
    pub async fn handle(&self, request: Request) -> Result<Response, ErrorBody> {
        let name = request.name();
        dispatch(&self.service, &self.codec, request)
            .await
            .map_err(|e| {
                if e.kind() == ErrorKind::Transient {
                    tracing::error!(request = name, error = %e, "request failed");
                } else {
                    tracing::debug!(request = name, error = %e, "request rejected");
                }
                ErrorBody::from(&e)
            })
    }
}
