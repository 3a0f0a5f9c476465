//! # Influence
//!
//! Authoritative backend for a turn-based, hidden-information card game.
//!
//! The server holds one versioned record per match in a key-value store,
//! decides whose turn it is and which moves are legal, applies moves
//! atomically under concurrent requests, and hands redacted state to an
//! [`EventPublisher`](influence_match::EventPublisher) for delivery.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use influence::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let server = GameServerBuilder::new()
//!     .build(Arc::new(MemoryStore::new()), Arc::new(ChannelPublisher::new()));
//!
//! let created = server
//!     .handle(Request::Create(CreateMatchRequest { nickname: "alice".into() }))
//!     .await
//!     .unwrap();
//! assert!(matches!(created, Response::Onboarded(_)));
//! # }
//! ```

mod error;
mod handler;
mod server;
mod telemetry;

pub use error::{ErrorBody, InfluenceError};
pub use handler::{Request, Response};
pub use server::{GameServer, GameServerBuilder};
pub use telemetry::init_tracing;

/// Everything needed to build a server and talk to it.
pub mod prelude {
    pub use crate::{
        init_tracing, ErrorBody, GameServer, GameServerBuilder, InfluenceError, Request, Response,
    };
    pub use influence_match::{
        ChannelPublisher, ErrorKind, EventPublisher, GameError, MatchConfig, OnboardingResult,
        PublishError,
    };
    pub use influence_protocol::{
        ActionKind, CreateMatchRequest, DeclareActionRequest, DeclaredAction, EventType,
        JoinMatchRequest, MatchId, PlayerId, PrivateHand, PublicMatchState, Role, ServerEvent,
    };
    pub use influence_session::{JoinCodeConfig, SessionConfig};
    pub use influence_store::{KvStore, MemoryStore};
    #[cfg(feature = "redis")]
    pub use influence_store::RedisStore;
}
