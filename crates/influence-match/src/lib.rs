//! Match records, optimistic concurrency, and the turn engine.
//!
//! This is where the rules live. A match is one record in the store; every
//! change to it goes through [`MatchRepository::with_match_lock`], which
//! reloads and re-runs the change whenever another writer got there first.
//!
//! # Key types
//!
//! - [`Match`] / [`Player`] / [`Influence`]: the stored aggregate
//! - [`MatchRepository`]: load, insert, and read-transform-commit with retry
//! - [`engine`]: setup and action resolution as pure mutations
//! - [`project_public`]: the redacted view that is safe to broadcast
//! - [`EventPublisher`] / [`ChannelPublisher`]: hand-off to connected clients
//! - [`MatchService`]: one method per player intent, wiring it all together
//! - [`GameError`]: every failure, with a stable client-facing code
//!
//! # How it fits in the stack
//!
//! ```text
//! Facade (above)       ← request dispatch, server builder
//!     ↕
//! Match layer (this crate)
//!     ↕
//! Session layer        ← token → seat, code → match
//!     ↕
//! Store layer          ← versioned key-value records
//! ```

mod config;
pub mod engine;
mod error;
mod model;
mod projection;
mod publisher;
mod repository;
mod service;

pub use config::{MatchConfig, ServiceConfig, MAX_PLAYERS, MIN_PLAYERS};
pub use engine::ActionResolution;
pub use error::{ErrorKind, GameError};
pub use model::{fresh_deck, Influence, Match, Player};
pub use projection::{project_hand, project_player, project_public};
pub use publisher::{ChannelPublisher, EventPublisher, EventSender, PublishError};
pub use repository::MatchRepository;
pub use service::{MatchService, OnboardingResult};
