//! Wire protocol for Influence.
//!
//! This crate defines the "language" the game server speaks:
//!
//! - **Types** ([`MatchId`], [`PlayerId`], [`Role`], [`ActionKind`]):
//!   identities and the closed sets the rules are built from.
//! - **Views** ([`PublicMatchState`], [`PrivateHand`]): what clients are
//!   allowed to see.
//! - **Messages** ([`DeclareActionRequest`], [`DeclaredAction`],
//!   [`ServerEvent`]): request bodies, the action log entry, and the
//!   event envelope handed to the realtime layer.
//! - **Codec** ([`Codec`], [`JsonCodec`]): how all of the above become
//!   bytes.
//!
//! The protocol layer knows nothing about stores, sessions or turn order.

mod codec;
mod error;
mod message;
mod types;
mod view;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use message::{
    CreateMatchRequest, DeclareActionRequest, DeclaredAction, JoinMatchRequest, ServerEvent,
};
pub use types::{ActionKind, ActionRules, EventType, MatchId, PlayerId, Role};
pub use view::{OwnInfluence, PlayerPublicInfo, PrivateHand, PublicInfluence, PublicMatchState};
