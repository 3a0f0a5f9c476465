//! Session tokens and join codes for Influence.
//!
//! Two small, TTL-owned record types live here:
//!
//! 1. **Sessions** ([`SessionManager`]): an opaque bearer token bound to
//!    one (match, player) seat.
//! 2. **Join codes** ([`JoinCodeAllocator`]): a short code that resolves
//!    to a match id for room discovery.
//!
//! Both reference matches and players by value only, and both tolerate
//! the referenced match disappearing.
//!
//! # How it fits in the stack
//!
//! ```text
//! Match layer (above)  ← resolves who is acting before touching a match
//!     ↕
//! Session layer (this crate)  ← token → seat, code → match
//!     ↕
//! Store layer (below)  ← TTL'd key-value records
//! ```

mod error;
mod join_code;
mod manager;
mod session;

pub use error::SessionError;
pub use join_code::JoinCodeAllocator;
pub use manager::SessionManager;
pub use session::{DEFAULT_JOIN_CODE_ALPHABET, JoinCodeConfig, Session, SessionConfig};
