//! Key-value store abstraction for Influence.
//!
//! Provides the [`KvStore`] capability every stateful component is built
//! on: plain get/set with TTL, set-if-absent, and a watched
//! compare-and-swap commit. Game state never lives in process memory
//! between requests; the store is the single source of truth.
//!
//! # How it fits in the stack
//!
//! ```text
//! Match layer (above)    ← OCC repository, sessions, join codes
//!     ↕
//! Store layer (this crate)  ← bytes in, bytes out, versioned commits
//! ```
//!
//! [`MemoryStore`] is the in-process backend used by tests and the demo.
//! With the `redis` feature, `RedisStore` keeps the same records on a
//! Redis server so several service instances can share them.

mod error;
mod memory;
#[cfg(feature = "redis")]
mod redis_store;

pub use error::StoreError;
pub use memory::{MemoryStore, Watched};
#[cfg(feature = "redis")]
pub use redis_store::RedisStore;

use std::future::Future;
use std::time::Duration;

/// Result of one [`KvStore::watched_commit`] attempt.
#[derive(Debug)]
pub enum CommitOutcome<E> {
    /// The transform's bytes were written. The key had not changed since
    /// it was read.
    Committed,

    /// Someone else wrote the key between the read and the write.
    /// Nothing was written; the caller should reload and try again.
    Conflict,

    /// The transform refused to produce new bytes. Nothing was written.
    Aborted(E),
}

/// The store capability: four operations, all network calls.
///
/// # Trait shape
///
/// Methods return `impl Future<Output = ..> + Send` rather than being
/// declared `async fn`. Implementors still write `async fn`, but callers
/// get a guarantee that the futures can be moved to other Tokio worker
/// threads (`tokio::spawn` requires it).
///
/// # Keys and TTLs
///
/// Keys are plain strings (`match:<id>`, `session:<token>`,
/// `joincode:<code>`). A `ttl` of `None` means the entry never expires.
/// Expired entries behave exactly like absent ones.
pub trait KvStore: Send + Sync + 'static {
    /// Reads the bytes under `key`, or `None` if absent or expired.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, StoreError>> + Send;

    /// Unconditionally writes `value` under `key`.
    fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Writes `value` only if `key` is absent (or expired).
    ///
    /// Returns `true` if this call created the entry.
    fn set_if_absent(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Removes `key`. Returns `true` if a live entry was removed.
    fn delete(&self, key: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Reads `key`, runs `transform` on the current bytes, and writes the
    /// result only if `key` is unchanged since the read.
    ///
    /// `transform` sees `None` when the key is absent. Returning `Err`
    /// aborts the attempt without writing. A committed write keeps the
    /// entry's existing expiry.
    ///
    /// This is a single attempt. Retrying on
    /// [`CommitOutcome::Conflict`] is the caller's job.
    fn watched_commit<E, F>(
        &self,
        key: &str,
        transform: F,
    ) -> impl Future<Output = Result<CommitOutcome<E>, StoreError>> + Send
    where
        E: Send,
        F: FnOnce(Option<&[u8]>) -> Result<Vec<u8>, E> + Send;
}
