//! In-process [`KvStore`] backend.
//!
//! Every write stamps the entry with a fresh version number drawn from a
//! store-wide counter. A watched commit remembers the version it read and
//! refuses to write if the version has moved, which is the same contract
//! as `WATCH`/`MULTI`/`EXEC` on a networked store.
//!
//! Expiry uses `tokio::time::Instant`, so tests can pause and advance the
//! clock instead of sleeping.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::{CommitOutcome, KvStore, StoreError};

#[derive(Debug)]
struct Entry {
    value: Vec<u8>,
    version: u64,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// A snapshot taken by [`MemoryStore::watch`].
///
/// Holds the bytes that were read and the version they were read at.
/// `version` is `None` when the key was absent.
#[derive(Debug, Clone)]
pub struct Watched {
    key: String,
    value: Option<Vec<u8>>,
    version: Option<u64>,
}

impl Watched {
    /// The bytes that were under the key when it was watched.
    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }
}

/// A [`KvStore`] kept in a `HashMap` behind an async mutex.
///
/// The lock is never held while a transform runs, so concurrent watched
/// commits really can race and lose, exactly as they would against a
/// remote store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    next_version: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn bump_version(&self) -> u64 {
        self.next_version.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Reads `key` and remembers the version it was read at.
    pub async fn watch(&self, key: &str) -> Watched {
        let mut entries = self.entries.lock().await;
        let (value, version) = match live_entry(&mut entries, key) {
            Some(entry) => (Some(entry.value.clone()), Some(entry.version)),
            None => (None, None),
        };
        Watched {
            key: key.to_string(),
            value,
            version,
        }
    }

    /// Writes `value` under the watched key if nobody wrote it since
    /// [`watch`](Self::watch). Returns `false` on conflict.
    ///
    /// The entry's expiry is carried over from the watched version.
    pub async fn commit_if_unchanged(&self, watched: &Watched, value: Vec<u8>) -> bool {
        let mut entries = self.entries.lock().await;
        let current = live_entry(&mut entries, &watched.key);
        let current_version = current.as_ref().map(|entry| entry.version);
        if current_version != watched.version {
            tracing::debug!(key = %watched.key, "watched key changed, commit rejected");
            return false;
        }
        let expires_at = current.and_then(|entry| entry.expires_at);
        let version = self.bump_version();
        entries.insert(
            watched.key.clone(),
            Entry {
                value,
                version,
                expires_at,
            },
        );
        true
    }
}

/// Looks up a live entry, evicting it first if it has expired.
fn live_entry<'a>(entries: &'a mut HashMap<String, Entry>, key: &str) -> Option<&'a Entry> {
    let now = Instant::now();
    if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
        entries.remove(key);
    }
    entries.get(key)
}

impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut entries = self.entries.lock().await;
        Ok(live_entry(&mut entries, key).map(|entry| entry.value.clone()))
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let version = self.bump_version();
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                value,
                version,
                expires_at,
            },
        );
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().await;
        if live_entry(&mut entries, key).is_some() {
            return Ok(false);
        }
        let version = self.bump_version();
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        entries.insert(
            key.to_string(),
            Entry {
                value,
                version,
                expires_at,
            },
        );
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().await;
        let existed = live_entry(&mut entries, key).is_some();
        entries.remove(key);
        Ok(existed)
    }

    async fn watched_commit<E, F>(
        &self,
        key: &str,
        transform: F,
    ) -> Result<CommitOutcome<E>, StoreError>
    where
        E: Send,
        F: FnOnce(Option<&[u8]>) -> Result<Vec<u8>, E> + Send,
    {
        let watched = self.watch(key).await;

        let next = match transform(watched.value()) {
            Ok(bytes) => bytes,
            Err(e) => return Ok(CommitOutcome::Aborted(e)),
        };

        if self.commit_if_unchanged(&watched, next).await {
            Ok(CommitOutcome::Committed)
        } else {
            Ok(CommitOutcome::Conflict)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_watch_absent_key_has_no_value() {
        let store = MemoryStore::new();
        let watched = store.watch("missing").await;
        assert!(watched.value().is_none());
    }

    #[tokio::test]
    async fn test_commit_if_unchanged_after_foreign_write_is_rejected() {
        let store = MemoryStore::new();
        store.set("k", b"one".to_vec(), None).await.unwrap();

        let watched = store.watch("k").await;
        // Another writer slips in between watch and commit.
        store.set("k", b"two".to_vec(), None).await.unwrap();

        assert!(!store.commit_if_unchanged(&watched, b"three".to_vec()).await);
        assert_eq!(store.get("k").await.unwrap(), Some(b"two".to_vec()));
    }

    #[tokio::test]
    async fn test_commit_if_unchanged_rejects_key_created_after_watch() {
        let store = MemoryStore::new();
        let watched = store.watch("k").await;
        store.set("k", b"new".to_vec(), None).await.unwrap();

        assert!(!store.commit_if_unchanged(&watched, b"mine".to_vec()).await);
    }

    #[tokio::test]
    async fn test_rewriting_same_bytes_still_changes_version() {
        // Version, not content, decides conflicts: an ABA write of
        // identical bytes must still invalidate the watch.
        let store = MemoryStore::new();
        store.set("k", b"same".to_vec(), None).await.unwrap();
        let watched = store.watch("k").await;
        store.set("k", b"same".to_vec(), None).await.unwrap();

        assert!(!store.commit_if_unchanged(&watched, b"next".to_vec()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watched_commit_keeps_existing_expiry() {
        let store = MemoryStore::new();
        store
            .set("k", b"v1".to_vec(), Some(Duration::from_secs(10)))
            .await
            .unwrap();

        let outcome = store
            .watched_commit::<(), _>("k", |_| Ok(b"v2".to_vec()))
            .await
            .unwrap();
        assert!(matches!(outcome, CommitOutcome::Committed));

        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(store.get("k").await.unwrap().is_none());
    }
}
