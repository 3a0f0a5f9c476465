//! Optimistic-concurrency access to match records.
//!
//! The repository never holds a lock. Each mutation is a loop of:
//!
//! ```text
//!   ┌──→ watch `match:<id>` and decode the snapshot
//!   │        │
//!   │        ▼
//!   │    transform(&mut Match) ──Err──→ abort, nothing written
//!   │        │ Ok
//!   │        ▼
//!   │    commit if the bytes haven't moved
//!   │        │
//!   └─ Conflict           Committed ──→ return (Match, T)
//! ```
//!
//! Different matches live under different keys and never contend.

use std::sync::Arc;

use influence_protocol::{Codec, JsonCodec, MatchId};
use influence_store::{CommitOutcome, KvStore};

use crate::{GameError, Match};

/// Loads, stores and atomically mutates [`Match`] records.
pub struct MatchRepository<S: KvStore> {
    store: Arc<S>,
    codec: JsonCodec,
}

impl<S: KvStore> MatchRepository<S> {
    /// Creates a repository over a shared store.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            codec: JsonCodec,
        }
    }

    /// Writes a brand-new match record. Match records have no TTL.
    pub async fn insert(&self, m: &Match) -> Result<(), GameError> {
        let data = self.codec.encode(m)?;
        self.store
            .set(&match_key(&m.id), data, None)
            .await
            .inspect_err(|e| {
                tracing::error!(match_id = %m.id, error = %e, "failed to store new match");
            })?;
        Ok(())
    }

    /// Reads the current record.
    ///
    /// # Errors
    /// [`GameError::MatchNotFound`] if there is no record for `match_id`.
    pub async fn load(&self, match_id: &MatchId) -> Result<Match, GameError> {
        let data = self
            .store
            .get(&match_key(match_id))
            .await?
            .ok_or_else(|| GameError::MatchNotFound(match_id.clone()))?;
        Ok(self.codec.decode(&data)?)
    }

    /// Applies `transform` to the latest record and commits the result.
    ///
    /// On a commit conflict the whole read-transform-commit cycle runs
    /// again on a fresh snapshot, with no upper bound. `transform` may
    /// therefore run several times and must not have effects outside the
    /// match it is given. Only the value from the committed run is
    /// returned.
    ///
    /// # Errors
    /// - whatever `transform` returns; nothing is written
    /// - [`GameError::MatchNotFound`] if the record is absent
    /// - [`GameError::Store`] / [`GameError::Protocol`] if the store
    ///   fails or the record can't be decoded; the record is unchanged
    pub async fn with_match_lock<T, F>(
        &self,
        match_id: &MatchId,
        mut transform: F,
    ) -> Result<(Match, T), GameError>
    where
        T: Send,
        F: FnMut(&mut Match) -> Result<T, GameError> + Send,
    {
        let key = match_key(match_id);
        let codec = self.codec;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let mut committed = None;

            let outcome = self
                .store
                .watched_commit(&key, |current| -> Result<Vec<u8>, GameError> {
                    let data = current.ok_or_else(|| GameError::MatchNotFound(match_id.clone()))?;
                    let mut m: Match = codec.decode(data)?;
                    let value = transform(&mut m)?;
                    let next = codec.encode(&m)?;
                    committed = Some((m, value));
                    Ok(next)
                })
                .await
                .inspect_err(|e| {
                    tracing::error!(%match_id, attempt, error = %e, "store failed during commit");
                })?;

            match outcome {
                CommitOutcome::Committed => {
                    if attempt > 1 {
                        tracing::debug!(%match_id, attempt, "commit succeeded after retry");
                    }
                    let committed = committed.expect("transform ran before commit");
                    return Ok(committed);
                }
                CommitOutcome::Conflict => {
                    tracing::debug!(%match_id, attempt, "match changed under us, retrying");
                }
                CommitOutcome::Aborted(err) => return Err(err),
            }
        }
    }

    /// Removes a match record. Returns `true` if one existed.
    pub async fn delete(&self, match_id: &MatchId) -> Result<bool, GameError> {
        Ok(self.store.delete(&match_key(match_id)).await?)
    }
}

fn match_key(match_id: &MatchId) -> String {
    format!("match:{match_id}")
}
