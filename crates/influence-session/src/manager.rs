//! The session manager: issues and resolves bearer tokens.
//!
//! Unlike an in-memory registry, the manager keeps no state of its own.
//! Every session lives in the store under `session:<token>` with a TTL,
//! so any number of server instances can resolve tokens issued by any
//! other.
//!
//! ## Lifecycle
//!
//! ```text
//! create_session() ──→ [stored, TTL running] ──→ resolve_session() ...
//!                              │
//!                              ▼ (TTL elapsed)
//!                          [gone] ──→ resolve_session() = InvalidSession
//! ```

use std::sync::Arc;

use influence_protocol::{Codec, JsonCodec, MatchId, PlayerId};
use influence_store::KvStore;
use rand::Rng;

use crate::{Session, SessionConfig, SessionError};

/// Issues and resolves session tokens against a [`KvStore`].
pub struct SessionManager<S: KvStore> {
    store: Arc<S>,
    config: SessionConfig,
    codec: JsonCodec,
}

impl<S: KvStore> SessionManager<S> {
    /// Creates a manager over a shared store.
    pub fn new(store: Arc<S>, config: SessionConfig) -> Self {
        Self {
            store,
            config,
            codec: JsonCodec,
        }
    }

    /// Issues a fresh token bound to `(match_id, player_id)`.
    ///
    /// The token is stored with the configured TTL and never renewed.
    ///
    /// # Errors
    /// Returns [`SessionError::Store`] if the write fails. No token is
    /// handed out in that case.
    pub async fn create_session(
        &self,
        match_id: &MatchId,
        player_id: &PlayerId,
    ) -> Result<String, SessionError> {
        let token = generate_token();
        let session = Session {
            player_id: player_id.clone(),
            match_id: match_id.clone(),
        };
        let data = self.codec.encode(&session)?;

        self.store
            .set(&session_key(&token), data, Some(self.config.ttl))
            .await
            .inspect_err(|e| {
                tracing::error!(%match_id, %player_id, error = %e, "failed to store session");
            })?;

        tracing::info!(%match_id, %player_id, "session created");
        Ok(token)
    }

    /// Resolves a token for a request against `match_id`.
    ///
    /// # Errors
    /// - [`SessionError::InvalidSession`]: empty, unknown, or expired
    ///   token, or a token issued for a different match
    /// - [`SessionError::Store`] / [`SessionError::Protocol`]: the
    ///   store failed, or the stored record is unreadable
    pub async fn resolve_session(
        &self,
        match_id: &MatchId,
        token: &str,
    ) -> Result<Session, SessionError> {
        if token.is_empty() {
            return Err(SessionError::InvalidSession);
        }

        let data = self
            .store
            .get(&session_key(token))
            .await?
            .ok_or(SessionError::InvalidSession)?;

        let session: Session = self.codec.decode(&data).inspect_err(|e| {
            tracing::error!(%match_id, error = %e, "failed to decode session");
        })?;

        if session.match_id != *match_id {
            tracing::debug!(
                %match_id,
                bound_to = %session.match_id,
                "session presented for the wrong match"
            );
            return Err(SessionError::InvalidSession);
        }

        Ok(session)
    }
}

fn session_key(token: &str) -> String {
    format!("session:{token}")
}

/// Generates a random 32-character hex string (128 bits of entropy).
///
/// Guessing a live token is computationally infeasible at this size.
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionManager`.
    //!
    //! Naming convention: `test_{function}_{scenario}_{expected}`.
    //!
    //! TTL behaviour is tested with Tokio's paused clock
    //! (`start_paused = true` + `tokio::time::advance`), so nothing
    //! actually sleeps.

    use std::time::Duration;

    use influence_store::MemoryStore;

    use super::*;

    fn manager() -> SessionManager<MemoryStore> {
        SessionManager::new(Arc::new(MemoryStore::new()), SessionConfig::default())
    }

    fn mid(id: &str) -> MatchId {
        MatchId::new(id)
    }

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id)
    }

    // =====================================================================
    // create_session()
    // =====================================================================

    #[tokio::test]
    async fn test_create_session_returns_32_hex_chars() {
        let mgr = manager();

        let token = mgr.create_session(&mid("m"), &pid("p")).await.unwrap();

        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_create_session_tokens_are_unique() {
        let mgr = manager();

        let t1 = mgr.create_session(&mid("m"), &pid("a")).await.unwrap();
        let t2 = mgr.create_session(&mid("m"), &pid("a")).await.unwrap();

        assert_ne!(t1, t2, "every call must mint a new token");
    }

    // =====================================================================
    // resolve_session()
    // =====================================================================

    #[tokio::test]
    async fn test_resolve_session_valid_token_returns_identity() {
        let mgr = manager();
        let token = mgr.create_session(&mid("m"), &pid("alice")).await.unwrap();

        let session = mgr.resolve_session(&mid("m"), &token).await.unwrap();

        assert_eq!(session.player_id, pid("alice"));
        assert_eq!(session.match_id, mid("m"));
    }

    #[tokio::test]
    async fn test_resolve_session_unknown_token_is_invalid() {
        let mgr = manager();

        let result = mgr.resolve_session(&mid("m"), "not-a-real-token").await;

        assert!(matches!(result, Err(SessionError::InvalidSession)));
    }

    #[tokio::test]
    async fn test_resolve_session_empty_token_is_invalid() {
        let mgr = manager();

        let result = mgr.resolve_session(&mid("m"), "").await;

        assert!(matches!(result, Err(SessionError::InvalidSession)));
    }

    #[tokio::test]
    async fn test_resolve_session_other_match_is_invalid() {
        // A token is only good for the match it was issued in.
        let mgr = manager();
        let token = mgr.create_session(&mid("m1"), &pid("alice")).await.unwrap();

        let result = mgr.resolve_session(&mid("m2"), &token).await;

        assert!(matches!(result, Err(SessionError::InvalidSession)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_session_after_ttl_is_invalid() {
        let mgr = SessionManager::new(
            Arc::new(MemoryStore::new()),
            SessionConfig {
                ttl: Duration::from_secs(60),
            },
        );
        let token = mgr.create_session(&mid("m"), &pid("alice")).await.unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(mgr.resolve_session(&mid("m"), &token).await.is_ok());

        // Resolving does not renew: expiry is absolute from creation.
        tokio::time::advance(Duration::from_secs(31)).await;
        let result = mgr.resolve_session(&mid("m"), &token).await;
        assert!(matches!(result, Err(SessionError::InvalidSession)));
    }

    #[tokio::test]
    async fn test_resolve_session_corrupt_record_is_protocol_error() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("session:deadbeef", b"{broken".to_vec(), None)
            .await
            .unwrap();
        let mgr = SessionManager::new(store, SessionConfig::default());

        let result = mgr.resolve_session(&mid("m"), "deadbeef").await;

        assert!(matches!(result, Err(SessionError::Protocol(_))));
    }
}
