//! Join codes: short, human-enterable aliases for a match id.
//!
//! A code is reserved when a match is created and stays resolvable for
//! any number of joiners until its TTL runs out or the match starts.
//! Joining never consumes it.

use std::sync::Arc;

use influence_protocol::MatchId;
use influence_store::KvStore;
use rand::Rng;

use crate::session::DEFAULT_JOIN_CODE_ALPHABET;
use crate::{JoinCodeConfig, SessionError};

/// Reserves, resolves and releases join codes.
pub struct JoinCodeAllocator<S: KvStore> {
    store: Arc<S>,
    config: JoinCodeConfig,
}

impl<S: KvStore> JoinCodeAllocator<S> {
    /// Creates an allocator over a shared store.
    ///
    /// The config is brought into the shape [`resolve`](Self::resolve)
    /// expects: the alphabet is upper-cased, stripped of whitespace,
    /// duplicates and non-ASCII symbols, and falls back to
    /// [`DEFAULT_JOIN_CODE_ALPHABET`] if nothing is left. A zero length
    /// falls back to the default length.
    pub fn new(store: Arc<S>, config: JoinCodeConfig) -> Self {
        Self {
            store,
            config: sanitize(config),
        }
    }

    /// Draws a fresh code and maps it to `match_id`.
    ///
    /// Uses set-if-absent, so a live code belonging to another match is
    /// never overwritten. On collision a new code is drawn. The loop is
    /// unbounded, but at ~10^9 codes a collision is already rare.
    ///
    /// # Errors
    /// Returns [`SessionError::Store`] if the store fails.
    pub async fn reserve(&self, match_id: &MatchId) -> Result<String, SessionError> {
        loop {
            let code = random_code(&mut rand::rng(), &self.config);
            let reserved = self
                .store
                .set_if_absent(
                    &join_code_key(&code),
                    match_id.as_str().as_bytes().to_vec(),
                    Some(self.config.ttl),
                )
                .await?;

            if reserved {
                tracing::info!(%match_id, join_code = %code, "join code reserved");
                return Ok(code);
            }
            tracing::debug!(join_code = %code, "join code collision, drawing again");
        }
    }

    /// Looks up the match a code points to.
    ///
    /// Codes are matched case-insensitively and surrounding whitespace is
    /// ignored, since people type them by hand.
    ///
    /// # Errors
    /// - [`SessionError::JoinCodeNotFound`]: unknown or expired code
    /// - [`SessionError::CorruptJoinCode`]: the entry isn't valid UTF-8
    pub async fn resolve(&self, code: &str) -> Result<MatchId, SessionError> {
        let code = normalize(code);
        let data = self
            .store
            .get(&join_code_key(&code))
            .await?
            .ok_or_else(|| SessionError::JoinCodeNotFound(code.clone()))?;

        String::from_utf8(data)
            .map(MatchId)
            .map_err(|_| SessionError::CorruptJoinCode(code))
    }

    /// Removes a code so it stops resolving. Returns `true` if it existed.
    pub async fn release(&self, code: &str) -> Result<bool, SessionError> {
        let removed = self.store.delete(&join_code_key(&normalize(code))).await?;
        if removed {
            tracing::debug!(join_code = %code, "join code released");
        }
        Ok(removed)
    }
}

fn join_code_key(code: &str) -> String {
    format!("joincode:{code}")
}

fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

fn sanitize(mut config: JoinCodeConfig) -> JoinCodeConfig {
    let mut alphabet = String::new();
    for c in config.alphabet.chars() {
        let c = c.to_ascii_uppercase();
        if c.is_ascii_graphic() && !alphabet.contains(c) {
            alphabet.push(c);
        }
    }
    if alphabet.is_empty() {
        tracing::warn!(alphabet = %config.alphabet, "unusable join-code alphabet, using the default");
        alphabet = DEFAULT_JOIN_CODE_ALPHABET.to_string();
    } else if alphabet != config.alphabet {
        tracing::warn!(from = %config.alphabet, to = %alphabet, "join-code alphabet normalized");
    }
    config.alphabet = alphabet;

    if config.length == 0 {
        let length = JoinCodeConfig::default().length;
        tracing::warn!(length, "zero join-code length, using the default");
        config.length = length;
    }
    config
}

/// Draws `config.length` symbols uniformly from `config.alphabet`.
fn random_code(rng: &mut impl Rng, config: &JoinCodeConfig) -> String {
    let symbols = config.alphabet.as_bytes();
    (0..config.length)
        .map(|_| char::from(symbols[rng.random_range(0..symbols.len())]))
        .collect()
}
