//! Redis-backed [`KvStore`].
//!
//! Plain reads and writes share one auto-reconnecting connection. A
//! watched commit opens a connection of its own, because `WATCH` is
//! connection state:
//!
//! ```text
//!   WATCH key
//!   GET key            → transform(current)
//!   MULTI
//!   SET key next KEEPTTL
//!   EXEC               → nil if key was touched since WATCH
//! ```
//!
//! `KEEPTTL` needs Redis 6.0 or newer.

use std::time::Duration;

use redis::aio::ConnectionManager;

use crate::{CommitOutcome, KvStore, StoreError};

/// A [`KvStore`] on a Redis server. Any number of service instances may
/// point at the same server.
#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("addr", &self.client.get_connection_info().addr)
            .finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connects to the server at `url` (`redis://host:port/db`).
    ///
    /// # Errors
    /// [`StoreError::Unavailable`] if the URL is invalid or the server
    /// can't be reached.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await.inspect_err(|e| {
            tracing::error!(error = %e, "failed to connect to redis");
        })?;
        tracing::info!(addr = ?client.get_connection_info().addr, "connected to redis");
        Ok(Self { client, conn })
    }
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Redis rejects `PX 0`, so sub-millisecond TTLs round up.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl {
            cmd.arg("PX").arg(ttl_millis(ttl));
        }
        let () = cmd.query_async(&mut conn).await?;
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value).arg("NX");
        if let Some(ttl) = ttl {
            cmd.arg("PX").arg(ttl_millis(ttl));
        }
        // `OK` when written, nil when the key already existed.
        let reply: Option<String> = cmd.query_async(&mut conn).await?;
        Ok(reply.is_some())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let removed: u64 = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(removed > 0)
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
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let () = redis::cmd("WATCH").arg(key).query_async(&mut conn).await?;
        let current: Option<Vec<u8>> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;

        // Dropping the connection discards the watch.
        let next = match transform(current.as_deref()) {
            Ok(bytes) => bytes,
            Err(e) => return Ok(CommitOutcome::Aborted(e)),
        };

        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("SET")
            .arg(key)
            .arg(next)
            .arg("KEEPTTL")
            .ignore();
        let reply: Option<()> = pipe.query_async(&mut conn).await?;

        match reply {
            Some(()) => Ok(CommitOutcome::Committed),
            None => {
                tracing::debug!(key, "watched key changed, EXEC aborted");
                Ok(CommitOutcome::Conflict)
            }
        }
    }
}
