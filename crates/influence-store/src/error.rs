/// Errors raised while talking to the key-value store.
///
/// Every variant is transient from the caller's point of view: nothing
/// was written, and the same request may be resubmitted. A missing key
/// is not an error (it's `Ok(None)`), and a lost compare-and-swap race is
/// reported as [`CommitOutcome::Conflict`](crate::CommitOutcome::Conflict).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the underlying connection failed.
    #[error("store I/O failed: {0}")]
    Io(#[source] std::io::Error),
}
