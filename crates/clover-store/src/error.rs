use std::fmt;

/// Errors surfaced by a [`crate::Store`] backend.
#[derive(Debug)]
pub enum StoreError {
    /// The transaction was already consumed by `commit`/`rollback`.
    TransactionConsumed,
    /// A write was attempted against a read-only transaction.
    ReadOnly,
    /// The underlying backend failed (I/O, corruption, etc).
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::TransactionConsumed => write!(f, "transaction already consumed"),
            StoreError::ReadOnly => write!(f, "cannot write in a read-only transaction"),
            StoreError::Backend(msg) => write!(f, "store backend error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}
