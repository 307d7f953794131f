use std::borrow::Cow;

use crate::error::StoreError;

/// A pluggable ordered, transactional key-value engine.
///
/// Implementations must provide snapshot isolation for read transactions
/// and serialize writers (a single writer at a time is sufficient — the
/// core never assumes multi-writer conflict detection).
pub trait Store {
    type Txn<'a>: Transaction
    where
        Self: 'a;

    /// Begin a transaction. `update = true` opens it for writes.
    fn begin(&self, update: bool) -> Result<Self::Txn<'_>, StoreError>;

    /// Idempotent shutdown hook.
    fn close(&self) {}
}

/// A single KV transaction. Exactly one of `commit`/`rollback` must be
/// called — dropping a transaction without either is a logic error in the
/// caller (the default backends treat it as an implicit rollback).
pub trait Transaction {
    type Cursor<'a>: Cursor
    where
        Self: 'a;

    /// Absent key returns `Ok(None)`, never an error.
    fn get(&self, key: &[u8]) -> Result<Option<Cow<'_, [u8]>>, StoreError>;

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    fn delete(&self, key: &[u8]) -> Result<(), StoreError>;

    /// A cursor over the whole keyspace, iterating forward or in reverse.
    fn cursor(&self, forward: bool) -> Result<Self::Cursor<'_>, StoreError>;

    fn commit(self) -> Result<(), StoreError>;

    fn rollback(self) -> Result<(), StoreError>;
}

/// A positionable iterator over a transaction's keyspace.
pub trait Cursor {
    /// Position at `key`, or the next key greater (forward cursor) / lesser
    /// (reverse cursor) than it if `key` itself is absent.
    fn seek(&mut self, key: &[u8]);

    /// Step one position in the cursor's direction.
    fn next(&mut self);

    fn valid(&self) -> bool;

    /// The `(key, value)` pair at the current position. Panics if `!valid()`.
    fn item(&self) -> (Cow<'_, [u8]>, Cow<'_, [u8]>);
}
