use std::borrow::Cow;
use std::cell::RefCell;
use std::sync::{Arc, Mutex, MutexGuard};

use arc_swap::ArcSwap;
use imbl::OrdMap;

use crate::error::StoreError;
use crate::store::{Cursor, Store, Transaction};

type Keyspace = OrdMap<Vec<u8>, Vec<u8>>;

/// A pure in-memory ordered KV store. No TTL, no persistence — a snapshot
/// is a cheap structural-sharing clone (`imbl::OrdMap`), so read
/// transactions never block writers and writers never block readers.
pub struct MemoryStore {
    data: ArcSwap<Keyspace>,
    write_lock: Mutex<()>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            data: ArcSwap::new(Arc::new(OrdMap::new())),
            write_lock: Mutex::new(()),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    type Txn<'a> = MemoryTransaction<'a>;

    fn begin(&self, update: bool) -> Result<Self::Txn<'_>, StoreError> {
        if update {
            let guard = self
                .write_lock
                .lock()
                .map_err(|e| StoreError::Backend(format!("write lock poisoned: {e}")))?;
            Ok(MemoryTransaction {
                store: self,
                snapshot: RefCell::new(Some((*self.data.load_full()).clone())),
                read_only: false,
                dirty: RefCell::new(false),
                _write_guard: Some(guard),
            })
        } else {
            Ok(MemoryTransaction {
                store: self,
                snapshot: RefCell::new(Some((*self.data.load_full()).clone())),
                read_only: true,
                dirty: RefCell::new(false),
                _write_guard: None,
            })
        }
    }
}

pub struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    snapshot: RefCell<Option<Keyspace>>,
    read_only: bool,
    dirty: RefCell<bool>,
    _write_guard: Option<MutexGuard<'a, ()>>,
}

impl<'a> MemoryTransaction<'a> {
    fn check_writable(&self) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        Ok(())
    }
}

impl<'a> Transaction for MemoryTransaction<'a> {
    type Cursor<'b>
        = MemoryCursor
    where
        Self: 'b;

    fn get(&self, key: &[u8]) -> Result<Option<Cow<'_, [u8]>>, StoreError> {
        let snap = self.snapshot.borrow();
        let snap = snap.as_ref().ok_or(StoreError::TransactionConsumed)?;
        Ok(snap.get(key).map(|v| Cow::Owned(v.clone())))
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut snap = self.snapshot.borrow_mut();
        let snap = snap.as_mut().ok_or(StoreError::TransactionConsumed)?;
        snap.insert(key.to_vec(), value.to_vec());
        *self.dirty.borrow_mut() = true;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut snap = self.snapshot.borrow_mut();
        let snap = snap.as_mut().ok_or(StoreError::TransactionConsumed)?;
        snap.remove(key);
        *self.dirty.borrow_mut() = true;
        Ok(())
    }

    fn cursor(&self, forward: bool) -> Result<Self::Cursor<'_>, StoreError> {
        let snap = self.snapshot.borrow();
        let snap = snap.as_ref().ok_or(StoreError::TransactionConsumed)?;
        Ok(MemoryCursor {
            entries: snap.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            pos: None,
            forward,
        })
    }

    fn commit(self) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        let snapshot = self
            .snapshot
            .into_inner()
            .ok_or(StoreError::TransactionConsumed)?;
        if *self.dirty.borrow() {
            self.store.data.store(Arc::new(snapshot));
        }
        Ok(())
    }

    fn rollback(self) -> Result<(), StoreError> {
        if self.snapshot.into_inner().is_none() {
            return Err(StoreError::TransactionConsumed);
        }
        Ok(())
    }
}

/// Cursor implementation: materializes the ordered key range once at
/// creation time (cheap — it's a view over the already-cloned snapshot)
/// and walks it with a plain index, honoring `seek`'s "next greater /
/// lesser" semantics in either direction.
pub struct MemoryCursor {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
    pos: Option<usize>,
    forward: bool,
}

impl Cursor for MemoryCursor {
    fn seek(&mut self, key: &[u8]) {
        let idx = self.entries.partition_point(|(k, _)| k.as_slice() < key);
        if self.forward {
            self.pos = if idx < self.entries.len() {
                Some(idx)
            } else {
                None
            };
        } else {
            // Reverse cursor: land on the greatest key <= `key`.
            let at_key = self.entries.get(idx).is_some_and(|(k, _)| k == key);
            let idx = if at_key { idx } else { idx.wrapping_sub(1) };
            self.pos = if idx < self.entries.len() {
                Some(idx)
            } else {
                None
            };
        }
    }

    fn next(&mut self) {
        match self.pos {
            Some(idx) if self.forward => {
                self.pos = if idx + 1 < self.entries.len() {
                    Some(idx + 1)
                } else {
                    None
                };
            }
            Some(idx) => {
                self.pos = idx.checked_sub(1);
            }
            None => {}
        }
    }

    fn valid(&self) -> bool {
        self.pos.is_some()
    }

    fn item(&self) -> (Cow<'_, [u8]>, Cow<'_, [u8]>) {
        let idx = self.pos.expect("cursor not valid");
        let (k, v) = &self.entries[idx];
        (Cow::Borrowed(k.as_slice()), Cow::Borrowed(v.as_slice()))
    }
}
