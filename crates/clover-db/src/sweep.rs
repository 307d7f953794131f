//! Background TTL sweep thread, grounded on the teacher's `sweep.rs`: a
//! condvar-timed loop with an atomic shutdown flag, stopped from `Drop`.
//! Entirely an optimization — see [`crate::ttl`].

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use clover_store::{Store, Transaction};

use crate::error::Result;
use crate::executor::now_nanos;
use crate::keys;
use crate::scan::scan_prefix;
use crate::ttl::sweep_collection;

pub struct SweepHandle {
    shutdown: Arc<AtomicBool>,
    notify: Arc<(Mutex<()>, Condvar)>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SweepHandle {
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.notify.1.notify_one();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

pub fn spawn<S: Store + Send + Sync + 'static>(store: Arc<S>, interval: Duration) -> SweepHandle {
    let shutdown = Arc::new(AtomicBool::new(false));
    let notify = Arc::new((Mutex::new(()), Condvar::new()));
    let thread_shutdown = Arc::clone(&shutdown);
    let thread_notify = Arc::clone(&notify);

    let handle = thread::spawn(move || loop {
        let (lock, cvar) = &*thread_notify;
        let guard = lock.lock().unwrap();
        let _ = cvar.wait_timeout(guard, interval).unwrap();
        if thread_shutdown.load(Ordering::Relaxed) {
            break;
        }
        if let Err(e) = sweep_once(store.as_ref()) {
            tracing::debug!(error = %e, "ttl sweep failed");
        }
    });

    SweepHandle {
        shutdown,
        notify,
        handle: Some(handle),
    }
}

fn sweep_once<S: Store>(store: &S) -> Result<()> {
    let txn = store.begin(true)?;
    let prefix = keys::collection_meta_prefix();
    let mut names = Vec::new();
    scan_prefix(&txn, &prefix, false, |k, _| {
        if let Ok(name) = std::str::from_utf8(&k[prefix.len()..]) {
            names.push(name.to_string());
        }
        ControlFlow::Continue(())
    })?;

    let now = now_nanos();
    let mut total = 0u64;
    for name in &names {
        total += sweep_collection(&txn, name, now)?;
    }
    if total > 0 {
        tracing::debug!(reaped = total, "ttl sweep reaped expired documents");
    }
    txn.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::meta::{CollectionMeta, IndexDescriptor};
    use clover_query::{encode_doc, Value};
    use clover_store::MemoryStore;

    #[test]
    fn spawned_sweep_reaps_expired_documents_in_the_background() {
        let store = Arc::new(MemoryStore::new());
        {
            let txn = store.begin(true).unwrap();
            let mut doc = Document::new();
            let id = doc.ensure_id();
            doc.set(crate::document::EXPIRES_AT_FIELD, Value::Time(0));
            doc.set("x", 1i64);
            let value = doc.into_value();
            txn.set(&keys::document_key("todos", &id), &encode_doc(&value)).unwrap();
            let meta = CollectionMeta {
                size: 1,
                indexes: vec![IndexDescriptor::ordered("x")],
            };
            txn.set(&keys::collection_meta_key("todos"), &meta.encode()).unwrap();
            txn.commit().unwrap();
        }

        let mut handle = spawn(Arc::clone(&store), Duration::from_millis(5));
        thread::sleep(Duration::from_millis(100));
        handle.stop();

        let txn = store.begin(false).unwrap();
        let meta_bytes = txn.get(&keys::collection_meta_key("todos")).unwrap().unwrap();
        let meta = CollectionMeta::decode(&meta_bytes).unwrap();
        assert_eq!(meta.size, 0);
    }
}
