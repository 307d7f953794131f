//! TTL reaping (spec §3.2, §5): deletes documents past their
//! `_expiresAt` along with their index entries. Purely a lazy-GC
//! optimization — every read path (see [`crate::executor`]) already
//! filters expired documents inline, so correctness never depends on this
//! running; it only reclaims space ahead of a later full scan.

use std::ops::ControlFlow;

use clover_query::{decode_doc, get_path, Value};
use clover_store::Transaction;

use crate::document::{EXPIRES_AT_FIELD, ID_FIELD};
use crate::error::{DbError, Result};
use crate::index;
use crate::keys;
use crate::meta::CollectionMeta;
use crate::scan::scan_prefix;

/// Reaps every expired document in `collection`. Returns the number reaped.
pub fn sweep_collection<T: Transaction>(txn: &T, collection: &str, now_nanos: i64) -> Result<u64> {
    let meta_key = keys::collection_meta_key(collection);
    let Some(bytes) = txn.get(&meta_key)? else {
        return Ok(0);
    };
    let mut meta = CollectionMeta::decode(&bytes).map_err(|e| DbError::Json(e.to_string()))?;

    let prefix = keys::document_prefix(collection);
    let mut expired = Vec::new();
    scan_prefix(txn, &prefix, false, |k, v| {
        if let Ok(value) = decode_doc(v) {
            if let Some(Value::Time(t)) = get_path(&value, EXPIRES_AT_FIELD) {
                if *t < now_nanos {
                    expired.push((k.to_vec(), value));
                }
            }
        }
        ControlFlow::Continue(())
    })?;

    let reaped = expired.len() as u64;
    for (key, value) in expired {
        if let Some(id) = get_path(&value, ID_FIELD).and_then(|v| v.as_str()) {
            for descriptor in &meta.indexes {
                let field_value = get_path(&value, &descriptor.field)
                    .cloned()
                    .unwrap_or(Value::Null);
                index::remove(txn, collection, &descriptor.field, &field_value, id)?;
            }
        }
        txn.delete(&key)?;
    }
    if reaped > 0 {
        meta.size = meta.size.saturating_sub(reaped);
        txn.set(&meta_key, &meta.encode())?;
    }
    Ok(reaped)
}
