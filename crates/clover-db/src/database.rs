//! The public `Database` API (spec §6.2), mirroring the teacher's
//! `Database<S: Store>` naming from `database.rs` but over the flat
//! single-namespace key layout of [`crate::keys`] rather than per-collection
//! column families.

use std::collections::HashSet;
use std::ops::ControlFlow;
use std::path::Path;
use std::sync::{Arc, Mutex};

use clover_query::{decode_doc, encode_doc, get_path, Query, Value};
use clover_store::{Store, Transaction};

use crate::document::{Document, ID_FIELD};
use crate::error::{DbError, Result};
use crate::executor;
use crate::index;
use crate::json;
use crate::keys;
use crate::meta::{CollectionMeta, IndexDescriptor};
use crate::options::Options;
use crate::planner;
use crate::scan::scan_prefix;
use crate::sweep::{self, SweepHandle};

/// An embedded, document-oriented database over a pluggable [`Store`]
/// backend. Cheap to clone-by-reference: share it across threads by
/// wrapping in `Arc` at the call site, or hold one directly since every
/// method only needs `&self`.
pub struct Database<S: Store + Send + Sync + 'static> {
    store: Arc<S>,
    sweep: Mutex<Option<SweepHandle>>,
}

impl<S: Store + Send + Sync + 'static> Database<S> {
    pub fn open(store: S, options: Options) -> Database<S> {
        let store = Arc::new(store);
        let sweep = options
            .ttl_sweep_interval
            .map(|interval| sweep::spawn(Arc::clone(&store), interval));
        tracing::info!("database opened");
        Database {
            store,
            sweep: Mutex::new(sweep),
        }
    }

    /// Stops the background sweep, if running. Idempotent.
    pub fn close(&self) {
        if let Some(mut handle) = self.sweep.lock().unwrap().take() {
            handle.stop();
        }
        tracing::info!("database closed");
    }

    fn run_write<F, R>(&self, op: &'static str, f: F) -> Result<R>
    where
        F: FnOnce(&S::Txn<'_>) -> Result<R>,
    {
        tracing::trace!(op, "begin write transaction");
        let txn = self.store.begin(true)?;
        match f(&txn) {
            Ok(value) => {
                txn.commit()?;
                tracing::debug!(op, "committed transaction");
                Ok(value)
            }
            Err(e) => {
                let _ = txn.rollback();
                tracing::debug!(op, error = %e, "rolled back transaction");
                Err(e)
            }
        }
    }

    fn run_read<F, R>(&self, op: &'static str, f: F) -> Result<R>
    where
        F: FnOnce(&S::Txn<'_>) -> Result<R>,
    {
        tracing::trace!(op, "begin read transaction");
        let txn = self.store.begin(false)?;
        let result = f(&txn);
        let _ = txn.rollback();
        result
    }

    // ---- collections --------------------------------------------------

    pub fn create_collection(&self, name: &str) -> Result<()> {
        self.run_write("create_collection", |txn| {
            let key = keys::collection_meta_key(name);
            if txn.get(&key)?.is_some() {
                return Err(DbError::CollectionExist(name.to_string()));
            }
            write_meta(txn, name, &CollectionMeta::default())
        })
    }

    pub fn drop_collection(&self, name: &str) -> Result<()> {
        self.run_write("drop_collection", |txn| {
            require_meta(txn, name)?;
            let prefix = keys::collection_prefix(name);
            let mut to_delete = Vec::new();
            scan_prefix(txn, &prefix, false, |k, _| {
                to_delete.push(k.to_vec());
                ControlFlow::Continue(())
            })?;
            for key in to_delete {
                txn.delete(&key)?;
            }
            txn.delete(&keys::collection_meta_key(name))?;
            Ok(())
        })
    }

    pub fn has_collection(&self, name: &str) -> Result<bool> {
        self.run_read("has_collection", |txn| {
            Ok(txn.get(&keys::collection_meta_key(name))?.is_some())
        })
    }

    pub fn list_collections(&self) -> Result<Vec<String>> {
        self.run_read("list_collections", |txn| {
            let prefix = keys::collection_meta_prefix();
            let mut names = Vec::new();
            scan_prefix(txn, &prefix, false, |k, _| {
                if let Ok(name) = std::str::from_utf8(&k[prefix.len()..]) {
                    names.push(name.to_string());
                }
                ControlFlow::Continue(())
            })?;
            Ok(names)
        })
    }

    // ---- documents ------------------------------------------------------

    /// Inserts every document in `docs`, assigning `_id` where absent.
    /// Returns the assigned ids in order. All-or-nothing: any failure
    /// (duplicate id, invalid document) rolls back the whole batch.
    pub fn insert(&self, collection: &str, docs: Vec<Value>) -> Result<Vec<String>> {
        self.run_write("insert", |txn| {
            let mut meta = require_meta(txn, collection)?;
            let mut ids = Vec::with_capacity(docs.len());
            for value in docs {
                let mut doc = Document::from_value(value)?;
                let id = doc.ensure_id();
                doc.validate()?;
                let key = keys::document_key(collection, &id);
                if txn.get(&key)?.is_some() {
                    return Err(DbError::DuplicateKey(collection.to_string(), id));
                }
                let doc_value = doc.into_value();
                add_index_entries(txn, collection, &meta, &doc_value, &id)?;
                txn.set(&key, &encode_doc(&doc_value))?;
                ids.push(id);
            }
            meta.size += ids.len() as u64;
            write_meta(txn, collection, &meta)?;
            Ok(ids)
        })
    }

    pub fn insert_one(&self, collection: &str, doc: Value) -> Result<String> {
        self.insert(collection, vec![doc])
            .map(|mut ids| ids.remove(0))
    }

    /// Insert-or-replace by `_id`: assigns one if absent.
    pub fn save(&self, collection: &str, value: Value) -> Result<String> {
        self.run_write("save", |txn| {
            let mut meta = require_meta(txn, collection)?;
            let mut doc = Document::from_value(value)?;
            let id = doc.ensure_id();
            doc.validate()?;
            let key = keys::document_key(collection, &id);
            let doc_value = doc.into_value();
            match txn.get(&key)? {
                Some(bytes) => {
                    let old = decode_doc(&bytes)?;
                    remove_index_entries(txn, collection, &meta, &old, &id)?;
                    add_index_entries(txn, collection, &meta, &doc_value, &id)?;
                    txn.set(&key, &encode_doc(&doc_value))?;
                }
                None => {
                    add_index_entries(txn, collection, &meta, &doc_value, &id)?;
                    txn.set(&key, &encode_doc(&doc_value))?;
                    meta.size += 1;
                    write_meta(txn, collection, &meta)?;
                }
            }
            Ok(id)
        })
    }

    pub fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        self.run_read("find_by_id", |txn| {
            let key = keys::document_key(collection, id);
            match txn.get(&key)? {
                None => Ok(None),
                Some(bytes) => {
                    let value = decode_doc(&bytes)?;
                    let doc = Document::from_value(value)?;
                    if doc.is_expired(executor::now_nanos()) {
                        Ok(None)
                    } else {
                        Ok(Some(doc.into_value()))
                    }
                }
            }
        })
    }

    pub fn delete_by_id(&self, collection: &str, id: &str) -> Result<()> {
        self.run_write("delete_by_id", |txn| {
            let mut meta = require_meta(txn, collection)?;
            let key = keys::document_key(collection, id);
            let bytes = txn
                .get(&key)?
                .ok_or_else(|| DbError::DocumentNotExist(collection.to_string(), id.to_string()))?;
            let old = decode_doc(&bytes)?;
            remove_index_entries(txn, collection, &meta, &old, id)?;
            txn.delete(&key)?;
            meta.size = meta.size.saturating_sub(1);
            write_meta(txn, collection, &meta)
        })
    }

    /// Loads the document, calls `updater`, and writes back whatever it
    /// returns — `None` deletes the document (spec §4.7: "used by
    /// query-driven delete").
    pub fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        updater: impl FnOnce(Value) -> Option<Value>,
    ) -> Result<()> {
        self.run_write("update_by_id", |txn| {
            let mut meta = require_meta(txn, collection)?;
            let key = keys::document_key(collection, id);
            let bytes = txn
                .get(&key)?
                .ok_or_else(|| DbError::DocumentNotExist(collection.to_string(), id.to_string()))?;
            let old = decode_doc(&bytes)?;
            remove_index_entries(txn, collection, &meta, &old, id)?;
            match updater(old) {
                Some(new_value) => {
                    let mut doc = Document::from_value(new_value)?;
                    doc.set(ID_FIELD, id.to_string());
                    doc.validate()?;
                    let new_value = doc.into_value();
                    add_index_entries(txn, collection, &meta, &new_value, id)?;
                    txn.set(&key, &encode_doc(&new_value))?;
                    Ok(())
                }
                None => {
                    txn.delete(&key)?;
                    meta.size = meta.size.saturating_sub(1);
                    write_meta(txn, collection, &meta)
                }
            }
        })
    }

    /// Requires `doc._id == id` if `_id` is present; fills it in otherwise.
    pub fn replace_by_id(&self, collection: &str, id: &str, value: Value) -> Result<()> {
        self.run_write("replace_by_id", |txn| {
            let mut doc = Document::from_value(value)?;
            match doc.id() {
                Some(existing) if existing == id => {}
                Some(existing) => {
                    return Err(DbError::InvalidDocument(format!(
                        "replacement _id {existing:?} does not match {id:?}"
                    )))
                }
                None => doc.set(ID_FIELD, id.to_string()),
            }
            doc.validate()?;

            let meta = require_meta(txn, collection)?;
            let key = keys::document_key(collection, id);
            let bytes = txn
                .get(&key)?
                .ok_or_else(|| DbError::DocumentNotExist(collection.to_string(), id.to_string()))?;
            let old = decode_doc(&bytes)?;
            remove_index_entries(txn, collection, &meta, &old, id)?;
            let new_value = doc.into_value();
            add_index_entries(txn, collection, &meta, &new_value, id)?;
            txn.set(&key, &encode_doc(&new_value))
                .map_err(DbError::from)
        })
    }

    // ---- queries --------------------------------------------------------

    pub fn find_all(&self, query: &Query) -> Result<Vec<Value>> {
        self.run_read("find_all", |txn| {
            let meta = meta_or_default(txn, &query.collection)?;
            let plan = planner::plan_query(query, &indexed_fields(&meta))?;
            let mut out = Vec::new();
            executor::execute(txn, &query.collection, &plan, |doc| {
                out.push(doc);
                ControlFlow::Continue(())
            })?;
            Ok(out)
        })
    }

    pub fn find_first(&self, query: &Query) -> Result<Option<Value>> {
        let mut narrowed = query.clone();
        narrowed.limit = 1;
        Ok(self.find_all(&narrowed)?.into_iter().next())
    }

    pub fn count(&self, query: &Query) -> Result<usize> {
        self.run_read("count", |txn| {
            let meta = meta_or_default(txn, &query.collection)?;
            if query.criterion.is_none() {
                let size = meta.size as isize;
                let after_skip = (size - query.skip as isize).max(0);
                let clamped = if query.limit < 0 {
                    after_skip
                } else {
                    after_skip.min(query.limit)
                };
                return Ok(clamped.max(0) as usize);
            }
            let plan = planner::plan_query(query, &indexed_fields(&meta))?;
            let mut n = 0usize;
            executor::execute(txn, &query.collection, &plan, |_| {
                n += 1;
                ControlFlow::Continue(())
            })?;
            Ok(n)
        })
    }

    pub fn exists(&self, query: &Query) -> Result<bool> {
        let mut narrowed = query.clone();
        narrowed.limit = 1;
        Ok(!self.find_all(&narrowed)?.is_empty())
    }

    /// Visits every matching document; no early stop.
    pub fn for_each(&self, query: &Query, mut f: impl FnMut(&Value)) -> Result<()> {
        self.iterate_docs(query, |doc| {
            f(doc);
            ControlFlow::Continue(())
        })
    }

    /// Visits every matching document until `f` returns
    /// `ControlFlow::Break`.
    pub fn iterate_docs(&self, query: &Query, mut f: impl FnMut(&Value) -> ControlFlow<()>) -> Result<()> {
        self.run_read("iterate_docs", |txn| {
            let meta = meta_or_default(txn, &query.collection)?;
            let plan = planner::plan_query(query, &indexed_fields(&meta))?;
            executor::execute(txn, &query.collection, &plan, |doc| f(&doc))
        })
    }

    /// Shallow-merges `patch`'s top-level fields (`_id` ignored) into every
    /// matching document. Returns the number of documents touched.
    pub fn update(&self, query: &Query, patch: &Value) -> Result<usize> {
        let Value::Object(patch_fields) = patch else {
            return Err(DbError::InvalidDocument(
                "update patch must be an object".to_string(),
            ));
        };
        let patch_fields = patch_fields.clone();
        self.update_func(query, move |doc| {
            let Value::Object(mut fields) = doc else {
                return doc;
            };
            for (k, v) in &patch_fields {
                if k == ID_FIELD {
                    continue;
                }
                fields.insert(k.clone(), v.clone());
            }
            Value::Object(fields)
        })
    }

    /// Applies `updater` to every matching document's full value. Returns
    /// the number of documents touched.
    pub fn update_func(&self, query: &Query, mut updater: impl FnMut(Value) -> Value) -> Result<usize> {
        self.run_write("update", |txn| {
            let meta = require_meta(txn, &query.collection)?;
            let plan = planner::plan_query(query, &indexed_fields(&meta))?;
            let mut ids = Vec::new();
            executor::execute(txn, &query.collection, &plan, |doc| {
                if let Some(id) = Document::from_value(doc).ok().and_then(|d| d.id()) {
                    ids.push(id);
                }
                ControlFlow::Continue(())
            })?;

            let mut modified = 0usize;
            for id in ids {
                let key = keys::document_key(&query.collection, &id);
                let Some(bytes) = txn.get(&key)? else { continue };
                let old = decode_doc(&bytes)?;
                remove_index_entries(txn, &query.collection, &meta, &old, &id)?;
                let mut new_doc = Document::from_value(updater(old))?;
                new_doc.set(ID_FIELD, id.clone());
                new_doc.validate()?;
                let new_value = new_doc.into_value();
                add_index_entries(txn, &query.collection, &meta, &new_value, &id)?;
                txn.set(&key, &encode_doc(&new_value))?;
                modified += 1;
            }
            Ok(modified)
        })
    }

    /// Deletes every matching document. Returns the number deleted.
    pub fn delete(&self, query: &Query) -> Result<usize> {
        self.run_write("delete", |txn| {
            let mut meta = require_meta(txn, &query.collection)?;
            let plan = planner::plan_query(query, &indexed_fields(&meta))?;
            let mut ids = Vec::new();
            executor::execute(txn, &query.collection, &plan, |doc| {
                if let Some(id) = Document::from_value(doc).ok().and_then(|d| d.id()) {
                    ids.push(id);
                }
                ControlFlow::Continue(())
            })?;

            let mut deleted = 0u64;
            for id in ids {
                let key = keys::document_key(&query.collection, &id);
                let Some(bytes) = txn.get(&key)? else { continue };
                let old = decode_doc(&bytes)?;
                remove_index_entries(txn, &query.collection, &meta, &old, &id)?;
                txn.delete(&key)?;
                deleted += 1;
            }
            meta.size = meta.size.saturating_sub(deleted);
            write_meta(txn, &query.collection, &meta)?;
            Ok(deleted as usize)
        })
    }

    // ---- indexes --------------------------------------------------------

    pub fn create_index(&self, collection: &str, field: &str) -> Result<()> {
        self.run_write("create_index", |txn| {
            let mut meta = require_meta(txn, collection)?;
            if meta.has_index(field) {
                return Err(DbError::IndexExist(collection.to_string(), field.to_string()));
            }
            meta.indexes.push(IndexDescriptor::ordered(field));

            let prefix = keys::document_prefix(collection);
            let mut bodies = Vec::new();
            scan_prefix(txn, &prefix, false, |_k, v| {
                bodies.push(v.to_vec());
                ControlFlow::Continue(())
            })?;
            tracing::debug!(collection, field, count = bodies.len(), "backfilling index");
            for bytes in bodies {
                let value = decode_doc(&bytes)?;
                let Some(id) = get_path(&value, ID_FIELD).and_then(|v| v.as_str()) else {
                    continue;
                };
                let field_value = get_path(&value, field).cloned().unwrap_or(Value::Null);
                index::add(txn, collection, field, &field_value, id)?;
            }
            write_meta(txn, collection, &meta)
        })
    }

    pub fn drop_index(&self, collection: &str, field: &str) -> Result<()> {
        self.run_write("drop_index", |txn| {
            let mut meta = require_meta(txn, collection)?;
            let pos = meta
                .indexes
                .iter()
                .position(|d| d.field == field)
                .ok_or_else(|| DbError::IndexNotExist(collection.to_string(), field.to_string()))?;
            meta.indexes.remove(pos);
            index::drop_index(txn, collection, field)?;
            write_meta(txn, collection, &meta)
        })
    }

    pub fn has_index(&self, collection: &str, field: &str) -> Result<bool> {
        self.run_read("has_index", |txn| {
            Ok(meta_or_default(txn, collection)?.has_index(field))
        })
    }

    pub fn list_indexes(&self, collection: &str) -> Result<Vec<String>> {
        self.run_read("list_indexes", |txn| {
            Ok(require_meta(txn, collection)?
                .indexes
                .into_iter()
                .map(|d| d.field)
                .collect())
        })
    }

    // ---- import / export -------------------------------------------------

    pub fn export_collection(&self, collection: &str, path: &Path) -> Result<()> {
        let docs = self.find_all(&Query::new(collection))?;
        let json_docs: Vec<serde_json::Value> = docs.iter().map(json::value_to_json).collect();
        let bytes = serde_json::to_vec_pretty(&json_docs)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Creates `collection` and inserts every object in the JSON array at
    /// `path`. Returns the number of documents inserted.
    pub fn import_collection(&self, collection: &str, path: &Path) -> Result<usize> {
        self.create_collection(collection)?;
        let bytes = std::fs::read(path)?;
        let json_docs: Vec<serde_json::Value> = serde_json::from_slice(&bytes)?;
        let docs: Vec<Value> = json_docs.iter().map(json::json_to_value).collect();
        Ok(self.insert(collection, docs)?.len())
    }
}

impl<S: Store + Send + Sync + 'static> Drop for Database<S> {
    fn drop(&mut self) {
        self.close();
    }
}

fn indexed_fields(meta: &CollectionMeta) -> HashSet<String> {
    meta.indexes.iter().map(|d| d.field.clone()).collect()
}

fn index_value_for(doc: &Value, field: &str) -> Value {
    get_path(doc, field).cloned().unwrap_or(Value::Null)
}

fn add_index_entries<T: Transaction>(
    txn: &T,
    collection: &str,
    meta: &CollectionMeta,
    doc: &Value,
    id: &str,
) -> Result<()> {
    for descriptor in &meta.indexes {
        let value = index_value_for(doc, &descriptor.field);
        index::add(txn, collection, &descriptor.field, &value, id)?;
    }
    Ok(())
}

fn remove_index_entries<T: Transaction>(
    txn: &T,
    collection: &str,
    meta: &CollectionMeta,
    doc: &Value,
    id: &str,
) -> Result<()> {
    for descriptor in &meta.indexes {
        let value = index_value_for(doc, &descriptor.field);
        index::remove(txn, collection, &descriptor.field, &value, id)?;
    }
    Ok(())
}

fn write_meta<T: Transaction>(txn: &T, name: &str, meta: &CollectionMeta) -> Result<()> {
    txn.set(&keys::collection_meta_key(name), &meta.encode())
        .map_err(DbError::from)
}

fn require_meta<T: Transaction>(txn: &T, name: &str) -> Result<CollectionMeta> {
    match txn.get(&keys::collection_meta_key(name))? {
        Some(bytes) => CollectionMeta::decode(&bytes).map_err(DbError::from),
        None => Err(DbError::CollectionNotExist(name.to_string())),
    }
}

fn meta_or_default<T: Transaction>(txn: &T, name: &str) -> Result<CollectionMeta> {
    match txn.get(&keys::collection_meta_key(name))? {
        Some(bytes) => CollectionMeta::decode(&bytes).map_err(DbError::from),
        None => Ok(CollectionMeta::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clover_query::field;
    use clover_store::MemoryStore;

    fn open() -> Database<MemoryStore> {
        Database::open(MemoryStore::new(), Options::no_sweep())
    }

    fn obj(pairs: &[(&str, Value)]) -> Value {
        let mut m = std::collections::BTreeMap::new();
        for (k, v) in pairs {
            m.insert(k.to_string(), v.clone());
        }
        Value::Object(m)
    }

    #[test]
    fn create_collection_twice_fails() {
        let db = open();
        db.create_collection("todos").unwrap();
        assert!(matches!(
            db.create_collection("todos"),
            Err(DbError::CollectionExist(_))
        ));
    }

    #[test]
    fn insert_requires_existing_collection() {
        let db = open();
        let err = db.insert("todos", vec![Document::new().into_value()]).unwrap_err();
        assert!(matches!(err, DbError::CollectionNotExist(_)));
    }

    #[test]
    fn insert_assigns_id_and_find_by_id_round_trips() {
        let db = open();
        db.create_collection("todos").unwrap();
        let ids = db
            .insert("todos", vec![obj(&[("title", Value::String("a".into()))])])
            .unwrap();
        assert_eq!(ids.len(), 1);
        let found = db.find_by_id("todos", &ids[0]).unwrap().unwrap();
        assert_eq!(found.as_object().unwrap().get("title"), Some(&Value::String("a".into())));
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let db = open();
        db.create_collection("todos").unwrap();
        let mut doc = Document::new();
        doc.ensure_id();
        let value = doc.into_value();
        db.insert("todos", vec![value.clone()]).unwrap();
        assert!(matches!(
            db.insert("todos", vec![value]),
            Err(DbError::DuplicateKey(_, _))
        ));
    }

    #[test]
    fn delete_by_id_decrements_size() {
        let db = open();
        db.create_collection("todos").unwrap();
        let ids = db.insert("todos", vec![obj(&[]), obj(&[])]).unwrap();
        assert_eq!(db.count(&Query::new("todos")).unwrap(), 2);
        db.delete_by_id("todos", &ids[0]).unwrap();
        assert_eq!(db.count(&Query::new("todos")).unwrap(), 1);
    }

    #[test]
    fn update_by_id_none_deletes() {
        let db = open();
        db.create_collection("todos").unwrap();
        let ids = db.insert("todos", vec![obj(&[])]).unwrap();
        db.update_by_id("todos", &ids[0], |_| None).unwrap();
        assert!(db.find_by_id("todos", &ids[0]).unwrap().is_none());
        assert_eq!(db.count(&Query::new("todos")).unwrap(), 0);
    }

    #[test]
    fn replace_by_id_rejects_mismatched_id() {
        let db = open();
        db.create_collection("todos").unwrap();
        let ids = db.insert("todos", vec![obj(&[])]).unwrap();
        let mut doc = Document::new();
        doc.set(ID_FIELD, "not-the-same-id");
        let err = db.replace_by_id("todos", &ids[0], doc.into_value()).unwrap_err();
        assert!(matches!(err, DbError::InvalidDocument(_)));
    }

    #[test]
    fn create_index_backfills_existing_documents() {
        let db = open();
        db.create_collection("todos").unwrap();
        db.insert(
            "todos",
            vec![
                obj(&[("userId", Value::Number(1.0))]),
                obj(&[("userId", Value::Number(2.0))]),
            ],
        )
        .unwrap();
        db.create_index("todos", "userId").unwrap();
        let q = Query::new("todos").where_(field("userId").eq(1.0));
        assert_eq!(db.find_all(&q).unwrap().len(), 1);
    }

    #[test]
    fn drop_index_then_query_falls_back_to_collection_scan() {
        let db = open();
        db.create_collection("todos").unwrap();
        db.insert("todos", vec![obj(&[("userId", Value::Number(1.0))])])
            .unwrap();
        db.create_index("todos", "userId").unwrap();
        db.drop_index("todos", "userId").unwrap();
        assert!(!db.has_index("todos", "userId").unwrap());
        let q = Query::new("todos").where_(field("userId").eq(1.0));
        assert_eq!(db.find_all(&q).unwrap().len(), 1);
    }

    #[test]
    fn update_merges_top_level_fields_and_keeps_id() {
        let db = open();
        db.create_collection("todos").unwrap();
        let ids = db
            .insert("todos", vec![obj(&[("done", Value::Bool(false))])])
            .unwrap();
        let patch = obj(&[("done", Value::Bool(true))]);
        let n = db.update(&Query::new("todos"), &patch).unwrap();
        assert_eq!(n, 1);
        let found = db.find_by_id("todos", &ids[0]).unwrap().unwrap();
        assert_eq!(found.as_object().unwrap().get("done"), Some(&Value::Bool(true)));
    }

    #[test]
    fn delete_query_maintains_size_and_indexes() {
        let db = open();
        db.create_collection("todos").unwrap();
        db.insert(
            "todos",
            vec![
                obj(&[("userId", Value::Number(1.0))]),
                obj(&[("userId", Value::Number(2.0))]),
            ],
        )
        .unwrap();
        db.create_index("todos", "userId").unwrap();
        let n = db
            .delete(&Query::new("todos").where_(field("userId").eq(1.0)))
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(db.count(&Query::new("todos")).unwrap(), 1);
        let q = Query::new("todos").where_(field("userId").eq(2.0));
        assert_eq!(db.find_all(&q).unwrap().len(), 1);
    }

    #[test]
    fn count_with_no_criterion_uses_fast_path_and_clamps() {
        let db = open();
        db.create_collection("todos").unwrap();
        db.insert("todos", vec![obj(&[]), obj(&[]), obj(&[])]).unwrap();
        assert_eq!(db.count(&Query::new("todos").skip(1)).unwrap(), 2);
        assert_eq!(db.count(&Query::new("todos").skip(10)).unwrap(), 0);
        assert_eq!(db.count(&Query::new("todos").limit(1)).unwrap(), 1);
    }

    #[test]
    fn expired_document_is_invisible_to_find_by_id_and_query() {
        let db = open();
        db.create_collection("todos").unwrap();
        let mut doc = Document::new();
        doc.ensure_id();
        doc.set(crate::document::EXPIRES_AT_FIELD, Value::Time(0));
        let ids = db.insert("todos", vec![doc.into_value()]).unwrap();
        assert!(db.find_by_id("todos", &ids[0]).unwrap().is_none());
        assert!(db.find_all(&Query::new("todos")).unwrap().is_empty());
    }

    #[test]
    fn list_collections_and_has_collection() {
        let db = open();
        db.create_collection("a").unwrap();
        db.create_collection("b").unwrap();
        let mut names = db.list_collections().unwrap();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
        assert!(db.has_collection("a").unwrap());
        assert!(!db.has_collection("c").unwrap());
    }

    #[test]
    fn drop_collection_removes_documents_and_indexes() {
        let db = open();
        db.create_collection("todos").unwrap();
        db.insert("todos", vec![obj(&[("userId", Value::Number(1.0))])])
            .unwrap();
        db.create_index("todos", "userId").unwrap();
        db.drop_collection("todos").unwrap();
        assert!(!db.has_collection("todos").unwrap());
        assert!(db.create_collection("todos").is_ok());
        assert_eq!(db.count(&Query::new("todos")).unwrap(), 0);
    }

    #[test]
    fn export_then_import_round_trips_documents() {
        let dir = std::env::temp_dir().join(format!(
            "clover-db-export-test-{}",
            Document::new().ensure_id().replace('-', "")
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("todos.json");

        let db = open();
        db.create_collection("todos").unwrap();
        db.insert(
            "todos",
            vec![
                obj(&[("title", Value::String("a".into()))]),
                obj(&[("title", Value::String("b".into()))]),
            ],
        )
        .unwrap();
        db.export_collection("todos", &path).unwrap();

        let db2 = open();
        let n = db2.import_collection("imported", &path).unwrap();
        assert_eq!(n, 2);
        assert_eq!(db2.count(&Query::new("imported")).unwrap(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }
}
