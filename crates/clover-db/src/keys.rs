//! The flat single-namespace key layout (spec §4.7). Every key is just a
//! byte string in one ordered keyspace — there is no column-family concept
//! at this layer, unlike the teacher's per-collection `Cf` split.

use clover_query::{encode_ordered, Value};

pub fn collection_meta_key(name: &str) -> Vec<u8> {
    let mut k = b"coll:".to_vec();
    k.extend_from_slice(name.as_bytes());
    k
}

pub fn collection_meta_prefix() -> Vec<u8> {
    b"coll:".to_vec()
}

/// Prefix covering every document and index key under one collection —
/// used by `dropCollection`.
pub fn collection_prefix(collection: &str) -> Vec<u8> {
    let mut k = b"c:".to_vec();
    k.extend_from_slice(collection.as_bytes());
    k.push(b';');
    k
}

pub fn document_prefix(collection: &str) -> Vec<u8> {
    let mut k = collection_prefix(collection);
    k.extend_from_slice(b"d:");
    k
}

pub fn document_key(collection: &str, id: &str) -> Vec<u8> {
    let mut k = document_prefix(collection);
    k.extend_from_slice(id.as_bytes());
    k
}

pub fn index_field_prefix(collection: &str, field: &str) -> Vec<u8> {
    let mut k = collection_prefix(collection);
    k.extend_from_slice(b"i:");
    k.extend_from_slice(field.as_bytes());
    k.push(b';');
    k
}

/// Prefix through the encoded value (shared by every doc-id sharing that
/// value) — the type tag is the first byte of `encode_ordered`, so tag and
/// value already sort together.
pub fn index_value_prefix(collection: &str, field: &str, value: &Value) -> Vec<u8> {
    let mut k = index_field_prefix(collection, field);
    k.extend_from_slice(&encode_ordered(value));
    k
}

pub fn index_entry_key(collection: &str, field: &str, value: &Value, id: &str) -> Vec<u8> {
    let mut k = index_value_prefix(collection, field, value);
    k.extend_from_slice(id.as_bytes());
    k
}
