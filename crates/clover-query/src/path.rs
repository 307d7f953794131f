//! Dotted-path access into a document (spec §4.2). A document is just a
//! `Value::Object` — there is no separate `Document` type at this layer,
//! the wrapper with `_id`/`_expiresAt` validation lives in `clover-db`.

use std::collections::BTreeMap;

use crate::value::Value;

/// Walks `path` (`.`-separated) through nested objects. Returns `None` if
/// any segment is missing or traverses a non-object — callers that need
/// the spec's "missing ⇒ Null" convention should fold `None` into
/// `Value::Null` themselves (distinguishing "missing" matters for sort).
pub fn get_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        match current {
            Value::Object(fields) => current = fields.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

/// `set(path, value)` creates intermediate objects as needed.
pub fn set_path(doc: &mut Value, path: &str, value: Value) {
    if !matches!(doc, Value::Object(_)) {
        *doc = Value::Object(BTreeMap::new());
    }
    let mut segments = path.split('.').peekable();
    let mut current = doc;
    while let Some(segment) = segments.next() {
        let Value::Object(fields) = current else {
            unreachable!("current is always coerced to Object above")
        };
        if segments.peek().is_none() {
            fields.insert(segment.to_string(), value);
            return;
        }
        current = fields
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(BTreeMap::new()));
        if !matches!(current, Value::Object(_)) {
            *current = Value::Object(BTreeMap::new());
        }
    }
}

/// `has(path)` — true iff the containing object exists and holds the leaf key.
pub fn has_path(doc: &Value, path: &str) -> bool {
    let Some((parent, leaf)) = path.rsplit_once('.') else {
        return matches!(doc, Value::Object(fields) if fields.contains_key(path));
    };
    match get_path(doc, parent) {
        Some(Value::Object(fields)) => fields.contains_key(leaf),
        _ => false,
    }
}
