//! The document wrapper (spec §3.2): a `Value::Object` plus the two
//! reserved fields' invariants. Path access is delegated straight to
//! `clover_query::path` since a document *is* an object-shaped `Value`.

use std::collections::BTreeMap;

use clover_query::{get_path, has_path, set_path, IntoValue, Value};
use uuid::Uuid;

use crate::error::{DbError, Result};

pub const ID_FIELD: &str = "_id";
pub const EXPIRES_AT_FIELD: &str = "_expiresAt";

#[derive(Debug, Clone)]
pub struct Document(Value);

impl Document {
    pub fn new() -> Document {
        Document(Value::Object(BTreeMap::new()))
    }

    pub fn from_value(value: Value) -> Result<Document> {
        if !matches!(value, Value::Object(_)) {
            return Err(DbError::InvalidDocument(
                "document must be an object".to_string(),
            ));
        }
        Ok(Document(value))
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn get(&self, path: &str) -> Value {
        get_path(&self.0, path).cloned().unwrap_or(Value::Null)
    }

    pub fn set(&mut self, path: &str, value: impl IntoValue) {
        set_path(&mut self.0, path, value.into_value());
    }

    pub fn has(&self, path: &str) -> bool {
        has_path(&self.0, path)
    }

    pub fn id(&self) -> Option<String> {
        match self.get(ID_FIELD) {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Assigns a fresh UUID-v4 `_id` if one is not already present.
    pub fn ensure_id(&mut self) -> String {
        if let Some(id) = self.id() {
            return id;
        }
        let id = Uuid::new_v4().to_string();
        self.set(ID_FIELD, id.clone());
        id
    }

    pub fn expires_at(&self) -> Option<i64> {
        match self.get(EXPIRES_AT_FIELD) {
            Value::Time(t) => Some(t),
            _ => None,
        }
    }

    /// `< now` ⇒ already expired (spec §3.2).
    pub fn is_expired(&self, now_nanos: i64) -> bool {
        self.expires_at().is_some_and(|t| t < now_nanos)
    }

    /// Validates `_id` (must be a UUID-v4 string) and `_expiresAt` (must be
    /// a `Time` if present). Runs on every insert/update.
    pub fn validate(&self) -> Result<()> {
        match self.get(ID_FIELD) {
            Value::String(s) => {
                let parsed = Uuid::parse_str(&s)
                    .map_err(|_| DbError::InvalidDocument(format!("{ID_FIELD} is not a UUID: {s}")))?;
                if parsed.get_version_num() != 4 {
                    return Err(DbError::InvalidDocument(format!(
                        "{ID_FIELD} is not a UUID-v4: {s}"
                    )));
                }
            }
            Value::Null => {}
            _ => {
                return Err(DbError::InvalidDocument(format!(
                    "{ID_FIELD} must be a string"
                )))
            }
        }
        if self.has(EXPIRES_AT_FIELD) && !matches!(self.get(EXPIRES_AT_FIELD), Value::Time(_)) {
            return Err(DbError::InvalidDocument(format!(
                "{EXPIRES_AT_FIELD} must be a Time"
            )));
        }
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_id_assigns_uuid_v4() {
        let mut doc = Document::new();
        let id = doc.ensure_id();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(doc.ensure_id(), id, "second call keeps the same id");
    }

    #[test]
    fn validate_rejects_non_uuid_id() {
        let mut doc = Document::new();
        doc.set(ID_FIELD, "not-a-uuid");
        assert!(doc.validate().is_err());
    }

    #[test]
    fn validate_rejects_wrong_typed_expires_at() {
        let mut doc = Document::new();
        doc.ensure_id();
        doc.set(EXPIRES_AT_FIELD, "soon");
        assert!(doc.validate().is_err());
    }

    #[test]
    fn validate_accepts_well_formed_document() {
        let mut doc = Document::new();
        doc.ensure_id();
        doc.set(EXPIRES_AT_FIELD, Value::Time(123));
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn is_expired_compares_against_now() {
        let mut doc = Document::new();
        doc.set(EXPIRES_AT_FIELD, Value::Time(100));
        assert!(doc.is_expired(101));
        assert!(!doc.is_expired(100));
        assert!(!doc.is_expired(99));
    }

    #[test]
    fn get_set_roundtrip_nested_path() {
        let mut doc = Document::new();
        doc.set("a.b", 42i64);
        assert_eq!(doc.get("a.b"), Value::Number(42.0));
        assert!(doc.has("a.b"));
        assert!(!doc.has("a.c"));
    }
}
