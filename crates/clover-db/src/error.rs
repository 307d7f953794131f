use std::fmt;

use clover_query::QueryError;
use clover_store::StoreError;

/// Named error kinds (spec §7) — not a type hierarchy, one flat enum, the
/// way the teacher's layered crates each keep a single hand-rolled error
/// enum with manual `Display`/`From` wiring instead of deriving through a
/// helper crate.
#[derive(Debug)]
pub enum DbError {
    CollectionExist(String),
    CollectionNotExist(String),
    IndexExist(String, String),
    IndexNotExist(String, String),
    DocumentNotExist(String, String),
    DuplicateKey(String, String),
    InvalidDocument(String),
    InvalidCriterion(String),
    Store(StoreError),
    Decode(String),
    Io(String),
    Json(String),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::CollectionExist(name) => write!(f, "collection {name:?} already exists"),
            DbError::CollectionNotExist(name) => write!(f, "collection {name:?} does not exist"),
            DbError::IndexExist(coll, field) => {
                write!(f, "index on {coll:?}.{field:?} already exists")
            }
            DbError::IndexNotExist(coll, field) => {
                write!(f, "index on {coll:?}.{field:?} does not exist")
            }
            DbError::DocumentNotExist(coll, id) => {
                write!(f, "document {id:?} not found in {coll:?}")
            }
            DbError::DuplicateKey(coll, id) => {
                write!(f, "document {id:?} already exists in {coll:?}")
            }
            DbError::InvalidDocument(msg) => write!(f, "invalid document: {msg}"),
            DbError::InvalidCriterion(msg) => write!(f, "invalid criterion: {msg}"),
            DbError::Store(e) => write!(f, "store error: {e}"),
            DbError::Decode(msg) => write!(f, "corrupt document encoding: {msg}"),
            DbError::Io(msg) => write!(f, "i/o error: {msg}"),
            DbError::Json(msg) => write!(f, "json error: {msg}"),
        }
    }
}

impl std::error::Error for DbError {}

impl From<StoreError> for DbError {
    fn from(e: StoreError) -> Self {
        DbError::Store(e)
    }
}

impl From<QueryError> for DbError {
    fn from(e: QueryError) -> Self {
        DbError::InvalidCriterion(e.to_string())
    }
}

impl From<clover_query::DecodeError> for DbError {
    fn from(e: clover_query::DecodeError) -> Self {
        DbError::Decode(e.to_string())
    }
}

impl From<std::io::Error> for DbError {
    fn from(e: std::io::Error) -> Self {
        DbError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::Json(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
