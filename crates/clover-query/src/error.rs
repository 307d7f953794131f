use std::fmt;

/// Errors raised while building or planning a query (spec §7).
#[derive(Debug)]
pub enum QueryError {
    /// A criterion literal could not be normalized into the canonical
    /// value set — currently only `f64::NAN`, which has no place in a
    /// total order.
    NotNormalizable(String),
    /// A field path was empty or malformed.
    InvalidPath(String),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::NotNormalizable(field) => {
                write!(f, "criterion on {field:?} uses a non-normalizable value")
            }
            QueryError::InvalidPath(path) => write!(f, "invalid field path: {path:?}"),
        }
    }
}

impl std::error::Error for QueryError {}
