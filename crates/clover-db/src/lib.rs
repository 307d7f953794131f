mod database;
mod document;
mod error;
mod executor;
mod index;
mod json;
mod keys;
mod meta;
mod options;
mod planner;
mod scan;
mod sweep;
mod ttl;

pub use clover_query::{field, Criterion, Field, Query, SortDirection, SortOption, Value, UNLIMITED};
pub use database::Database;
pub use document::Document;
pub use error::{DbError, Result};
pub use meta::IndexDescriptor;
pub use options::Options;
