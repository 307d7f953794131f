mod criteria;
mod demorgan;
mod encoding;
mod error;
mod eval;
mod index_select;
mod normalize;
mod path;
mod plan;
mod query;
mod range_extract;
mod sort;
mod value;

pub use criteria::{field, Criterion, CriterionValue, Field, LogicalOp, UnaryOp, ValueRef};
pub use encoding::{decode_doc, encode_doc, encode_ordered, ordered_value_len, DecodeError};
pub use error::QueryError;
pub use eval::matches;
pub use path::{get_path, has_path, set_path};
pub use plan::{prepare, PreparedCriterion};
pub use query::{Query, UNLIMITED};
pub use range_extract::{extract_range, Interval};
pub use sort::{compare_documents, SortDirection, SortOption};
pub use value::{compare_values, IntoValue, Value};
