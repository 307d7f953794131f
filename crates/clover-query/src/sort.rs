//! Sort options and the document comparator (spec §4.6).

use std::cmp::Ordering;

use crate::path::get_path;
use crate::value::{compare_values, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn sign(self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SortOption {
    pub field: String,
    pub direction: SortDirection,
}

impl SortOption {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> SortOption {
        SortOption {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> SortOption {
        SortOption::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> SortOption {
        SortOption::new(field, SortDirection::Desc)
    }
}

/// Compares two documents field-by-field across `options`. A document
/// missing the field sorts after one that has it under ascending order (and
/// before, under descending) — present-but-`Null` is not "missing".
pub fn compare_documents(a: &Value, b: &Value, options: &[SortOption]) -> Ordering {
    for opt in options {
        let av = get_path(a, &opt.field);
        let bv = get_path(b, &opt.field);
        let ord = match (av, bv) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => compare_values(x, y),
        };
        let signed = ((ord as i32) * opt.direction.sign()).cmp(&0);
        if signed != Ordering::Equal {
            return signed;
        }
    }
    Ordering::Equal
}
