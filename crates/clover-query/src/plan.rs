//! Composes the four visitors in the fixed order the spec mandates
//! (Normalize → NotFlatten → IndexSelect → RangeExtract) into one
//! preparation step the storage layer's planner builds plan nodes from.

use std::collections::HashSet;

use crate::criteria::Criterion;
use crate::demorgan::push_down_not;
use crate::error::QueryError;
use crate::index_select::select_index;
use crate::normalize::normalize;
use crate::range_extract::{extract_range, Interval};

pub struct PreparedCriterion {
    /// The criterion after de-Morgan pushdown — always re-applied in full,
    /// even when an index narrows the scan (the index is a coarse filter).
    pub criterion: Criterion,
    pub index_field: Option<String>,
    pub range: Option<Interval>,
}

pub fn prepare(
    criterion: Criterion,
    indexed_fields: &HashSet<String>,
) -> Result<PreparedCriterion, QueryError> {
    normalize(&criterion)?;
    let criterion = push_down_not(criterion);
    let index_field = select_index(&criterion, indexed_fields);
    let range = index_field
        .as_deref()
        .map(|field| extract_range(&criterion, field));
    Ok(PreparedCriterion {
        criterion,
        index_field,
        range,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::field;

    #[test]
    fn prepare_picks_index_and_range_for_and_chain() {
        let c = field("userId").gt(5).and(field("userId").le(10));
        let indexed = HashSet::from(["userId".to_string()]);
        let prepared = prepare(c, &indexed).unwrap();
        assert_eq!(prepared.index_field.as_deref(), Some("userId"));
        assert!(prepared.range.is_some());
        assert!(!prepared.range.unwrap().is_empty());
    }

    #[test]
    fn prepare_rejects_nan_literal() {
        let c = field("x").eq(f64::NAN);
        let result = prepare(c, &HashSet::new());
        assert!(result.is_err());
    }

    #[test]
    fn prepare_falls_back_to_no_index() {
        let c = field("name").eq("clover");
        let prepared = prepare(c, &HashSet::new()).unwrap();
        assert_eq!(prepared.index_field, None);
        assert!(prepared.range.is_none());
    }
}
