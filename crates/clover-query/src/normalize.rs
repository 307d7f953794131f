//! Visitor 1/4: pre-normalize RHS literals (spec §4.3, §9 open question).
//!
//! Every literal a caller can construct in Rust is already coerced into the
//! canonical [`Value`] set by [`crate::value::IntoValue`] — the one
//! non-normalizable value that can still appear is `f64::NAN`, which has no
//! place in the canonical total order. This pass rejects it up front so the
//! later visitors never have to special-case it.

use crate::criteria::{Criterion, CriterionValue, ValueRef};
use crate::error::QueryError;
use crate::value::Value;

fn check_value_ref(field: &str, v: &ValueRef) -> Result<(), QueryError> {
    if let ValueRef::Literal(Value::Number(n)) = v {
        if n.is_nan() {
            return Err(QueryError::NotNormalizable(field.to_string()));
        }
    }
    Ok(())
}

/// Validates every literal in the tree, failing fast on the first
/// non-normalizable one. Idempotent: running it twice on an already-checked
/// tree is a no-op (it never rewrites values, only validates them).
pub fn normalize(criterion: &Criterion) -> Result<(), QueryError> {
    match criterion {
        Criterion::Not(inner) => normalize(inner),
        Criterion::Binary { lhs, rhs, .. } => {
            normalize(lhs)?;
            normalize(rhs)
        }
        Criterion::Unary { field, value, .. } => match value {
            CriterionValue::None | CriterionValue::Pattern(_) | CriterionValue::Predicate(_) => {
                Ok(())
            }
            CriterionValue::One(v) => check_value_ref(field, v),
            CriterionValue::Many(vs) => vs.iter().try_for_each(|v| check_value_ref(field, v)),
        },
    }
}
