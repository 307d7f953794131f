//! Interval algebra and visitor 4/4: fold an And-chain of comparisons on a
//! single field into one interval (spec §4.3).

use std::cmp::Ordering;

use crate::criteria::{Criterion, CriterionValue, LogicalOp, UnaryOp, ValueRef};
use crate::value::{compare_values, Value};

/// `(start?, end?, start_included, end_included)`. `None` on either
/// endpoint means unbounded on that side.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub start: Option<Value>,
    pub end: Option<Value>,
    pub start_included: bool,
    pub end_included: bool,
}

impl Interval {
    pub fn full() -> Interval {
        Interval {
            start: None,
            end: None,
            start_included: true,
            end_included: true,
        }
    }

    fn point(v: Value) -> Interval {
        Interval {
            start: Some(v.clone()),
            end: Some(v),
            start_included: true,
            end_included: true,
        }
    }

    fn at_least(v: Value, inclusive: bool) -> Interval {
        Interval {
            start: Some(v),
            end: None,
            start_included: inclusive,
            end_included: true,
        }
    }

    fn at_most(v: Value, inclusive: bool) -> Interval {
        Interval {
            start: None,
            end: Some(v),
            start_included: true,
            end_included: inclusive,
        }
    }

    /// Either endpoint crossed, or equal endpoints with an exclusive side.
    pub fn is_empty(&self) -> bool {
        match (&self.start, &self.end) {
            (Some(s), Some(e)) => match compare_values(s, e) {
                Ordering::Greater => true,
                Ordering::Equal => !(self.start_included && self.end_included),
                Ordering::Less => false,
            },
            _ => false,
        }
    }

    /// Endpoint-merging intersection: tighter start wins, tighter end wins,
    /// and inclusivity is ANDed when endpoints tie.
    pub fn intersect(self, other: Interval) -> Interval {
        let start = match (self.start, other.start) {
            (None, b) => b.map(|v| (v, other.start_included)),
            (a, None) => a.map(|v| (v, self.start_included)),
            (Some(a), Some(b)) => match compare_values(&a, &b) {
                Ordering::Greater => Some((a, self.start_included)),
                Ordering::Less => Some((b, other.start_included)),
                Ordering::Equal => Some((a, self.start_included && other.start_included)),
            },
        };
        let end = match (self.end, other.end) {
            (None, b) => b.map(|v| (v, other.end_included)),
            (a, None) => a.map(|v| (v, self.end_included)),
            (Some(a), Some(b)) => match compare_values(&a, &b) {
                Ordering::Less => Some((a, self.end_included)),
                Ordering::Greater => Some((b, other.end_included)),
                Ordering::Equal => Some((a, self.end_included && other.end_included)),
            },
        };
        let (start, start_included) = start.map_or((None, true), |(v, i)| (Some(v), i));
        let (end, end_included) = end.map_or((None, true), |(v, i)| (Some(v), i));
        Interval {
            start,
            end,
            start_included,
            end_included,
        }
    }
}

fn leaf_interval(field: &str, criterion: &Criterion) -> Interval {
    let Criterion::Unary {
        op,
        field: leaf_field,
        value,
    } = criterion
    else {
        return Interval::full();
    };
    if leaf_field != field {
        return Interval::full();
    }
    let CriterionValue::One(ValueRef::Literal(v)) = value else {
        return Interval::full();
    };
    match op {
        UnaryOp::Eq => Interval::point(v.clone()),
        UnaryOp::Lt => Interval::at_most(v.clone(), false),
        UnaryOp::Le => Interval::at_most(v.clone(), true),
        UnaryOp::Gt => Interval::at_least(v.clone(), false),
        UnaryOp::Ge => Interval::at_least(v.clone(), true),
        _ => Interval::full(),
    }
}

/// Folds comparisons on `field` from an And-chain into one interval. `Or`
/// subtrees (and anything else that isn't a pure And of comparisons on
/// `field`) contribute no restriction — the caller falls back to a full
/// index scan and re-applies the whole criterion per the planner's
/// coarse-filter contract.
pub fn extract_range(criterion: &Criterion, field: &str) -> Interval {
    match criterion {
        Criterion::Binary {
            op: LogicalOp::And,
            lhs,
            rhs,
        } => extract_range(lhs, field).intersect(extract_range(rhs, field)),
        Criterion::Binary {
            op: LogicalOp::Or, ..
        } => Interval::full(),
        Criterion::Not(_) => Interval::full(),
        leaf => leaf_interval(field, leaf),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::field;

    #[test]
    fn and_chain_folds_to_bounded_interval() {
        let c = field("userId").gt(5).and(field("userId").le(10));
        let interval = extract_range(&c, "userId");
        assert_eq!(interval.start, Some(Value::Number(5.0)));
        assert!(!interval.start_included);
        assert_eq!(interval.end, Some(Value::Number(10.0)));
        assert!(interval.end_included);
        assert!(!interval.is_empty());
    }

    #[test]
    fn or_contributes_full_range() {
        let c = field("userId").eq(1).or(field("userId").eq(2));
        let interval = extract_range(&c, "userId");
        assert_eq!(interval, Interval::full());
    }

    #[test]
    fn contradictory_and_chain_is_empty() {
        let c = field("x").gt(10).and(field("x").lt(5));
        assert!(extract_range(&c, "x").is_empty());
    }

    #[test]
    fn exclusive_equal_endpoints_is_empty() {
        let c = field("x").gt(5).and(field("x").le(5));
        assert!(extract_range(&c, "x").is_empty());
    }

    #[test]
    fn unrelated_field_does_not_restrict() {
        let c = field("status").eq("ok");
        assert_eq!(extract_range(&c, "userId"), Interval::full());
    }
}
