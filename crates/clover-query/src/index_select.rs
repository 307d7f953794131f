//! Visitor 3/4: pick at most one indexed field to drive the scan (spec §4.3).

use std::collections::HashSet;

use crate::criteria::{Criterion, LogicalOp, UnaryOp};

/// The set of fields a subtree contributes a usable comparison over.
fn contributing_fields(criterion: &Criterion, indexed: &HashSet<String>) -> HashSet<String> {
    match criterion {
        Criterion::Not(inner) => contributing_fields(inner, indexed),
        Criterion::Unary { op, field, .. } => {
            let indexable = !matches!(op, UnaryOp::Function);
            if indexable && indexed.contains(field) {
                HashSet::from([field.clone()])
            } else {
                HashSet::new()
            }
        }
        Criterion::Binary { op, lhs, rhs } => {
            let left = contributing_fields(lhs, indexed);
            let right = contributing_fields(rhs, indexed);
            match op {
                LogicalOp::And => {
                    if left.is_empty() {
                        right
                    } else if right.is_empty() {
                        left
                    } else if left.len() <= right.len() {
                        left
                    } else {
                        right
                    }
                }
                LogicalOp::Or => {
                    if left.is_empty() || right.is_empty() {
                        HashSet::new()
                    } else {
                        left.union(&right).cloned().collect()
                    }
                }
            }
        }
    }
}

/// Returns the single field to index on, if the tree admits one.
pub fn select_index(criterion: &Criterion, indexed: &HashSet<String>) -> Option<String> {
    let fields = contributing_fields(criterion, indexed);
    if fields.len() == 1 {
        fields.into_iter().next()
    } else {
        None
    }
}
