//! Visitor 2/4: push `Not` toward the leaves (spec §4.3).
//!
//! `Not(And(a,b)) → Or(Not(a), Not(b))`, `Not(Or(a,b)) → And(Not(a), Not(b))`,
//! `Not(Not(c)) → c`, and a `Not` directly over a comparison leaf rewrites
//! to the complementary comparison. After this pass no `Not` survives above
//! a reducible leaf.

use crate::criteria::{Criterion, LogicalOp, UnaryOp};

pub fn push_down_not(criterion: Criterion) -> Criterion {
    match criterion {
        Criterion::Not(inner) => push_not(*inner),
        Criterion::Binary { op, lhs, rhs } => Criterion::Binary {
            op,
            lhs: Box::new(push_down_not(*lhs)),
            rhs: Box::new(push_down_not(*rhs)),
        },
        leaf @ Criterion::Unary { .. } => leaf,
    }
}

fn push_not(criterion: Criterion) -> Criterion {
    match criterion {
        Criterion::Not(inner) => push_down_not(*inner),
        Criterion::Binary {
            op: LogicalOp::And,
            lhs,
            rhs,
        } => Criterion::Binary {
            op: LogicalOp::Or,
            lhs: Box::new(push_not(*lhs)),
            rhs: Box::new(push_not(*rhs)),
        },
        Criterion::Binary {
            op: LogicalOp::Or,
            lhs,
            rhs,
        } => Criterion::Binary {
            op: LogicalOp::And,
            lhs: Box::new(push_not(*lhs)),
            rhs: Box::new(push_not(*rhs)),
        },
        // `Not Eq` has no single complementary comparison — it splits into
        // `Lt Or Gt` rather than folding to `Neq` (spec §4.3).
        Criterion::Unary {
            op: UnaryOp::Eq,
            field,
            value,
        } => Criterion::Binary {
            op: LogicalOp::Or,
            lhs: Box::new(Criterion::Unary {
                op: UnaryOp::Lt,
                field: field.clone(),
                value: value.clone(),
            }),
            rhs: Box::new(Criterion::Unary {
                op: UnaryOp::Gt,
                field,
                value,
            }),
        },
        Criterion::Unary { op, field, value } => {
            let negated = match op {
                UnaryOp::Neq => UnaryOp::Eq,
                UnaryOp::Lt => UnaryOp::Ge,
                UnaryOp::Le => UnaryOp::Gt,
                UnaryOp::Gt => UnaryOp::Le,
                UnaryOp::Ge => UnaryOp::Lt,
                // Exists/In/Like/Contains/Function have no complementary
                // unary op in the algebra; keep the `Not` wrapper over them.
                other => {
                    return Criterion::Not(Box::new(Criterion::Unary {
                        op: other,
                        field,
                        value,
                    }))
                }
            };
            Criterion::Unary {
                op: negated,
                field,
                value,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::field;
    use crate::eval::matches as eval_matches;
    use crate::value::Value;
    use std::collections::BTreeMap;

    fn doc(x: f64) -> Value {
        let mut m = BTreeMap::new();
        m.insert("x".to_string(), Value::Number(x));
        Value::Object(m)
    }

    #[test]
    fn not_and_becomes_or_of_nots() {
        // Not(x > 1 And x < 2)  ==  x <= 1 Or x >= 2
        let c = !(field("x").gt(1.0).and(field("x").lt(2.0)));
        let pushed = push_down_not(c);
        assert!(matches!(
            pushed,
            Criterion::Binary {
                op: LogicalOp::Or,
                ..
            }
        ));

        for x in [0.0, 0.5, 1.0, 1.5, 2.0, 2.5] {
            let original = !(field("x").gt(1.0).and(field("x").lt(2.0)));
            let rewritten = push_down_not(!(field("x").gt(1.0).and(field("x").lt(2.0))));
            assert_eq!(
                eval_matches(&original, &doc(x)),
                eval_matches(&rewritten, &doc(x)),
                "mismatch at x={x}"
            );
        }
    }

    #[test]
    fn double_not_cancels() {
        let c = !(!field("x").eq(1.0));
        let pushed = push_down_not(c);
        assert!(matches!(
            pushed,
            Criterion::Unary {
                op: UnaryOp::Eq,
                ..
            }
        ));
    }

    #[test]
    fn not_eq_splits_into_lt_or_gt() {
        let c = !field("x").eq(1.0);
        let pushed = push_down_not(c);
        assert!(matches!(
            pushed,
            Criterion::Binary {
                op: LogicalOp::Or,
                ..
            }
        ));
        for x in [0.0, 0.5, 1.0, 1.5, 2.0] {
            let original = !field("x").eq(1.0);
            let rewritten = push_down_not(!field("x").eq(1.0));
            assert_eq!(
                eval_matches(&original, &doc(x)),
                eval_matches(&rewritten, &doc(x)),
                "mismatch at x={x}"
            );
        }
    }

    #[test]
    fn not_neq_folds_to_eq() {
        let c = !field("x").neq(1.0);
        let pushed = push_down_not(c);
        assert!(matches!(
            pushed,
            Criterion::Unary {
                op: UnaryOp::Eq,
                ..
            }
        ));
    }

    #[test]
    fn not_over_unsupported_op_keeps_wrapper() {
        let c = !field("x").exists();
        let pushed = push_down_not(c);
        assert!(matches!(pushed, Criterion::Not(_)));
    }
}
