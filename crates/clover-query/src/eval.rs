//! Evaluates a [`Criterion`] tree against a document. Grounded on the
//! teacher's `Expression::eval` cross-type matcher, simplified because the
//! canonical `Value` model already folds every numeric width into one
//! `Number` variant — there is no width-coercion table to maintain here,
//! just the canonical order comparison.

use crate::criteria::{Criterion, CriterionValue, LogicalOp, UnaryOp, ValueRef};
use crate::path::get_path;
use crate::value::{compare_values, Value};
use std::cmp::Ordering;

/// Resolves a field reference or returns the literal; a missing field
/// reference resolves to `Null`, matching the "missing field ⇒ Null"
/// convention used throughout comparisons and indexing.
fn resolve<'a>(doc: &'a Value, value: &'a ValueRef) -> std::borrow::Cow<'a, Value> {
    match value {
        ValueRef::Literal(v) => std::borrow::Cow::Borrowed(v),
        ValueRef::FieldRef(path) => {
            std::borrow::Cow::Owned(get_path(doc, path).cloned().unwrap_or(Value::Null))
        }
    }
}

pub fn matches(criterion: &Criterion, doc: &Value) -> bool {
    match criterion {
        Criterion::Not(inner) => !matches(inner, doc),
        Criterion::Binary { op, lhs, rhs } => match op {
            LogicalOp::And => matches(lhs, doc) && matches(rhs, doc),
            LogicalOp::Or => matches(lhs, doc) || matches(rhs, doc),
        },
        Criterion::Unary { op, field, value } => match op {
            UnaryOp::Exists => get_path(doc, field).is_some(),
            UnaryOp::Function => match value {
                CriterionValue::Predicate(f) => f(doc),
                _ => false,
            },
            UnaryOp::Like => {
                let CriterionValue::Pattern(re) = value else {
                    return false;
                };
                match get_path(doc, field) {
                    Some(Value::String(s)) => re.is_match(s),
                    _ => false,
                }
            }
            UnaryOp::In => {
                let CriterionValue::Many(values) = value else {
                    return false;
                };
                let field_value = get_path(doc, field).cloned().unwrap_or(Value::Null);
                values
                    .iter()
                    .any(|v| compare_values(&field_value, &resolve(doc, v)) == Ordering::Equal)
            }
            UnaryOp::Contains => {
                let CriterionValue::Many(elems) = value else {
                    return false;
                };
                let Some(Value::Array(items)) = get_path(doc, field) else {
                    return false;
                };
                elems.iter().all(|elem| {
                    let needle = resolve(doc, elem);
                    items
                        .iter()
                        .any(|item| compare_values(item, &needle) == Ordering::Equal)
                })
            }
            cmp_op => {
                let CriterionValue::One(rhs) = value else {
                    return false;
                };
                let field_value = get_path(doc, field).cloned().unwrap_or(Value::Null);
                let rhs_value = resolve(doc, rhs);
                let ord = compare_values(&field_value, &rhs_value);
                match cmp_op {
                    UnaryOp::Eq => ord == Ordering::Equal,
                    UnaryOp::Neq => ord != Ordering::Equal,
                    UnaryOp::Lt => ord == Ordering::Less,
                    UnaryOp::Le => ord != Ordering::Greater,
                    UnaryOp::Gt => ord == Ordering::Greater,
                    UnaryOp::Ge => ord != Ordering::Less,
                    _ => unreachable!("exhaustive above"),
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::field;
    use std::collections::BTreeMap;

    fn doc(pairs: &[(&str, Value)]) -> Value {
        let mut m = BTreeMap::new();
        for (k, v) in pairs {
            m.insert(k.to_string(), v.clone());
        }
        Value::Object(m)
    }

    #[test]
    fn eq_matches_cross_type_normalized_number() {
        let d = doc(&[("userId", Value::Number(1.0))]);
        assert!(matches(&field("userId").eq(1u8), &d));
        assert!(matches(&field("userId").eq(1.0f32), &d));
    }

    #[test]
    fn missing_field_is_null_for_eq() {
        let d = doc(&[]);
        assert!(matches(&field("x").eq(Value::Null), &d));
        assert!(!matches(&field("x").eq(1), &d));
    }

    #[test]
    fn and_chain_range() {
        let d = doc(&[("userId", Value::Number(7.0))]);
        let c = field("userId").gt(5).and(field("userId").le(10));
        assert!(matches(&c, &d));
    }

    #[test]
    fn contains_requires_every_element() {
        let d = doc(&[(
            "myField",
            Value::Array(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(4.0)]),
        )]);
        assert!(matches(&field("myField").contains(vec![4]), &d));
        assert!(!matches(&field("myField").contains(vec![4, 99]), &d));
    }

    #[test]
    fn like_requires_string_field() {
        let d = doc(&[("name", Value::String("clover".into()))]);
        assert!(matches(&field("name").like("^clo").unwrap(), &d));
        let num_doc = doc(&[("name", Value::Number(1.0))]);
        assert!(!matches(&field("name").like("^clo").unwrap(), &num_doc));
    }

    #[test]
    fn not_inverts() {
        let d = doc(&[("x", Value::Number(1.0))]);
        assert!(matches(&!field("x").eq(2), &d));
        assert!(!matches(&!field("x").eq(1), &d));
    }

    #[test]
    fn field_ref_resolves_against_same_document() {
        let d = doc(&[("a", Value::Number(1.0)), ("b", Value::Number(1.0))]);
        assert!(matches(&field("a").eq("$b"), &d));
    }
}
