//! The predicate tree (spec §4.3). Mirrors the teacher's
//! `FilterNode`/`FilterGroup` shape (condition vs. group, with a logical op
//! joining children) but generalized to the full unary operator set and a
//! `Not` node, since the planner's de-Morgan pass needs `Not` to exist as a
//! first-class node to push down.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Exists,
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    Like,
    Contains,
    Function,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// A value used on the right-hand side of a unary criterion: either a
/// literal or a reference to another field in the same document, resolved
/// at evaluation time (spec §4.3: "typed wrapper or the string form
/// `$other.field`").
#[derive(Debug, Clone)]
pub enum ValueRef {
    Literal(Value),
    FieldRef(String),
}

impl ValueRef {
    /// Parses the `"$other.field"` string convention; anything else is a
    /// plain literal string.
    pub fn from_str_literal(s: &str) -> ValueRef {
        match s.strip_prefix('$') {
            Some(field) => ValueRef::FieldRef(field.to_string()),
            None => ValueRef::Literal(Value::String(s.to_string())),
        }
    }
}

#[derive(Clone)]
pub enum CriterionValue {
    None,
    One(ValueRef),
    Many(Vec<ValueRef>),
    Pattern(Regex),
    Predicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>),
}

impl fmt::Debug for CriterionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriterionValue::None => write!(f, "None"),
            CriterionValue::One(v) => write!(f, "One({v:?})"),
            CriterionValue::Many(vs) => write!(f, "Many({vs:?})"),
            CriterionValue::Pattern(r) => write!(f, "Pattern({r})"),
            CriterionValue::Predicate(_) => write!(f, "Predicate(<fn>)"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Criterion {
    Unary {
        op: UnaryOp,
        field: String,
        value: CriterionValue,
    },
    Binary {
        op: LogicalOp,
        lhs: Box<Criterion>,
        rhs: Box<Criterion>,
    },
    Not(Box<Criterion>),
}

impl Criterion {
    pub fn and(self, other: Criterion) -> Criterion {
        Criterion::Binary {
            op: LogicalOp::And,
            lhs: Box::new(self),
            rhs: Box::new(other),
        }
    }

    pub fn or(self, other: Criterion) -> Criterion {
        Criterion::Binary {
            op: LogicalOp::Or,
            lhs: Box::new(self),
            rhs: Box::new(other),
        }
    }

    pub fn negate(self) -> Criterion {
        Criterion::Not(Box::new(self))
    }
}

impl std::ops::Not for Criterion {
    type Output = Criterion;
    fn not(self) -> Criterion {
        self.negate()
    }
}

/// Entry point to the fluent builder: `Field("age").gt(18)`.
pub struct Field(String);

pub fn field(name: impl Into<String>) -> Field {
    Field(name.into())
}

impl Field {
    pub fn exists(self) -> Criterion {
        Criterion::Unary {
            op: UnaryOp::Exists,
            field: self.0,
            value: CriterionValue::None,
        }
    }

    fn cmp(self, op: UnaryOp, value: ValueRef) -> Criterion {
        Criterion::Unary {
            op,
            field: self.0,
            value: CriterionValue::One(value),
        }
    }

    pub fn eq(self, value: impl Into<ValueRef>) -> Criterion {
        self.cmp(UnaryOp::Eq, value.into())
    }

    pub fn neq(self, value: impl Into<ValueRef>) -> Criterion {
        self.cmp(UnaryOp::Neq, value.into())
    }

    pub fn lt(self, value: impl Into<ValueRef>) -> Criterion {
        self.cmp(UnaryOp::Lt, value.into())
    }

    pub fn le(self, value: impl Into<ValueRef>) -> Criterion {
        self.cmp(UnaryOp::Le, value.into())
    }

    pub fn gt(self, value: impl Into<ValueRef>) -> Criterion {
        self.cmp(UnaryOp::Gt, value.into())
    }

    pub fn ge(self, value: impl Into<ValueRef>) -> Criterion {
        self.cmp(UnaryOp::Ge, value.into())
    }

    pub fn is_in(self, values: impl IntoIterator<Item = impl Into<ValueRef>>) -> Criterion {
        Criterion::Unary {
            op: UnaryOp::In,
            field: self.0,
            value: CriterionValue::Many(values.into_iter().map(Into::into).collect()),
        }
    }

    pub fn like(self, pattern: &str) -> Result<Criterion, regex::Error> {
        Ok(Criterion::Unary {
            op: UnaryOp::Like,
            field: self.0,
            value: CriterionValue::Pattern(Regex::new(pattern)?),
        })
    }

    pub fn contains(self, elems: impl IntoIterator<Item = impl Into<ValueRef>>) -> Criterion {
        Criterion::Unary {
            op: UnaryOp::Contains,
            field: self.0,
            value: CriterionValue::Many(elems.into_iter().map(Into::into).collect()),
        }
    }

    pub fn matches(self, predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Criterion {
        Criterion::Unary {
            op: UnaryOp::Function,
            field: self.0,
            value: CriterionValue::Predicate(Arc::new(predicate)),
        }
    }
}

impl From<Value> for ValueRef {
    fn from(v: Value) -> Self {
        ValueRef::Literal(v)
    }
}

impl From<&str> for ValueRef {
    fn from(s: &str) -> Self {
        ValueRef::from_str_literal(s)
    }
}

impl From<String> for ValueRef {
    fn from(s: String) -> Self {
        ValueRef::from_str_literal(&s)
    }
}

macro_rules! impl_valueref_numeric {
    ($($t:ty),+) => {
        $(impl From<$t> for ValueRef {
            fn from(n: $t) -> Self {
                ValueRef::Literal(Value::Number(n as f64))
            }
        })+
    };
}

impl_valueref_numeric!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl From<bool> for ValueRef {
    fn from(b: bool) -> Self {
        ValueRef::Literal(Value::Bool(b))
    }
}
