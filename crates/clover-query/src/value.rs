use std::cmp::Ordering;
use std::collections::BTreeMap;

/// The canonical, closed set of document value types.
///
/// Every value that enters the core is coerced into one of these seven
/// variants (see [`IntoValue`]). Ordering across variants is by tag first
/// (the declaration order below), then by content — this is what makes
/// [`crate::encoding::encode_ordered`] and [`compare_values`] agree, which
/// in turn is what lets a single index span heterogeneous value types.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Number(f64),
    String(String),
    Object(BTreeMap<String, Value>),
    Array(Vec<Value>),
    Bool(bool),
    /// Nanoseconds since the Unix epoch.
    Time(i64),
}

impl Value {
    pub fn tag(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Number(_) => 1,
            Value::String(_) => 2,
            Value::Object(_) => 3,
            Value::Array(_) => 4,
            Value::Bool(_) => 5,
            Value::Time(_) => 6,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Total order over the canonical value set (spec §3.1, §4.1).
///
/// Cross-type comparisons are ordered by tag, never rejected — this is a
/// deliberate design point of the spec: mixed-type values can legitimately
/// share one index.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Time(x), Value::Time(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => compare_seq(x.iter(), y.iter()),
        (Value::Object(x), Value::Object(y)) => compare_seq(
            x.iter().map(|(k, v)| ObjEntry(k, v)),
            y.iter().map(|(k, v)| ObjEntry(k, v)),
        ),
        _ => a.tag().cmp(&b.tag()),
    }
}

/// Wrapper so `compare_seq` can compare `(&String, &Value)` pairs the same
/// way it compares plain `&Value`s (key first, then value).
struct ObjEntry<'a>(&'a String, &'a Value);

impl<'a> ObjCmp for ObjEntry<'a> {
    fn cmp_entry(&self, other: &Self) -> Ordering {
        self.0.cmp(other.0).then_with(|| compare_values(self.1, other.1))
    }
}

trait ObjCmp {
    fn cmp_entry(&self, other: &Self) -> Ordering;
}

impl ObjCmp for &Value {
    fn cmp_entry(&self, other: &Self) -> Ordering {
        compare_values(self, other)
    }
}

fn compare_seq<T: ObjCmp, IA: Iterator<Item = T>, IB: Iterator<Item = T>>(
    mut a: IA,
    mut b: IB,
) -> Ordering {
    loop {
        return match (a.next(), b.next()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => match x.cmp_entry(&y) {
                Ordering::Equal => continue,
                other => other,
            },
        };
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        compare_values(self, other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_values(self, other)
    }
}

/// Coerces host values into the canonical [`Value`] set (spec §3.1).
///
/// All signed/unsigned integer widths and `f32` fold into `Number` (an
/// `f64` intermediate); `Option<T>` dereferences through `None` to `Null`.
/// Unlike the dynamically-typed reference system, Rust's static types mean
/// there is no "unsupported host type" to silently drop at this layer —
/// the one value Rust *can* produce that breaks the canonical order is
/// `f64::NAN`, so `Number` construction from a literal is always
/// structurally valid but [`crate::criteria::Normalize`] rejects NaN when a
/// criterion is planned (see [`crate::error::QueryError::NotNormalizable`]).
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

macro_rules! impl_into_value_numeric {
    ($($t:ty),+) => {
        $(impl IntoValue for $t {
            fn into_value(self) -> Value {
                Value::Number(self as f64)
            }
        })+
    };
}

impl_into_value_numeric!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::Array(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: IntoValue> IntoValue for BTreeMap<String, T> {
    fn into_value(self) -> Value {
        Value::Object(
            self.into_iter()
                .map(|(k, v)| (k, v.into_value()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_type_order_follows_tag() {
        assert!(compare_values(&Value::Null, &Value::Number(0.0)) == Ordering::Less);
        assert!(compare_values(&Value::Bool(true), &Value::Time(0)) == Ordering::Less);
    }

    #[test]
    fn bool_order() {
        assert!(compare_values(&Value::Bool(false), &Value::Bool(true)) == Ordering::Less);
    }

    #[test]
    fn numeric_widths_normalize_to_same_number() {
        assert_eq!(1u8.into_value(), 1i64.into_value());
        assert_eq!(1.0f32.into_value(), 1.0f64.into_value());
        assert_eq!((-5i32).into_value(), Value::Number(-5.0));
    }

    #[test]
    fn option_none_is_null() {
        let v: Option<i32> = None;
        assert_eq!(v.into_value(), Value::Null);
    }

    #[test]
    fn array_order_is_lexicographic() {
        let a = vec![1i64, 2].into_value();
        let b = vec![1i64, 3].into_value();
        assert_eq!(compare_values(&a, &b), Ordering::Less);

        let shorter = vec![1i64].into_value();
        assert_eq!(compare_values(&shorter, &a), Ordering::Less);
    }

    #[test]
    fn object_order_compares_sorted_keys() {
        let mut x = BTreeMap::new();
        x.insert("a".to_string(), 1i64.into_value());
        let mut y = BTreeMap::new();
        y.insert("a".to_string(), 2i64.into_value());
        assert_eq!(
            compare_values(&Value::Object(x), &Value::Object(y)),
            Ordering::Less
        );
    }
}
