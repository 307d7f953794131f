//! JSON import/export bridge (spec §6.2) — out of the core model's scope,
//! but `ExportCollection`/`ImportCollection` need some self-contained
//! on-disk format, so this round-trips [`Value`] through `serde_json`.
//! `Value::Time` has no native JSON representation, so it's tagged
//! `{"$time": nanos}`, the extended-JSON convention the teacher's BSON
//! heritage suggests.

use std::collections::BTreeMap;

use clover_query::Value;
use serde_json::{Map, Number};

const TIME_KEY: &str = "$time";

pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Number(n) => Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Time(t) => {
            let mut m = Map::new();
            m.insert(TIME_KEY.to_string(), serde_json::Value::Number(Number::from(*t)));
            serde_json::Value::Object(m)
        }
        Value::Array(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::Object(fields) => {
            let mut m = Map::new();
            for (k, v) in fields {
                m.insert(k.clone(), value_to_json(v));
            }
            serde_json::Value::Object(m)
        }
    }
}

pub fn json_to_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::Array(items.iter().map(json_to_value).collect()),
        serde_json::Value::Object(fields) => {
            if fields.len() == 1 {
                if let Some(t) = fields.get(TIME_KEY).and_then(|v| v.as_i64()) {
                    return Value::Time(t);
                }
            }
            let mut m = BTreeMap::new();
            for (k, v) in fields {
                m.insert(k.clone(), json_to_value(v));
            }
            Value::Object(m)
        }
    }
}
