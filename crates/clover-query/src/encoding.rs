//! Ordered binary encoding (spec §4.1).
//!
//! `encode_ordered` maps a [`Value`] to a byte string such that unsigned
//! lexicographic comparison of the byte strings agrees with
//! [`compare_values`] — this is the "encoding-order law" the storage and
//! index layers build on. The sortable integer/float technique (XOR the
//! sign bit, flip everything when negative) is lifted directly from the
//! BSON-era encoder this crate's ancestor used for index keys.

use std::collections::BTreeMap;

use crate::value::Value;

const TAG_NULL: u8 = 0;
const TAG_NUMBER: u8 = 1;
const TAG_STRING: u8 = 2;
const TAG_OBJECT: u8 = 3;
const TAG_ARRAY: u8 = 4;
const TAG_BOOL: u8 = 5;
const TAG_TIME: u8 = 6;

const CONTINUE: u8 = 1;
const STOP: u8 = 0;

/// Sortable `f64` encoding: flip the sign bit for non-negatives so they sort
/// after negatives, and flip every bit for negatives so larger-magnitude
/// negatives sort first. Produces 8 big-endian bytes whose unsigned order
/// matches IEEE-754 total order (consistent with `f64::total_cmp`).
pub fn encode_f64_sortable(v: f64) -> [u8; 8] {
    let bits = v.to_bits();
    let flipped = if bits & (1 << 63) != 0 {
        !bits
    } else {
        bits | (1 << 63)
    };
    flipped.to_be_bytes()
}

#[allow(dead_code)]
pub fn decode_f64_sortable(bytes: [u8; 8]) -> f64 {
    let flipped = u64::from_be_bytes(bytes);
    let bits = if flipped & (1 << 63) != 0 {
        flipped & !(1 << 63)
    } else {
        !flipped
    };
    f64::from_bits(bits)
}

/// Order-preserving string encoding: escape `0x00` as `0x00 0xFF` and
/// terminate with `0x00 0x00`, the standard trick for embedding
/// variable-length, NUL-safe strings in a byte-comparable key.
fn encode_ordered_string(out: &mut Vec<u8>, s: &str) {
    for &b in s.as_bytes() {
        if b == 0x00 {
            out.push(0x00);
            out.push(0xFF);
        } else {
            out.push(b);
        }
    }
    out.push(0x00);
    out.push(0x00);
}

/// Encodes `value` so that byte comparison agrees with [`compare_values`].
pub fn encode_ordered(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    encode_ordered_into(&mut out, value);
    out
}

fn encode_ordered_into(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => out.push(TAG_NULL),
        Value::Number(n) => {
            out.push(TAG_NUMBER);
            out.extend_from_slice(&encode_f64_sortable(*n));
        }
        Value::String(s) => {
            out.push(TAG_STRING);
            encode_ordered_string(out, s);
        }
        Value::Bool(b) => {
            out.push(TAG_BOOL);
            out.push(*b as u8);
        }
        Value::Time(t) => {
            out.push(TAG_TIME);
            out.extend_from_slice(&(*t as u64 ^ (1u64 << 63)).to_be_bytes());
        }
        Value::Array(items) => {
            out.push(TAG_ARRAY);
            for item in items {
                out.push(CONTINUE);
                encode_ordered_into(out, item);
            }
            out.push(STOP);
        }
        Value::Object(fields) => {
            out.push(TAG_OBJECT);
            // BTreeMap already iterates in key order.
            for (k, v) in fields {
                out.push(CONTINUE);
                encode_ordered_string(out, k);
                encode_ordered_into(out, v);
            }
            out.push(STOP);
        }
    }
}

/// Length in bytes of the single `encode_ordered` value starting at the
/// front of `bytes` — used to split an index key's `prefix ‖ ordered-value
/// ‖ doc-id` layout without needing the value itself in hand. Walks the
/// same shape `encode_ordered_into` writes, so it stays in lockstep with
/// that function by construction.
pub fn ordered_value_len(bytes: &[u8]) -> Result<usize, DecodeError> {
    let mut cursor = 0usize;
    skip_ordered_value(bytes, &mut cursor)?;
    Ok(cursor)
}

fn skip(bytes: &[u8], cursor: &mut usize, n: usize) -> Result<(), DecodeError> {
    if *cursor + n > bytes.len() {
        return Err(DecodeError("unexpected end of buffer".into()));
    }
    *cursor += n;
    Ok(())
}

fn skip_ordered_string(bytes: &[u8], cursor: &mut usize) -> Result<(), DecodeError> {
    loop {
        if *cursor >= bytes.len() {
            return Err(DecodeError("unterminated ordered string".into()));
        }
        if bytes[*cursor] == 0x00 {
            if *cursor + 1 >= bytes.len() {
                return Err(DecodeError("unterminated ordered string".into()));
            }
            let escape = bytes[*cursor + 1];
            *cursor += 2;
            if escape == 0x00 {
                return Ok(());
            }
            // 0xFF escape: a literal embedded NUL, keep scanning.
        } else {
            *cursor += 1;
        }
    }
}

fn skip_ordered_value(bytes: &[u8], cursor: &mut usize) -> Result<(), DecodeError> {
    if *cursor >= bytes.len() {
        return Err(DecodeError("unexpected end of buffer".into()));
    }
    let tag = bytes[*cursor];
    *cursor += 1;
    match tag {
        TAG_NULL => Ok(()),
        TAG_NUMBER => skip(bytes, cursor, 8),
        TAG_STRING => skip_ordered_string(bytes, cursor),
        TAG_BOOL => skip(bytes, cursor, 1),
        TAG_TIME => skip(bytes, cursor, 8),
        TAG_ARRAY => {
            loop {
                if *cursor >= bytes.len() {
                    return Err(DecodeError("unterminated ordered array".into()));
                }
                let marker = bytes[*cursor];
                *cursor += 1;
                if marker == STOP {
                    return Ok(());
                }
                skip_ordered_value(bytes, cursor)?;
            }
        }
        TAG_OBJECT => {
            loop {
                if *cursor >= bytes.len() {
                    return Err(DecodeError("unterminated ordered object".into()));
                }
                let marker = bytes[*cursor];
                *cursor += 1;
                if marker == STOP {
                    return Ok(());
                }
                skip_ordered_string(bytes, cursor)?;
                skip_ordered_value(bytes, cursor)?;
            }
        }
        other => Err(DecodeError(format!("unknown ordered tag byte {other}"))),
    }
}

/// Self-describing document-body codec (spec §4.1's separate, non-ordered
/// round-trip contract). Unlike `encode_ordered`, this one is paired with a
/// decoder and is what the storage layer uses to persist documents.
pub fn encode_doc(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    encode_doc_into(&mut out, value);
    out
}

fn write_len_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

fn encode_doc_into(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => out.push(TAG_NULL),
        Value::Number(n) => {
            out.push(TAG_NUMBER);
            out.extend_from_slice(&n.to_bits().to_be_bytes());
        }
        Value::String(s) => {
            out.push(TAG_STRING);
            write_len_prefixed(out, s.as_bytes());
        }
        Value::Bool(b) => {
            out.push(TAG_BOOL);
            out.push(*b as u8);
        }
        Value::Time(t) => {
            out.push(TAG_TIME);
            out.extend_from_slice(&t.to_be_bytes());
        }
        Value::Array(items) => {
            out.push(TAG_ARRAY);
            out.extend_from_slice(&(items.len() as u32).to_be_bytes());
            for item in items {
                encode_doc_into(out, item);
            }
        }
        Value::Object(fields) => {
            out.push(TAG_OBJECT);
            out.extend_from_slice(&(fields.len() as u32).to_be_bytes());
            for (k, v) in fields {
                write_len_prefixed(out, k.as_bytes());
                encode_doc_into(out, v);
            }
        }
    }
}

#[derive(Debug)]
pub struct DecodeError(pub String);

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed document encoding: {}", self.0)
    }
}

impl std::error::Error for DecodeError {}

pub fn decode_doc(bytes: &[u8]) -> Result<Value, DecodeError> {
    let mut cursor = 0usize;
    let value = decode_doc_at(bytes, &mut cursor)?;
    if cursor != bytes.len() {
        return Err(DecodeError("trailing bytes after document".into()));
    }
    Ok(value)
}

fn take<'a>(bytes: &'a [u8], cursor: &mut usize, n: usize) -> Result<&'a [u8], DecodeError> {
    if *cursor + n > bytes.len() {
        return Err(DecodeError("unexpected end of buffer".into()));
    }
    let out = &bytes[*cursor..*cursor + n];
    *cursor += n;
    Ok(out)
}

fn take_u32(bytes: &[u8], cursor: &mut usize) -> Result<u32, DecodeError> {
    let b = take(bytes, cursor, 4)?;
    Ok(u32::from_be_bytes(b.try_into().unwrap()))
}

fn decode_doc_at(bytes: &[u8], cursor: &mut usize) -> Result<Value, DecodeError> {
    let tag = *take(bytes, cursor, 1)?.first().unwrap();
    match tag {
        TAG_NULL => Ok(Value::Null),
        TAG_NUMBER => {
            let b = take(bytes, cursor, 8)?;
            Ok(Value::Number(f64::from_bits(u64::from_be_bytes(
                b.try_into().unwrap(),
            ))))
        }
        TAG_STRING => {
            let len = take_u32(bytes, cursor)? as usize;
            let b = take(bytes, cursor, len)?;
            let s = std::str::from_utf8(b)
                .map_err(|e| DecodeError(format!("invalid utf8: {e}")))?
                .to_string();
            Ok(Value::String(s))
        }
        TAG_BOOL => {
            let b = take(bytes, cursor, 1)?;
            Ok(Value::Bool(b[0] != 0))
        }
        TAG_TIME => {
            let b = take(bytes, cursor, 8)?;
            Ok(Value::Time(i64::from_be_bytes(b.try_into().unwrap())))
        }
        TAG_ARRAY => {
            let len = take_u32(bytes, cursor)? as usize;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(decode_doc_at(bytes, cursor)?);
            }
            Ok(Value::Array(items))
        }
        TAG_OBJECT => {
            let len = take_u32(bytes, cursor)? as usize;
            let mut fields = BTreeMap::new();
            for _ in 0..len {
                let klen = take_u32(bytes, cursor)? as usize;
                let kbytes = take(bytes, cursor, klen)?;
                let key = std::str::from_utf8(kbytes)
                    .map_err(|e| DecodeError(format!("invalid utf8 key: {e}")))?
                    .to_string();
                let value = decode_doc_at(bytes, cursor)?;
                fields.insert(key, value);
            }
            Ok(Value::Object(fields))
        }
        other => Err(DecodeError(format!("unknown tag byte {other}"))),
    }
}
