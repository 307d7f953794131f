//! The single-field range index engine (spec §4.8). Entries are
//! `(type-tag, ordered-value, doc-id)` keys — `keys::index_entry_key`
//! already folds the type tag into the ordered-value encoding, so a scan
//! of one field's prefix naturally groups by type before value.

use std::ops::ControlFlow;

use clover_query::{ordered_value_len, Interval, Value};
use clover_store::{Cursor, Transaction};

use crate::keys::{index_entry_key, index_field_prefix, index_value_prefix};
use crate::scan::{prefix_successor, scan_prefix};

pub fn add<T: Transaction>(
    txn: &T,
    collection: &str,
    field: &str,
    value: &Value,
    doc_id: &str,
) -> Result<(), clover_store::StoreError> {
    let key = index_entry_key(collection, field, value, doc_id);
    txn.set(&key, b"")
}

pub fn remove<T: Transaction>(
    txn: &T,
    collection: &str,
    field: &str,
    value: &Value,
    doc_id: &str,
) -> Result<(), clover_store::StoreError> {
    let key = index_entry_key(collection, field, value, doc_id);
    txn.delete(&key)
}

/// Full scan of the index prefix, yielding doc ids in field-value order
/// (or reverse). Stops early if `f` breaks. `iterate_range` with an
/// unbounded interval covers every current call site, but this is kept as
/// the engine's unranged primitive in its own right.
#[allow(dead_code)]
pub fn iterate<T: Transaction>(
    txn: &T,
    collection: &str,
    field: &str,
    reverse: bool,
    f: impl FnMut(&str) -> ControlFlow<()>,
) -> Result<(), clover_store::StoreError> {
    iterate_range(txn, collection, field, &Interval::full(), reverse, f)
}

/// Scans only the keys whose value falls in `range`, honoring inclusive /
/// exclusive endpoints and stopping as soon as the opposite endpoint is
/// crossed.
pub fn iterate_range<T: Transaction>(
    txn: &T,
    collection: &str,
    field: &str,
    range: &Interval,
    reverse: bool,
    mut f: impl FnMut(&str) -> ControlFlow<()>,
) -> Result<(), clover_store::StoreError> {
    let field_prefix = index_field_prefix(collection, field);
    let field_prefix_len = field_prefix.len();

    // Both are full keys (field prefix + encoded endpoint value, no doc-id
    // suffix yet) so they compare directly against scanned keys.
    let lower = range
        .start
        .as_ref()
        .map(|v| index_value_prefix(collection, field, v));
    let upper = range
        .end
        .as_ref()
        .map(|v| index_value_prefix(collection, field, v));

    // Forward: seeking at `lower` itself is enough — entries sharing that
    // exact value are extensions of it, so they sort at or after `lower`.
    // Reverse needs the *successor* of the upper bound instead, or a
    // reverse seek at `upper` would land just before any doc-id-suffixed
    // entry whose value equals it (the entry is an extension, hence
    // byte-greater than `upper`, hence invisible to a `key <= target` seek).
    let seek_at = if !reverse {
        lower.clone().unwrap_or_else(|| field_prefix.clone())
    } else {
        let bound = upper.clone().unwrap_or_else(|| field_prefix.clone());
        prefix_successor(&bound).unwrap_or(bound)
    };

    let mut cursor = txn.cursor(!reverse)?;
    cursor.seek(&seek_at);

    // Consecutive entries sharing the same encoded value (a "tie" under
    // whatever sort later consumes this scan) are buffered and flushed as
    // one group. A forward scan's raw key order already lists a tied
    // group's doc-ids ascending; a reverse scan walks the same
    // `value ‖ doc-id` bytes backwards, so a tied group arrives doc-ids
    // descending unless reversed back on the way out. Flushing group-wise
    // keeps tie order ascending-by-doc-id regardless of scan direction,
    // matching the order an in-memory sort over the same documents would
    // produce.
    let mut group_key: Option<Vec<u8>> = None;
    let mut pending: Vec<String> = Vec::new();
    let mut stopped = false;

    while cursor.valid() {
        let (key, _) = cursor.item();
        if !key.starts_with(&field_prefix) {
            break;
        }
        let bounds = Bounds::of(&key, range, lower.as_deref(), upper.as_deref());
        match bounds.classify(reverse) {
            Classification::OutOfRangeEntrySide => {}
            Classification::Within => {
                if let Ok(value_len) = ordered_value_len(&key[field_prefix_len..]) {
                    let this_group = key[..field_prefix_len + value_len].to_vec();
                    let doc_id =
                        String::from_utf8_lossy(&key[field_prefix_len + value_len..]).into_owned();
                    if group_key.as_deref() != Some(this_group.as_slice()) {
                        stopped = flush_group(reverse, &mut pending, &mut f);
                        if stopped {
                            drop(key);
                            break;
                        }
                        group_key = Some(this_group);
                    }
                    pending.push(doc_id);
                }
            }
            Classification::OutOfRangeFarSide => {
                drop(key);
                break;
            }
        }
        drop(key);
        cursor.next();
    }
    if !stopped {
        flush_group(reverse, &mut pending, &mut f);
    }
    Ok(())
}

/// Emits a buffered tie group — ascending by doc-id always — and reports
/// whether the consumer asked to stop.
fn flush_group(reverse: bool, pending: &mut Vec<String>, f: &mut impl FnMut(&str) -> ControlFlow<()>) -> bool {
    let stop = if reverse {
        pending.iter().rev().any(|id| f(id).is_break())
    } else {
        pending.iter().any(|id| f(id).is_break())
    };
    pending.clear();
    stop
}

enum Classification {
    /// Outside the range on the side the scan starts from — the interval
    /// hasn't been entered yet (only possible right at the seek point,
    /// when that endpoint itself is exclusive).
    OutOfRangeEntrySide,
    Within,
    /// Outside the range on the side the scan is heading toward — nothing
    /// further in this direction can be in range either.
    OutOfRangeFarSide,
}

/// Whether a scanned key is below the lower bound, above the upper bound,
/// or inside, independent of scan direction.
struct Bounds {
    below_lower: bool,
    above_upper: bool,
}

impl Bounds {
    fn of(key: &[u8], range: &Interval, lower: Option<&[u8]>, upper: Option<&[u8]>) -> Bounds {
        // `lower`/`upper` are the encoded *value* with no doc-id suffix, so
        // a key sharing that exact value is always byte-greater than it
        // (it's an extension, not a strictly larger value) — `starts_with`
        // catches the exact-value case before falling back to plain byte
        // comparison for genuinely different values.
        let below_lower = match lower {
            Some(lo) => {
                if key.starts_with(lo) {
                    !range.start_included
                } else {
                    key < lo
                }
            }
            None => false,
        };
        let above_upper = match upper {
            Some(hi) => {
                if key.starts_with(hi) {
                    !range.end_included
                } else {
                    key > hi
                }
            }
            None => false,
        };
        Bounds {
            below_lower,
            above_upper,
        }
    }

    /// Forward scans move from low to high, so crossing the upper bound
    /// ends the scan; crossing the lower bound can only happen right at
    /// the seek point (an excluded exact match) and just gets skipped.
    /// Reverse scans are the mirror image.
    fn classify(&self, reverse: bool) -> Classification {
        if !reverse {
            if self.above_upper {
                Classification::OutOfRangeFarSide
            } else if self.below_lower {
                Classification::OutOfRangeEntrySide
            } else {
                Classification::Within
            }
        } else if self.below_lower {
            Classification::OutOfRangeFarSide
        } else if self.above_upper {
            Classification::OutOfRangeEntrySide
        } else {
            Classification::Within
        }
    }
}

pub fn drop_index<T: Transaction>(
    txn: &T,
    collection: &str,
    field: &str,
) -> Result<(), clover_store::StoreError> {
    let prefix = index_field_prefix(collection, field);
    let mut keys = Vec::new();
    scan_prefix(txn, &prefix, false, |k, _| {
        keys.push(k.to_vec());
        ControlFlow::Continue(())
    })?;
    for k in keys {
        txn.delete(&k)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clover_query::Interval;
    use clover_store::{MemoryStore, Store};

    fn populate(txn: &impl Transaction) {
        for (id, v) in [("a", 1.0), ("b", 5.0), ("c", 7.0), ("d", 10.0)] {
            add(txn, "todos", "userId", &Value::Number(v), id).unwrap();
        }
    }

    #[test]
    fn iterate_yields_all_in_value_order() {
        let store = MemoryStore::new();
        let txn = store.begin(true).unwrap();
        populate(&txn);
        let mut ids = Vec::new();
        iterate(&txn, "todos", "userId", false, |id| {
            ids.push(id.to_string());
            ControlFlow::Continue(())
        })
        .unwrap();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn iterate_reverse_yields_descending() {
        let store = MemoryStore::new();
        let txn = store.begin(true).unwrap();
        populate(&txn);
        let mut ids = Vec::new();
        iterate(&txn, "todos", "userId", true, |id| {
            ids.push(id.to_string());
            ControlFlow::Continue(())
        })
        .unwrap();
        assert_eq!(ids, vec!["d", "c", "b", "a"]);
    }

    #[test]
    fn reverse_scan_keeps_tied_values_ascending_by_doc_id() {
        let store = MemoryStore::new();
        let txn = store.begin(true).unwrap();
        for (id, v) in [("x1", 5.0), ("x2", 5.0), ("x3", 5.0), ("y1", 1.0)] {
            add(&txn, "todos", "userId", &Value::Number(v), id).unwrap();
        }
        let mut ids = Vec::new();
        iterate(&txn, "todos", "userId", true, |id| {
            ids.push(id.to_string());
            ControlFlow::Continue(())
        })
        .unwrap();
        assert_eq!(ids, vec!["x1", "x2", "x3", "y1"]);
    }

    #[test]
    fn iterate_range_respects_inclusivity() {
        let store = MemoryStore::new();
        let txn = store.begin(true).unwrap();
        populate(&txn);
        let range = Interval {
            start: Some(Value::Number(5.0)),
            end: Some(Value::Number(10.0)),
            start_included: false,
            end_included: true,
        };
        let mut ids = Vec::new();
        iterate_range(&txn, "todos", "userId", &range, false, |id| {
            ids.push(id.to_string());
            ControlFlow::Continue(())
        })
        .unwrap();
        assert_eq!(ids, vec!["c", "d"]);
    }

    #[test]
    fn iterate_range_reverse_respects_inclusivity() {
        let store = MemoryStore::new();
        let txn = store.begin(true).unwrap();
        populate(&txn);
        let range = Interval {
            start: Some(Value::Number(5.0)),
            end: Some(Value::Number(10.0)),
            start_included: false,
            end_included: true,
        };
        let mut ids = Vec::new();
        iterate_range(&txn, "todos", "userId", &range, true, |id| {
            ids.push(id.to_string());
            ControlFlow::Continue(())
        })
        .unwrap();
        assert_eq!(ids, vec!["d", "c"]);
    }

    #[test]
    fn remove_deletes_the_entry() {
        let store = MemoryStore::new();
        let txn = store.begin(true).unwrap();
        populate(&txn);
        remove(&txn, "todos", "userId", &Value::Number(5.0), "b").unwrap();
        let mut ids = Vec::new();
        iterate(&txn, "todos", "userId", false, |id| {
            ids.push(id.to_string());
            ControlFlow::Continue(())
        })
        .unwrap();
        assert_eq!(ids, vec!["a", "c", "d"]);
    }

    #[test]
    fn drop_index_removes_every_entry() {
        let store = MemoryStore::new();
        let txn = store.begin(true).unwrap();
        populate(&txn);
        drop_index(&txn, "todos", "userId").unwrap();
        let mut ids = Vec::new();
        iterate(&txn, "todos", "userId", false, |id| {
            ids.push(id.to_string());
            ControlFlow::Continue(())
        })
        .unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn heterogeneous_types_share_index_without_interference() {
        let store = MemoryStore::new();
        let txn = store.begin(true).unwrap();
        add(&txn, "c", "f", &Value::Bool(true), "bool-doc").unwrap();
        add(&txn, "c", "f", &Value::Number(1.0), "num-doc").unwrap();
        let mut ids = Vec::new();
        iterate(&txn, "c", "f", false, |id| {
            ids.push(id.to_string());
            ControlFlow::Continue(())
        })
        .unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"bool-doc".to_string()));
        assert!(ids.contains(&"num-doc".to_string()));
    }
}
