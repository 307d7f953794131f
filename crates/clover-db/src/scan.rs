//! Prefix scanning over the flat KV namespace, forward or reverse.
//!
//! `clover_store::Cursor::seek` lands on the next key *greater* (forward
//! cursor) or *lesser* (reverse cursor) than the target when the target
//! itself is absent — reverse prefix scans exploit that by seeking to the
//! lexicographic successor of the prefix and walking backward from there.

use std::ops::ControlFlow;

use clover_store::{Cursor, Transaction};

/// The smallest byte string that sorts strictly after every string with
/// `prefix` as a prefix — `None` if `prefix` is empty or all `0xFF` (no
/// such bound exists, vanishingly rare for our textual key prefixes).
pub(crate) fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut out = prefix.to_vec();
    while let Some(&last) = out.last() {
        if last != 0xFF {
            *out.last_mut().unwrap() += 1;
            return Some(out);
        }
        out.pop();
    }
    None
}

/// Scans every key under `prefix`, forward or reverse, invoking `f(key,
/// value)` for each. `f` returning `ControlFlow::Break` ends the scan
/// early without it being treated as an error — the idiomatic-Rust
/// standin for the spec's `StopIteration` sentinel.
fn scan_prefix_forward<T: Transaction>(
    txn: &T,
    prefix: &[u8],
    mut f: impl FnMut(&[u8], &[u8]) -> ControlFlow<()>,
) -> Result<(), clover_store::StoreError> {
    let mut cursor = txn.cursor(true)?;
    cursor.seek(prefix);
    while cursor.valid() {
        let (k, v) = cursor.item();
        if !k.starts_with(prefix) {
            break;
        }
        if f(&k, &v).is_break() {
            break;
        }
        drop((k, v));
        cursor.next();
    }
    Ok(())
}

pub fn scan_prefix<T: Transaction>(
    txn: &T,
    prefix: &[u8],
    reverse: bool,
    mut f: impl FnMut(&[u8], &[u8]) -> ControlFlow<()>,
) -> Result<(), clover_store::StoreError> {
    if !reverse {
        return scan_prefix_forward(txn, prefix, f);
    }

    match prefix_successor(prefix) {
        Some(upper) => {
            let mut cursor = txn.cursor(false)?;
            cursor.seek(&upper);
            while cursor.valid() {
                let (k, v) = cursor.item();
                if !k.starts_with(prefix) {
                    break;
                }
                if f(&k, &v).is_break() {
                    break;
                }
                drop((k, v));
                cursor.next();
            }
            Ok(())
        }
        None => {
            // No byte string sorts after `prefix` — collect forward and
            // walk the buffer in reverse.
            let mut entries = Vec::new();
            scan_prefix_forward(txn, prefix, |k, v| {
                entries.push((k.to_vec(), v.to_vec()));
                ControlFlow::Continue(())
            })?;
            for (k, v) in entries.iter().rev() {
                if f(k, v).is_break() {
                    break;
                }
            }
            Ok(())
        }
    }
}
