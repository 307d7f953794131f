//! Plan execution (spec §4.5). Runs a [`crate::planner::Plan`] against a
//! transaction and feeds surviving documents to a consumer callback, one at
//! a time — `ControlFlow::Break` is the idiomatic-Rust standin for the
//! spec's `StopIteration` sentinel, ending the scan early without it being
//! an error.

use std::ops::ControlFlow;
use std::time::{SystemTime, UNIX_EPOCH};

use clover_query::{compare_documents, decode_doc, matches, Value};
use clover_store::Transaction;

use crate::document::Document;
use crate::error::{DbError, Result};
use crate::index;
use crate::keys;
use crate::planner::{Plan, PlanNode};
use crate::scan::scan_prefix;

pub fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(0)
}

/// Decodes a body, drops it if expired, and re-applies the full criterion.
/// Returns `None` for anything that shouldn't reach the consumer.
fn load_candidate(bytes: &[u8], plan: &Plan, now: i64) -> Option<Value> {
    let value = decode_doc(bytes).ok()?;
    let doc = Document::from_value(value).ok()?;
    if doc.is_expired(now) {
        return None;
    }
    let value = doc.into_value();
    if let Some(criterion) = &plan.criterion {
        if !matches(criterion, &value) {
            return None;
        }
    }
    Some(value)
}

fn collect<T: Transaction>(
    txn: &T,
    collection: &str,
    plan: &Plan,
    now: i64,
    mut f: impl FnMut(Value) -> ControlFlow<()>,
) -> Result<()> {
    match &plan.input {
        PlanNode::CollectionScan => {
            let prefix = keys::document_prefix(collection);
            scan_prefix(txn, &prefix, false, |_k, v| match load_candidate(v, plan, now) {
                Some(doc) => f(doc),
                None => ControlFlow::Continue(()),
            })
            .map_err(DbError::from)
        }
        PlanNode::IndexScan { field, range, reverse } => {
            let mut pending_err = None;
            index::iterate_range(txn, collection, field, range, *reverse, |doc_id| {
                let key = keys::document_key(collection, doc_id);
                match txn.get(&key) {
                    Ok(Some(bytes)) => match load_candidate(&bytes, plan, now) {
                        Some(doc) => f(doc),
                        // TTL-reaped ahead of its index entry: silently skip.
                        None => ControlFlow::Continue(()),
                    },
                    Ok(None) => ControlFlow::Continue(()),
                    Err(e) => {
                        pending_err = Some(e);
                        ControlFlow::Break(())
                    }
                }
            })
            .map_err(DbError::from)?;
            match pending_err {
                Some(e) => Err(DbError::from(e)),
                None => Ok(()),
            }
        }
    }
}

/// Runs the full pipeline — input, Sort (if needed), Skip/Limit — feeding
/// each surviving document to `consumer`. `consumer` returning
/// `ControlFlow::Break` ends the scan early.
pub fn execute<T: Transaction>(
    txn: &T,
    collection: &str,
    plan: &Plan,
    mut consumer: impl FnMut(Value) -> ControlFlow<()>,
) -> Result<()> {
    let now = now_nanos();
    if let Some(sort_opts) = &plan.sort {
        let mut buffered = Vec::new();
        collect(txn, collection, plan, now, |doc| {
            buffered.push(doc);
            ControlFlow::Continue(())
        })?;
        buffered.sort_by(|a, b| compare_documents(a, b, sort_opts));
        for (emitted, doc) in buffered.into_iter().skip(plan.skip).enumerate() {
            if let Some(limit) = plan.limit {
                if emitted >= limit {
                    break;
                }
            }
            if consumer(doc).is_break() {
                break;
            }
        }
        Ok(())
    } else {
        let mut skipped = 0usize;
        let mut emitted = 0usize;
        collect(txn, collection, plan, now, |doc| {
            if skipped < plan.skip {
                skipped += 1;
                return ControlFlow::Continue(());
            }
            if let Some(limit) = plan.limit {
                if emitted >= limit {
                    return ControlFlow::Break(());
                }
            }
            emitted += 1;
            consumer(doc)
        })
    }
}
