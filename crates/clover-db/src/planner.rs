//! Query planner (spec §4.5): turns a prepared criterion plus the
//! collection's indexed fields into a linear plan — one input node,
//! optionally a Sort node, then skip/limit — the storage layer's
//! [`crate::executor`] runs against.

use std::collections::HashSet;

use clover_query::{prepare, Criterion, Interval, Query, SortDirection, SortOption};

use crate::error::Result;

#[derive(Debug, Clone)]
pub enum PlanNode {
    /// A chosen index, an optional range over it, and a scan direction.
    /// `range` is `Interval::full()` when the criterion didn't narrow it —
    /// the index was still picked because it absorbed the requested sort.
    IndexScan {
        field: String,
        range: Interval,
        reverse: bool,
    },
    CollectionScan,
}

#[derive(Debug, Clone)]
pub struct Plan {
    pub input: PlanNode,
    /// Re-applied to every surviving candidate regardless of node: an
    /// index is only ever a coarse filter, and a collection scan has no
    /// filter of its own.
    pub criterion: Option<Criterion>,
    /// `Some` iff a Sort node must materialize the candidates and reorder
    /// them — `None` when no sort was requested, or the chosen input node
    /// already emits them in the requested order.
    pub sort: Option<Vec<SortOption>>,
    pub skip: usize,
    pub limit: Option<usize>,
}

/// Builds a [`Plan`] for `query` against a collection whose indexed fields
/// are `indexed_fields`.
///
/// An unsorted query (`query.sort` empty) never gets a Sort node — a
/// `CollectionScan` happens to already emit documents in ascending `_id`
/// order, since document keys sort lexicographically by id, which is what
/// the spec's "default sort is `_id` ascending" describes. An `IndexScan`
/// chosen purely to narrow an unsorted query emits in that field's order
/// instead; no sort is requested, so no node reorders it.
pub fn plan_query(query: &Query, indexed_fields: &HashSet<String>) -> Result<Plan> {
    let prepared = query
        .criterion
        .as_ref()
        .map(|c| prepare(c.clone(), indexed_fields))
        .transpose()?;

    let sort_options = &query.sort;

    let (input, emit_sorted) = match prepared.as_ref().and_then(|p| p.index_field.clone()) {
        Some(field) => {
            let range = prepared
                .as_ref()
                .unwrap()
                .range
                .clone()
                .unwrap_or_else(Interval::full);
            if sort_options.len() == 1 && sort_options[0].field == field {
                let reverse = sort_options[0].direction == SortDirection::Desc;
                (PlanNode::IndexScan { field, range, reverse }, true)
            } else {
                (
                    PlanNode::IndexScan {
                        field,
                        range,
                        reverse: false,
                    },
                    false,
                )
            }
        }
        None if sort_options.len() == 1 && indexed_fields.contains(&sort_options[0].field) => {
            let field = sort_options[0].field.clone();
            let reverse = sort_options[0].direction == SortDirection::Desc;
            (
                PlanNode::IndexScan {
                    field,
                    range: Interval::full(),
                    reverse,
                },
                true,
            )
        }
        None => (PlanNode::CollectionScan, false),
    };

    let sort = if !sort_options.is_empty() && !emit_sorted {
        Some(sort_options.clone())
    } else {
        None
    };

    Ok(Plan {
        input,
        criterion: prepared.map(|p| p.criterion),
        sort,
        skip: query.skip,
        limit: if query.limit < 0 {
            None
        } else {
            Some(query.limit as usize)
        },
    })
}
