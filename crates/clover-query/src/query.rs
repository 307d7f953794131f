//! The query builder (spec §4.4). Immutable: every combinator consumes
//! `self` and returns a fresh `Query`, matching the teacher's `Query`
//! value-type style.

use crate::criteria::Criterion;
use crate::sort::SortOption;

pub const UNLIMITED: isize = -1;

#[derive(Debug, Clone)]
pub struct Query {
    pub collection: String,
    pub criterion: Option<Criterion>,
    pub skip: usize,
    pub limit: isize,
    pub sort: Vec<SortOption>,
}

impl Query {
    pub fn new(collection: impl Into<String>) -> Query {
        Query {
            collection: collection.into(),
            criterion: None,
            skip: 0,
            limit: UNLIMITED,
            sort: Vec::new(),
        }
    }

    pub fn where_(mut self, criterion: Criterion) -> Query {
        self.criterion = Some(match self.criterion {
            Some(existing) => existing.and(criterion),
            None => criterion,
        });
        self
    }

    pub fn skip(mut self, n: usize) -> Query {
        self.skip = n;
        self
    }

    pub fn limit(mut self, n: isize) -> Query {
        self.limit = n;
        self
    }

    pub fn sort(mut self, options: Vec<SortOption>) -> Query {
        self.sort = options;
        self
    }

    pub fn match_func(self, predicate: impl Fn(&crate::value::Value) -> bool + Send + Sync + 'static) -> Query {
        self.where_(crate::criteria::field("").matches(move |doc| predicate(doc)))
    }
}
