//! Query Module
//!
//! Filters, query options and segmented results.

use serde_json::Value;

use super::TableEntity;

// == Filter ==
/// Row predicate evaluated by the store.
///
/// A property comparison only matches rows that carry the property, so a
/// filter naming a property the entities never persist matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    PartitionKeyEq(String),
    PropertyEq { name: String, value: Value },
    And(Box<Filter>, Box<Filter>),
}

impl Filter {
    pub fn partition(partition_key: impl Into<String>) -> Self {
        Filter::PartitionKeyEq(partition_key.into())
    }

    pub fn property_eq(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::PropertyEq {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn and(self, other: Filter) -> Self {
        Filter::And(Box::new(self), Box::new(other))
    }

    pub fn matches(&self, entity: &TableEntity) -> bool {
        match self {
            Filter::PartitionKeyEq(pk) => entity.partition_key == *pk,
            Filter::PropertyEq { name, value } => entity.property(name) == Some(value),
            Filter::And(left, right) => left.matches(entity) && right.matches(entity),
        }
    }
}

// == Table Query ==
/// Query options. An empty query matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableQuery {
    pub filter: Option<Filter>,
}

impl TableQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn matches(&self, entity: &TableEntity) -> bool {
        self.filter.as_ref().map_or(true, |f| f.matches(entity))
    }
}

// == Segments ==
/// Position at which the next segment starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationToken {
    pub next_partition_key: String,
    pub next_row_key: String,
}

/// One page of query results.
#[derive(Debug, Clone, Default)]
pub struct QuerySegment {
    pub entities: Vec<TableEntity>,
    /// Present when more matching rows remain
    pub continuation: Option<ContinuationToken>,
}

impl QuerySegment {
    pub fn has_more(&self) -> bool {
        self.continuation.is_some()
    }
}
