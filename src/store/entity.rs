//! Table Entity Module
//!
//! Generic row representation: system keys plus a bag of JSON properties.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Wildcard ETag accepted by unconditional writes.
pub const WILDCARD_ETAG: &str = "*";

// == Entity Key ==
/// Compound identity of a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey {
    pub partition_key: String,
    pub row_key: String,
}

impl EntityKey {
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.partition_key, self.row_key)
    }
}

// == ETag Condition ==
/// Precondition attached to a replace or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ETagCondition {
    /// Write regardless of the stored version
    Any,
    /// Write only if the stored ETag equals this one
    Matches(String),
}

impl ETagCondition {
    /// Builds a condition from an entity's ETag. A missing or wildcard
    /// ETag means unconditional.
    pub fn from_etag(etag: Option<&str>) -> Self {
        match etag {
            Some(tag) if tag != WILDCARD_ETAG => ETagCondition::Matches(tag.to_string()),
            _ => ETagCondition::Any,
        }
    }

    /// Returns true if a row currently at `current` may be written.
    pub fn permits(&self, current: Option<&str>) -> bool {
        match self {
            ETagCondition::Any => true,
            ETagCondition::Matches(expected) => current == Some(expected.as_str()),
        }
    }

    /// ETag text as it would appear in an `If-Match` header.
    pub fn as_str(&self) -> &str {
        match self {
            ETagCondition::Any => WILDCARD_ETAG,
            ETagCondition::Matches(tag) => tag,
        }
    }
}

// == Table Entity ==
/// A stored row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntity {
    pub partition_key: String,
    pub row_key: String,
    /// Version marker, assigned by the store on every write
    pub etag: Option<String>,
    /// Last-modified instant, assigned by the store on every write
    pub timestamp: Option<DateTime<Utc>>,
    /// User properties
    pub properties: Map<String, Value>,
}

impl TableEntity {
    /// Creates an unsaved entity with no properties.
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            etag: None,
            timestamp: None,
            properties: Map::new(),
        }
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.partition_key.clone(), self.row_key.clone())
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Builder-style property setter.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}
