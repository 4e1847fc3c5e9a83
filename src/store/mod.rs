//! Table Store Module
//!
//! Keyed, partitioned entity storage. Rows are addressed by
//! (partition key, row key), carry an ETag that changes on every write,
//! and are scanned in segments.

mod entity;
mod memory;
mod query;
mod stats;


use async_trait::async_trait;

use crate::error::StoreError;

// Re-export public types
pub use entity::{ETagCondition, EntityKey, TableEntity};
pub use memory::InMemoryTableStore;
pub use query::{ContinuationToken, Filter, QuerySegment, TableQuery};
pub use stats::StoreStats;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Maximum entities a single query segment may hold.
pub const MAX_SEGMENT_SIZE: usize = 1000;

// == Table Store Trait ==
/// Operations offered by a partitioned table store.
///
/// Writes return the entity as stored, with the ETag and timestamp the
/// store assigned.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Point lookup. `Ok(None)` when no row has this key.
    async fn retrieve(&self, partition_key: &str, row_key: &str)
        -> StoreResult<Option<TableEntity>>;

    /// Returns one segment of the rows matching `query`, starting at
    /// `continuation` when given.
    async fn query_segmented(
        &self,
        query: &TableQuery,
        continuation: Option<ContinuationToken>,
    ) -> StoreResult<QuerySegment>;

    /// Inserts a new row. Fails with `Conflict` if the key is taken.
    async fn insert(&self, entity: TableEntity) -> StoreResult<TableEntity>;

    /// Replaces an existing row. Fails with `NotFound` if it is missing
    /// and `PreconditionFailed` if `condition` rejects its ETag.
    async fn replace(
        &self,
        entity: TableEntity,
        condition: ETagCondition,
    ) -> StoreResult<TableEntity>;

    /// Deletes an existing row, with the same failure modes as `replace`.
    async fn delete(&self, key: &EntityKey, condition: ETagCondition) -> StoreResult<()>;
}
