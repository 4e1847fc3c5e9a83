//! In-Memory Table Store Module
//!
//! Process-local table store with the same key, ETag and segmenting
//! behavior as a managed table service.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    ContinuationToken, ETagCondition, EntityKey, QuerySegment, StoreResult, StoreStats,
    TableEntity, TableQuery, TableStore, MAX_SEGMENT_SIZE,
};
use crate::error::StoreError;

type RowKey = (String, String);

#[derive(Debug, Default)]
struct TableState {
    /// Rows ordered by (partition key, row key)
    rows: BTreeMap<RowKey, TableEntity>,
    stats: StoreStats,
    /// Last version handed out as an ETag
    version: u64,
}

impl TableState {
    /// Assigns a fresh ETag and timestamp.
    fn stamp(&mut self, entity: &mut TableEntity) {
        self.version += 1;
        entity.etag = Some(format!("W/\"{}\"", self.version));
        entity.timestamp = Some(Utc::now());
    }

    /// Checks that `key` exists and that `condition` accepts its ETag.
    fn check_write(&self, key: &RowKey, condition: &ETagCondition) -> StoreResult<()> {
        let current = self.rows.get(key).ok_or_else(|| StoreError::NotFound {
            partition_key: key.0.clone(),
            row_key: key.1.clone(),
        })?;

        if !condition.permits(current.etag.as_deref()) {
            return Err(StoreError::PreconditionFailed {
                row_key: key.1.clone(),
                expected: condition.as_str().to_string(),
            });
        }
        Ok(())
    }
}

// == In-Memory Table Store ==
/// Table store held in process memory.
#[derive(Debug)]
pub struct InMemoryTableStore {
    table_name: String,
    segment_size: usize,
    state: RwLock<TableState>,
    /// Read counters live outside the lock so reads only take a shared guard
    point_reads: AtomicU64,
    queries: AtomicU64,
}

impl InMemoryTableStore {
    // == Constructor ==
    /// Creates an empty table.
    ///
    /// # Arguments
    /// * `table_name` - Name used in log output
    /// * `segment_size` - Maximum entities per query segment, clamped to
    ///   `1..=MAX_SEGMENT_SIZE`
    pub fn new(table_name: impl Into<String>, segment_size: usize) -> Self {
        Self {
            table_name: table_name.into(),
            segment_size: segment_size.clamp(1, MAX_SEGMENT_SIZE),
            state: RwLock::new(TableState::default()),
            point_reads: AtomicU64::new(0),
            queries: AtomicU64::new(0),
        }
    }

    pub fn segment_size(&self) -> usize {
        self.segment_size
    }

    /// Returns a snapshot of the operation counters.
    pub async fn stats(&self) -> StoreStats {
        let mut stats = self.state.read().await.stats.clone();
        stats.point_reads = self.point_reads.load(Ordering::Relaxed);
        stats.queries = self.queries.load(Ordering::Relaxed);
        stats
    }

    /// Number of rows across all partitions.
    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.rows.is_empty()
    }
}

impl Default for InMemoryTableStore {
    fn default() -> Self {
        Self::new("todo", MAX_SEGMENT_SIZE)
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn retrieve(
        &self,
        partition_key: &str,
        row_key: &str,
    ) -> StoreResult<Option<TableEntity>> {
        self.point_reads.fetch_add(1, Ordering::Relaxed);
        let state = self.state.read().await;

        let key = (partition_key.to_string(), row_key.to_string());
        Ok(state.rows.get(&key).cloned())
    }

    async fn query_segmented(
        &self,
        query: &TableQuery,
        continuation: Option<ContinuationToken>,
    ) -> StoreResult<QuerySegment> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        let state = self.state.read().await;

        let lower = match continuation {
            Some(token) => Bound::Included((token.next_partition_key, token.next_row_key)),
            None => Bound::Unbounded,
        };

        let mut matching = state
            .rows
            .range((lower, Bound::Unbounded))
            .map(|(_, entity)| entity)
            .filter(|entity| query.matches(entity));

        let entities: Vec<TableEntity> =
            matching.by_ref().take(self.segment_size).cloned().collect();
        let continuation = matching.next().map(|next| ContinuationToken {
            next_partition_key: next.partition_key.clone(),
            next_row_key: next.row_key.clone(),
        });

        debug!(
            table = %self.table_name,
            returned = entities.len(),
            more = continuation.is_some(),
            "Query segment served"
        );

        Ok(QuerySegment {
            entities,
            continuation,
        })
    }

    async fn insert(&self, mut entity: TableEntity) -> StoreResult<TableEntity> {
        let mut state = self.state.write().await;

        let key = (entity.partition_key.clone(), entity.row_key.clone());
        if state.rows.contains_key(&key) {
            return Err(StoreError::Conflict {
                partition_key: key.0,
                row_key: key.1,
            });
        }

        state.stamp(&mut entity);
        state.rows.insert(key, entity.clone());
        state.stats.record_insert();
        Ok(entity)
    }

    async fn replace(
        &self,
        mut entity: TableEntity,
        condition: ETagCondition,
    ) -> StoreResult<TableEntity> {
        let mut state = self.state.write().await;

        let key = (entity.partition_key.clone(), entity.row_key.clone());
        state.check_write(&key, &condition)?;

        state.stamp(&mut entity);
        state.rows.insert(key, entity.clone());
        state.stats.record_replace();
        Ok(entity)
    }

    async fn delete(&self, key: &EntityKey, condition: ETagCondition) -> StoreResult<()> {
        let mut state = self.state.write().await;

        let row = (key.partition_key.clone(), key.row_key.clone());
        state.check_write(&row, &condition)?;

        state.rows.remove(&row);
        state.stats.record_delete();
        Ok(())
    }
}
