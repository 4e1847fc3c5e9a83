//! Todo Repository
//!
//! Binds a table store to the configured todo partition and maps rows to
//! `TodoEntity` values.

use std::sync::Arc;

use tracing::debug;

use crate::config::{Config, ConcurrencyMode};
use crate::models::TodoEntity;
use crate::store::{ETagCondition, Filter, StoreResult, TableQuery, TableStore};

/// Todo access over a single partition of a table store.
#[derive(Clone)]
pub struct TodoRepository {
    store: Arc<dyn TableStore>,
    partition_key: String,
    mode: ConcurrencyMode,
}

impl TodoRepository {
    pub fn new(
        store: Arc<dyn TableStore>,
        partition_key: impl Into<String>,
        mode: ConcurrencyMode,
    ) -> Self {
        Self {
            store,
            partition_key: partition_key.into(),
            mode,
        }
    }

    pub fn from_config(store: Arc<dyn TableStore>, config: &Config) -> Self {
        Self::new(store, config.partition_key.clone(), config.concurrency_mode)
    }

    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    /// Point lookup by row key.
    pub async fn find(&self, id: &str) -> StoreResult<Option<TodoEntity>> {
        self.store
            .retrieve(&self.partition_key, id)
            .await?
            .map(TodoEntity::try_from)
            .transpose()
    }

    /// First query segment of every todo in the partition.
    ///
    /// Later segments are not fetched.
    pub async fn list_first_segment(&self) -> StoreResult<Vec<TodoEntity>> {
        self.first_segment(TableQuery::new().filter(Filter::partition(&self.partition_key)))
            .await
    }

    /// First query segment of the completed todos in the partition.
    pub async fn completed_first_segment(&self) -> StoreResult<Vec<TodoEntity>> {
        let filter = Filter::partition(&self.partition_key)
            .and(Filter::property_eq(TodoEntity::IS_COMPLETED, true));
        self.first_segment(TableQuery::new().filter(filter)).await
    }

    /// Stores a new todo unconditionally.
    pub async fn insert(&self, todo: &TodoEntity) -> StoreResult<TodoEntity> {
        let saved = self.store.insert(todo.to_table_entity()).await?;
        TodoEntity::try_from(saved)
    }

    /// Replaces a stored todo, honouring the concurrency mode.
    pub async fn replace(&self, todo: &TodoEntity) -> StoreResult<TodoEntity> {
        let saved = self
            .store
            .replace(todo.to_table_entity(), self.condition_for(todo))
            .await?;
        TodoEntity::try_from(saved)
    }

    /// Deletes a stored todo, honouring the concurrency mode.
    pub async fn delete(&self, todo: &TodoEntity) -> StoreResult<()> {
        let row = todo.to_table_entity();
        self.store
            .delete(&row.key(), self.condition_for(todo))
            .await
    }

    fn condition_for(&self, todo: &TodoEntity) -> ETagCondition {
        match self.mode {
            ConcurrencyMode::LastWriteWins => ETagCondition::Any,
            ConcurrencyMode::Optimistic => ETagCondition::from_etag(todo.etag.as_deref()),
        }
    }

    async fn first_segment(&self, query: TableQuery) -> StoreResult<Vec<TodoEntity>> {
        let segment = self.store.query_segmented(&query, None).await?;
        if segment.has_more() {
            debug!(
                partition = %self.partition_key,
                returned = segment.entities.len(),
                "Query has further segments that are not fetched"
            );
        }

        segment
            .entities
            .into_iter()
            .map(TodoEntity::try_from)
            .collect()
    }
}
