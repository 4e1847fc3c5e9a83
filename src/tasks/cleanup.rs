//! Completed Todo Cleanup Task
//!
//! Background task that periodically deletes todos marked complete.

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::StoreError;
use crate::repository::TodoRepository;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Completed todos returned by the query
    pub matched: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Deletes the completed todos found in the first query segment.
///
/// Deletions run with at most `concurrency` in flight. A failed deletion is
/// logged and counted; the remaining ones still run. Only the initial query
/// failing aborts the sweep.
pub async fn run_cleanup_sweep(
    todos: &TodoRepository,
    concurrency: usize,
) -> Result<SweepReport, StoreError> {
    info!("Deleting completed todos, sweep started at {}", Utc::now());

    let completed = todos.completed_first_segment().await?;
    let matched = completed.len();

    let outcomes: Vec<(String, Result<(), StoreError>)> = stream::iter(completed)
        .map(|todo| async move {
            let outcome = todos.delete(&todo).await;
            (todo.row_key, outcome)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut report = SweepReport {
        matched,
        ..SweepReport::default()
    };
    for (id, outcome) in outcomes {
        match outcome {
            Ok(()) => report.deleted += 1,
            Err(e) => {
                warn!(id = %id, error = %e, "Failed to delete completed todo");
                report.failed += 1;
            }
        }
    }

    info!(
        matched = report.matched,
        failed = report.failed,
        "Deleted: {} items at: {}",
        report.deleted,
        Utc::now()
    );
    Ok(report)
}

/// Time from `now` to the next multiple of `interval_secs` since the Unix
/// epoch. An instant exactly on a boundary waits a full interval.
pub fn delay_until_next_tick(now: DateTime<Utc>, interval_secs: u64) -> Duration {
    let interval_ms = interval_secs.max(1).saturating_mul(1000);
    let now_ms = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    Duration::from_millis(interval_ms - now_ms % interval_ms)
}

/// Spawns a background task that sweeps completed todos on a wall-clock
/// aligned schedule (every `interval_secs`, on the boundary).
///
/// # Arguments
/// * `todos` - Repository bound to the todo partition
/// * `interval_secs` - Seconds between sweeps
/// * `concurrency` - Maximum deletions in flight per sweep
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_cleanup_task(state.todos.clone(), 120, 4);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task(
    todos: TodoRepository,
    interval_secs: u64,
    concurrency: usize,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting completed todo cleanup with interval of {} seconds",
            interval_secs
        );

        loop {
            tokio::time::sleep(delay_until_next_tick(Utc::now(), interval_secs)).await;

            match run_cleanup_sweep(&todos, concurrency).await {
                Ok(report) if report.matched == 0 => {
                    debug!("Cleanup: no completed todos found");
                }
                Ok(_) => {}
                Err(e) => error!(error = %e, "Cleanup sweep could not query completed todos"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::TimeZone;

    use crate::config::ConcurrencyMode;
    use crate::models::TodoEntity;
    use crate::store::{
        ContinuationToken, ETagCondition, EntityKey, InMemoryTableStore, QuerySegment,
        StoreResult, TableEntity, TableQuery, TableStore,
    };

    /// Store whose deletes fail for selected row keys.
    struct FailingDeletes {
        inner: InMemoryTableStore,
        failing: HashSet<String>,
    }

    #[async_trait]
    impl TableStore for FailingDeletes {
        async fn retrieve(&self, pk: &str, rk: &str) -> StoreResult<Option<TableEntity>> {
            self.inner.retrieve(pk, rk).await
        }

        async fn query_segmented(
            &self,
            query: &TableQuery,
            continuation: Option<ContinuationToken>,
        ) -> StoreResult<QuerySegment> {
            self.inner.query_segmented(query, continuation).await
        }

        async fn insert(&self, entity: TableEntity) -> StoreResult<TableEntity> {
            self.inner.insert(entity).await
        }

        async fn replace(
            &self,
            entity: TableEntity,
            condition: ETagCondition,
        ) -> StoreResult<TableEntity> {
            self.inner.replace(entity, condition).await
        }

        async fn delete(&self, key: &EntityKey, condition: ETagCondition) -> StoreResult<()> {
            if self.failing.contains(&key.row_key) {
                return Err(StoreError::Unavailable("throttled".to_string()));
            }
            self.inner.delete(key, condition).await
        }
    }

    fn repository() -> (Arc<InMemoryTableStore>, TodoRepository) {
        let store = Arc::new(InMemoryTableStore::default());
        let todos = TodoRepository::new(store.clone(), "TODO", ConcurrencyMode::LastWriteWins);
        (store, todos)
    }

    async fn seed(todos: &TodoRepository, description: &str, completed: bool) -> TodoEntity {
        let mut todo = TodoEntity::new("TODO", description);
        todo.is_completed = completed;
        todos.insert(&todo).await.unwrap()
    }

    #[tokio::test]
    async fn test_sweep_deletes_only_completed() {
        let (_, todos) = repository();
        let done = seed(&todos, "done", true).await;
        let open = seed(&todos, "open", false).await;

        let report = run_cleanup_sweep(&todos, 4).await.unwrap();
        assert_eq!(
            report,
            SweepReport {
                matched: 1,
                deleted: 1,
                failed: 0
            }
        );

        assert!(todos.find(&done.row_key).await.unwrap().is_none());
        assert!(todos.find(&open.row_key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sweep_on_empty_table() {
        let (store, todos) = repository();

        let report = run_cleanup_sweep(&todos, 4).await.unwrap();
        assert_eq!(report, SweepReport::default());
        assert_eq!(store.stats().await.deletes, 0);
    }

    #[tokio::test]
    async fn test_sweep_continues_past_failed_deletes() {
        let inner = InMemoryTableStore::default();
        let mut failing = HashSet::new();
        for i in 0..5 {
            let mut todo = TodoEntity::new("TODO", format!("done {}", i));
            todo.is_completed = true;
            if i == 1 || i == 3 {
                failing.insert(todo.row_key.clone());
            }
            inner.insert(todo.to_table_entity()).await.unwrap();
        }

        let store = Arc::new(FailingDeletes { inner, failing });
        let todos = TodoRepository::new(store.clone(), "TODO", ConcurrencyMode::LastWriteWins);

        let report = run_cleanup_sweep(&todos, 2).await.unwrap();
        assert_eq!(report.matched, 5);
        assert_eq!(report.deleted, 3);
        assert_eq!(report.failed, 2);
        assert_eq!(store.inner.len().await, 2);
    }

    #[tokio::test]
    async fn test_sweep_serial_when_concurrency_zero() {
        let (_, todos) = repository();
        for i in 0..3 {
            seed(&todos, &format!("done {}", i), true).await;
        }

        let report = run_cleanup_sweep(&todos, 0).await.unwrap();
        assert_eq!(report.deleted, 3);
    }

    #[test]
    fn test_delay_until_next_tick() {
        let at = |h, m, s| Utc.with_ymd_and_hms(2024, 5, 1, h, m, s).unwrap();

        assert_eq!(delay_until_next_tick(at(10, 0, 30), 120), Duration::from_secs(90));
        assert_eq!(delay_until_next_tick(at(10, 1, 59), 120), Duration::from_secs(1));
        assert_eq!(delay_until_next_tick(at(10, 2, 0), 120), Duration::from_secs(120));
        assert_eq!(delay_until_next_tick(at(10, 2, 0), 0), Duration::from_secs(1));
    }

    #[test]
    fn test_delay_until_next_tick_huge_interval() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let now_ms = now.timestamp_millis() as u64;

        let delay = delay_until_next_tick(now, u64::MAX / 10);
        assert_eq!(delay, Duration::from_millis(u64::MAX - now_ms % u64::MAX));
        assert!(delay > Duration::from_secs(86_400 * 365));
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_completed_todos() {
        let (_, todos) = repository();
        let done = seed(&todos, "done", true).await;

        // Spawn cleanup task with 1 second interval
        let handle = spawn_cleanup_task(todos.clone(), 1, 4);

        // Wait for at least one sweep
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(
            todos.find(&done.row_key).await.unwrap().is_none(),
            "Completed todo should have been swept"
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_open_todos() {
        let (_, todos) = repository();
        let open = seed(&todos, "open", false).await;

        let handle = spawn_cleanup_task(todos.clone(), 1, 4);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(
            todos.find(&open.row_key).await.unwrap().is_some(),
            "Open todo should not be removed"
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let (_, todos) = repository();

        let handle = spawn_cleanup_task(todos, 1, 4);

        // Abort immediately
        handle.abort();

        // Wait a bit and verify task is finished
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
