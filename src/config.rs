//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// How writes treat the entity's ETag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyMode {
    /// Writes use the wildcard ETag; concurrent updates race and the last one wins
    #[default]
    LastWriteWins,
    /// Writes carry the ETag that was read; stale writes are rejected
    Optimistic,
}

impl FromStr for ConcurrencyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last-write-wins" | "lww" => Ok(ConcurrencyMode::LastWriteWins),
            "optimistic" => Ok(ConcurrencyMode::Optimistic),
            other => Err(format!("unknown concurrency mode '{}'", other)),
        }
    }
}

/// What an update does with `isCompleted` when the body omits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionUpdate {
    /// An omitted flag is read as `false` and written
    #[default]
    Overwrite,
    /// An omitted flag leaves the stored value unchanged
    Preserve,
}

impl FromStr for CompletionUpdate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(CompletionUpdate::Overwrite),
            "preserve" => Ok(CompletionUpdate::Preserve),
            other => Err(format!("unknown completion update policy '{}'", other)),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Name of the table holding todos
    pub table_name: String,
    /// Partition key shared by every todo
    pub partition_key: String,
    /// Cleanup sweep interval in seconds
    pub cleanup_interval: u64,
    /// Maximum deletions in flight during a sweep
    pub cleanup_concurrency: usize,
    /// Maximum entities returned per query segment
    pub segment_size: usize,
    pub concurrency_mode: ConcurrencyMode,
    pub completion_update: CompletionUpdate,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `TODO_TABLE_NAME` - Table name (default: todo)
    /// - `TODO_PARTITION_KEY` - Partition for all todos (default: TODO)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 120)
    /// - `CLEANUP_CONCURRENCY` - Deletions in flight per sweep (default: 4)
    /// - `STORE_SEGMENT_SIZE` - Entities per query segment (default: 1000)
    /// - `CONCURRENCY_MODE` - `last-write-wins` or `optimistic` (default: last-write-wins)
    /// - `COMPLETION_UPDATE` - `overwrite` or `preserve` (default: overwrite)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            table_name: non_empty_var("TODO_TABLE_NAME").unwrap_or(defaults.table_name),
            partition_key: non_empty_var("TODO_PARTITION_KEY").unwrap_or(defaults.partition_key),
            cleanup_interval: parse_var("CLEANUP_INTERVAL")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.cleanup_interval),
            cleanup_concurrency: parse_var("CLEANUP_CONCURRENCY")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.cleanup_concurrency),
            segment_size: parse_var("STORE_SEGMENT_SIZE")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.segment_size),
            concurrency_mode: parse_var("CONCURRENCY_MODE").unwrap_or(defaults.concurrency_mode),
            completion_update: parse_var("COMPLETION_UPDATE")
                .unwrap_or(defaults.completion_update),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            table_name: "todo".to_string(),
            partition_key: "TODO".to_string(),
            cleanup_interval: 120,
            cleanup_concurrency: 4,
            segment_size: 1000,
            concurrency_mode: ConcurrencyMode::LastWriteWins,
            completion_update: CompletionUpdate::Overwrite,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
