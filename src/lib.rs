//! Todo Table - A small todo-list service
//!
//! Exposes CRUD endpoints for todos kept in a partitioned table store and
//! periodically sweeps completed todos.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use repository::TodoRepository;
pub use tasks::{run_cleanup_sweep, spawn_cleanup_task};
