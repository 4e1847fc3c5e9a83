//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cleanup: Deletes completed todos on a wall-clock aligned interval

mod cleanup;

pub use cleanup::{delay_until_next_tick, run_cleanup_sweep, spawn_cleanup_task, SweepReport};
