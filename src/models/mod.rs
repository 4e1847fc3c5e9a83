//! Entity, request and response models for the todo API
//!
//! This module defines the persisted todo entity and the DTOs (Data
//! Transfer Objects) used for serializing/deserializing HTTP bodies.

pub mod entity;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use entity::TodoEntity;
pub use requests::{CreateTodoRequest, UpdateTodoRequest};
pub use responses::{ApiResponse, HealthResponse};
