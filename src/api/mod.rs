//! API Module
//!
//! HTTP handlers and routing for the todo REST API.
//!
//! # Endpoints
//! - `POST /todo` - Create a todo
//! - `GET /todo` - List todos (first segment)
//! - `GET /todo/:id` - Get a todo by id
//! - `PUT /todo/:id` - Update a todo
//! - `DELETE /todo/:id` - Delete a todo
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
