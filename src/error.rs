//! Error types for the todo service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::ApiResponse;

// == Store Error Enum ==
/// Failures reported by a table store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No row exists for the given partition/row key
    #[error("Entity not found: {partition_key}/{row_key}")]
    NotFound {
        partition_key: String,
        row_key: String,
    },

    /// Insert collided with an existing row
    #[error("Entity already exists: {partition_key}/{row_key}")]
    Conflict {
        partition_key: String,
        row_key: String,
    },

    /// The supplied ETag no longer matches the stored row
    #[error("Precondition failed for {row_key}: etag {expected} is stale")]
    PreconditionFailed { row_key: String, expected: String },

    /// Entity could not be mapped to or from table properties
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Store is unreachable or refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

// == Todo Error Enum ==
/// Unified error type for the todo handlers.
#[derive(Error, Debug)]
pub enum TodoError {
    /// Request body missing, unparseable or incomplete
    #[error("Invalid request: {0}")]
    Validation(String),

    /// No todo with the requested id
    #[error("Todo not found: {0}")]
    NotFound(String),

    /// Underlying table store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TodoError {
    /// Message shown to callers. Store details are never exposed.
    pub fn public_message(&self) -> String {
        match self {
            TodoError::Validation(msg) => msg.clone(),
            TodoError::NotFound(_) => "Todo not found.".to_string(),
            TodoError::Store(StoreError::PreconditionFailed { .. }) => {
                "Todo was modified by another request.".to_string()
            }
            TodoError::Store(_) => "Internal server error.".to_string(),
        }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Not-found is a client error on this API, same as validation
            TodoError::Validation(_) | TodoError::NotFound(_) => StatusCode::BAD_REQUEST,
            TodoError::Store(StoreError::PreconditionFailed { .. }) => StatusCode::CONFLICT,
            TodoError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        match &self {
            TodoError::Validation(_) | TodoError::NotFound(_) => info!("{}", self),
            TodoError::Store(StoreError::PreconditionFailed { .. }) => warn!("{}", self),
            TodoError::Store(err) => error!(error = %err, "Table store operation failed"),
        }

        let status = self.status_code();
        let body = Json(ApiResponse::<()>::failure(self.public_message()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the todo handlers.
pub type Result<T> = std::result::Result<T, TodoError>;
