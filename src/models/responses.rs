//! Response DTOs for the todo API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

/// Envelope wrapping every todo endpoint's output.
///
/// `result` holds a single todo, a list of todos, or is omitted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub is_success: bool,
    /// Human-readable outcome
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Creates a successful envelope carrying `result`
    pub fn success(message: impl Into<String>, result: T) -> Self {
        Self {
            is_success: true,
            message: message.into(),
            result: Some(result),
        }
    }

    /// Creates a failed envelope with no result
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            message: message.into(),
            result: None,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
