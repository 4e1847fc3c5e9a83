//! API Handlers
//!
//! HTTP request handlers for each todo endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use tracing::info;

use crate::config::{CompletionUpdate, Config};
use crate::error::{Result, TodoError};
use crate::models::{
    ApiResponse, CreateTodoRequest, HealthResponse, TodoEntity, UpdateTodoRequest,
};
use crate::repository::TodoRepository;
use crate::store::{InMemoryTableStore, TableStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Todo access bound to the configured partition
    pub todos: TodoRepository,
    /// How updates treat an omitted `isCompleted`
    pub completion_update: CompletionUpdate,
}

impl AppState {
    /// Creates a new AppState with the given repository.
    pub fn new(todos: TodoRepository, completion_update: CompletionUpdate) -> Self {
        Self {
            todos,
            completion_update,
        }
    }

    /// Creates a new AppState over `store` using the partition, concurrency
    /// mode and update policy from the Config.
    pub fn with_store(store: Arc<dyn TableStore>, config: &Config) -> Self {
        Self::new(
            TodoRepository::from_config(store, config),
            config.completion_update,
        )
    }

    /// Creates a new AppState backed by an in-memory table sized from the Config.
    pub fn from_config(config: &Config) -> Self {
        let store = InMemoryTableStore::new(config.table_name.clone(), config.segment_size);
        Self::with_store(Arc::new(store), config)
    }
}

type TodoResponse = Json<ApiResponse<TodoEntity>>;

/// Handler for POST /todo
///
/// Stores a new, incomplete todo.
pub async fn create_todo_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<TodoResponse> {
    info!("Received a new todo.");

    // Unreadable bodies get the same answer as a missing description
    let req = payload.map(|Json(req)| req).unwrap_or_default();
    if let Some(error_msg) = req.validate() {
        return Err(TodoError::Validation(error_msg));
    }

    let todo = TodoEntity::new(
        state.todos.partition_key(),
        req.task_description.unwrap_or_default(),
    );
    let saved = state.todos.insert(&todo).await?;

    let message = "New todo stored in table";
    info!(id = %saved.row_key, "{}", message);

    Ok(Json(ApiResponse::success(message, saved)))
}

/// Handler for PUT /todo/:id
///
/// Updates the completion flag and, when given, the description.
pub async fn update_todo_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<TodoResponse> {
    info!("Update for todo: {}, received", id);

    let mut todo = state
        .todos
        .find(&id)
        .await?
        .ok_or_else(|| TodoError::NotFound(id.clone()))?;

    let Json(req) = payload.map_err(|rejection| {
        TodoError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    req.apply_to(&mut todo, state.completion_update);
    let saved = state.todos.replace(&todo).await?;

    let message = format!("todo: {}, update in table.", id);
    info!("{}", message);

    Ok(Json(ApiResponse::success(message, saved)))
}

/// Handler for GET /todo
///
/// Returns the first segment of todos; never fails on an empty table.
pub async fn list_todos_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TodoEntity>>>> {
    info!("Get all todos received.");

    let todos = state.todos.list_first_segment().await?;

    let message = "retrieve all todos.";
    info!(count = todos.len(), "{}", message);

    Ok(Json(ApiResponse::success(message, todos)))
}

/// Handler for GET /todo/:id
pub async fn get_todo_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<TodoResponse> {
    info!("Get todo by id {} received.", id);

    let todo = state
        .todos
        .find(&id)
        .await?
        .ok_or_else(|| TodoError::NotFound(id.clone()))?;

    let message = format!("todo: {}, retrieve", todo.row_key);
    info!("{}", message);

    Ok(Json(ApiResponse::success(message, todo)))
}

/// Handler for DELETE /todo/:id
///
/// Deletes the todo and echoes its last stored state.
pub async fn delete_todo_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<TodoResponse> {
    info!("Delete todo {} received.", id);

    let todo = state
        .todos
        .find(&id)
        .await?
        .ok_or_else(|| TodoError::NotFound(id.clone()))?;

    state.todos.delete(&todo).await?;

    let message = format!("todo: {}, deleted", todo.row_key);
    info!("{}", message);

    Ok(Json(ApiResponse::success(message, todo)))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
