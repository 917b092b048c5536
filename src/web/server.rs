//! HTTP server implementation.
//!
//! This module provides the axum-based HTTP server that exposes the task
//! store and history log as a JSON API, and serves the server-rendered
//! history pages.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::templates;
use crate::db::Database;
use crate::error::{ApiError, ErrorCode};
use crate::types::{HistoryOrder, Task};

/// Server state shared across handlers.
#[derive(Clone)]
pub struct ApiServer {
    /// Reference to the task database.
    db: Arc<Database>,
    /// Directory served under /static.
    static_dir: PathBuf,
}

impl ApiServer {
    /// Create a new server instance.
    pub fn new(db: Arc<Database>, static_dir: PathBuf) -> Self {
        Self { db, static_dir }
    }

    /// Get the database reference.
    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.code {
            ErrorCode::MissingRequiredField => StatusCode::BAD_REQUEST,
            ErrorCode::TaskNotFound => StatusCode::NOT_FOUND,
            ErrorCode::DuplicateTaskId => StatusCode::CONFLICT,
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(self)).into_response()
    }
}

/// Convert a storage-layer failure into its API error, logging it on the way.
fn request_failed(op: &'static str, err: anyhow::Error) -> ApiError {
    let api_err = ApiError::from(err);
    warn!(op, code = ?api_err.code, message = %api_err.message, "Request failed");
    api_err
}

/// Extract a required non-empty field, before any storage call.
fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, ApiError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::missing_field(field)),
    }
}

/// Success message response.
#[derive(serde::Serialize)]
struct MessageResponse {
    message: &'static str,
}

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Request body for task creation.
#[derive(Debug, Deserialize)]
struct CreateTaskRequest {
    id: Option<String>,
    text: Option<String>,
    status: Option<String>,
}

/// Request body for a status update.
#[derive(Debug, Deserialize)]
struct UpdateTaskRequest {
    status: Option<String>,
}

/// Request body for a direct history append.
#[derive(Debug, Deserialize)]
struct AppendHistoryRequest {
    action: Option<String>,
    timestamp: Option<String>,
}

/// Root endpoint - serves the playback page with the history list overlaid.
async fn playback_page(State(state): State<ApiServer>) -> Html<String> {
    let entries = state
        .db()
        .list_history(HistoryOrder::Insertion)
        .unwrap_or_default();

    let mut items = String::new();
    for entry in &entries {
        items.push_str(&format!(
            r#"<li class="history-entry">{} at {}</li>"#,
            html_escape(&entry.action),
            html_escape(&entry.timestamp)
        ));
    }

    Html(templates::PLAYBACK_TEMPLATE.replace("{{history_entries}}", &items))
}

/// Full-history page, most recent entry first.
async fn history_view_page(State(state): State<ApiServer>) -> Html<String> {
    let entries = state
        .db()
        .list_history(HistoryOrder::Reverse)
        .unwrap_or_default();

    let mut items = String::new();
    for entry in &entries {
        items.push_str(&format!(
            r#"<li><div>{}</div><div class="timestamp">{}</div></li>"#,
            html_escape(&entry.action),
            html_escape(&entry.timestamp)
        ));
    }

    Html(templates::HISTORY_TEMPLATE.replace("{{history_entries}}", &items))
}

/// List all tasks.
async fn list_tasks(State(state): State<ApiServer>) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state
        .db()
        .list_tasks()
        .map_err(|e| request_failed("list_tasks", e))?;
    Ok(Json(tasks))
}

/// Create a task.
async fn create_task(
    State(state): State<ApiServer>,
    Json(body): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = required(&body.id, "id")?;
    let text = required(&body.text, "text")?;
    let status = required(&body.status, "status")?;

    state
        .db()
        .create_task(id, text, status)
        .map_err(|e| request_failed("create_task", e))?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Task added",
        }),
    ))
}

/// Update a task's status.
async fn update_task(
    State(state): State<ApiServer>,
    Path(task_id): Path<String>,
    Json(body): Json<UpdateTaskRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let status = required(&body.status, "status")?;

    state
        .db()
        .update_status(&task_id, status)
        .map_err(|e| request_failed("update_task", e))?;

    Ok(Json(MessageResponse {
        message: "Task updated",
    }))
}

/// Delete a task.
async fn delete_task(
    State(state): State<ApiServer>,
    Path(task_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .db()
        .delete_task(&task_id)
        .map_err(|e| request_failed("delete_task", e))?;

    Ok(Json(MessageResponse {
        message: "Task deleted",
    }))
}

/// List history, most recent entry first.
async fn list_history(State(state): State<ApiServer>) -> Result<impl IntoResponse, ApiError> {
    let entries = state
        .db()
        .list_history(HistoryOrder::Reverse)
        .map_err(|e| request_failed("list_history", e))?;
    Ok(Json(entries))
}

/// Append a history entry with a caller-supplied timestamp.
async fn append_history(
    State(state): State<ApiServer>,
    Json(body): Json<AppendHistoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let action = required(&body.action, "action")?;
    let timestamp = required(&body.timestamp, "timestamp")?;

    state
        .db()
        .append_history(action, timestamp)
        .map_err(|e| request_failed("append_history", e))?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "History recorded",
        }),
    ))
}

/// Wipe both the task store and the history log.
async fn reset_all(State(state): State<ApiServer>) -> Result<Json<MessageResponse>, ApiError> {
    state.db().reset().map_err(|e| request_failed("reset", e))?;

    Ok(Json(MessageResponse {
        message: "All cleared",
    }))
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Build the router with all routes.
fn build_router(state: ApiServer) -> Router {
    // Permissive CORS, matching the blanket configuration the frontend expects
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        // Page routes
        .route("/", get(playback_page))
        .route("/history-view", get(history_view_page))
        // API routes
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{task_id}", put(update_task).delete(delete_task))
        .route("/history", get(list_history).post(append_history))
        .route("/reset", post(reset_all))
        .route("/api/health", get(health))
        .nest_service("/static", static_files)
        // Add middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server on the specified port, in the background.
///
/// Returns a oneshot sender that can be used to signal shutdown,
/// and the actual address the server is bound to.
pub async fn start_server(
    db: Arc<Database>,
    port: u16,
    static_dir: PathBuf,
) -> anyhow::Result<(oneshot::Sender<()>, SocketAddr)> {
    let state = ApiServer::new(db, static_dir);
    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("Server listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Server shutting down");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((shutdown_tx, bound_addr))
}

/// Run the HTTP server in the foreground until interrupted.
pub async fn serve(db: Arc<Database>, port: u16, static_dir: PathBuf) -> anyhow::Result<()> {
    let state = ApiServer::new(db, static_dir);
    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
