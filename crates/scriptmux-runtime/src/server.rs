//! HTTP server: JSON endpoints plus the per-session output event stream.

use std::convert::Infallible;
use std::future::Future;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

use scriptmux_supervisor::{ExecutionResult, StreamEvent, Supervisor, SupervisorError};
use scriptmux_tmux::{PaneTarget, Session};

#[derive(Clone)]
struct AppState {
    supervisor: Supervisor,
}

pub fn build_router(supervisor: Supervisor) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/scripts/run", post(run_script))
        .route("/api/sessions", get(list_sessions).post(start_session))
        .route("/api/sessions/:name", delete(kill_session))
        .route("/api/sessions/:name/output", get(session_output))
        .route("/api/sessions/:name/stream", get(stream_output))
        .route("/api/lists/:list", get(read_list).put(write_list))
        .with_state(AppState { supervisor })
}

/// Serve until `shutdown` resolves. Open streams end with the server.
pub async fn serve(
    listener: TcpListener,
    supervisor: Supervisor,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let app = build_router(supervisor);
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(addr = %addr, "http server listening");
    }
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
}

#[derive(Debug, Serialize)]
struct ApiErrorBody<'a> {
    error: &'a str,
    message: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                Json(ApiErrorBody {
                    error: "not_found",
                    message: Some(msg),
                }),
            )
                .into_response(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Outcome {
    success: bool,
    message: String,
}

async fn health_check() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct RunRequest {
    path: String,
}

async fn run_script(
    State(state): State<AppState>,
    Json(req): Json<RunRequest>,
) -> Json<ExecutionResult> {
    Json(state.supervisor.execute(&req.path).await)
}

async fn list_sessions(State(state): State<AppState>) -> Json<Vec<Session>> {
    Json(state.supervisor.list_sessions().await)
}

#[derive(Debug, Deserialize)]
struct StartRequest {
    name: String,
    command: String,
}

async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartRequest>,
) -> Json<Outcome> {
    let outcome = match state.supervisor.start_session(&req.name, &req.command).await {
        Ok(()) => Outcome {
            success: true,
            message: format!("Session {} started", req.name),
        },
        Err(e) => Outcome {
            success: false,
            message: format!("Failed to start session: {e}"),
        },
    };
    Json(outcome)
}

async fn kill_session(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<serde_json::Value> {
    let success = state.supervisor.kill_session(&name).await;
    Json(serde_json::json!({ "success": success }))
}

#[derive(Debug, Default, Deserialize)]
struct PaneQuery {
    window: Option<u32>,
    pane: Option<u32>,
}

impl PaneQuery {
    fn target(&self, session: String) -> PaneTarget {
        PaneTarget::session(session)
            .with_window(self.window.unwrap_or(0))
            .with_pane(self.pane.unwrap_or(0))
    }
}

async fn session_output(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<PaneQuery>,
) -> Json<serde_json::Value> {
    let output = state.supervisor.snapshot(&query.target(name)).await;
    Json(serde_json::json!({ "output": output }))
}

fn to_sse_event(event: StreamEvent) -> Event {
    match event {
        StreamEvent::Output(payload) => Event::default().data(payload),
        StreamEvent::Error(payload) => Event::default().event("error").data(payload),
    }
}

/// Keep-alive comments make a silent stream notice a vanished client
/// without waiting for the pane to change.
async fn stream_output(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<PaneQuery>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!(session = %name, "stream requested");
    let rx = state.supervisor.stream(query.target(name));
    let stream = ReceiverStream::new(rx).map(|event| Ok(to_sse_event(event)));
    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[derive(Debug, Serialize)]
struct ListBody {
    name: String,
    entries: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ListUpdate {
    entries: Vec<String>,
}

async fn read_list(
    State(state): State<AppState>,
    Path(list): Path<String>,
) -> Result<Json<ListBody>, ApiError> {
    match state.supervisor.read_list(&list).await {
        Ok(entries) => Ok(Json(ListBody {
            name: list,
            entries,
        })),
        Err(e) => Err(ApiError::NotFound(e.to_string())),
    }
}

async fn write_list(
    State(state): State<AppState>,
    Path(list): Path<String>,
    Json(update): Json<ListUpdate>,
) -> Result<Json<Outcome>, ApiError> {
    match state.supervisor.write_list(&list, &update.entries).await {
        Ok(_) => Ok(Json(Outcome {
            success: true,
            message: format!("{list} updated successfully"),
        })),
        Err(e @ SupervisorError::ListNotConfigured(_)) => Err(ApiError::NotFound(e.to_string())),
        Err(e) => {
            tracing::warn!(list = %list, error = %e, "list update failed");
            Ok(Json(Outcome {
                success: false,
                message: format!("Error updating {list}: {e}"),
            }))
        }
    }
}
