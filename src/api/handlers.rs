//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::sse::sse_stream;
use super::types::{
    AppendedResponse, ErrorResponse, HealthResponse, MessageRequest, SessionResponse,
};
use super::AppState;
use crate::conversation::{Conversation, Turn, TurnLoopError};
use crate::session::SessionId;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Root serves the chat page
        .route("/", get(serve_spa))
        .route("/assets/*path", get(serve_static))
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/start", post(start_session))
        // Typed messages and quick-reply clicks
        .route("/api/sessions/:id/messages", post(send_message))
        // SSE streaming
        .route("/api/sessions/:id/stream", get(stream_session))
        .route("/health", get(health))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// SPA Handler
// ============================================================

async fn serve_spa() -> impl IntoResponse {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - UI not found</h1>".to_string()),
        )
            .into_response(),
    }
}

// ============================================================
// Sessions
// ============================================================

async fn create_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let conversation = state.sessions.create().await;
    Json(session_response(&conversation))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let conversation = find_session(&state, &id).await?;
    Ok(Json(session_response(&conversation)))
}

/// Drive the greeting exchange; a no-op once the conversation has begun
async fn start_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AppendedResponse>, AppError> {
    let conversation = find_session(&state, &id).await?;
    let turn_loop = state.sessions.turn_loop();

    let appended =
        run_to_completion(async move { turn_loop.start_conversation(&conversation).await })
            .await?;

    Ok(Json(AppendedResponse { appended }))
}

async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<MessageRequest>, JsonRejection>,
) -> Result<Json<AppendedResponse>, AppError> {
    let conversation = find_session(&state, &id).await?;
    let Json(req) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    tracing::info!(
        session_id = %conversation.session_id(),
        source = req.source.as_str(),
        "Message received"
    );

    let turn_loop = state.sessions.turn_loop();
    let appended = run_to_completion(async move {
        turn_loop
            .submit_user_text(&conversation, &req.text)
            .await
    })
    .await?;

    Ok(Json(AppendedResponse { appended }))
}

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let conversation = find_session(&state, &id).await?;
    let (snapshot, broadcast_rx) = conversation.snapshot_and_subscribe();

    Ok(sse_stream(conversation.session_id(), snapshot, broadcast_rx))
}

// ============================================================
// Health & Version
// ============================================================

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sessions: state.sessions.session_count().await,
    })
}

async fn get_version() -> &'static str {
    concat!("enquiry-chat ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Helpers
// ============================================================

async fn find_session(state: &AppState, id: &str) -> Result<Arc<Conversation>, AppError> {
    let not_found = || AppError::NotFound(format!("Session not found: {id}"));
    let session_id: SessionId = id.parse().map_err(|_| not_found())?;
    state.sessions.get(&session_id).await.ok_or_else(not_found)
}

fn session_response(conversation: &Conversation) -> SessionResponse {
    let snapshot = conversation.snapshot();
    SessionResponse {
        session_id: conversation.session_id(),
        turns: snapshot.turns,
        phase: snapshot.phase,
    }
}

/// Run a turn on its own task so a client disconnect cannot abandon it
/// half-way (leaving the conversation stuck in `Processing`).
async fn run_to_completion<F>(turn: F) -> Result<Vec<Turn>, AppError>
where
    F: std::future::Future<Output = Result<Vec<Turn>, TurnLoopError>> + Send + 'static,
{
    tokio::spawn(turn)
        .await
        .map_err(|e| AppError::Internal(format!("Turn task failed: {e}")))?
        .map_err(AppError::from)
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<TurnLoopError> for AppError {
    fn from(err: TurnLoopError) -> Self {
        match err {
            TurnLoopError::Busy => AppError::Conflict(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
