//! REST API server for the financial coach
//!
//! Exposes one demo chat session over HTTP. The session lives for the
//! lifetime of the server process and can be cleared by the client.
//!
//! History is never trimmed: it grows with every turn until
//! `DELETE /api/session`. Only the prompt window bounds what is sent to the
//! model.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::agent::Orchestrator;
use crate::models::Route;
use crate::session::{HistoryTurn, SessionContext};

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub route: Route,
    pub reply: String,
    pub caption: String,
    pub payload: Option<serde_json::Value>,
    pub turn_index: usize,
}

#[derive(Debug, Serialize)]
pub struct SessionView<'a> {
    pub session_id: uuid::Uuid,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub turns: &'a [HistoryTurn],
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<Orchestrator>,
    pub session: Arc<Mutex<SessionContext>>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Chat Endpoint
/// =============================

async fn chat_handler(
    State(state): State<ApiState>,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let message = req.message.trim();
    if message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Message must not be empty".into())),
        );
    }

    // One turn at a time per session
    let mut session = state.session.lock().await;
    let turn = state.orchestrator.handle_turn(&mut session, message).await;

    info!(route = %turn.route, turn = turn.turn_index, "Chat turn served");

    (
        StatusCode::OK,
        Json(ApiResponse::success(ChatResponse {
            route: turn.route,
            reply: turn.body,
            caption: turn.caption,
            payload: turn.payload,
            turn_index: turn.turn_index,
        })),
    )
}

/// =============================
/// Session Endpoints
/// =============================

async fn get_session(State(state): State<ApiState>) -> Json<ApiResponse> {
    let session = state.session.lock().await;
    Json(ApiResponse::success(SessionView {
        session_id: session.session_id,
        started_at: session.started_at,
        turns: session.history().turns(),
    }))
}

async fn reset_session(State(state): State<ApiState>) -> Json<ApiResponse> {
    let mut session = state.session.lock().await;
    session.clear();
    info!(session_id = %session.session_id, "Session cleared");

    Json(ApiResponse::success(serde_json::json!({
        "session_id": session.session_id,
    })))
}

/// =============================
/// Router
/// =============================

pub fn create_router(orchestrator: Arc<Orchestrator>) -> Router {
    let state = ApiState {
        orchestrator,
        session: Arc::new(Mutex::new(SessionContext::new())),
    };

    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat_handler))
        .route("/api/session", get(get_session).delete(reset_session))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(orchestrator: Arc<Orchestrator>, port: u16) -> crate::Result<()> {
    let router = create_router(orchestrator);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
