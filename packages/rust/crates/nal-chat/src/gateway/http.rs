//! HTTP gateway: POST /chat → chat engine → `{ "reply": ... }`.
//!
//! A missing or non-string `message` is treated as the empty string, which
//! yields the fallback answer rather than a 4xx. Embedding failures map to 500
//! and a request exceeding the timeout maps to 504.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use nal_faq::ChatEngine;
use serde::{Deserialize, Deserializer, Serialize};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tower_http::cors::CorsLayer;

/// Default timeout for one chat request.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Request body for POST /chat.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    /// User utterance; absent, null or non-string values become `""`.
    #[serde(default, deserialize_with = "lenient_message")]
    pub message: String,
}

fn lenient_message<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string())
}

/// Response body for POST /chat.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Shared state: engine + per-request timeout + optional concurrency limit.
#[derive(Clone)]
pub struct GatewayState {
    pub engine: Arc<ChatEngine>,
    pub request_timeout_secs: u64,
    /// When Some, excess requests wait for a slot within the request timeout.
    pub concurrency_semaphore: Option<Arc<Semaphore>>,
    pub max_concurrent_requests: Option<usize>,
}

impl GatewayState {
    /// State with a fresh semaphore when `max_concurrent_requests` is set.
    pub fn new(
        engine: Arc<ChatEngine>,
        request_timeout_secs: u64,
        max_concurrent_requests: Option<usize>,
    ) -> Self {
        Self {
            engine,
            request_timeout_secs,
            concurrency_semaphore: max_concurrent_requests.map(|n| Arc::new(Semaphore::new(n))),
            max_concurrent_requests,
        }
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct GatewayHealthResponse {
    pub status: &'static str,
    pub knowledge_entries: usize,
    pub embedding_provider: String,
    pub match_threshold: f32,
    pub request_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent_requests: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_flight_requests: Option<usize>,
}

async fn handle_chat(
    State(state): State<GatewayState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let started = Instant::now();
    let timeout_secs = state.request_timeout_secs;
    let timeout = Duration::from_secs(timeout_secs);
    let deadline = started.checked_add(timeout);
    // Waiting for a slot and spelling correction both count against the timeout.
    let work = async {
        let _permit = match state.concurrency_semaphore.as_ref() {
            Some(semaphore) => Some(semaphore.acquire().await.map_err(|_| {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "concurrency limit closed".to_string(),
                )
            })?),
            None => None,
        };
        let engine = Arc::clone(&state.engine);
        let message = body.message;
        let prepared = tokio::task::spawn_blocking(move || match deadline {
            Some(deadline) => engine.prepare_before(&message, deadline),
            None => Some(engine.prepare(&message)),
        })
        .await
        .map_err(|error| {
            tracing::warn!(
                event = "nal.gateway.chat.prepare_failed",
                error = %error,
                "chat normalization task failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
        })?;
        let Some(prepared) = prepared else {
            return Err(timed_out(timeout_secs));
        };
        state.engine.respond(prepared).await.map_err(|error| {
            tracing::warn!(
                event = "nal.gateway.chat.failed",
                error = %error,
                "chat request failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
        })
    };
    let reply = match tokio::time::timeout(timeout, work).await {
        Ok(result) => result?,
        Err(_) => return Err(timed_out(timeout_secs)),
    };
    tracing::info!(
        event = "nal.gateway.chat.completed",
        intent = reply.intent.as_str(),
        score = ?reply.score,
        matched = ?reply.matched,
        elapsed_ms = started.elapsed().as_millis(),
        "chat request completed"
    );
    Ok(Json(ChatResponse { reply: reply.reply }))
}

fn timed_out(timeout_secs: u64) -> (StatusCode, String) {
    tracing::warn!(
        event = "nal.gateway.chat.timeout",
        timeout_secs,
        "chat request timed out"
    );
    (
        StatusCode::GATEWAY_TIMEOUT,
        format!("chat request timed out after {timeout_secs}s"),
    )
}

async fn handle_health(State(state): State<GatewayState>) -> Json<GatewayHealthResponse> {
    let in_flight_requests = state.max_concurrent_requests.and_then(|max| {
        state
            .concurrency_semaphore
            .as_ref()
            .map(|semaphore| max.saturating_sub(semaphore.available_permits()))
    });
    Json(GatewayHealthResponse {
        status: "healthy",
        knowledge_entries: state.engine.knowledge().len(),
        embedding_provider: state.engine.embedder_name().to_string(),
        match_threshold: state.engine.matcher().threshold(),
        request_timeout_secs: state.request_timeout_secs,
        max_concurrent_requests: state.max_concurrent_requests,
        in_flight_requests,
    })
}

/// Build the gateway router (POST /chat, GET /health) with permissive CORS.
pub fn router(
    engine: Arc<ChatEngine>,
    request_timeout_secs: u64,
    max_concurrent_requests: Option<usize>,
) -> Router {
    router_with_state(GatewayState::new(
        engine,
        request_timeout_secs,
        max_concurrent_requests,
    ))
}

/// Build the gateway router around an existing state.
pub fn router_with_state(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/chat", post(handle_chat))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on `bind_addr` until Ctrl+C or SIGTERM; in-flight requests finish first.
pub async fn run_http(
    engine: Arc<ChatEngine>,
    bind_addr: &str,
    request_timeout_secs: Option<u64>,
    max_concurrent_requests: Option<usize>,
) -> Result<()> {
    let timeout = request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    let app = router(engine, timeout, max_concurrent_requests);
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!(
        event = "nal.gateway.listening",
        bind = bind_addr,
        request_timeout_secs = timeout,
        max_concurrent = %max_concurrent_requests
            .map_or_else(|| "unlimited".to_string(), |n| n.to_string()),
        "gateway listening (Ctrl+C/SIGTERM to stop)"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!(event = "nal.gateway.stopped", "gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %error, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
