//! Embedding client transport selection, MCP fallback and response validation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use nal_chat::EmbeddingClient;
use nal_faq::{Embedder, FaqError};
use serde_json::json;

#[derive(Clone, Copy)]
enum HttpMode {
    Ok,
    Fail,
    WrongCount,
}

#[derive(Clone)]
struct EmbedTestState {
    http_mode: HttpMode,
    http_calls: Arc<AtomicUsize>,
    mcp_calls: Arc<AtomicUsize>,
    last_model: Arc<std::sync::Mutex<Option<String>>>,
}

async fn handle_embed_batch(
    State(state): State<EmbedTestState>,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    state.http_calls.fetch_add(1, Ordering::Relaxed);
    if let Ok(mut slot) = state.last_model.lock() {
        *slot = body.get("model").and_then(|m| m.as_str()).map(ToString::to_string);
    }
    let count = body
        .get("texts")
        .and_then(|texts| texts.as_array())
        .map_or(0, Vec::len);
    match state.http_mode {
        HttpMode::Fail => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "embed backend unavailable" })),
        ),
        HttpMode::Ok => (
            StatusCode::OK,
            Json(json!({ "vectors": vec![vec![1.0_f32, 1.0_f32]; count] })),
        ),
        HttpMode::WrongCount => (
            StatusCode::OK,
            Json(json!({ "vectors": vec![vec![1.0_f32, 1.0_f32]; count + 1] })),
        ),
    }
}

async fn handle_mcp_embed(State(state): State<EmbedTestState>) -> Json<serde_json::Value> {
    state.mcp_calls.fetch_add(1, Ordering::Relaxed);
    Json(json!({
        "jsonrpc": "2.0",
        "id": "mcp-embed",
        "result": {
            "content": [
                {
                    "type": "text",
                    "text": "{\"success\":true,\"vectors\":[[2.0,2.0]]}"
                }
            ]
        }
    }))
}

async fn handle_mcp_unavailable() -> StatusCode {
    StatusCode::BAD_GATEWAY
}

struct MockServer {
    base_url: String,
    http_calls: Arc<AtomicUsize>,
    mcp_calls: Arc<AtomicUsize>,
    last_model: Arc<std::sync::Mutex<Option<String>>>,
}

async fn spawn_embedding_mock_server(http_mode: HttpMode) -> Result<Option<MockServer>> {
    let state = EmbedTestState {
        http_mode,
        http_calls: Arc::new(AtomicUsize::new(0)),
        mcp_calls: Arc::new(AtomicUsize::new(0)),
        last_model: Arc::new(std::sync::Mutex::new(None)),
    };
    let server = MockServer {
        base_url: String::new(),
        http_calls: Arc::clone(&state.http_calls),
        mcp_calls: Arc::clone(&state.mcp_calls),
        last_model: Arc::clone(&state.last_model),
    };
    let app = Router::new()
        .route("/embed/batch", post(handle_embed_batch))
        .route("/messages/", post(handle_mcp_embed))
        .route("/broken/", post(handle_mcp_unavailable))
        .with_state(state);

    let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener,
        Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
            eprintln!("skipping embedding client tests: local socket bind is not permitted");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(Some(MockServer {
        base_url: format!("http://{addr}"),
        ..server
    }))
}

#[tokio::test]
async fn embed_batch_prefers_http_primary() -> Result<()> {
    let Some(server) = spawn_embedding_mock_server(HttpMode::Ok).await? else {
        return Ok(());
    };
    let client = EmbeddingClient::new_with_mcp_url(
        &server.base_url,
        5,
        Some(format!("{}/messages/", server.base_url)),
    );
    let texts = vec!["how do i rent".to_string(), "where is the office".to_string()];
    let vectors = client.embed_batch(&texts).await?;

    assert_eq!(vectors, vec![vec![1.0, 1.0], vec![1.0, 1.0]]);
    assert_eq!(server.http_calls.load(Ordering::Relaxed), 1);
    assert_eq!(server.mcp_calls.load(Ordering::Relaxed), 0);
    Ok(())
}

#[tokio::test]
async fn embed_batch_falls_back_to_mcp_when_http_fails() -> Result<()> {
    let Some(server) = spawn_embedding_mock_server(HttpMode::Fail).await? else {
        return Ok(());
    };
    let client = EmbeddingClient::new_with_mcp_url(
        &server.base_url,
        5,
        Some(format!("{}/messages/", server.base_url)),
    );
    let vector = client.embed("hello").await?;

    assert_eq!(vector, vec![2.0, 2.0]);
    assert_eq!(server.http_calls.load(Ordering::Relaxed), 1);
    assert_eq!(server.mcp_calls.load(Ordering::Relaxed), 1);
    Ok(())
}

#[tokio::test]
async fn embed_batch_errors_when_http_fails_without_mcp() -> Result<()> {
    let Some(server) = spawn_embedding_mock_server(HttpMode::Fail).await? else {
        return Ok(());
    };
    let client = EmbeddingClient::new(&server.base_url, 5);
    let result = client.embed_batch(&["hello".to_string()]).await;

    assert!(matches!(result, Err(FaqError::Embedding(_))), "got {result:?}");
    assert_eq!(server.mcp_calls.load(Ordering::Relaxed), 0);
    Ok(())
}

#[tokio::test]
async fn embed_batch_errors_when_both_sources_fail() -> Result<()> {
    let Some(server) = spawn_embedding_mock_server(HttpMode::Fail).await? else {
        return Ok(());
    };
    let client = EmbeddingClient::new_with_mcp_url(
        &server.base_url,
        5,
        Some(format!("{}/broken/", server.base_url)),
    );
    let result = client.embed_batch(&["hello".to_string()]).await;

    let Err(FaqError::Embedding(message)) = result else {
        panic!("expected embedding error, got {result:?}");
    };
    assert!(message.contains("mcp"), "got {message}");
    Ok(())
}

#[tokio::test]
async fn embed_batch_rejects_vector_count_mismatch() -> Result<()> {
    let Some(server) = spawn_embedding_mock_server(HttpMode::WrongCount).await? else {
        return Ok(());
    };
    let client = EmbeddingClient::new(&server.base_url, 5);
    let result = client.embed_batch(&["hello".to_string()]).await;

    assert!(
        matches!(
            result,
            Err(FaqError::EmbeddingCount {
                expected: 1,
                actual: 2
            })
        ),
        "got {result:?}"
    );
    Ok(())
}

#[tokio::test]
async fn embed_batch_sends_configured_model_hint() -> Result<()> {
    let Some(server) = spawn_embedding_mock_server(HttpMode::Ok).await? else {
        return Ok(());
    };
    let client =
        EmbeddingClient::new(&server.base_url, 5).with_model(Some("bge-small".to_string()));
    client.embed_batch(&["hello".to_string()]).await?;

    let model = server.last_model.lock().ok().and_then(|slot| slot.clone());
    assert_eq!(model.as_deref(), Some("bge-small"));
    assert_eq!(client.name(), "http");
    Ok(())
}

#[tokio::test]
async fn embed_batch_with_no_texts_skips_network() -> Result<()> {
    let client = EmbeddingClient::new("http://127.0.0.1:9", 1);
    let vectors = client.embed_batch(&[]).await?;
    assert!(vectors.is_empty());
    Ok(())
}
