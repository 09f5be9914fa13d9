//! HTTP gateway integration tests: routing, lenient request bodies, error mapping.
//! Uses a TF-IDF engine over an in-memory table so no external services are required.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::body::to_bytes;
use axum::http::{Request, StatusCode};
use nal_chat::{GatewayState, router, router_with_state};
use nal_faq::{
    ChatEngine, DOMAIN_WORDS, Embedder, FALLBACK_ANSWER, FaqError, GREETING_RESPONSES,
    INTENT_KEYWORDS, KnowledgeTable, QaPair, ReplySelector, SimilarityMatcher, SpellDictionary,
    TextNormalizer, TfIdfEmbedder,
};
use serde_json::Value;
use tower::ServiceExt;

struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    fn name(&self) -> &str {
        "failing"
    }

    async fn embed_batch(&self, _texts: &[String]) -> nal_faq::Result<Vec<Vec<f32>>> {
        Err(FaqError::Embedding("embed backend unavailable".to_string()))
    }
}

struct SlowEmbedder;

#[async_trait]
impl Embedder for SlowEmbedder {
    fn name(&self) -> &str {
        "slow"
    }

    async fn embed_batch(&self, texts: &[String]) -> nal_faq::Result<Vec<Vec<f32>>> {
        tokio::time::sleep(Duration::from_secs(3)).await;
        Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
    }
}

fn normalizer() -> TextNormalizer {
    let mut dictionary = SpellDictionary::english(2);
    dictionary.load_domain_words(DOMAIN_WORDS);
    dictionary.load_domain_words(INTENT_KEYWORDS);
    TextNormalizer::new(Arc::new(dictionary))
}

async fn tfidf_engine() -> Arc<ChatEngine> {
    let pairs = vec![
        QaPair::new(
            "How do I list my property for sale?",
            "Create a seller account and add a listing.",
        ),
        QaPair::new("Where is your office?", "Our office is downtown."),
    ];
    let questions: Vec<String> = pairs.iter().map(|p| p.question.to_lowercase()).collect();
    let embedder = Arc::new(TfIdfEmbedder::from_corpus(&questions));
    let table = KnowledgeTable::build(pairs, embedder.as_ref())
        .await
        .expect("table");
    Arc::new(ChatEngine::new(
        table,
        normalizer(),
        embedder,
        SimilarityMatcher::default(),
        ReplySelector::seeded(7),
    ))
}

fn engine_with(embedder: Arc<dyn Embedder>) -> Arc<ChatEngine> {
    Arc::new(ChatEngine::new(
        KnowledgeTable::default(),
        normalizer(),
        embedder,
        SimilarityMatcher::default(),
        ReplySelector::seeded(7),
    ))
}

async fn post_chat(
    engine: Arc<ChatEngine>,
    timeout_secs: u64,
    body: &str,
) -> (StatusCode, Vec<u8>) {
    send_chat(router(engine, timeout_secs, None), body).await
}

async fn send_chat(app: Router, body: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(
            Request::post("/chat")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn reply_of(bytes: &[u8]) -> String {
    let payload: Value = serde_json::from_slice(bytes).expect("json body");
    payload
        .get("reply")
        .and_then(Value::as_str)
        .expect("reply field")
        .to_string()
}

#[tokio::test]
async fn chat_misspelled_greeting_returns_greeting() {
    let (status, body) = post_chat(tfidf_engine().await, 60, r#"{"message":"helo"}"#).await;
    assert_eq!(status, StatusCode::OK);
    let reply = reply_of(&body);
    assert!(GREETING_RESPONSES.contains(&reply.as_str()), "got {reply}");
}

#[tokio::test]
async fn chat_thanks_slang_returns_welcome() {
    let (status, body) = post_chat(tfidf_engine().await, 60, r#"{"message":"thanx!"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply_of(&body), "You are welcome.");
}

#[tokio::test]
async fn chat_known_question_returns_its_answer() {
    let (status, body) = post_chat(
        tfidf_engine().await,
        60,
        r#"{"message":"Where is your office?"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply_of(&body), "Our office is downtown.");
}

#[tokio::test]
async fn chat_missing_or_non_string_message_returns_fallback() {
    for body in [r"{}", r#"{"message":5}"#, r#"{"message":null}"#] {
        let (status, bytes) = post_chat(tfidf_engine().await, 60, body).await;
        assert_eq!(status, StatusCode::OK, "body {body}");
        assert_eq!(reply_of(&bytes), FALLBACK_ANSWER, "body {body}");
    }
}

#[tokio::test]
async fn chat_returns_500_when_embedding_fails() {
    let (status, body) = post_chat(
        engine_with(Arc::new(FailingEmbedder)),
        60,
        r#"{"message":"what are your fees"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let text = String::from_utf8(body).expect("utf8 body");
    assert!(text.contains("embed backend unavailable"), "got {text}");
}

#[tokio::test]
async fn chat_returns_504_when_request_times_out() {
    let (status, _) = post_chat(
        engine_with(Arc::new(SlowEmbedder)),
        1,
        r#"{"message":"what are your fees"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn chat_returns_504_when_spelling_correction_overruns() {
    // Each unknown token costs a full two-edit candidate search.
    let message = ["qwzxkvjplmbt"; 300].join(" ");
    let body = serde_json::json!({ "message": message }).to_string();
    let started = Instant::now();
    let (status, _) = post_chat(tfidf_engine().await, 1, &body).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "took {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn chat_returns_504_while_waiting_for_a_concurrency_slot() {
    let state = GatewayState::new(tfidf_engine().await, 1, Some(1));
    let semaphore = state
        .concurrency_semaphore
        .clone()
        .expect("concurrency limit configured");
    let _busy = semaphore.acquire_owned().await.expect("only slot");

    let started = Instant::now();
    let (status, _) = send_chat(router_with_state(state), r#"{"message":"hi"}"#).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn chat_canned_intents_skip_embedding() {
    let (status, body) = post_chat(
        engine_with(Arc::new(FailingEmbedder)),
        60,
        r#"{"message":"bye"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply_of(&body), "Bye! Take care...");

    let (status, body) = post_chat(
        engine_with(Arc::new(FailingEmbedder)),
        60,
        r#"{"message":"hello there"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reply = reply_of(&body);
    assert!(GREETING_RESPONSES.contains(&reply.as_str()), "got {reply}");
}

#[tokio::test]
async fn gateway_returns_404_for_unknown_route() {
    let response = router(tfidf_engine().await, 60, None)
        .oneshot(Request::get("/unknown").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn gateway_allows_any_origin() {
    let response = router(tfidf_engine().await, 60, None)
        .oneshot(
            Request::post("/chat")
                .header("origin", "http://localhost:3000")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"message":"hi"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn gateway_health_returns_structured_summary() {
    let response = router(tfidf_engine().await, 60, Some(4))
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = serde_json::from_slice(&bytes).expect("json body");

    assert_eq!(payload.get("status").and_then(Value::as_str), Some("healthy"));
    assert_eq!(payload.get("knowledge_entries").and_then(Value::as_u64), Some(2));
    assert_eq!(
        payload.get("embedding_provider").and_then(Value::as_str),
        Some("tfidf")
    );
    assert_eq!(payload.get("request_timeout_secs").and_then(Value::as_u64), Some(60));
    assert_eq!(payload.get("max_concurrent_requests").and_then(Value::as_u64), Some(4));
    assert_eq!(payload.get("in_flight_requests").and_then(Value::as_u64), Some(0));
}
