//! Embedding client for HTTP /embed/batch or MCP tools/call (embedding.embed_texts).
//!
//! Primary path is HTTP `/embed/batch`; MCP is consulted only when an MCP URL
//! is configured and the HTTP path fails. Failure of both is an error, never an
//! empty vector.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use nal_faq::{Embedder, FaqError};
use reqwest::Client;
use serde::Deserialize;

#[derive(Deserialize)]
struct EmbedBatchResponse {
    vectors: Option<Vec<Vec<f32>>>,
}

#[derive(Deserialize)]
struct McpEmbedResult {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    vectors: Vec<Vec<f32>>,
}

/// Remote embedding provider.
pub struct EmbeddingClient {
    client: Client,
    base_url: String,
    model: Option<String>,
    mcp_url: Option<String>,
}

impl EmbeddingClient {
    /// HTTP-only client.
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        Self::new_with_mcp_url(base_url, timeout_secs, None)
    }

    pub fn new_with_mcp_url(base_url: &str, timeout_secs: u64, mcp_url: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: None,
            mcp_url: mcp_url
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
        }
    }

    /// Model hint sent with every request.
    #[must_use]
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        self
    }

    /// Embed via HTTP /embed/batch.
    async fn embed_http(
        &self,
        texts: &[String],
        model: Option<&str>,
    ) -> Result<Vec<Vec<f32>>, String> {
        let started = Instant::now();
        let url = format!("{}/embed/batch", self.base_url);
        let mut body = serde_json::json!({ "texts": texts });
        if let Some(model) = model {
            body["model"] = serde_json::Value::String(model.to_string());
        }
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|error| {
                tracing::debug!(
                    event = "nal.embedding.http.request_failed",
                    url = %url,
                    elapsed_ms = started.elapsed().as_millis(),
                    error = %error,
                    "embedding http request failed"
                );
                format!("request to {url} failed: {error}")
            })?;
        let status = resp.status();
        if !status.is_success() {
            tracing::debug!(
                event = "nal.embedding.http.non_success_status",
                status = %status,
                elapsed_ms = started.elapsed().as_millis(),
                "embedding http returned non-success status"
            );
            return Err(format!("{url} returned {status}"));
        }
        let data: EmbedBatchResponse = resp.json().await.map_err(|error| {
            tracing::debug!(
                event = "nal.embedding.http.decode_failed",
                elapsed_ms = started.elapsed().as_millis(),
                error = %error,
                "embedding http response decode failed"
            );
            format!("{url} returned an undecodable body: {error}")
        })?;
        tracing::debug!(
            event = "nal.embedding.http.completed",
            elapsed_ms = started.elapsed().as_millis(),
            success = data.vectors.is_some(),
            "embedding http path completed"
        );
        data.vectors.ok_or_else(|| format!("{url} response has no `vectors` field"))
    }

    /// Embed via MCP tools/call embedding.embed_texts.
    async fn embed_mcp(&self, url: &str, texts: &[String]) -> Result<Vec<Vec<f32>>, String> {
        let started = Instant::now();
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": "mcp-embed",
            "method": "tools/call",
            "params": {
                "name": "embedding.embed_texts",
                "arguments": { "texts": texts }
            }
        });
        let resp = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|error| format!("mcp request to {url} failed: {error}"))?;
        if !resp.status().is_success() {
            return Err(format!("mcp {url} returned {}", resp.status()));
        }
        let result: serde_json::Value = resp
            .json()
            .await
            .map_err(|error| format!("mcp {url} returned an undecodable body: {error}"))?;
        let text = result
            .get("result")
            .and_then(|value| value.get("content"))
            .and_then(serde_json::Value::as_array)
            .and_then(|content| content.first())
            .and_then(|item| item.get("text"))
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| format!("mcp {url} response has no text content"))?;
        let data: McpEmbedResult = serde_json::from_str(text)
            .map_err(|error| format!("mcp {url} payload parse failed: {error}"))?;
        tracing::debug!(
            event = "nal.embedding.mcp.completed",
            elapsed_ms = started.elapsed().as_millis(),
            success = data.success,
            vector_count = data.vectors.len(),
            "embedding mcp path completed"
        );
        if data.success {
            Ok(data.vectors)
        } else {
            Err(format!("mcp {url} reported failure"))
        }
    }

    /// Embed texts with an optional embedding model hint.
    pub async fn embed_batch_with_model(
        &self,
        texts: &[String],
        model: Option<&str>,
    ) -> nal_faq::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        let started = Instant::now();
        let http_error = match self.embed_http(texts, model).await {
            Ok(vectors) => {
                tracing::debug!(
                    event = "nal.embedding.batch.completed",
                    selected_source = "http",
                    fallback_used = false,
                    elapsed_ms = started.elapsed().as_millis(),
                    "embedding batch completed on primary source"
                );
                return check_count(texts.len(), vectors);
            }
            Err(error) => error,
        };

        let Some(mcp_url) = self.mcp_url.as_deref() else {
            tracing::warn!(
                event = "nal.embedding.batch.failed",
                error = %http_error,
                "embedding failed and no mcp fallback is configured"
            );
            return Err(FaqError::Embedding(http_error));
        };
        match self.embed_mcp(mcp_url, texts).await {
            Ok(vectors) => {
                tracing::debug!(
                    event = "nal.embedding.batch.completed",
                    selected_source = "mcp",
                    fallback_used = true,
                    elapsed_ms = started.elapsed().as_millis(),
                    "embedding batch completed after fallback source"
                );
                check_count(texts.len(), vectors)
            }
            Err(mcp_error) => {
                tracing::warn!(
                    event = "nal.embedding.batch.failed",
                    http_error = %http_error,
                    mcp_error = %mcp_error,
                    "embedding failed on primary and fallback sources"
                );
                Err(FaqError::Embedding(format!("{http_error}; {mcp_error}")))
            }
        }
    }
}

fn check_count(expected: usize, vectors: Vec<Vec<f32>>) -> nal_faq::Result<Vec<Vec<f32>>> {
    if vectors.len() == expected {
        Ok(vectors)
    } else {
        Err(FaqError::EmbeddingCount {
            expected,
            actual: vectors.len(),
        })
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn embed_batch(&self, texts: &[String]) -> nal_faq::Result<Vec<Vec<f32>>> {
        self.embed_batch_with_model(texts, self.model.as_deref()).await
    }
}
