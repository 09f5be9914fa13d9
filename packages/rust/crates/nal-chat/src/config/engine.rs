//! Fully-resolved engine configuration.
//!
//! The binary resolves CLI flags, environment and settings files into an
//! [`EngineConfig`]; [`crate::build_engine`] consumes it.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::anyhow;
use nal_faq::{DEFAULT_MATCH_THRESHOLD, DEFAULT_MAX_EDIT_DISTANCE, DOMAIN_WORDS, FALLBACK_ANSWER};

/// Default base URL of the embedding service.
pub const DEFAULT_EMBEDDING_URL: &str = "http://127.0.0.1:18501";

/// Default HTTP timeout for one embedding call.
pub const DEFAULT_EMBEDDING_TIMEOUT_SECS: u64 = 30;

/// Which embedding provider backs the knowledge table and queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingProviderKind {
    /// Remote `/embed/batch` endpoint (MCP fallback when configured).
    #[default]
    Http,
    /// Local TF-IDF fitted on the knowledge questions.
    TfIdf,
}

impl EmbeddingProviderKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::TfIdf => "tfidf",
        }
    }
}

impl FromStr for EmbeddingProviderKind {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "tfidf" | "tf-idf" | "local" => Ok(Self::TfIdf),
            other => Err(anyhow!(
                "invalid embedding provider '{other}' (expected one of: http, tfidf)"
            )),
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProviderKind,
    pub client_url: String,
    pub model: Option<String>,
    pub timeout_secs: u64,
    pub mcp_url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::default(),
            client_url: DEFAULT_EMBEDDING_URL.to_string(),
            model: None,
            timeout_secs: DEFAULT_EMBEDDING_TIMEOUT_SECS,
            mcp_url: None,
        }
    }
}

/// Everything needed to build a [`nal_faq::ChatEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// CSV with `question` and `answer` columns.
    pub knowledge_path: PathBuf,
    pub embedding: EmbeddingConfig,
    /// Inclusive similarity threshold.
    pub match_threshold: f32,
    pub fallback_answer: String,
    /// Extra `word [count]` list merged into the bundled dictionary.
    pub dictionary_path: Option<PathBuf>,
    pub domain_words: Vec<String>,
    pub max_edit_distance: usize,
    /// Fixed seed for greeting selection; entropy when `None`.
    pub greeting_seed: Option<u64>,
}

impl EngineConfig {
    /// Defaults for everything except the knowledge source.
    pub fn new(knowledge_path: impl Into<PathBuf>) -> Self {
        Self {
            knowledge_path: knowledge_path.into(),
            embedding: EmbeddingConfig::default(),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            fallback_answer: FALLBACK_ANSWER.to_string(),
            dictionary_path: None,
            domain_words: DOMAIN_WORDS.iter().map(ToString::to_string).collect(),
            max_edit_distance: DEFAULT_MAX_EDIT_DISTANCE,
            greeting_seed: None,
        }
    }
}
