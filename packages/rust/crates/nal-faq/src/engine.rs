//! Chat engine: normalize → classify → (embed → match) → select.
//!
//! The first two steps are synchronous ([`ChatEngine::prepare`]); the rest is
//! async ([`ChatEngine::respond`]).

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::embedding::Embedder;
use crate::error::Result;
use crate::intent::{Intent, detect_intent};
use crate::knowledge::KnowledgeTable;
use crate::normalize::TextNormalizer;
use crate::reply::ReplySelector;
use crate::similarity::SimilarityMatcher;

/// Reply plus the intermediate values that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    /// Text returned to the user.
    pub reply: String,
    /// Detected intent.
    pub intent: Intent,
    /// Spell-corrected, lowercased input.
    pub normalized: String,
    /// Best similarity, when matching ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    /// Whether the score reached the threshold, when matching ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<bool>,
}

/// Output of the synchronous first stage: corrected text and its intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedMessage {
    /// Spell-corrected, lowercased input.
    pub normalized: String,
    /// Intent from the raw text, then the normalized text.
    pub intent: Intent,
}

/// Read-only pipeline state shared by every request.
pub struct ChatEngine {
    knowledge: KnowledgeTable,
    normalizer: TextNormalizer,
    embedder: Arc<dyn Embedder>,
    matcher: SimilarityMatcher,
    selector: ReplySelector,
}

impl ChatEngine {
    /// Assemble an engine from already-initialized parts.
    pub fn new(
        knowledge: KnowledgeTable,
        normalizer: TextNormalizer,
        embedder: Arc<dyn Embedder>,
        matcher: SimilarityMatcher,
        selector: ReplySelector,
    ) -> Self {
        Self {
            knowledge,
            normalizer,
            embedder,
            matcher,
            selector,
        }
    }

    /// Answer one utterance. Only embedding failures are errors.
    pub async fn reply(&self, message: &str) -> Result<ChatReply> {
        let prepared = self.prepare(message);
        self.respond(prepared).await
    }

    /// Spelling correction and intent detection. CPU-bound; callers with a
    /// latency budget should run [`prepare_before`](Self::prepare_before) on a
    /// blocking thread.
    #[must_use]
    pub fn prepare(&self, message: &str) -> PreparedMessage {
        let normalized = self.normalizer.normalize(message);
        let intent = detect_intent(message, &normalized);
        PreparedMessage { normalized, intent }
    }

    /// [`prepare`](Self::prepare) that returns `None` once `deadline` passes.
    #[must_use]
    pub fn prepare_before(&self, message: &str, deadline: Instant) -> Option<PreparedMessage> {
        let normalized = self.normalizer.normalize_before(message, deadline)?;
        let intent = detect_intent(message, &normalized);
        Some(PreparedMessage { normalized, intent })
    }

    /// Second stage: a canned reply, or embed + match for `Unknown`.
    pub async fn respond(&self, prepared: PreparedMessage) -> Result<ChatReply> {
        let started = Instant::now();
        let PreparedMessage { normalized, intent } = prepared;
        if intent != Intent::Unknown {
            tracing::debug!(
                event = "nal.engine.reply.intent",
                intent = intent.as_str(),
                "canned reply selected"
            );
            return Ok(ChatReply {
                reply: self.selector.select(intent, None),
                intent,
                normalized,
                score: None,
                matched: None,
            });
        }

        let query = self.embedder.embed(&normalized).await?;
        let outcome = self.matcher.best_match(&query, &self.knowledge);
        tracing::debug!(
            event = "nal.engine.reply.matched",
            score = outcome.score,
            matched = outcome.matched,
            index = ?outcome.index,
            elapsed_ms = started.elapsed().as_millis(),
            "similarity match completed"
        );
        Ok(ChatReply {
            reply: self.selector.select(intent, Some(&outcome)),
            intent,
            normalized,
            score: Some(outcome.score),
            matched: Some(outcome.matched),
        })
    }

    /// Loaded knowledge table.
    #[must_use]
    pub fn knowledge(&self) -> &KnowledgeTable {
        &self.knowledge
    }

    /// Similarity matcher settings.
    #[must_use]
    pub fn matcher(&self) -> &SimilarityMatcher {
        &self.matcher
    }

    /// Embedding provider label.
    #[must_use]
    pub fn embedder_name(&self) -> &str {
        self.embedder.name()
    }
}
