//! Text normalizer: whitespace tokenization, per-token spelling correction,
//! lowercase output.

use std::sync::Arc;
use std::time::Instant;

use crate::spelling::SpellChecker;

/// Spell-corrects and lowercases free text.
#[derive(Clone)]
pub struct TextNormalizer {
    checker: Arc<dyn SpellChecker>,
}

impl TextNormalizer {
    /// Normalizer backed by `checker`.
    pub fn new(checker: Arc<dyn SpellChecker>) -> Self {
        Self { checker }
    }

    /// Correct each whitespace-separated token, keeping known tokens and tokens
    /// without a suggestion as written. Case of kept tokens is preserved.
    #[must_use]
    pub fn correct_spelling(&self, raw: &str) -> String {
        raw.split_whitespace()
            .map(|token| self.correct_token(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Corrected and lowercased text used for intent detection and matching.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> String {
        self.correct_spelling(raw).to_lowercase()
    }

    /// Like [`normalize`](Self::normalize), but gives up with `None` once
    /// `deadline` has passed. The deadline is checked before every token.
    #[must_use]
    pub fn normalize_before(&self, raw: &str, deadline: Instant) -> Option<String> {
        let mut corrected = Vec::new();
        for token in raw.split_whitespace() {
            if Instant::now() >= deadline {
                tracing::debug!(
                    event = "nal.normalize.deadline_exceeded",
                    corrected_tokens = corrected.len(),
                    "normalization stopped at deadline"
                );
                return None;
            }
            corrected.push(self.correct_token(token));
        }
        Some(corrected.join(" ").to_lowercase())
    }

    fn correct_token(&self, token: &str) -> String {
        if self.checker.is_known(token) {
            return token.to_string();
        }
        self.checker
            .suggest(token)
            .unwrap_or_else(|| token.to_string())
    }
}
