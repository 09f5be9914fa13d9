//! Cosine-similarity matcher over the knowledge table.

use serde::Serialize;

use crate::knowledge::{KnowledgeEntry, KnowledgeTable};

/// Minimum similarity for a table answer to be used.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.3;

/// Reply used when no entry reaches the threshold.
pub const FALLBACK_ANSWER: &str =
    "NAL Real Estate helps users buy, sell, and rent properties with ease.";

/// Cosine similarity; 0.0 for mismatched lengths or a zero-norm vector.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Index and score of the most similar entry. First occurrence wins ties.
#[must_use]
pub fn argmax_similarity(query: &[f32], entries: &[KnowledgeEntry]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (index, entry) in entries.iter().enumerate() {
        let score = cosine_similarity(query, &entry.embedding);
        match best {
            Some((_, best_score)) if score <= best_score || score.is_nan() => {}
            _ => best = Some((index, score)),
        }
    }
    best
}

/// Result of matching one query against the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOutcome {
    /// Matched answer, or the fallback.
    pub answer: String,
    /// Best similarity found (0.0 for an empty table).
    pub score: f32,
    /// True when `score >= threshold`.
    pub matched: bool,
    /// Index of the best entry when matched.
    pub index: Option<usize>,
}

/// Thresholded best-match lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatcher {
    threshold: f32,
    fallback_answer: String,
}

impl Default for SimilarityMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_THRESHOLD, FALLBACK_ANSWER)
    }
}

impl SimilarityMatcher {
    /// Matcher with a custom threshold and fallback reply.
    pub fn new(threshold: f32, fallback_answer: impl Into<String>) -> Self {
        Self {
            threshold,
            fallback_answer: fallback_answer.into(),
        }
    }

    /// Inclusive match threshold.
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Reply used below the threshold.
    #[must_use]
    pub fn fallback_answer(&self) -> &str {
        &self.fallback_answer
    }

    /// Best answer for `query`; the fallback when the table is empty or the
    /// best score is below the threshold.
    #[must_use]
    pub fn best_match(&self, query: &[f32], table: &KnowledgeTable) -> MatchOutcome {
        let entries = table.entries();
        match argmax_similarity(query, entries) {
            Some((index, score)) if score >= self.threshold => MatchOutcome {
                answer: entries[index].answer.clone(),
                score,
                matched: true,
                index: Some(index),
            },
            best => MatchOutcome {
                answer: self.fallback_answer.clone(),
                score: best.map_or(0.0, |(_, score)| score),
                matched: false,
                index: None,
            },
        }
    }
}
