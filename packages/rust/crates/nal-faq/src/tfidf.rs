//! Local TF-IDF embedder fitted on the knowledge questions.
//!
//! Lets the service run without an external embedding endpoint. The
//! vocabulary and IDF weights are computed once from the corpus; vectors are
//! normalized to unit length so cosine similarity reduces to a dot product.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::embedding::Embedder;
use crate::error::Result;

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "it", "in", "on", "of", "to", "and", "or", "for", "with", "this",
    "that", "be", "are", "was", "were", "been", "do", "does", "did", "can", "i", "my", "me",
    "we", "our", "you", "your", "at", "by", "from", "as", "so", "its",
];

/// TF-IDF embedder over a fixed vocabulary.
#[derive(Debug, Clone, Default)]
pub struct TfIdfEmbedder {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
}

impl TfIdfEmbedder {
    /// Fit vocabulary and IDF weights on `documents`.
    #[must_use]
    pub fn from_corpus<S: AsRef<str>>(documents: &[S]) -> Self {
        if documents.is_empty() {
            return Self::default();
        }
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for document in documents {
            let unique: HashSet<String> = tokenize(document.as_ref()).into_iter().collect();
            for term in unique {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
                let next = vocabulary.len();
                vocabulary.entry(term).or_insert(next);
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let n = documents.len() as f32;
        let mut idf = vec![0.0_f32; vocabulary.len()];
        for (term, &idx) in &vocabulary {
            #[allow(clippy::cast_precision_loss)]
            let df = doc_freq.get(term).copied().unwrap_or(0).max(1) as f32;
            idf[idx] = (n / df).ln() + 1.0;
        }
        Self { vocabulary, idf }
    }

    /// Vector length (vocabulary size).
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    /// Embed one text synchronously.
    #[must_use]
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimension()];
        for token in tokenize(text) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                vector[idx] += self.idf[idx];
            }
        }
        normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl Embedder for TfIdfEmbedder {
    fn name(&self) -> &str {
        "tfidf"
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .filter(|token| !STOP_WORDS.contains(&token.as_str()))
        .collect()
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}
