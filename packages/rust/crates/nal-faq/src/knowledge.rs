//! Knowledge table: question/answer rows with precomputed question embeddings.
//!
//! The table is loaded once from a CSV file with `question` and `answer`
//! columns, embedded in a single batch, and never mutated afterward.
//! `entries[i].embedding` always belongs to `entries[i].answer`.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::embedding::Embedder;
use crate::error::{FaqError, Result};

const QUESTION_COLUMN: &str = "question";
const ANSWER_COLUMN: &str = "answer";

/// One decoded row of the knowledge source, before embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    /// User-facing question text.
    pub question: String,
    /// Canned answer returned when the question matches.
    pub answer: String,
}

impl QaPair {
    /// Build a pair from any string-like values.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Read question/answer pairs from a CSV file.
///
/// Extra columns are ignored. A missing file, missing column, blank field or
/// a file without rows is an error: running with an empty table would
/// silently answer every question with the fallback.
pub fn load_qa_pairs(path: &Path) -> Result<Vec<QaPair>> {
    if !path.exists() {
        return Err(FaqError::KnowledgeNotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    let pairs = read_qa_pairs(file)?;
    tracing::info!(
        event = "nal.knowledge.load.completed",
        path = %path.display(),
        rows = pairs.len(),
        "knowledge file loaded"
    );
    Ok(pairs)
}

/// Read question/answer pairs from any CSV reader.
pub fn read_qa_pairs<R: Read>(source: R) -> Result<Vec<QaPair>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(source);
    let headers = reader.headers()?.clone();
    let question_idx = column_index(&headers, QUESTION_COLUMN)?;
    let answer_idx = column_index(&headers, ANSWER_COLUMN)?;

    let mut pairs = Vec::new();
    for (offset, record) in reader.records().enumerate() {
        let record = record?;
        let row = offset + 1;
        let question = required_field(&record, question_idx, row, QUESTION_COLUMN)?;
        let answer = required_field(&record, answer_idx, row, ANSWER_COLUMN)?;
        pairs.push(QaPair { question, answer });
    }
    if pairs.is_empty() {
        return Err(FaqError::EmptyKnowledge);
    }
    Ok(pairs)
}

/// Distinct lowercase words of two or more letters in the questions, sorted.
///
/// Used as domain vocabulary for spelling correction.
#[must_use]
pub fn question_vocabulary(pairs: &[QaPair]) -> Vec<String> {
    let words: BTreeSet<String> = pairs
        .iter()
        .flat_map(|pair| pair.question.split(|c: char| !c.is_alphabetic()))
        .filter(|word| word.chars().count() > 1)
        .map(str::to_lowercase)
        .collect();
    words.into_iter().collect()
}

fn column_index(headers: &csv::StringRecord, name: &'static str) -> Result<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
        .ok_or(FaqError::MissingColumn(name))
}

fn required_field(
    record: &csv::StringRecord,
    index: usize,
    row: usize,
    column: &'static str,
) -> Result<String> {
    let value = record.get(index).unwrap_or_default().trim();
    if value.is_empty() {
        return Err(FaqError::BlankField { row, column });
    }
    Ok(value.to_string())
}

/// A question/answer row with the embedding of its lowercased question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeEntry {
    /// Lowercased question text (the exact string that was embedded).
    pub question: String,
    /// Answer returned on match.
    pub answer: String,
    /// Embedding of `question`.
    pub embedding: Vec<f32>,
}

/// Immutable, index-aligned table of knowledge entries.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeTable {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeTable {
    /// Embed every lowercased question in one batch and build the table.
    pub async fn build(pairs: Vec<QaPair>, embedder: &dyn Embedder) -> Result<Self> {
        let started = Instant::now();
        let questions: Vec<String> = pairs
            .iter()
            .map(|pair| pair.question.to_lowercase())
            .collect();
        let vectors = embedder.embed_batch(&questions).await?;
        if vectors.len() != questions.len() {
            return Err(FaqError::EmbeddingCount {
                expected: questions.len(),
                actual: vectors.len(),
            });
        }
        let entries: Vec<KnowledgeEntry> = pairs
            .into_iter()
            .zip(questions)
            .zip(vectors)
            .map(|((pair, question), embedding)| KnowledgeEntry {
                question,
                answer: pair.answer,
                embedding,
            })
            .collect();
        tracing::info!(
            event = "nal.knowledge.table.built",
            entries = entries.len(),
            dimension = entries.first().map_or(0, |entry| entry.embedding.len()),
            provider = embedder.name(),
            elapsed_ms = started.elapsed().as_millis(),
            "knowledge table embedded"
        );
        Ok(Self { entries })
    }

    /// Wrap already-embedded entries (fixtures, cached tables).
    #[must_use]
    pub fn from_entries(entries: Vec<KnowledgeEntry>) -> Self {
        Self { entries }
    }

    /// Entries in source order.
    #[must_use]
    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
