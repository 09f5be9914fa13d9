//! Engine bootstrap: load knowledge, build dictionary and embedder, embed the table.
//!
//! Any failure here is fatal; the service never starts with a partial table.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use nal_faq::{
    ChatEngine, Embedder, INTENT_KEYWORDS, KnowledgeTable, QaPair, ReplySelector,
    SimilarityMatcher, SpellDictionary, TextNormalizer, TfIdfEmbedder, load_qa_pairs,
    question_vocabulary,
};

use crate::config::{EmbeddingConfig, EmbeddingProviderKind, EngineConfig};
use crate::embedding::EmbeddingClient;

/// Build a ready-to-serve engine from resolved config.
pub async fn build_engine(config: &EngineConfig) -> anyhow::Result<ChatEngine> {
    let started = Instant::now();
    let pairs = load_qa_pairs(&config.knowledge_path).with_context(|| {
        format!(
            "failed to load knowledge file {}",
            config.knowledge_path.display()
        )
    })?;
    let dictionary = build_spell_dictionary(config, &pairs)?;
    let embedder = build_embedder(&config.embedding, &pairs);
    let knowledge = KnowledgeTable::build(pairs, embedder.as_ref())
        .await
        .context("failed to embed knowledge questions")?;
    let selector = config
        .greeting_seed
        .map_or_else(ReplySelector::default, ReplySelector::seeded);
    tracing::info!(
        event = "nal.bootstrap.engine.ready",
        knowledge_entries = knowledge.len(),
        dictionary_words = dictionary.len(),
        embedding_provider = embedder.name(),
        match_threshold = config.match_threshold,
        elapsed_ms = started.elapsed().as_millis(),
        "chat engine ready"
    );
    Ok(ChatEngine::new(
        knowledge,
        TextNormalizer::new(Arc::new(dictionary)),
        embedder,
        SimilarityMatcher::new(config.match_threshold, config.fallback_answer.clone()),
        selector,
    ))
}

/// Bundled English list, plus the optional extra list, then the domain
/// overrides: configured domain words, intent keywords and the words of the
/// knowledge questions.
pub fn build_spell_dictionary(
    config: &EngineConfig,
    pairs: &[QaPair],
) -> anyhow::Result<SpellDictionary> {
    let mut dictionary = SpellDictionary::english(config.max_edit_distance);
    if let Some(path) = config.dictionary_path.as_deref() {
        dictionary
            .load_frequency_file(path)
            .with_context(|| format!("failed to read spelling dictionary {}", path.display()))?;
    }
    let vocabulary = question_vocabulary(pairs);
    dictionary.load_domain_words(&config.domain_words);
    dictionary.load_domain_words(INTENT_KEYWORDS);
    dictionary.load_domain_words(&vocabulary);
    tracing::debug!(
        event = "nal.bootstrap.dictionary.ready",
        words = dictionary.len(),
        domain_words = config.domain_words.len(),
        question_words = vocabulary.len(),
        "spelling dictionary ready"
    );
    Ok(dictionary)
}

/// Embedder for the configured provider. TF-IDF is fitted on the lowercased
/// questions so queries and table share one vocabulary.
pub fn build_embedder(config: &EmbeddingConfig, pairs: &[QaPair]) -> Arc<dyn Embedder> {
    match config.provider {
        EmbeddingProviderKind::Http => {
            tracing::info!(
                event = "nal.bootstrap.embedder.http",
                url = %config.client_url,
                model = config.model.as_deref().unwrap_or("<default>"),
                mcp_fallback = config.mcp_url.is_some(),
                "using remote embedding provider"
            );
            Arc::new(
                EmbeddingClient::new_with_mcp_url(
                    &config.client_url,
                    config.timeout_secs,
                    config.mcp_url.clone(),
                )
                .with_model(config.model.clone()),
            )
        }
        EmbeddingProviderKind::TfIdf => {
            let questions: Vec<String> = pairs
                .iter()
                .map(|pair| pair.question.to_lowercase())
                .collect();
            let embedder = TfIdfEmbedder::from_corpus(&questions);
            tracing::info!(
                event = "nal.bootstrap.embedder.tfidf",
                dimension = embedder.dimension(),
                "using local tf-idf embedder"
            );
            Arc::new(embedder)
        }
    }
}
