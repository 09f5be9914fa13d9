use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use nal_chat::{
    DEFAULT_EMBEDDING_TIMEOUT_SECS, DEFAULT_EMBEDDING_URL, EmbeddingConfig, EmbeddingProviderKind,
    EngineConfig, RuntimeSettings, build_engine,
};
use nal_faq::{
    ChatEngine, DEFAULT_MATCH_THRESHOLD, DEFAULT_MAX_EDIT_DISTANCE, DOMAIN_WORDS, FALLBACK_ANSWER,
};

use crate::resolve::{
    parse_positive_from_env, parse_u64_from_env, resolve_embedding_provider,
    resolve_optional_path, resolve_optional_string, resolve_positive_u64, resolve_string,
    resolve_unit_f32,
};

/// Engine-level overrides taken from global CLI flags.
#[derive(Debug, Default)]
pub(crate) struct EngineOverrides {
    pub(crate) knowledge: Option<PathBuf>,
    pub(crate) embedding_provider: Option<EmbeddingProviderKind>,
}

pub(crate) fn resolve_engine_config(
    overrides: EngineOverrides,
    runtime_settings: &RuntimeSettings,
) -> Result<EngineConfig> {
    let knowledge_path = resolve_optional_path(
        overrides.knowledge,
        "NAL_KNOWLEDGE_PATH",
        runtime_settings.knowledge.path.as_deref(),
    )
    .ok_or_else(|| {
        anyhow!(
            "no knowledge file configured: pass --knowledge, set NAL_KNOWLEDGE_PATH, \
             or set knowledge.path in settings.yaml"
        )
    })?;

    let embedding_settings = &runtime_settings.embedding;
    let embedding = EmbeddingConfig {
        provider: resolve_embedding_provider(
            overrides.embedding_provider,
            "NAL_EMBEDDING_PROVIDER",
            embedding_settings.provider.as_deref(),
        ),
        client_url: resolve_string(
            None,
            "NAL_EMBEDDING_URL",
            embedding_settings.client_url.as_deref(),
            DEFAULT_EMBEDDING_URL,
        ),
        model: resolve_optional_string(
            None,
            "NAL_EMBEDDING_MODEL",
            embedding_settings.model.as_deref(),
        ),
        timeout_secs: resolve_positive_u64(
            None,
            "NAL_EMBEDDING_TIMEOUT_SECS",
            embedding_settings.timeout_secs,
            DEFAULT_EMBEDDING_TIMEOUT_SECS,
        ),
        mcp_url: resolve_optional_string(
            None,
            "NAL_MCP_EMBED_URL",
            embedding_settings.mcp_url.as_deref(),
        ),
    };

    let matching = &runtime_settings.matching;
    let spelling = &runtime_settings.spelling;
    let config = EngineConfig {
        knowledge_path,
        embedding,
        match_threshold: resolve_unit_f32(
            "NAL_MATCH_THRESHOLD",
            matching.threshold,
            DEFAULT_MATCH_THRESHOLD,
        ),
        fallback_answer: resolve_string(
            None,
            "NAL_FALLBACK_ANSWER",
            matching.fallback_answer.as_deref(),
            FALLBACK_ANSWER,
        ),
        dictionary_path: resolve_optional_path(
            None,
            "NAL_SPELLING_DICTIONARY",
            spelling.dictionary_path.as_deref(),
        ),
        domain_words: spelling.domain_words.clone().unwrap_or_else(|| {
            DOMAIN_WORDS.iter().map(ToString::to_string).collect()
        }),
        max_edit_distance: parse_positive_from_env("NAL_SPELLING_MAX_EDIT_DISTANCE")
            .or(spelling.max_edit_distance)
            .unwrap_or(DEFAULT_MAX_EDIT_DISTANCE),
        greeting_seed: parse_u64_from_env("NAL_GREETING_SEED"),
    };
    tracing::debug!(
        event = "nal.config.engine.resolved",
        knowledge = %config.knowledge_path.display(),
        provider = config.embedding.provider.as_str(),
        threshold = config.match_threshold,
        max_edit_distance = config.max_edit_distance,
        "engine config resolved"
    );
    Ok(config)
}

pub(crate) async fn build_shared_engine(
    overrides: EngineOverrides,
    runtime_settings: &RuntimeSettings,
) -> Result<Arc<ChatEngine>> {
    let config = resolve_engine_config(overrides, runtime_settings)?;
    Ok(Arc::new(build_engine(&config).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nal_chat::{KnowledgeSettings, MatchingSettings};

    #[test]
    fn cli_knowledge_path_and_provider_override_settings() {
        let settings = RuntimeSettings {
            knowledge: KnowledgeSettings {
                path: Some("settings.csv".to_string()),
            },
            ..RuntimeSettings::default()
        };
        let config = resolve_engine_config(
            EngineOverrides {
                knowledge: Some(PathBuf::from("cli.csv")),
                embedding_provider: Some(EmbeddingProviderKind::TfIdf),
            },
            &settings,
        )
        .expect("config should resolve");
        assert_eq!(config.knowledge_path, PathBuf::from("cli.csv"));
        assert_eq!(config.embedding.provider, EmbeddingProviderKind::TfIdf);
    }

    #[test]
    fn matching_settings_flow_into_config() {
        let settings = RuntimeSettings {
            knowledge: KnowledgeSettings {
                path: Some("faq.csv".to_string()),
            },
            matching: MatchingSettings {
                threshold: Some(0.45),
                fallback_answer: Some("Please call our office.".to_string()),
            },
            ..RuntimeSettings::default()
        };
        let config = resolve_engine_config(EngineOverrides::default(), &settings)
            .expect("config should resolve");
        assert!((config.match_threshold - 0.45).abs() < f32::EPSILON);
        assert_eq!(config.fallback_answer, "Please call our office.");
        assert_eq!(config.domain_words.len(), DOMAIN_WORDS.len());
    }
}
