//! Config namespace: resolved engine config and layered runtime settings.

mod engine;
mod settings;

pub use engine::{
    DEFAULT_EMBEDDING_TIMEOUT_SECS, DEFAULT_EMBEDDING_URL, EmbeddingConfig, EmbeddingProviderKind,
    EngineConfig,
};
pub use settings::{
    EmbeddingSettings, GatewaySettings, KnowledgeSettings, MatchingSettings, RuntimeSettings,
    SpellingSettings, load_runtime_settings, load_runtime_settings_from_paths,
    runtime_settings_paths, set_config_home_override,
};
