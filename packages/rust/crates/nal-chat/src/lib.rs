//! nal-chat - NAL Real Estate FAQ assistant service.
//!
//! Wraps the [`nal_faq`] pipeline in an axum HTTP gateway (`POST /chat`), a
//! stdio loop and a one-shot `ask` command. Startup state (knowledge table,
//! dictionary, embedder) is built once by [`build_engine`] and shared behind
//! an `Arc`.

#![allow(missing_docs)]

mod bootstrap;
mod config;
mod embedding;
mod gateway;

pub use bootstrap::{build_embedder, build_engine, build_spell_dictionary};
pub use config::{
    DEFAULT_EMBEDDING_TIMEOUT_SECS, DEFAULT_EMBEDDING_URL, EmbeddingConfig, EmbeddingProviderKind,
    EmbeddingSettings, EngineConfig, GatewaySettings, KnowledgeSettings, MatchingSettings,
    RuntimeSettings, SpellingSettings, load_runtime_settings, load_runtime_settings_from_paths,
    runtime_settings_paths, set_config_home_override,
};
pub use embedding::EmbeddingClient;
pub use gateway::{
    ChatRequest, ChatResponse, DEFAULT_REQUEST_TIMEOUT_SECS, GatewayHealthResponse, GatewayState,
    router, router_with_state, run_http, run_stdio,
};
