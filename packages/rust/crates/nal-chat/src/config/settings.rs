//! Runtime settings loader for nal-chat.
//!
//! Loads and merges:
//! - System defaults: `<PRJ_ROOT>/packages/conf/settings.yaml`
//! - User overrides:  `<PRJ_CONFIG_HOME>/nal-chat/settings.yaml`
//!
//! Merge precedence is user over system.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;

const DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH: &str = "packages/conf/settings.yaml";
const DEFAULT_USER_SETTINGS_RELATIVE_PATH: &str = "nal-chat/settings.yaml";
const DEFAULT_CONFIG_HOME_RELATIVE_PATH: &str = ".config";
static CONFIG_HOME_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeSettings {
    #[serde(default)]
    pub knowledge: KnowledgeSettings,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub spelling: SpellingSettings,
    #[serde(default)]
    pub gateway: GatewaySettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnowledgeSettings {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmbeddingSettings {
    pub provider: Option<String>,
    pub client_url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub mcp_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchingSettings {
    pub threshold: Option<f32>,
    pub fallback_answer: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpellingSettings {
    pub dictionary_path: Option<String>,
    pub domain_words: Option<Vec<String>>,
    pub max_edit_distance: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewaySettings {
    pub bind: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub max_concurrent_requests: Option<usize>,
}

impl RuntimeSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            knowledge: self.knowledge.merge(overlay.knowledge),
            embedding: self.embedding.merge(overlay.embedding),
            matching: self.matching.merge(overlay.matching),
            spelling: self.spelling.merge(overlay.spelling),
            gateway: self.gateway.merge(overlay.gateway),
        }
    }
}

impl KnowledgeSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            path: overlay.path.or(self.path),
        }
    }
}

impl EmbeddingSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            provider: overlay.provider.or(self.provider),
            client_url: overlay.client_url.or(self.client_url),
            model: overlay.model.or(self.model),
            timeout_secs: overlay.timeout_secs.or(self.timeout_secs),
            mcp_url: overlay.mcp_url.or(self.mcp_url),
        }
    }
}

impl MatchingSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            threshold: overlay.threshold.or(self.threshold),
            fallback_answer: overlay.fallback_answer.or(self.fallback_answer),
        }
    }
}

impl SpellingSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            dictionary_path: overlay.dictionary_path.or(self.dictionary_path),
            domain_words: overlay.domain_words.or(self.domain_words),
            max_edit_distance: overlay.max_edit_distance.or(self.max_edit_distance),
        }
    }
}

impl GatewaySettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            bind: overlay.bind.or(self.bind),
            request_timeout_secs: overlay.request_timeout_secs.or(self.request_timeout_secs),
            max_concurrent_requests: overlay
                .max_concurrent_requests
                .or(self.max_concurrent_requests),
        }
    }
}

/// Load merged runtime settings (user overrides system).
pub fn load_runtime_settings() -> RuntimeSettings {
    let (system_path, user_path) = runtime_settings_paths();
    load_runtime_settings_from_paths(&system_path, &user_path)
}

/// System and user settings file locations.
///
/// A relative config home is resolved against `PRJ_ROOT` (or the working
/// directory); an absolute one is used as-is.
#[doc(hidden)]
pub fn runtime_settings_paths() -> (PathBuf, PathBuf) {
    let root = env_path("PRJ_ROOT")
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let config_home = CONFIG_HOME_OVERRIDE
        .get()
        .cloned()
        .or_else(|| env_path("PRJ_CONFIG_HOME"))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_HOME_RELATIVE_PATH));
    (
        root.join(DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH),
        root.join(config_home).join(DEFAULT_USER_SETTINGS_RELATIVE_PATH),
    )
}

#[doc(hidden)]
pub fn load_runtime_settings_from_paths(system: &Path, user: &Path) -> RuntimeSettings {
    let system_settings = read_settings_file(system).unwrap_or_default();
    let user_settings = read_settings_file(user).unwrap_or_default();
    system_settings.merge(user_settings)
}

/// Missing files are silently skipped; unreadable or invalid ones are logged
/// and skipped.
fn read_settings_file(path: &Path) -> Option<RuntimeSettings> {
    if !path.exists() {
        return None;
    }
    let raw = std::fs::read_to_string(path)
        .inspect_err(|error| {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to read settings file; ignoring"
            );
        })
        .ok()?;
    let settings = serde_yaml::from_str::<RuntimeSettings>(&raw)
        .inspect_err(|error| {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to parse settings yaml; ignoring file"
            );
        })
        .ok()?;
    tracing::debug!(
        event = "nal.settings.file_loaded",
        path = %path.display(),
        "settings file loaded"
    );
    Some(settings)
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Set config-home override (used by CLI `--conf`). First value wins.
pub fn set_config_home_override(path: impl Into<PathBuf>) {
    let path = path.into();
    if path.as_os_str().is_empty() {
        return;
    }
    match CONFIG_HOME_OVERRIDE.get() {
        Some(current) if current != &path => {
            tracing::warn!(
                current = %current.display(),
                ignored = %path.display(),
                "config home override already set; ignoring subsequent value"
            );
        }
        Some(_) => {}
        None => {
            let _ = CONFIG_HOME_OVERRIDE.set(path);
        }
    }
}
