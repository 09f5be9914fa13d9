use std::path::PathBuf;

use nal_chat::EmbeddingProviderKind;

pub(crate) fn resolve_string(
    cli_value: Option<String>,
    env_name: &str,
    settings_value: Option<&str>,
    default: &str,
) -> String {
    resolve_optional_string(cli_value, env_name, settings_value)
        .unwrap_or_else(|| default.to_string())
}

pub(crate) fn resolve_optional_string(
    cli_value: Option<String>,
    env_name: &str,
    settings_value: Option<&str>,
) -> Option<String> {
    cli_value
        .and_then(non_blank)
        .or_else(|| non_empty_env(env_name))
        .or_else(|| settings_value.map(ToString::to_string).and_then(non_blank))
}

pub(crate) fn resolve_optional_path(
    cli_value: Option<PathBuf>,
    env_name: &str,
    settings_value: Option<&str>,
) -> Option<PathBuf> {
    cli_value
        .filter(|path| !path.as_os_str().is_empty())
        .or_else(|| resolve_optional_string(None, env_name, settings_value).map(PathBuf::from))
}

pub(crate) fn resolve_positive_u64(
    cli_value: Option<u64>,
    env_name: &str,
    settings_value: Option<u64>,
    default: u64,
) -> u64 {
    cli_value
        .filter(|value| *value > 0)
        .or_else(|| parse_positive_from_env(env_name))
        .or_else(|| settings_value.filter(|value| *value > 0))
        .unwrap_or(default)
}

pub(crate) fn resolve_optional_positive_usize(
    cli_value: Option<usize>,
    env_name: &str,
    settings_value: Option<usize>,
) -> Option<usize> {
    cli_value
        .filter(|value| *value > 0)
        .or_else(|| parse_positive_from_env(env_name))
        .or_else(|| settings_value.filter(|value| *value > 0))
}

pub(crate) fn resolve_embedding_provider(
    cli_value: Option<EmbeddingProviderKind>,
    env_name: &str,
    settings_value: Option<&str>,
) -> EmbeddingProviderKind {
    if let Some(provider) = cli_value {
        return provider;
    }
    if let Some(raw) = non_empty_env(env_name) {
        match raw.parse() {
            Ok(provider) => return provider,
            Err(error) => tracing::warn!(
                env_var = %env_name,
                error = %error,
                "invalid embedding provider env value; using settings/default"
            ),
        }
    }
    if let Some(raw) = settings_value {
        match raw.parse() {
            Ok(provider) => return provider,
            Err(error) => tracing::warn!(
                error = %error,
                "invalid embedding.provider in settings; using default"
            ),
        }
    }
    EmbeddingProviderKind::default()
}

pub(crate) fn resolve_unit_f32(env_name: &str, settings_value: Option<f32>, default: f32) -> f32 {
    if let Some(value) = non_empty_env(env_name).and_then(|raw| parse_unit_f32(env_name, &raw)) {
        return value;
    }
    if let Some(value) = settings_value {
        if (0.0..=1.0).contains(&value) {
            return value;
        }
        tracing::warn!(
            value,
            "invalid matching.threshold in settings (expected 0.0..=1.0); using default"
        );
    }
    default
}

pub(crate) fn parse_u64_from_env(name: &str) -> Option<u64> {
    let raw = non_empty_env(name)?;
    raw.parse::<u64>()
        .inspect_err(|_| {
            tracing::warn!(env_var = %name, value = %raw, "invalid integer env value");
        })
        .ok()
}

pub(crate) fn parse_positive_from_env<T>(name: &str) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let raw = non_empty_env(name)?;
    let parsed = parse_positive::<T>(&raw);
    if parsed.is_none() {
        tracing::warn!(env_var = %name, value = %raw, "invalid positive integer env value");
    }
    parsed
}

fn parse_positive<T>(raw: &str) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    raw.trim()
        .parse::<T>()
        .ok()
        .filter(|value| *value > T::default())
}

fn parse_unit_f32(name: &str, raw: &str) -> Option<f32> {
    match raw.trim().parse::<f32>() {
        Ok(value) if (0.0..=1.0).contains(&value) => Some(value),
        _ => {
            tracing::warn!(
                env_var = %name,
                value = %raw,
                "invalid unit float env value (expected 0.0..=1.0)"
            );
            None
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(non_blank)
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
