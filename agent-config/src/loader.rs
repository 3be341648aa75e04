//! Configuration loader implementations.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::schema::EngineConfig;

/// Overrides [`EngineConfig::default_timeout_ms`].
pub const ENV_DEFAULT_TIMEOUT_MS: &str = "TOOLSETS_DEFAULT_TIMEOUT_MS";
/// Overrides [`EngineConfig::max_concurrency`].
pub const ENV_MAX_CONCURRENCY: &str = "TOOLSETS_MAX_CONCURRENCY";
/// Overrides [`EngineConfig::log_filter`].
pub const ENV_LOG_FILTER: &str = "TOOLSETS_LOG";

/// Parses a configuration document.
///
/// # Errors
///
/// Returns an error for malformed JSON, unknown fields or invalid limits.
pub fn from_json_str(text: &str) -> Result<EngineConfig> {
    let config: EngineConfig =
        serde_json::from_str(text).context("failed to parse engine configuration")?;
    config.validate()?;
    Ok(config)
}

/// Reads and parses a configuration file.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed.
pub fn from_file(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration from {}", path.display()))?;
    from_json_str(&text).with_context(|| format!("invalid configuration in {}", path.display()))
}

/// Applies environment overrides obtained through `lookup`.
///
/// # Errors
///
/// Returns an error when an override cannot be parsed or yields an invalid
/// configuration.
pub fn apply_env<F>(mut config: EngineConfig, lookup: F) -> Result<EngineConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(ENV_DEFAULT_TIMEOUT_MS) {
        config.default_timeout_ms = Some(
            raw.trim()
                .parse()
                .with_context(|| format!("{ENV_DEFAULT_TIMEOUT_MS} must be an integer, got `{raw}`"))?,
        );
    }
    if let Some(raw) = lookup(ENV_MAX_CONCURRENCY) {
        config.max_concurrency = Some(
            raw.trim()
                .parse()
                .with_context(|| format!("{ENV_MAX_CONCURRENCY} must be an integer, got `{raw}`"))?,
        );
    }
    if let Some(raw) = lookup(ENV_LOG_FILTER) {
        config.log_filter = Some(raw);
    }
    config.validate()?;
    Ok(config)
}

/// Loads the file at `path`, if any, then applies process environment
/// overrides.
///
/// # Errors
///
/// Propagates file, parse and validation errors.
pub fn load(path: Option<&Path>) -> Result<EngineConfig> {
    let base = path.map(from_file).transpose()?.unwrap_or_default();
    let config = apply_env(base, |key| std::env::var(key).ok())?;
    debug!(?config, "loaded engine configuration");
    Ok(config)
}
