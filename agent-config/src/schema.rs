//! Strongly typed configuration schemas.

use std::num::NonZeroUsize;
use std::time::Duration;

use agent_tools::DispatchConfig;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// Default tracing filter when none is configured.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Engine settings. Unset fields fall back to the engine defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Timeout applied to calls that do not specify one, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_timeout_ms: Option<u64>,
    /// Maximum number of capabilities running at once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<usize>,
    /// `tracing` filter directive, e.g. `agent_tools=debug`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl EngineConfig {
    /// Checks that every configured limit is usable.
    ///
    /// # Errors
    ///
    /// Returns an error when a limit is zero or the log filter is blank.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.default_timeout_ms != Some(0),
            "default_timeout_ms must be greater than zero"
        );
        ensure!(
            self.max_concurrency != Some(0),
            "max_concurrency must be greater than zero"
        );
        if let Some(filter) = &self.log_filter {
            ensure!(!filter.trim().is_empty(), "log_filter cannot be blank");
        }
        Ok(())
    }

    /// Builds the dispatcher policy described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when [`EngineConfig::validate`] fails.
    pub fn dispatch_config(&self) -> Result<DispatchConfig> {
        self.validate()?;
        let mut config = DispatchConfig::default();
        if let Some(ms) = self.default_timeout_ms {
            config = config.with_default_timeout(Duration::from_millis(ms));
        }
        if let Some(limit) = self.max_concurrency {
            let limit = NonZeroUsize::new(limit).context("max_concurrency must be greater than zero")?;
            config = config.with_max_concurrency(limit);
        }
        Ok(config)
    }

    /// Returns the configured log filter or [`DEFAULT_LOG_FILTER`].
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}
