#![forbid(unsafe_code)]

//! Runtime configuration.
//!
//! Loaded from TOML or JSON, then adjusted by environment overrides:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `WEAVE_DEBOUNCE_MS` | `default_debounce_ms` |
//! | `WEAVE_LOG` | `log_filter` |
//!
//! Unparseable override values are ignored with a warning; unparseable
//! files are an error.

use std::time::Duration;

use serde::Deserialize;
use weave_core::{Error, Result};

/// Tunables shared by every component mounted through one context.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Debounce interval used by text inputs that do not set their own.
    pub default_debounce_ms: u64,
    /// Upper bound on back-to-back render passes triggered from one notification.
    pub max_render_passes: u32,
    /// `tracing` filter directive used when `WEAVE_LOG` is unset.
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_debounce_ms: 0,
            max_render_passes: 16,
            log_filter: "warn".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()
    }

    /// Parse a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()
    }

    /// Apply `WEAVE_*` overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary lookup (environment in production).
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup("WEAVE_DEBOUNCE_MS") {
            match raw.trim().parse() {
                Ok(ms) => self.default_debounce_ms = ms,
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid WEAVE_DEBOUNCE_MS"),
            }
        }
        if let Some(filter) = lookup("WEAVE_LOG").filter(|f| !f.trim().is_empty()) {
            self.log_filter = filter;
        }
        self
    }

    /// Default debounce interval as a duration.
    #[must_use]
    pub fn default_debounce(&self) -> Duration {
        Duration::from_millis(self.default_debounce_ms)
    }

    fn validate(self) -> Result<Self> {
        if self.max_render_passes == 0 {
            return Err(Error::Config(
                "max_render_passes must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.default_debounce(), Duration::ZERO);
        assert_eq!(config.max_render_passes, 16);
    }

    #[test]
    fn toml_partial_document_keeps_defaults() {
        let config = RuntimeConfig::from_toml_str("default_debounce_ms = 200\n").unwrap();
        assert_eq!(config.default_debounce_ms, 200);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn json_document() {
        let config =
            RuntimeConfig::from_json_str(r#"{"max_render_passes": 4, "log_filter": "debug"}"#)
                .unwrap();
        assert_eq!(config.max_render_passes, 4);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = RuntimeConfig::from_toml_str("debounce = 3\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn zero_render_passes_is_rejected() {
        assert!(RuntimeConfig::from_toml_str("max_render_passes = 0\n").is_err());
    }

    #[test]
    fn overrides_apply_and_bad_values_are_ignored() {
        let config = RuntimeConfig::default().with_overrides(|name| match name {
            "WEAVE_DEBOUNCE_MS" => Some("150".into()),
            "WEAVE_LOG" => Some("weave_runtime=trace".into()),
            _ => None,
        });
        assert_eq!(config.default_debounce_ms, 150);
        assert_eq!(config.log_filter, "weave_runtime=trace");

        let config = RuntimeConfig::default().with_overrides(|name| {
            (name == "WEAVE_DEBOUNCE_MS").then(|| "soon".to_string())
        });
        assert_eq!(config.default_debounce_ms, 0);
    }
}
