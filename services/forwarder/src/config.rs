use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Deserialize-only shadow of [`Config`]: every field optional so a
/// partial TOML file is valid, with defaults applied in code rather than
/// via `serde(default = "...")` string literals (SPEC_FULL.md §1).
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    brokers: Option<String>,
    backlog_capacity: Option<usize>,
    headers_mode_eventstream: Option<bool>,
    headers_mode_forwarder: Option<bool>,
}

/// Ambient, TOML-sourced settings layered under the per-run CLI flags
/// (SPEC_FULL.md §6.1). CLI flags cover per-run topology (entity,
/// topics, batching); this file covers what stays constant across runs
/// against the same cluster.
#[derive(Debug, Clone)]
pub struct Config {
    pub brokers: String,
    pub backlog_capacity: usize,
    pub headers_mode_eventstream: bool,
    pub headers_mode_forwarder: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_owned(),
            backlog_capacity: 10_000,
            headers_mode_eventstream: false,
            headers_mode_forwarder: false,
        }
    }
}

impl Config {
    fn from_raw(raw: RawConfig) -> Self {
        let defaults = Config::default();
        Config {
            brokers: raw.brokers.unwrap_or(defaults.brokers),
            backlog_capacity: raw.backlog_capacity.unwrap_or(defaults.backlog_capacity),
            headers_mode_eventstream: raw.headers_mode_eventstream.unwrap_or(defaults.headers_mode_eventstream),
            headers_mode_forwarder: raw.headers_mode_forwarder.unwrap_or(defaults.headers_mode_forwarder),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_str(&text, path)
    }

    fn from_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Config::from_raw(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = Config::load(Path::new("/nonexistent/forwarder.toml")).unwrap();
        assert_eq!(cfg.brokers, "localhost:9092");
        assert!(!cfg.headers_mode_eventstream);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let cfg = Config::from_str("brokers = \"kafka:9092\"\n", Path::new("forwarder.toml")).unwrap();
        assert_eq!(cfg.brokers, "kafka:9092");
        assert_eq!(cfg.backlog_capacity, 10_000);
    }
}
