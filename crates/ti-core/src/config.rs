//! Configuration types for trade-index.
//!
//! [`Config::load`] reads `~/.config/trade-index/config.toml`, creating it
//! with hardcoded defaults if it does not yet exist. [`Config::defaults`]
//! returns the same defaults without touching the filesystem (useful in
//! tests).

use serde::Deserialize;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[source]
bucket = ""
prefix = ""
region = ""

[ingest]
polling_interval_ms = 30000

[query]
nearest_tolerance_ms   = 60000
first_before_lookback_ms = 3600000
first_after_lookahead_ms = 3600000
"#;

/// One-minute bucket width, fixed per spec and not configurable.
pub const BUCKET_WIDTH_MS: i64 = 60_000;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration, loaded from
/// `~/.config/trade-index/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

/// `[source]` section — identifies the object-store bucket/prefix to ingest
/// from, and (when `queue_url` is set) the notification queue to long-poll.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub region: String,
    /// Presence selects event-driven discovery; absence selects polling.
    #[serde(default)]
    pub queue_url: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            prefix: String::new(),
            region: String::new(),
            queue_url: None,
        }
    }
}

/// `[ingest]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_polling_interval_ms")]
    pub polling_interval_ms: u64,
}

fn default_polling_interval_ms() -> u64 {
    30_000
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            polling_interval_ms: default_polling_interval_ms(),
        }
    }
}

/// `[query]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_nearest_tolerance_ms")]
    pub nearest_tolerance_ms: i64,
    #[serde(default = "default_lookback_ms")]
    pub first_before_lookback_ms: i64,
    #[serde(default = "default_lookahead_ms")]
    pub first_after_lookahead_ms: i64,
}

fn default_nearest_tolerance_ms() -> i64 {
    60_000
}
fn default_lookback_ms() -> i64 {
    3_600_000
}
fn default_lookahead_ms() -> i64 {
    3_600_000
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            nearest_tolerance_ms: default_nearest_tolerance_ms(),
            first_before_lookback_ms: default_lookback_ms(),
            first_after_lookahead_ms: default_lookahead_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/trade-index/config.toml`, layered on top of the
    /// built-in defaults. Creates the file with defaults if it does not
    /// exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path.as_path()).required(false))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("trade-index")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load() {
        let cfg = Config::defaults();
        assert_eq!(cfg.ingest.polling_interval_ms, 30_000);
        assert_eq!(cfg.query.nearest_tolerance_ms, 60_000);
        assert_eq!(cfg.query.first_before_lookback_ms, 3_600_000);
        assert_eq!(cfg.query.first_after_lookahead_ms, 3_600_000);
        assert!(cfg.source.queue_url.is_none());
    }
}
