//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{DashError, Result};
use crate::status::classifier::{DEFAULT_CRITICAL_BELOW, DEFAULT_WARNING_BELOW, StatusThresholds};

/// Smallest refresh interval the dashboard accepts.
pub const MIN_REFRESH_MS: u64 = 100;

/// Full dashboard configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub status: StatusConfig,
    pub feed: FeedConfig,
    pub logging: LoggingConfig,
    pub paths: PathsConfig,
}

/// Health thresholds for status classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatusConfig {
    pub critical_below_health_pct: f64,
    pub warning_below_health_pct: f64,
}

/// Telemetry snapshot source and refresh cadence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FeedConfig {
    /// JSON or TOML feed file; the built-in sample fleet is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_file: Option<PathBuf>,
    pub refresh_ms: u64,
}

/// JSONL activity log tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// Secondary log location used when the primary path is unwritable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_path: Option<PathBuf>,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
    pub fsync_interval_secs: u64,
}

/// Filesystem paths used by dairydash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    pub jsonl_log: PathBuf,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            critical_below_health_pct: DEFAULT_CRITICAL_BELOW,
            warning_below_health_pct: DEFAULT_WARNING_BELOW,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            snapshot_file: None,
            refresh_ms: 5_000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fallback_path: None,
            max_size_bytes: 16 * 1024 * 1024,
            max_rotated_files: 3,
            fsync_interval_secs: 10,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!(
                    "[DDASH-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths"
                );
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        let cfg = home_dir
            .join(".config")
            .join("dairydash")
            .join("config.toml");
        let data = home_dir.join(".local").join("share").join("dairydash");
        Self {
            config_file: cfg,
            jsonl_log: data.join("activity.jsonl"),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| DashError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(DashError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for the activity log.
    ///
    /// FNV-1a over the canonical JSON form, stable across processes.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    /// Classification thresholds derived from `[status]`.
    pub fn thresholds(&self) -> Result<StatusThresholds> {
        StatusThresholds::from_config(&self.status)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        // status
        if let Some(raw) = lookup("DDASH_STATUS_CRITICAL_BELOW_HEALTH_PCT") {
            self.status.critical_below_health_pct =
                parse_env("DDASH_STATUS_CRITICAL_BELOW_HEALTH_PCT", &raw)?;
        }
        if let Some(raw) = lookup("DDASH_STATUS_WARNING_BELOW_HEALTH_PCT") {
            self.status.warning_below_health_pct =
                parse_env("DDASH_STATUS_WARNING_BELOW_HEALTH_PCT", &raw)?;
        }

        // feed
        if let Some(raw) = lookup("DDASH_FEED_SNAPSHOT_FILE") {
            self.feed.snapshot_file = Some(PathBuf::from(raw));
        }
        if let Some(raw) = lookup("DDASH_FEED_REFRESH_MS") {
            self.feed.refresh_ms = parse_env("DDASH_FEED_REFRESH_MS", &raw)?;
        }

        // logging
        if let Some(raw) = lookup("DDASH_LOGGING_ENABLED") {
            self.logging.enabled = parse_env("DDASH_LOGGING_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("DDASH_LOGGING_MAX_SIZE_BYTES") {
            self.logging.max_size_bytes = parse_env("DDASH_LOGGING_MAX_SIZE_BYTES", &raw)?;
        }
        if let Some(raw) = lookup("DDASH_LOGGING_MAX_ROTATED_FILES") {
            self.logging.max_rotated_files = parse_env("DDASH_LOGGING_MAX_ROTATED_FILES", &raw)?;
        }

        // paths
        if let Some(raw) = lookup("DDASH_JSONL_LOG") {
            self.paths.jsonl_log = PathBuf::from(raw);
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        StatusThresholds::from_config(&self.status)?;

        if self.feed.refresh_ms < MIN_REFRESH_MS {
            return Err(DashError::InvalidConfig {
                details: format!(
                    "feed.refresh_ms must be >= {MIN_REFRESH_MS}, got {}",
                    self.feed.refresh_ms
                ),
            });
        }

        if self.logging.max_size_bytes == 0 || self.logging.max_rotated_files == 0 {
            return Err(DashError::InvalidConfig {
                details: "logging.max_size_bytes and logging.max_rotated_files must be > 0"
                    .to_string(),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|error| DashError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}
