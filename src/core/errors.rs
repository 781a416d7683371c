//! DASH-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, DashError>;

/// Top-level error type for the dairy dashboard core.
#[derive(Debug, Error)]
pub enum DashError {
    #[error("[DASH-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[DASH-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[DASH-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[DASH-2001] invalid metric {field}: {value}")]
    InvalidMetric { field: &'static str, value: String },

    #[error("[DASH-2002] unknown panel: {id:?}")]
    UnknownPanel { id: String },

    #[error("[DASH-2003] telemetry feed failure for {path}: {details}")]
    Feed { path: PathBuf, details: String },

    #[error("[DASH-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[DASH-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[DASH-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl DashError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "DASH-1001",
            Self::MissingConfig { .. } => "DASH-1002",
            Self::ConfigParse { .. } => "DASH-1003",
            Self::InvalidMetric { .. } => "DASH-2001",
            Self::UnknownPanel { .. } => "DASH-2002",
            Self::Feed { .. } => "DASH-2003",
            Self::Serialization { .. } => "DASH-2101",
            Self::Io { .. } => "DASH-3002",
            Self::Runtime { .. } => "DASH-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    ///
    /// A bad reading stays bad on retry; the next refresh cycle brings a new
    /// snapshot instead.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::Feed { .. } | Self::Runtime { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for an out-of-domain metric.
    #[must_use]
    pub fn invalid_metric(field: &'static str, value: impl ToString) -> Self {
        Self::InvalidMetric {
            field,
            value: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for DashError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for DashError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
