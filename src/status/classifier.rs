//! Health-first status classification and alert derivation.
//!
//! Rules are evaluated in priority order, first match wins:
//!
//! 1. `health < critical_below` → [`StatusCategory::Critical`]
//! 2. `health < warning_below` → [`StatusCategory::Warning`]
//! 3. otherwise → [`StatusCategory::Optimal`]
//!
//! The alert flag is always raised for critical equipment, follows the
//! upstream flag for warning equipment, and is never raised for optimal
//! equipment. Classification is pure and O(1); nothing is cached.

#![allow(missing_docs)]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::config::StatusConfig;
use crate::core::errors::{DashError, Result};
use crate::status::snapshot::{EquipmentSnapshot, PERCENT_DOMAIN};

/// Default health threshold below which equipment is critical.
pub const DEFAULT_CRITICAL_BELOW: f64 = 70.0;
/// Default health threshold below which equipment is in warning.
pub const DEFAULT_WARNING_BELOW: f64 = 85.0;

// ──────────────────── category ────────────────────

/// Displayable status taxonomy. Ordered by severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum StatusCategory {
    Optimal,
    Warning,
    Critical,
}

impl StatusCategory {
    /// All categories, least severe first.
    pub const ALL: [Self; 3] = [Self::Optimal, Self::Warning, Self::Critical];

    /// Lowercase label used in badges and JSON output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    /// Utility-class color set consumed by the web card renderer.
    #[must_use]
    pub const fn color_class(self) -> &'static str {
        match self {
            Self::Optimal => "text-green-600 bg-green-50 border-green-200",
            Self::Warning => "text-yellow-600 bg-yellow-50 border-yellow-200",
            Self::Critical => "text-red-600 bg-red-50 border-red-200",
        }
    }

    /// Color class for a status label that did not come from a classification.
    #[must_use]
    pub const fn fallback_color_class() -> &'static str {
        "text-gray-600 bg-gray-50 border-gray-200"
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ──────────────────── thresholds ────────────────────

/// Health cut-offs separating the three categories.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusThresholds {
    pub critical_below: f64,
    pub warning_below: f64,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            critical_below: DEFAULT_CRITICAL_BELOW,
            warning_below: DEFAULT_WARNING_BELOW,
        }
    }
}

impl StatusThresholds {
    /// Build validated thresholds. Requires `0 <= critical < warning <= 100`.
    pub fn new(critical_below: f64, warning_below: f64) -> Result<Self> {
        let thresholds = Self {
            critical_below,
            warning_below,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn from_config(config: &StatusConfig) -> Result<Self> {
        Self::new(
            config.critical_below_health_pct,
            config.warning_below_health_pct,
        )
    }

    pub fn validate(&self) -> Result<()> {
        for (name, val) in [
            ("critical_below_health_pct", self.critical_below),
            ("warning_below_health_pct", self.warning_below),
        ] {
            if !PERCENT_DOMAIN.contains(&val) {
                return Err(DashError::InvalidConfig {
                    details: format!("status.{name} must be in [0, 100], got {val}"),
                });
            }
        }
        if self.critical_below >= self.warning_below {
            return Err(DashError::InvalidConfig {
                details: format!(
                    "status thresholds must strictly ascend: critical_below ({}) < warning_below ({})",
                    self.critical_below, self.warning_below
                ),
            });
        }
        Ok(())
    }

    /// Category for an already-validated health value.
    #[must_use]
    pub fn category_for(&self, health_pct: f64) -> StatusCategory {
        if health_pct < self.critical_below {
            StatusCategory::Critical
        } else if health_pct < self.warning_below {
            StatusCategory::Warning
        } else {
            StatusCategory::Optimal
        }
    }
}

// ──────────────────── classification ────────────────────

/// Classifier output consumed by card and summary renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Classification {
    pub category: StatusCategory,
    pub alert: bool,
}

impl Classification {
    /// Combine a derived category with the upstream alert flag.
    #[must_use]
    pub const fn from_category(category: StatusCategory, raw_alert: bool) -> Self {
        let alert = match category {
            StatusCategory::Critical => true,
            StatusCategory::Warning => raw_alert,
            StatusCategory::Optimal => false,
        };
        Self { category, alert }
    }
}

/// Stateless snapshot classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatusClassifier {
    thresholds: StatusThresholds,
}

impl StatusClassifier {
    #[must_use]
    pub const fn new(thresholds: StatusThresholds) -> Self {
        Self { thresholds }
    }

    pub fn from_config(config: &StatusConfig) -> Result<Self> {
        Ok(Self::new(StatusThresholds::from_config(config)?))
    }

    #[must_use]
    pub const fn thresholds(&self) -> StatusThresholds {
        self.thresholds
    }

    /// Classify one snapshot.
    ///
    /// Fails with [`DashError::InvalidMetric`] naming the first offending
    /// field when the snapshot is outside its declared domain.
    pub fn classify(&self, snapshot: &EquipmentSnapshot) -> Result<Classification> {
        snapshot.validate()?;
        let category = self.thresholds.category_for(snapshot.health_pct);
        Ok(Classification::from_category(category, snapshot.raw_alert))
    }
}

/// Classify with the default 70/85 thresholds.
pub fn classify(snapshot: &EquipmentSnapshot) -> Result<Classification> {
    StatusClassifier::default().classify(snapshot)
}
