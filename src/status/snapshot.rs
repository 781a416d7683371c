//! Equipment telemetry snapshot: one reading for one unit at one instant.

#![allow(missing_docs)]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::errors::{DashError, Result};

/// Fields of a snapshot that carry a validated domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricField {
    Name,
    Health,
    Temperature,
    Efficiency,
    Alert,
}

impl MetricField {
    /// Field name as it appears in feed records and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Health => "health",
            Self::Temperature => "temp",
            Self::Efficiency => "efficiency",
            Self::Alert => "alert",
        }
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive domain for percentage metrics.
pub const PERCENT_DOMAIN: std::ops::RangeInclusive<f64> = 0.0..=100.0;

/// One piece of equipment at one point in time.
///
/// Snapshots are transient: created by the telemetry feed, classified, then
/// dropped. Serialized field names follow the feed record format
/// (`health`, `temp`, `efficiency`, `alert`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSnapshot {
    /// Identifying name, non-empty.
    pub name: String,
    /// Health score, domain [0, 100].
    #[serde(rename = "health")]
    pub health_pct: f64,
    /// Temperature in Celsius. Sensor-dependent, not range checked.
    #[serde(rename = "temp")]
    pub temperature_c: f64,
    /// Efficiency, domain [0, 100].
    #[serde(rename = "efficiency")]
    pub efficiency_pct: f64,
    /// Alert flag raised by the upstream monitoring feed.
    #[serde(rename = "alert", default)]
    pub raw_alert: bool,
}

impl EquipmentSnapshot {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        health_pct: f64,
        temperature_c: f64,
        efficiency_pct: f64,
        raw_alert: bool,
    ) -> Self {
        Self {
            name: name.into(),
            health_pct,
            temperature_c,
            efficiency_pct,
            raw_alert,
        }
    }

    /// Check every domain-constrained field. Out-of-range values are reported,
    /// never clamped.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DashError::invalid_metric(
                MetricField::Name.as_str(),
                format!("{:?}", self.name),
            ));
        }
        check_percent(MetricField::Health, self.health_pct)?;
        check_percent(MetricField::Efficiency, self.efficiency_pct)?;
        Ok(())
    }
}

/// Reject NaN and anything outside [0, 100].
pub fn check_percent(field: MetricField, value: f64) -> Result<f64> {
    // RangeInclusive::contains is false for NaN.
    if PERCENT_DOMAIN.contains(&value) {
        Ok(value)
    } else {
        Err(DashError::invalid_metric(field.as_str(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> EquipmentSnapshot {
        EquipmentSnapshot::new("Pasteurizer Unit 1", 92.0, 72.5, 96.8, false)
    }

    #[test]
    fn valid_snapshot_passes() {
        assert!(healthy().validate().is_ok());
    }

    #[test]
    fn percent_bounds_are_inclusive() {
        assert!(check_percent(MetricField::Health, 0.0).is_ok());
        assert!(check_percent(MetricField::Health, 100.0).is_ok());
        assert!(check_percent(MetricField::Health, -0.001).is_err());
        assert!(check_percent(MetricField::Health, 100.001).is_err());
    }

    #[test]
    fn nan_and_infinity_rejected() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = check_percent(MetricField::Efficiency, value).unwrap_err();
            match err {
                DashError::InvalidMetric { field, .. } => assert_eq!(field, "efficiency"),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn empty_name_rejected() {
        let mut snap = healthy();
        snap.name = "   ".to_string();
        let err = snap.validate().unwrap_err();
        assert!(matches!(err, DashError::InvalidMetric { field: "name", .. }));
    }

    #[test]
    fn health_checked_before_efficiency() {
        let snap = EquipmentSnapshot::new("Centrifuge A", 150.0, 65.2, -3.0, true);
        let err = snap.validate().unwrap_err();
        assert!(matches!(err, DashError::InvalidMetric { field: "health", .. }));
    }

    #[test]
    fn temperature_is_unconstrained() {
        let snap = EquipmentSnapshot::new("Storage Tank T-101", 65.0, -40.0, 78.5, true);
        assert!(snap.validate().is_ok());
        let hot = EquipmentSnapshot::new("Steam line", 90.0, 180.0, 90.0, false);
        assert!(hot.validate().is_ok());
    }

    #[test]
    fn serde_uses_feed_field_names() {
        let json = serde_json::to_value(healthy()).unwrap();
        assert_eq!(json["health"], 92.0);
        assert_eq!(json["temp"], 72.5);
        assert_eq!(json["efficiency"], 96.8);
        assert_eq!(json["alert"], false);

        let parsed: EquipmentSnapshot = serde_json::from_str(
            r#"{"name":"Packaging Line","health":84,"temp":25.8,"efficiency":91.7}"#,
        )
        .unwrap();
        assert!(!parsed.raw_alert);
        assert!((parsed.health_pct - 84.0).abs() < f64::EPSILON);
    }
}
