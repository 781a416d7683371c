//! Snapshot feed files: JSON arrays or TOML `[[equipment]]` tables.
//!
//! Metric fields are read as loose values so that one bad record (missing,
//! non-numeric, NaN or overflowing metric) becomes an `InvalidMetric` entry
//! instead of failing the whole file.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use toml::Value as TomlValue;

use crate::core::errors::{DashError, Result};
use crate::feed::sample::sample_fleet;
use crate::status::classifier::StatusClassifier;
use crate::status::snapshot::{EquipmentSnapshot, MetricField};
use crate::status::summary::EquipmentStatus;

/// One feed record after decoding.
#[derive(Debug)]
pub struct FeedEntry {
    /// Record name, or `record #N` (1-based) when the name is unusable.
    pub name: String,
    pub snapshot: Result<EquipmentSnapshot>,
}

/// A record field as written in the feed, independent of the file format.
#[derive(Debug, Clone, PartialEq)]
enum RawField {
    Missing,
    /// Any numeric literal, including NaN and values beyond `f64` range (as infinity).
    Number(f64),
    Text(String),
    Bool(bool),
    /// Arrays, tables and anything else, kept in its source rendering.
    Other(String),
}

impl RawField {
    fn from_json(value: Option<JsonValue>) -> Self {
        match value {
            None | Some(JsonValue::Null) => Self::Missing,
            Some(JsonValue::Number(n)) => {
                // Literals beyond f64 range (1e400) are kept as text and parse to infinity.
                let parsed = n.as_f64().or_else(|| n.to_string().parse::<f64>().ok());
                parsed.map_or_else(|| Self::Other(n.to_string()), Self::Number)
            }
            Some(JsonValue::String(s)) => Self::Text(s),
            Some(JsonValue::Bool(b)) => Self::Bool(b),
            Some(other) => Self::Other(other.to_string()),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_toml(value: Option<TomlValue>) -> Self {
        match value {
            None => Self::Missing,
            Some(TomlValue::Integer(i)) => Self::Number(i as f64),
            Some(TomlValue::Float(f)) => Self::Number(f),
            Some(TomlValue::String(s)) => Self::Text(s),
            Some(TomlValue::Boolean(b)) => Self::Bool(b),
            Some(other) => Self::Other(other.to_string()),
        }
    }

    /// Rendering used as the `value` of an `InvalidMetric`.
    fn describe(&self) -> String {
        match self {
            Self::Missing => "missing".to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => format!("{s:?}"),
            Self::Bool(b) => b.to_string(),
            Self::Other(raw) => raw.clone(),
        }
    }
}

#[derive(Debug)]
struct FeedRecord {
    name: RawField,
    health: RawField,
    temp: RawField,
    efficiency: RawField,
    alert: RawField,
}

impl FeedRecord {
    fn from_json(value: JsonValue) -> Self {
        let mut map = match value {
            JsonValue::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        let mut take = |key: &str| RawField::from_json(map.remove(key));
        Self {
            name: take("name"),
            health: take("health"),
            temp: take("temp"),
            efficiency: take("efficiency"),
            alert: take("alert"),
        }
    }

    fn from_toml(value: TomlValue) -> Self {
        let mut table = match value {
            TomlValue::Table(table) => table,
            _ => toml::Table::new(),
        };
        let mut take = |key: &str| RawField::from_toml(table.remove(key));
        Self {
            name: take("name"),
            health: take("health"),
            temp: take("temp"),
            efficiency: take("efficiency"),
            alert: take("alert"),
        }
    }

    fn into_entry(self, index: usize) -> FeedEntry {
        let name = match &self.name {
            RawField::Text(s) if !s.trim().is_empty() => s.clone(),
            _ => format!("record #{}", index + 1),
        };
        let snapshot = self.into_snapshot();
        FeedEntry { name, snapshot }
    }

    fn into_snapshot(self) -> Result<EquipmentSnapshot> {
        let name = match self.name {
            RawField::Text(s) => s,
            other => return Err(invalid(MetricField::Name, &other)),
        };
        let health_pct = number(MetricField::Health, &self.health)?;
        let temperature_c = number(MetricField::Temperature, &self.temp)?;
        let efficiency_pct = number(MetricField::Efficiency, &self.efficiency)?;
        let raw_alert = match self.alert {
            RawField::Missing => false,
            RawField::Bool(b) => b,
            other => return Err(invalid(MetricField::Alert, &other)),
        };
        let snapshot = EquipmentSnapshot {
            name,
            health_pct,
            temperature_c,
            efficiency_pct,
            raw_alert,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }
}

/// Any numeric literal passes here; domain checks happen in `validate`.
fn number(field: MetricField, value: &RawField) -> Result<f64> {
    match value {
        RawField::Number(n) => Ok(*n),
        other => Err(invalid(field, other)),
    }
}

fn invalid(field: MetricField, value: &RawField) -> DashError {
    DashError::invalid_metric(field.as_str(), value.describe())
}

/// Parse feed text. `toml` selects the TOML reader, otherwise JSON.
///
/// JSON documents are either an array of records or an object with an
/// `equipment` array; TOML documents use `[[equipment]]` tables.
pub fn parse_feed(raw: &str, toml: bool) -> std::result::Result<Vec<FeedEntry>, String> {
    let records = if toml {
        toml_records(raw)?
    } else {
        json_records(raw)?
    };
    Ok(records
        .into_iter()
        .enumerate()
        .map(|(i, record)| record.into_entry(i))
        .collect())
}

fn json_records(raw: &str) -> std::result::Result<Vec<FeedRecord>, String> {
    let items = match serde_json::from_str::<JsonValue>(raw).map_err(|e| e.to_string())? {
        JsonValue::Array(items) => items,
        JsonValue::Object(mut doc) => match doc.remove("equipment") {
            Some(JsonValue::Array(items)) => items,
            _ => return Err("expected an `equipment` array".to_string()),
        },
        _ => return Err("expected an array of equipment records".to_string()),
    };
    Ok(items.into_iter().map(FeedRecord::from_json).collect())
}

fn toml_records(raw: &str) -> std::result::Result<Vec<FeedRecord>, String> {
    let mut doc = toml::from_str::<toml::Table>(raw).map_err(|e| e.to_string())?;
    let items = match doc.remove("equipment") {
        None => Vec::new(),
        Some(TomlValue::Array(items)) => items,
        Some(_) => return Err("`equipment` must be an array of tables".to_string()),
    };
    Ok(items.into_iter().map(FeedRecord::from_toml).collect())
}

/// Read and decode a feed file. Unreadable or malformed files fail as a whole.
pub fn load_feed(path: &Path) -> Result<Vec<FeedEntry>> {
    let raw = fs::read_to_string(path).map_err(|source| DashError::io(path, source))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    parse_feed(&raw, is_toml).map_err(|details| DashError::Feed {
        path: path.to_path_buf(),
        details,
    })
}

/// Where snapshots come from for one refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// Built-in sample fleet.
    Sample,
    /// Feed file re-read on every refresh.
    File(PathBuf),
}

impl FeedSource {
    #[must_use]
    pub fn from_path(path: Option<&Path>) -> Self {
        path.map_or(Self::Sample, |p| Self::File(p.to_path_buf()))
    }

    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Sample => "built-in sample fleet".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }

    /// Load and classify one refresh cycle.
    pub fn classify(&self, classifier: &StatusClassifier) -> Result<Vec<EquipmentStatus>> {
        match self {
            Self::Sample => Ok(classifier.classify_all(sample_fleet())),
            Self::File(path) => Ok(load_feed(path)?
                .into_iter()
                .map(|entry| match entry.snapshot {
                    Ok(snapshot) => classifier.status_of(snapshot),
                    Err(error) => EquipmentStatus::rejected(entry.name, error),
                })
                .collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::classifier::StatusCategory;

    #[test]
    fn json_array_feed_parses() {
        let raw = r#"[
            {"name": "Centrifuge A", "health": 76, "temp": 65.2, "efficiency": 89.3, "alert": true},
            {"name": "Packaging Line", "health": 84, "temp": 25.8, "efficiency": 91.7}
        ]"#;
        let entries = parse_feed(raw, false).unwrap();
        assert_eq!(entries.len(), 2);
        let first = entries[0].snapshot.as_ref().unwrap();
        assert!(first.raw_alert);
        assert!(!entries[1].snapshot.as_ref().unwrap().raw_alert);
    }

    #[test]
    fn json_object_feed_parses() {
        let raw = r#"{"equipment": [{"name": "Homogenizer H-201", "health": 88, "temp": 68.1, "efficiency": 94.2}]}"#;
        let entries = parse_feed(raw, false).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Homogenizer H-201");
    }

    #[test]
    fn toml_feed_parses() {
        let raw = r#"
[[equipment]]
name = "Storage Tank T-101"
health = 65
temp = 4.2
efficiency = 78.5
alert = true
"#;
        let entries = parse_feed(raw, true).unwrap();
        let snap = entries[0].snapshot.as_ref().unwrap();
        assert!((snap.health_pct - 65.0).abs() < f64::EPSILON);
        assert!(snap.raw_alert);
    }

    #[test]
    fn non_numeric_metric_is_invalid_metric() {
        let raw = r#"[{"name": "Centrifuge A", "health": "high", "temp": 65.2, "efficiency": 89.3}]"#;
        let entries = parse_feed(raw, false).unwrap();
        let err = entries[0].snapshot.as_ref().unwrap_err();
        match err {
            DashError::InvalidMetric { field, value } => {
                assert_eq!(*field, "health");
                assert_eq!(value, "\"high\"");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_metric_is_invalid_metric() {
        let raw = r#"[{"name": "Centrifuge A", "health": 76, "temp": 65.2}]"#;
        let entries = parse_feed(raw, false).unwrap();
        let err = entries[0].snapshot.as_ref().unwrap_err();
        assert!(matches!(
            err,
            DashError::InvalidMetric { field: "efficiency", value } if value == "missing"
        ));
    }

    #[test]
    fn out_of_range_metric_is_invalid_metric() {
        let raw = r#"[{"name": "Centrifuge A", "health": 101, "temp": 65.2, "efficiency": 80}]"#;
        let entries = parse_feed(raw, false).unwrap();
        assert!(matches!(
            entries[0].snapshot,
            Err(DashError::InvalidMetric { field: "health", .. })
        ));
    }

    #[test]
    fn unnamed_record_gets_positional_name() {
        let raw = r#"[{"name": "ok", "health": 90, "temp": 1, "efficiency": 90}, {"health": 90}]"#;
        let entries = parse_feed(raw, false).unwrap();
        assert_eq!(entries[1].name, "record #2");
        assert!(matches!(
            entries[1].snapshot,
            Err(DashError::InvalidMetric { field: "name", .. })
        ));
    }

    #[test]
    fn overflowing_json_number_rejects_only_its_record() {
        let raw = r#"[
            {"name": "Pasteurizer Unit 1", "health": 92, "temp": 72.5, "efficiency": 96.8},
            {"name": "Centrifuge A", "health": 1e400, "temp": 65.2, "efficiency": 89.3}
        ]"#;
        let entries = parse_feed(raw, false).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].snapshot.is_ok());
        assert_eq!(entries[1].name, "Centrifuge A");
        match entries[1].snapshot.as_ref().unwrap_err() {
            DashError::InvalidMetric { field, value } => {
                assert_eq!(*field, "health");
                assert_eq!(value, "inf");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn toml_non_finite_metrics_are_reported_as_sent() {
        let raw = r#"
[[equipment]]
name = "Homogenizer H-201"
health = nan
temp = 68.1
efficiency = 94.2

[[equipment]]
name = "Storage Tank T-101"
health = 65
temp = 4.2
efficiency = inf
"#;
        let entries = parse_feed(raw, true).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(matches!(
            &entries[0].snapshot,
            Err(DashError::InvalidMetric { field: "health", value }) if value == "NaN"
        ));
        assert!(matches!(
            &entries[1].snapshot,
            Err(DashError::InvalidMetric { field: "efficiency", value }) if value == "inf"
        ));
    }

    #[test]
    fn non_boolean_alert_rejected() {
        let raw = r#"[{"name": "x", "health": 90, "temp": 1, "efficiency": 90, "alert": "yes"}]"#;
        let entries = parse_feed(raw, false).unwrap();
        assert!(matches!(
            entries[0].snapshot,
            Err(DashError::InvalidMetric { field: "alert", .. })
        ));
    }

    #[test]
    fn malformed_file_fails_as_feed_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        fs::write(&path, "{not json").unwrap();
        let err = load_feed(&path).unwrap_err();
        assert_eq!(err.code(), "DASH-2003");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_feed(Path::new("/nonexistent/dairydash/feed.json")).unwrap_err();
        assert!(matches!(err, DashError::Io { .. }));
    }

    #[test]
    fn file_source_keeps_bad_records_in_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.toml");
        fs::write(
            &path,
            r#"
[[equipment]]
name = "Pasteurizer Unit 1"
health = 92
temp = 72.5
efficiency = 96.8

[[equipment]]
name = "Broken sensor"
health = "n/a"
temp = 10
efficiency = 50
"#,
        )
        .unwrap();

        let source = FeedSource::from_path(Some(&path));
        let results = source.classify(&StatusClassifier::default()).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0].classification().map(|c| c.category),
            Some(StatusCategory::Optimal)
        );
        assert_eq!(results[1].name, "Broken sensor");
        assert!(results[1].snapshot.is_none());
        assert!(results[1].error().is_some());
    }

    #[test]
    fn sample_source_has_five_units() {
        let results = FeedSource::Sample
            .classify(&StatusClassifier::default())
            .unwrap();
        assert_eq!(results.len(), 5);
        assert_eq!(FeedSource::from_path(None), FeedSource::Sample);
    }
}
