//! Batch classification and fleet-level summary statistics.

#![allow(missing_docs)]
#![allow(clippy::cast_precision_loss)]

use serde::Serialize;

use crate::core::errors::{DashError, Result};
use crate::status::classifier::{Classification, StatusCategory, StatusClassifier};
use crate::status::snapshot::EquipmentSnapshot;

/// Classification outcome for one equipment entry.
///
/// Invalid snapshots stay in the batch so the operator sees the sensor fault
/// next to the healthy units.
#[derive(Debug)]
pub struct EquipmentStatus {
    pub name: String,
    /// `None` when the feed record could not be read as a snapshot at all.
    pub snapshot: Option<EquipmentSnapshot>,
    pub outcome: Result<Classification>,
}

impl EquipmentStatus {
    /// Entry rejected before classification (unreadable feed record).
    #[must_use]
    pub fn rejected(name: impl Into<String>, error: DashError) -> Self {
        Self {
            name: name.into(),
            snapshot: None,
            outcome: Err(error),
        }
    }

    #[must_use]
    pub fn classification(&self) -> Option<Classification> {
        self.outcome.as_ref().ok().copied()
    }

    #[must_use]
    pub fn error(&self) -> Option<&DashError> {
        self.outcome.as_ref().err()
    }

    /// Whether the card should be visually highlighted.
    #[must_use]
    pub fn needs_attention(&self) -> bool {
        self.classification().is_some_and(|c| c.alert)
    }
}

impl StatusClassifier {
    /// Classify one snapshot into a batch entry.
    #[must_use]
    pub fn status_of(&self, snapshot: EquipmentSnapshot) -> EquipmentStatus {
        let outcome = self.classify(&snapshot);
        EquipmentStatus {
            name: snapshot.name.clone(),
            snapshot: Some(snapshot),
            outcome,
        }
    }

    /// Classify every snapshot independently.
    pub fn classify_all<I>(&self, snapshots: I) -> Vec<EquipmentStatus>
    where
        I: IntoIterator<Item = EquipmentSnapshot>,
    {
        snapshots
            .into_iter()
            .map(|snapshot| self.status_of(snapshot))
            .collect()
    }
}

/// Aggregate counts consumed by the summary-statistics renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FleetSummary {
    pub total: usize,
    pub optimal: usize,
    pub warning: usize,
    pub critical: usize,
    pub alerting: usize,
    pub invalid: usize,
    /// Mean health over valid entries; `None` when none are valid.
    pub mean_health_pct: Option<f64>,
    /// Mean efficiency over valid entries; `None` when none are valid.
    pub mean_efficiency_pct: Option<f64>,
    /// Most severe category among valid entries.
    pub worst: Option<StatusCategory>,
}

impl FleetSummary {
    #[must_use]
    pub fn from_results(results: &[EquipmentStatus]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        let mut health_sum = 0.0;
        let mut efficiency_sum = 0.0;

        for status in results {
            let (Some(classification), Some(snapshot)) =
                (status.classification(), status.snapshot.as_ref())
            else {
                summary.invalid += 1;
                continue;
            };
            match classification.category {
                StatusCategory::Optimal => summary.optimal += 1,
                StatusCategory::Warning => summary.warning += 1,
                StatusCategory::Critical => summary.critical += 1,
            }
            if classification.alert {
                summary.alerting += 1;
            }
            summary.worst = summary.worst.max(Some(classification.category));
            health_sum += snapshot.health_pct;
            efficiency_sum += snapshot.efficiency_pct;
        }

        let valid = summary.valid();
        if valid > 0 {
            summary.mean_health_pct = Some(health_sum / valid as f64);
            summary.mean_efficiency_pct = Some(efficiency_sum / valid as f64);
        }
        summary
    }

    #[must_use]
    pub const fn valid(&self) -> usize {
        self.total - self.invalid
    }

    #[must_use]
    pub const fn count(&self, category: StatusCategory) -> usize {
        match category {
            StatusCategory::Optimal => self.optimal,
            StatusCategory::Warning => self.warning,
            StatusCategory::Critical => self.critical,
        }
    }
}
