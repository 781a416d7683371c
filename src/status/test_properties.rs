//! Property-based tests for classification invariants.
//!
//! Health alone decides the category, critical units always alert, optimal
//! units never do, and out-of-domain metrics are rejected rather than clamped.

use proptest::prelude::*;

use super::classifier::{StatusCategory, StatusClassifier, StatusThresholds, classify};
use super::snapshot::EquipmentSnapshot;
use super::summary::{EquipmentStatus, FleetSummary};
use crate::core::errors::DashError;

// ──────────────────── strategies ────────────────────

fn arb_pct() -> impl Strategy<Value = f64> {
    0.0f64..=100.0
}

fn arb_out_of_domain() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-1000.0f64..-0.001),
        (100.001f64..1000.0),
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
    ]
}

fn arb_snapshot() -> impl Strategy<Value = EquipmentSnapshot> {
    (arb_pct(), -40.0f64..150.0, arb_pct(), any::<bool>()).prop_map(
        |(health, temp, efficiency, alert)| {
            EquipmentSnapshot::new("unit", health, temp, efficiency, alert)
        },
    )
}

fn arb_thresholds() -> impl Strategy<Value = StatusThresholds> {
    (0.0f64..99.0)
        .prop_flat_map(|critical| (Just(critical), (critical + 0.5)..=100.0))
        .prop_map(|(critical, warning)| {
            StatusThresholds::new(critical, warning).expect("ordered thresholds are valid")
        })
}

// ──────────────────── property tests ────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Category follows the default 70/85 cut-offs for every valid health.
    #[test]
    fn category_follows_health_ranges(snapshot in arb_snapshot()) {
        let c = classify(&snapshot).expect("in-domain snapshot");
        let expected = if snapshot.health_pct < 70.0 {
            StatusCategory::Critical
        } else if snapshot.health_pct < 85.0 {
            StatusCategory::Warning
        } else {
            StatusCategory::Optimal
        };
        prop_assert_eq!(c.category, expected);
    }

    #[test]
    fn alert_rules_hold(snapshot in arb_snapshot()) {
        let c = classify(&snapshot).expect("in-domain snapshot");
        match c.category {
            StatusCategory::Critical => prop_assert!(c.alert),
            StatusCategory::Warning => prop_assert_eq!(c.alert, snapshot.raw_alert),
            StatusCategory::Optimal => prop_assert!(!c.alert),
        }
    }

    /// Temperature never influences the outcome.
    #[test]
    fn temperature_is_ignored(snapshot in arb_snapshot(), other_temp in -100.0f64..300.0) {
        let mut moved = snapshot.clone();
        moved.temperature_c = other_temp;
        prop_assert_eq!(classify(&snapshot).ok(), classify(&moved).ok());
    }

    #[test]
    fn out_of_domain_health_is_rejected(health in arb_out_of_domain(), efficiency in arb_pct()) {
        let snapshot = EquipmentSnapshot::new("unit", health, 20.0, efficiency, false);
        let err = classify(&snapshot).unwrap_err();
        prop_assert!(
            matches!(err, DashError::InvalidMetric { field: "health", .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn out_of_domain_efficiency_is_rejected(health in arb_pct(), efficiency in arb_out_of_domain()) {
        let snapshot = EquipmentSnapshot::new("unit", health, 20.0, efficiency, true);
        let err = classify(&snapshot).unwrap_err();
        prop_assert!(
            matches!(err, DashError::InvalidMetric { field: "efficiency", .. }),
            "unexpected error: {err}"
        );
    }

    /// Lower health never yields a less severe category.
    #[test]
    fn severity_is_monotonic_in_health(
        thresholds in arb_thresholds(),
        a in arb_pct(),
        b in arb_pct(),
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(thresholds.category_for(low) >= thresholds.category_for(high));
    }

    /// Custom thresholds partition [0, 100] the same way the defaults do.
    #[test]
    fn custom_thresholds_partition_domain(thresholds in arb_thresholds(), health in arb_pct()) {
        let category = StatusClassifier::new(thresholds)
            .classify(&EquipmentSnapshot::new("unit", health, 20.0, 50.0, false))
            .expect("in-domain snapshot")
            .category;
        let expected = if health < thresholds.critical_below {
            StatusCategory::Critical
        } else if health < thresholds.warning_below {
            StatusCategory::Warning
        } else {
            StatusCategory::Optimal
        };
        prop_assert_eq!(category, expected);
    }

    /// Summary counts always add up to the number of entries.
    #[test]
    fn summary_counts_balance(
        snapshots in prop::collection::vec(
            (prop_oneof![arb_pct(), arb_out_of_domain()], arb_pct(), any::<bool>()),
            0..20,
        )
    ) {
        let statuses: Vec<EquipmentStatus> = StatusClassifier::default().classify_all(
            snapshots
                .into_iter()
                .map(|(h, e, a)| EquipmentSnapshot::new("unit", h, 20.0, e, a))
                .collect::<Vec<_>>(),
        );
        let summary = FleetSummary::from_results(&statuses);
        prop_assert_eq!(summary.total, statuses.len());
        prop_assert_eq!(
            summary.optimal + summary.warning + summary.critical + summary.invalid,
            summary.total
        );
        prop_assert!(summary.alerting >= summary.critical);
        prop_assert!(summary.alerting <= summary.warning + summary.critical);
        prop_assert_eq!(summary.mean_health_pct.is_some(), summary.invalid < summary.total);
    }
}
