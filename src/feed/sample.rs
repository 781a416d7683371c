//! Built-in sample fleet used when no snapshot feed is configured.

use crate::status::snapshot::EquipmentSnapshot;

/// The five reference units shown on the plant overview.
#[must_use]
pub fn sample_fleet() -> Vec<EquipmentSnapshot> {
    vec![
        EquipmentSnapshot::new("Pasteurizer Unit 1", 92.0, 72.5, 96.8, false),
        EquipmentSnapshot::new("Centrifuge A", 76.0, 65.2, 89.3, true),
        EquipmentSnapshot::new("Homogenizer H-201", 88.0, 68.1, 94.2, false),
        EquipmentSnapshot::new("Storage Tank T-101", 65.0, 4.2, 78.5, true),
        EquipmentSnapshot::new("Packaging Line", 84.0, 25.8, 91.7, false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::classifier::{StatusCategory, classify};

    #[test]
    fn sample_units_classify_health_first() {
        let expected = [
            (StatusCategory::Optimal, false),
            (StatusCategory::Warning, true),
            (StatusCategory::Optimal, false),
            (StatusCategory::Critical, true),
            // 84 sits below the 85 warning cut-off.
            (StatusCategory::Warning, false),
        ];
        for (snap, (category, alert)) in sample_fleet().iter().zip(expected) {
            let c = classify(snap).expect("sample data is valid");
            assert_eq!((c.category, c.alert), (category, alert), "{}", snap.name);
        }
    }
}
