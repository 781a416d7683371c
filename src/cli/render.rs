//! Text and JSON presentation of classification results and navigation state.

#![allow(missing_docs)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use std::fmt::Write as _;

use colored::{Color, ColoredString, Colorize};
use serde::Serialize;

use crate::core::errors::DashError;
use crate::nav::controller::{NavigationState, PanelLabel};
use crate::nav::panel::{NAV_ITEMS, PanelId};
use crate::status::classifier::StatusCategory;
use crate::status::summary::{EquipmentStatus, FleetSummary};

/// Terminal color for a status category.
#[must_use]
pub const fn category_color(category: StatusCategory) -> Color {
    match category {
        StatusCategory::Optimal => Color::Green,
        StatusCategory::Warning => Color::Yellow,
        StatusCategory::Critical => Color::Red,
    }
}

/// Upper-case status badge, colored by category.
#[must_use]
pub fn badge(category: StatusCategory) -> ColoredString {
    category
        .label()
        .to_uppercase()
        .color(category_color(category))
        .bold()
}

/// Horizontal bar, e.g. `[████████░░] 80%`. Values are clamped for drawing only.
#[must_use]
pub fn gauge(pct: f64, width: usize) -> String {
    let filled = ((pct.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!(
        "[{}{}] {:.0}%",
        "█".repeat(filled),
        "░".repeat(width - filled),
        pct
    )
}

// ──────────────────── JSON reports ────────────────────

/// Serializable card for one equipment entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentReport {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<StatusCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<bool>,
    pub color_class: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub code: &'static str,
    pub message: String,
    /// Whether the next refresh or a rerun may succeed without operator action.
    pub retryable: bool,
}

impl From<&DashError> for ErrorReport {
    fn from(error: &DashError) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
            retryable: error.is_retryable(),
        }
    }
}

impl From<&EquipmentStatus> for EquipmentReport {
    fn from(status: &EquipmentStatus) -> Self {
        let classification = status.classification();
        let snapshot = status.snapshot.as_ref();
        Self {
            name: status.name.clone(),
            category: classification.map(|c| c.category),
            alert: classification.map(|c| c.alert),
            color_class: classification.map_or_else(StatusCategory::fallback_color_class, |c| {
                c.category.color_class()
            }),
            health_pct: snapshot.map(|s| s.health_pct),
            temperature_c: snapshot.map(|s| s.temperature_c),
            efficiency_pct: snapshot.map(|s| s.efficiency_pct),
            error: status.error().map(ErrorReport::from),
        }
    }
}

/// Serializable navigation state with the header label attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavReport {
    #[serde(flatten)]
    pub state: NavigationState,
    pub label: PanelLabel,
    pub title: &'static str,
}

impl From<NavigationState> for NavReport {
    fn from(state: NavigationState) -> Self {
        Self {
            state,
            label: PanelLabel::from(state.active_panel.nav_item()),
            title: state.active_panel.heading().title,
        }
    }
}

#[must_use]
pub fn equipment_reports<'a>(
    statuses: impl IntoIterator<Item = &'a EquipmentStatus>,
) -> Vec<EquipmentReport> {
    statuses.into_iter().map(EquipmentReport::from).collect()
}

// ──────────────────── human output ────────────────────

/// One status card per line: name, badge, gauge, metrics, alert marker.
#[must_use]
pub fn status_table<'a>(statuses: impl IntoIterator<Item = &'a EquipmentStatus>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "  {:<22}  {:<9}  {:<30}  {:>8}  {:>10}",
        "Equipment", "Status", "Health", "Temp", "Efficiency"
    );
    let _ = writeln!(out, "  {}", "-".repeat(87));
    for status in statuses {
        match (status.classification(), status.snapshot.as_ref()) {
            (Some(c), Some(snap)) => {
                let marker = if c.alert { " ⚠".red().bold() } else { "".normal() };
                let _ = writeln!(
                    out,
                    "  {:<22}  {:<9}  {:<30}  {:>6.1}°C  {:>9.1}%{marker}",
                    status.name,
                    badge(c.category).to_string(),
                    gauge(snap.health_pct, 20)
                        .color(category_color(c.category))
                        .to_string(),
                    snap.temperature_c,
                    snap.efficiency_pct,
                );
            }
            _ => {
                let reason = status
                    .error()
                    .map_or_else(|| "unclassified".to_string(), ToString::to_string);
                let _ = writeln!(
                    out,
                    "  {:<22}  {:<9}  {}",
                    status.name,
                    "INVALID".dimmed().to_string(),
                    reason.dimmed()
                );
            }
        }
    }
    out
}

/// Summary-statistics block.
#[must_use]
pub fn summary_lines(summary: &FleetSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Fleet Summary:");
    let _ = writeln!(out, "  Total equipment: {}", summary.total);
    for category in StatusCategory::ALL {
        let _ = writeln!(
            out,
            "  {:<16} {}",
            format!("{}:", category.label().to_uppercase()),
            summary.count(category).to_string().color(category_color(category))
        );
    }
    let _ = writeln!(out, "  Alerting:        {}", summary.alerting);
    if summary.invalid > 0 {
        let _ = writeln!(out, "  Invalid:         {}", summary.invalid);
    }
    match (summary.mean_health_pct, summary.mean_efficiency_pct) {
        (Some(health), Some(efficiency)) => {
            let _ = writeln!(out, "  Mean health:     {health:.1}%");
            let _ = writeln!(out, "  Mean efficiency: {efficiency:.1}%");
        }
        _ => {
            let _ = writeln!(out, "  Mean health:     n/a");
        }
    }
    if let Some(worst) = summary.worst {
        let _ = writeln!(out, "  Overall:         {}", badge(worst));
    }
    out
}

/// Panel menu with the active entry marked.
#[must_use]
pub fn panel_menu(active: PanelId) -> String {
    let mut out = String::new();
    for item in &NAV_ITEMS {
        let marker = if item.id == active { "▶" } else { " " };
        let line = format!(
            "{marker} {}  {:<12} {:<11} {}",
            item.id.number(),
            item.label,
            item.id.as_str(),
            item.accent
        );
        if item.id == active {
            let _ = writeln!(out, "{}", line.bold());
        } else {
            let _ = writeln!(out, "{line}");
        }
    }
    out
}

/// Header line for the active panel, e.g. `Overview - Plant Overview`.
#[must_use]
pub fn nav_header(state: NavigationState) -> String {
    let label = PanelLabel::from(state.active_panel.nav_item());
    let heading = state.active_panel.heading();
    let sidebar = if state.sidebar_open { "open" } else { "closed" };
    format!(
        "{} - {}\n  {}\n  sidebar: {sidebar}",
        label.label.bold(),
        heading.title,
        heading.description.dimmed()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::sample::sample_fleet;
    use crate::status::classifier::StatusClassifier;

    #[test]
    fn gauge_clamps_drawing_but_reports_value() {
        assert_eq!(gauge(50.0, 10).matches('█').count(), 5);
        assert_eq!(gauge(0.0, 10).matches('░').count(), 10);
        assert_eq!(gauge(150.0, 10).matches('█').count(), 10);
        assert!(gauge(84.0, 10).ends_with("84%"));
    }

    #[test]
    fn reports_carry_category_and_color_class() {
        let results = StatusClassifier::default().classify_all(sample_fleet());
        let reports = equipment_reports(&results);
        assert_eq!(reports.len(), 5);
        assert_eq!(reports[3].category, Some(StatusCategory::Critical));
        assert_eq!(reports[3].alert, Some(true));
        assert!(reports[3].color_class.contains("red"));
        assert!(reports[3].error.is_none());

        let json = serde_json::to_value(&reports[4]).unwrap();
        assert_eq!(json["category"], "warning");
        assert_eq!(json["alert"], false);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn rejected_entry_report_uses_fallback_color() {
        let status = EquipmentStatus::rejected("record #2", DashError::invalid_metric("health", "missing"));
        let report = EquipmentReport::from(&status);
        assert_eq!(report.category, None);
        assert!(report.color_class.contains("gray"));
        let error = report.error.unwrap();
        assert_eq!(error.code, "DASH-2001");
        assert!(error.message.contains("health"));
        assert!(!error.retryable);
    }

    #[test]
    fn error_report_flags_retryable_failures() {
        let io = DashError::io(
            "/srv/feed.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let report = ErrorReport::from(&io);
        assert_eq!(report.code, "DASH-3002");
        assert!(report.retryable);

        let json = serde_json::to_value(ErrorReport::from(&DashError::UnknownPanel {
            id: "bogus".to_string(),
        }))
        .unwrap();
        assert_eq!(json["code"], "DASH-2002");
        assert_eq!(json["retryable"], false);
    }

    #[test]
    fn nav_report_flattens_state() {
        let state = NavigationState::default().with_panel(PanelId::Equipment);
        let json = serde_json::to_value(NavReport::from(state)).unwrap();
        assert_eq!(json["active_panel"], "equipment");
        assert_eq!(json["sidebar_open"], false);
        assert_eq!(json["label"]["label"], "Equipment");
        assert_eq!(json["title"], "Equipment Management");
    }

    #[test]
    fn status_table_lists_every_unit() {
        let mut results = StatusClassifier::default().classify_all(sample_fleet());
        results.push(EquipmentStatus::rejected(
            "record #6",
            DashError::invalid_metric("temp", "missing"),
        ));
        let table = status_table(&results);
        for name in ["Pasteurizer Unit 1", "Storage Tank T-101", "record #6"] {
            assert!(table.contains(name), "missing {name}:\n{table}");
        }
        assert!(table.contains("INVALID"));
    }

    #[test]
    fn panel_menu_lists_seven_panels() {
        let menu = panel_menu(PanelId::Alerts);
        assert_eq!(menu.lines().count(), 7);
        assert!(menu.contains("ai-models"));
        assert!(menu.lines().any(|l| l.contains('▶') && l.contains("Alerts")));
    }
}
