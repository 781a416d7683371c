//! Typed activity events and the synchronous log front-end used by the CLI.

#![allow(missing_docs)]

use crate::core::config::Config;
use crate::core::errors::DashError;
use crate::logger::jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};
use crate::nav::controller::NavigationState;
use crate::status::classifier::StatusCategory;
use crate::status::summary::EquipmentStatus;

// ──────────────────── event type ────────────────────

/// Everything the dashboard records in its activity log.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityEvent {
    DashboardStarted {
        version: String,
        config_hash: String,
        source: String,
    },
    DashboardStopped {
        reason: String,
        refreshes: u64,
    },
    PanelSelected {
        state: NavigationState,
    },
    SidebarToggled {
        state: NavigationState,
    },
    Classified {
        equipment: String,
        category: StatusCategory,
        alert: bool,
        health_pct: f64,
        temperature_c: f64,
        efficiency_pct: f64,
    },
    MetricRejected {
        equipment: String,
        code: String,
        message: String,
    },
    ConfigLoaded {
        path: String,
        config_hash: String,
    },
    Error {
        code: String,
        message: String,
    },
}

impl ActivityEvent {
    /// Activity event for a failure.
    #[must_use]
    pub fn error(error: &DashError) -> Self {
        Self::Error {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }

    /// Activity event for one classified or rejected equipment entry.
    #[must_use]
    pub fn from_status(status: &EquipmentStatus) -> Self {
        match (&status.outcome, &status.snapshot) {
            (Ok(classification), Some(snapshot)) => Self::Classified {
                equipment: status.name.clone(),
                category: classification.category,
                alert: classification.alert,
                health_pct: snapshot.health_pct,
                temperature_c: snapshot.temperature_c,
                efficiency_pct: snapshot.efficiency_pct,
            },
            (Err(error), _) => Self::rejected(&status.name, error),
            (Ok(_), None) => Self::rejected(
                &status.name,
                &DashError::invalid_metric("snapshot", "missing"),
            ),
        }
    }

    fn rejected(equipment: &str, error: &DashError) -> Self {
        Self::MetricRejected {
            equipment: equipment.to_string(),
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }

    /// Flatten into a log line.
    #[must_use]
    pub fn into_entry(self) -> LogEntry {
        match self {
            Self::DashboardStarted {
                version,
                config_hash,
                source,
            } => LogEntry::new(EventType::DashboardStart, Severity::Info).with_details(format!(
                "version={version} config_hash={config_hash} feed={source}"
            )),
            Self::DashboardStopped { reason, refreshes } => {
                LogEntry::new(EventType::DashboardStop, Severity::Info)
                    .with_details(format!("reason={reason} refreshes={refreshes}"))
            }
            Self::PanelSelected { state } => nav_entry(EventType::PanelSelect, state),
            Self::SidebarToggled { state } => nav_entry(EventType::SidebarToggle, state),
            Self::Classified {
                equipment,
                category,
                alert,
                health_pct,
                temperature_c,
                efficiency_pct,
            } => {
                let (event, severity) = match (category, alert) {
                    (StatusCategory::Critical, _) => (EventType::StatusAlert, Severity::Critical),
                    (_, true) => (EventType::StatusAlert, Severity::Warning),
                    (_, false) => (EventType::Classification, Severity::Info),
                };
                let mut entry = LogEntry::new(event, severity);
                entry.equipment = Some(equipment);
                entry.category = Some(category.label().to_string());
                entry.alert = Some(alert);
                entry.health_pct = Some(health_pct);
                entry.temperature_c = Some(temperature_c);
                entry.efficiency_pct = Some(efficiency_pct);
                entry
            }
            Self::MetricRejected {
                equipment,
                code,
                message,
            } => {
                let mut entry = LogEntry::new(EventType::InvalidMetric, Severity::Warning);
                entry.equipment = Some(equipment);
                entry.error_code = Some(code);
                entry.error_message = Some(message);
                entry
            }
            Self::ConfigLoaded { path, config_hash } => {
                LogEntry::new(EventType::ConfigLoad, Severity::Info)
                    .with_details(format!("path={path} config_hash={config_hash}"))
            }
            Self::Error { code, message } => {
                let mut entry = LogEntry::new(EventType::Error, Severity::Warning);
                entry.error_code = Some(code);
                entry.error_message = Some(message);
                entry
            }
        }
    }
}

fn nav_entry(event: EventType, state: NavigationState) -> LogEntry {
    let mut entry = LogEntry::new(event, Severity::Info);
    entry.panel = Some(state.active_panel.as_str().to_string());
    entry.sidebar_open = Some(state.sidebar_open);
    entry
}

// ──────────────────── log front-end ────────────────────

/// Activity log owned by one CLI invocation or dashboard session.
///
/// Disabled logs accept events and drop them.
pub struct ActivityLog {
    writer: Option<JsonlWriter>,
}

impl ActivityLog {
    /// Open the log described by `[logging]` and `[paths]`.
    #[must_use]
    pub fn open(config: &Config) -> Self {
        if !config.logging.enabled {
            return Self::disabled();
        }
        let jsonl = JsonlConfig::from_config(&config.logging, &config.paths);
        Self {
            writer: Some(JsonlWriter::open(jsonl)),
        }
    }

    #[must_use]
    pub const fn disabled() -> Self {
        Self { writer: None }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub fn record(&mut self, event: ActivityEvent) {
        if let Some(writer) = self.writer.as_mut() {
            writer.write_entry(&event.into_entry());
        }
    }

    /// One line per equipment entry in a refresh batch.
    pub fn record_statuses(&mut self, statuses: &[EquipmentStatus]) {
        if self.writer.is_none() {
            return;
        }
        for status in statuses {
            self.record(ActivityEvent::from_status(status));
        }
    }

    pub fn flush(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush();
        }
    }

    /// Move back to the primary log path if an earlier write degraded it.
    pub fn try_recover(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            writer.try_recover();
        }
    }
}
