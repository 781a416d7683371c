//! Panel identifiers and the fixed navigation-item table.

#![allow(missing_docs)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::DashError;

// ──────────────────── panels ────────────────────

/// Content panels selectable from the sidebar, in menu order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelId {
    /// Summary statistics and equipment status cards.
    #[default]
    Overview,
    Equipment,
    Process,
    Quality,
    AiModels,
    Alerts,
    Analytics,
}

/// Total number of panels (used for prev/next wrapping).
const PANEL_COUNT: u8 = 7;

impl PanelId {
    /// All panels in menu order.
    pub const ALL: [Self; PANEL_COUNT as usize] = [
        Self::Overview,
        Self::Equipment,
        Self::Process,
        Self::Quality,
        Self::AiModels,
        Self::Alerts,
        Self::Analytics,
    ];

    /// Wire identifier, e.g. `ai-models`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Equipment => "equipment",
            Self::Process => "process",
            Self::Quality => "quality",
            Self::AiModels => "ai-models",
            Self::Alerts => "alerts",
            Self::Analytics => "analytics",
        }
    }

    /// 1-based menu position, used for number-key selection.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Overview => 1,
            Self::Equipment => 2,
            Self::Process => 3,
            Self::Quality => 4,
            Self::AiModels => 5,
            Self::Alerts => 6,
            Self::Analytics => 7,
        }
    }

    /// Resolve a 1-based menu position. Returns `None` for out-of-range.
    #[must_use]
    pub const fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Overview),
            2 => Some(Self::Equipment),
            3 => Some(Self::Process),
            4 => Some(Self::Quality),
            5 => Some(Self::AiModels),
            6 => Some(Self::Alerts),
            7 => Some(Self::Analytics),
            _ => None,
        }
    }

    /// Next panel in menu order, wrapping analytics → overview.
    #[must_use]
    pub const fn next(self) -> Self {
        let n = self.number() % PANEL_COUNT + 1;
        match Self::from_number(n) {
            Some(p) => p,
            None => Self::Overview,
        }
    }

    /// Previous panel in menu order, wrapping overview → analytics.
    #[must_use]
    pub const fn prev(self) -> Self {
        let n = if self.number() == 1 {
            PANEL_COUNT
        } else {
            self.number() - 1
        };
        match Self::from_number(n) {
            Some(p) => p,
            None => Self::Analytics,
        }
    }

    /// Display attributes bound to this panel.
    #[must_use]
    pub fn nav_item(self) -> &'static NavItem {
        &NAV_ITEMS[self.number() as usize - 1]
    }

    /// Heading and description shown in the content area.
    #[must_use]
    pub const fn heading(self) -> PanelHeading {
        match self {
            Self::Overview => PanelHeading {
                title: "Plant Overview",
                description: "Real-time monitoring and predictive analytics",
            },
            Self::Equipment => PanelHeading {
                title: "Equipment Management",
                description: "Detailed equipment monitoring and control systems coming soon...",
            },
            Self::Process => PanelHeading {
                title: "Process Control",
                description: "Real-time process variable monitoring and control interface coming soon...",
            },
            Self::Quality => PanelHeading {
                title: "Quality Management",
                description: "AI-powered quality prediction and analysis dashboard coming soon...",
            },
            Self::AiModels => PanelHeading {
                title: "AI Models",
                description: "Machine learning model performance and management coming soon...",
            },
            Self::Alerts => PanelHeading {
                title: "Alert Management",
                description: "Predictive alerts and notification system coming soon...",
            },
            Self::Analytics => PanelHeading {
                title: "Advanced Analytics",
                description: "Deep analytics and reporting interface coming soon...",
            },
        }
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PanelId {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|panel| panel.as_str() == s)
            .ok_or_else(|| DashError::UnknownPanel { id: s.to_string() })
    }
}

// ──────────────────── navigation table ────────────────────

/// Label and accent bound to a panel in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub id: PanelId,
    pub label: &'static str,
    /// Gradient stops for the active-item highlight.
    pub accent: &'static str,
}

/// Content-area heading for a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PanelHeading {
    pub title: &'static str,
    pub description: &'static str,
}

/// Sidebar table in menu order. Indexed by `PanelId::number() - 1`.
pub static NAV_ITEMS: [NavItem; PANEL_COUNT as usize] = [
    NavItem {
        id: PanelId::Overview,
        label: "Overview",
        accent: "from-blue-500 to-cyan-500",
    },
    NavItem {
        id: PanelId::Equipment,
        label: "Equipment",
        accent: "from-purple-500 to-pink-500",
    },
    NavItem {
        id: PanelId::Process,
        label: "Process",
        accent: "from-green-500 to-emerald-500",
    },
    NavItem {
        id: PanelId::Quality,
        label: "Quality",
        accent: "from-orange-500 to-red-500",
    },
    NavItem {
        id: PanelId::AiModels,
        label: "AI Models",
        accent: "from-indigo-500 to-purple-500",
    },
    NavItem {
        id: PanelId::Alerts,
        label: "Alerts",
        accent: "from-red-500 to-pink-500",
    },
    NavItem {
        id: PanelId::Analytics,
        label: "Analytics",
        accent: "from-cyan-500 to-blue-500",
    },
];
