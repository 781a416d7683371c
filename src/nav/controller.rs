//! Navigation state machine for the dashboard shell.
//!
//! Two orthogonal variables: the active panel and the narrow-viewport sidebar
//! flag. The controller owns the only [`NavigationState`] of a session and
//! performs no I/O.

#![allow(missing_docs)]

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::Result;
use crate::nav::panel::{NavItem, PanelId};

/// UI focus: which panel is shown and whether the sidebar overlay is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavigationState {
    pub active_panel: PanelId,
    pub sidebar_open: bool,
}

impl NavigationState {
    /// Combined panel-selection transition: activate `panel` and dismiss the
    /// sidebar. Both effects always happen together.
    #[must_use]
    pub const fn with_panel(self, panel: PanelId) -> Self {
        Self {
            active_panel: panel,
            sidebar_open: false,
        }
    }

    #[must_use]
    pub const fn with_sidebar_toggled(self) -> Self {
        Self {
            active_panel: self.active_panel,
            sidebar_open: !self.sidebar_open,
        }
    }

    #[must_use]
    pub const fn with_sidebar_closed(self) -> Self {
        Self {
            active_panel: self.active_panel,
            sidebar_open: false,
        }
    }
}

/// Active-panel display attributes for the header renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PanelLabel {
    pub panel: PanelId,
    pub label: &'static str,
    pub accent: &'static str,
}

impl From<&NavItem> for PanelLabel {
    fn from(item: &NavItem) -> Self {
        Self {
            panel: item.id,
            label: item.label,
            accent: item.accent,
        }
    }
}

/// Session-lifetime owner of the navigation state.
#[derive(Debug, Clone, Default)]
pub struct NavigationController {
    state: NavigationState,
}

impl NavigationController {
    /// Start at the overview panel with the sidebar closed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> NavigationState {
        self.state
    }

    #[must_use]
    pub const fn active_panel(&self) -> PanelId {
        self.state.active_panel
    }

    #[must_use]
    pub const fn sidebar_open(&self) -> bool {
        self.state.sidebar_open
    }

    /// Select a panel by wire identifier.
    ///
    /// Unknown identifiers fail with `UnknownPanel` and leave the state
    /// untouched.
    pub fn select_panel(&mut self, id: &str) -> Result<PanelId> {
        let panel = id.parse::<PanelId>()?;
        self.select(panel);
        Ok(panel)
    }

    /// Select an already-typed panel. Closes the sidebar.
    pub fn select(&mut self, panel: PanelId) {
        self.state = self.state.with_panel(panel);
    }

    /// Select the n-th (1-based) panel. Returns `false` for out-of-range keys.
    pub fn select_number(&mut self, n: u8) -> bool {
        match PanelId::from_number(n) {
            Some(panel) => {
                self.select(panel);
                true
            }
            None => false,
        }
    }

    pub fn next_panel(&mut self) -> PanelId {
        let panel = self.state.active_panel.next();
        self.select(panel);
        panel
    }

    pub fn prev_panel(&mut self) -> PanelId {
        let panel = self.state.active_panel.prev();
        self.select(panel);
        panel
    }

    /// Flip the sidebar flag. Returns the new value.
    pub fn toggle_sidebar(&mut self) -> bool {
        self.state = self.state.with_sidebar_toggled();
        self.state.sidebar_open
    }

    /// Idempotently close the sidebar (overlay click).
    pub fn close_sidebar(&mut self) {
        self.state = self.state.with_sidebar_closed();
    }

    /// Label and accent color of the active panel.
    #[must_use]
    pub fn current_panel_label(&self) -> PanelLabel {
        PanelLabel::from(self.state.active_panel.nav_item())
    }

    /// Apply one user action. Failed actions leave the state unchanged.
    pub fn apply(&mut self, action: &NavAction) -> Result<NavigationState> {
        match action {
            NavAction::Select(id) => {
                self.select_panel(id)?;
            }
            NavAction::Next => {
                self.next_panel();
            }
            NavAction::Prev => {
                self.prev_panel();
            }
            NavAction::ToggleSidebar => {
                self.toggle_sidebar();
            }
            NavAction::CloseSidebar => self.close_sidebar(),
        }
        Ok(self.state)
    }
}

// ──────────────────── actions ────────────────────

/// User-level navigation input, shared by the terminal dashboard and the
/// `nav` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    /// Select a panel by wire identifier (validated on apply).
    Select(String),
    Next,
    Prev,
    ToggleSidebar,
    CloseSidebar,
}

impl NavAction {
    /// Whether the action is a panel selection (as opposed to a sidebar change).
    #[must_use]
    pub const fn selects_panel(&self) -> bool {
        matches!(self, Self::Select(_) | Self::Next | Self::Prev)
    }
}

impl FromStr for NavAction {
    type Err = std::convert::Infallible;

    /// `next`, `prev`, `toggle`, `close`; anything else is a panel identifier.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim() {
            "next" => Self::Next,
            "prev" => Self::Prev,
            "toggle" => Self::ToggleSidebar,
            "close" => Self::CloseSidebar,
            other => Self::Select(other.to_string()),
        })
    }
}
