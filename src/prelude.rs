//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use dairy_dashboard::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{DashError, Result};

// Status
pub use crate::status::classifier::{
    Classification, StatusCategory, StatusClassifier, StatusThresholds, classify,
};
pub use crate::status::snapshot::EquipmentSnapshot;
pub use crate::status::summary::{EquipmentStatus, FleetSummary};

// Navigation
pub use crate::nav::controller::{NavAction, NavigationController, NavigationState, PanelLabel};
pub use crate::nav::panel::PanelId;

// Feed
pub use crate::feed::loader::{FeedSource, load_feed};
pub use crate::feed::sample::sample_fleet;

// Logging
pub use crate::logger::activity::{ActivityEvent, ActivityLog};
