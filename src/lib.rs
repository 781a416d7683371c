#![forbid(unsafe_code)]

//! Dairy plant dashboard core: equipment status classification and
//! dashboard navigation state.
//!
//! Two independent pieces:
//! 1. **Status classification** maps a telemetry snapshot to a status
//!    category and an alert flag, health first.
//! 2. **Navigation** tracks the active content panel and the sidebar flag of
//!    the dashboard shell.
//!
//! # Library usage
//!
//! ```rust,no_run
//! use dairy_dashboard::prelude::*;
//!
//! let snapshot = EquipmentSnapshot::new("Centrifuge A", 76.0, 65.2, 89.3, true);
//! let classification = StatusClassifier::default().classify(&snapshot)?;
//! assert_eq!(classification.category, StatusCategory::Warning);
//! # Ok::<(), DashError>(())
//! ```

pub mod prelude;

#[cfg(feature = "cli")]
pub mod cli;
pub mod core;
pub mod feed;
pub mod logger;
pub mod nav;
pub mod status;
