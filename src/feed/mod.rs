//! Telemetry snapshot sources: built-in sample fleet and feed files.

pub mod loader;
pub mod sample;
