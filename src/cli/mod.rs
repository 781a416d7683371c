//! Terminal presentation for the `dairydash` binary.

pub mod dashboard;
pub mod render;
