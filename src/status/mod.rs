//! Equipment status classification: snapshots, categories, alerts, summaries.

pub mod classifier;
pub mod snapshot;
pub mod summary;

#[cfg(test)]
mod test_properties;
