//! Dashboard navigation: panel table and the selection state machine.

pub mod controller;
pub mod panel;

#[cfg(test)]
mod test_properties;
