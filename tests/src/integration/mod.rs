//! Cross-layer scenarios.

#[cfg(test)]
pub mod fixtures;

pub mod auth_flows;
pub mod command_flows;
pub mod query_flows;
