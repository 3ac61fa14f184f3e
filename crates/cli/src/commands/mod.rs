//! CLI command implementations

pub mod costs;
pub mod recommendations;
pub mod reports;
