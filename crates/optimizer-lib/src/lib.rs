//! Cloud cost optimizer library
//!
//! This crate provides the core functionality for:
//! - Normalizing instance inventory, CPU metrics and billing into one dataset
//! - Idle, rightsizing and savings recommendations
//! - Budget evaluation and alert delivery
//! - Report persistence and observability

pub mod alerts;
pub mod engine;
pub mod error;
pub mod models;
pub mod observability;
pub mod processing;
pub mod report;
pub mod source;

pub use error::{OptimizerError, Result};
pub use models::*;
pub use observability::{OptimizerMetrics, StructuredLogger};
