//! Data processing layer
//!
//! Turns raw provider responses into the flat tables the optimization
//! engine consumes.

mod cost;
mod dataset;
mod inventory;


pub use cost::{
    aggregate_service_costs, top_services, total_cost, CostAnalyzer, COST_METRIC,
    DEFAULT_TOP_SERVICES,
};
pub use dataset::DatasetBuilder;
pub use inventory::{
    average_utilization, InventoryConfig, InventoryNormalizer, DEFAULT_MAX_CONCURRENT_FETCHES,
    DEFAULT_REGION,
};
