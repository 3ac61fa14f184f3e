//! Unified dataset assembly
//!
//! Single fetch boundary for the classifiers: runs the inventory and cost
//! normalizers side by side and bundles their tables.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::debug;

use super::cost::CostAnalyzer;
use super::inventory::InventoryNormalizer;
use crate::error::Result;
use crate::models::{BillingResponse, InstanceRecord, ServiceCostRecord, UnifiedDataset};
use crate::source::{BillingPeriod, BillingSource};

pub struct DatasetBuilder {
    inventory: InventoryNormalizer,
    billing: Arc<dyn BillingSource>,
}

impl DatasetBuilder {
    pub fn new(inventory: InventoryNormalizer, billing: Arc<dyn BillingSource>) -> Self {
        Self { inventory, billing }
    }

    pub fn inventory(&self) -> &InventoryNormalizer {
        &self.inventory
    }

    pub async fn build_instance_dataset(&self) -> Result<Vec<InstanceRecord>> {
        self.inventory.build_instance_dataset().await
    }

    /// Raw billing data for the trailing 30 days
    pub async fn fetch_billing(&self) -> Result<BillingResponse> {
        let period = BillingPeriod::trailing_month(today());
        self.billing.cost_and_usage(&period).await
    }

    pub async fn build_cost_dataset(&self) -> Result<Vec<ServiceCostRecord>> {
        let response = self.fetch_billing().await?;
        CostAnalyzer::new(&response).extract_service_costs()
    }

    /// Both tables; either failure aborts the build
    pub async fn build_unified_dataset(&self) -> Result<UnifiedDataset> {
        let (instance_metrics, service_costs) =
            tokio::try_join!(self.build_instance_dataset(), self.build_cost_dataset())?;

        debug!(
            instances = instance_metrics.len(),
            services = service_costs.len(),
            "Unified dataset ready"
        );

        Ok(UnifiedDataset {
            instance_metrics,
            service_costs,
        })
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
