//! Recorded inventory snapshot
//!
//! Replays a JSON capture of provider responses. Utilization samples are
//! stored per region, so a query against the wrong region finds nothing.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{async_trait, BillingPeriod, BillingSource, InventorySource, MetricsQuery, MetricsSource};
use crate::error::{OptimizerError, Result};
use crate::models::{BillingResponse, InstanceDescriptor, MetricSample};

/// On-disk snapshot layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventorySnapshot {
    /// region -> instances in discovery order
    #[serde(default)]
    pub regions: HashMap<String, Vec<InstanceDescriptor>>,
    /// region -> instance_id -> samples
    #[serde(default)]
    pub metrics: HashMap<String, HashMap<String, Vec<MetricSample>>>,
    #[serde(default)]
    pub billing: BillingResponse,
    /// Regions whose listing fails, for replaying outages
    #[serde(default)]
    pub failing_regions: HashSet<String>,
}

/// Source backed by an [`InventorySnapshot`]
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    snapshot: InventorySnapshot,
}

impl SnapshotSource {
    pub fn new(snapshot: InventorySnapshot) -> Self {
        Self { snapshot }
    }

    /// Load a snapshot from a JSON file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            OptimizerError::configuration(format!(
                "failed to read snapshot {}: {}",
                path.display(),
                e
            ))
        })?;

        let source = Self::from_json(&content)?;
        info!(
            path = %path.display(),
            regions = source.snapshot.regions.len(),
            "Loaded inventory snapshot"
        );
        Ok(source)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let snapshot: InventorySnapshot = serde_json::from_str(content)?;
        Ok(Self::new(snapshot))
    }

    pub fn snapshot(&self) -> &InventorySnapshot {
        &self.snapshot
    }
}

#[async_trait]
impl InventorySource for SnapshotSource {
    async fn list_instances(&self, region: &str) -> Result<Vec<InstanceDescriptor>> {
        if self.snapshot.failing_regions.contains(region) {
            return Err(OptimizerError::transport(format!(
                "describe instances failed in {}",
                region
            )));
        }

        let instances = self
            .snapshot
            .regions
            .get(region)
            .cloned()
            .unwrap_or_default();
        debug!(region = %region, count = instances.len(), "Listed instances");
        Ok(instances)
    }
}

#[async_trait]
impl MetricsSource for SnapshotSource {
    async fn cpu_utilization(&self, query: &MetricsQuery) -> Result<Vec<MetricSample>> {
        Ok(self
            .snapshot
            .metrics
            .get(&query.region)
            .and_then(|by_instance| by_instance.get(&query.instance_id))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl BillingSource for SnapshotSource {
    async fn cost_and_usage(&self, period: &BillingPeriod) -> Result<BillingResponse> {
        debug!(start = %period.start, end = %period.end, "Reading recorded billing data");
        Ok(self.snapshot.billing.clone())
    }
}
