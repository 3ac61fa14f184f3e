//! Multi-region instance normalization
//!
//! Lists instances in every configured region, fetches a trailing CPU window
//! for each one from the region it lives in, and flattens the result into
//! one table ordered by region (configuration order) then discovery order.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::{OptimizerError, Result};
use crate::models::{round_to, InstanceDescriptor, InstanceRecord, MetricSample};
use crate::source::{InventorySource, MetricsQuery, MetricsSource, DEFAULT_PERIOD_SECS};

/// Default region when none is configured explicitly
pub const DEFAULT_REGION: &str = "ap-south-1";

/// Default number of utilization queries in flight
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Configuration for the inventory normalizer
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// Regions to scan, in output order
    pub regions: Vec<String>,
    /// Trailing utilization window (default: 1 hour)
    pub window: Duration,
    /// Sample granularity in seconds (default: 300)
    pub period_secs: u32,
    /// Upper bound on concurrent utilization queries
    pub max_concurrent_fetches: usize,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            regions: vec![DEFAULT_REGION.to_string()],
            window: Duration::hours(1),
            period_secs: DEFAULT_PERIOD_SECS,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

impl InventoryConfig {
    /// Create a config for the given regions, rejecting an empty set
    pub fn for_regions<I, S>(regions: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let regions: Vec<String> = regions
            .into_iter()
            .map(Into::into)
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();

        if regions.is_empty() {
            return Err(OptimizerError::configuration("no target regions configured"));
        }

        Ok(Self {
            regions,
            ..Self::default()
        })
    }

    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = limit.max(1);
        self
    }
}

/// Builds the instance-metrics table
pub struct InventoryNormalizer {
    inventory: Arc<dyn InventorySource>,
    metrics: Arc<dyn MetricsSource>,
    config: InventoryConfig,
}

impl InventoryNormalizer {
    pub fn new(
        inventory: Arc<dyn InventorySource>,
        metrics: Arc<dyn MetricsSource>,
        config: InventoryConfig,
    ) -> Self {
        Self {
            inventory,
            metrics,
            config,
        }
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    /// Build the table using the current time as the window end
    pub async fn build_instance_dataset(&self) -> Result<Vec<InstanceRecord>> {
        self.build_instance_dataset_at(Utc::now()).await
    }

    /// Build the table with utilization windows ending at `now`
    pub async fn build_instance_dataset_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<InstanceRecord>> {
        if self.config.regions.is_empty() {
            return Err(OptimizerError::configuration("no target regions configured"));
        }

        let descriptors = self.list_all_regions().await?;
        let utilization = self.fetch_utilization(&descriptors, now).await?;

        let records: Vec<InstanceRecord> = descriptors
            .into_iter()
            .zip(utilization)
            .map(|(descriptor, avg_cpu_percent)| InstanceRecord {
                instance_id: descriptor.instance_id,
                instance_type: descriptor.instance_type,
                lifecycle_state: descriptor.state.into(),
                region: descriptor.region,
                avg_cpu_percent,
            })
            .collect();

        info!(
            regions = self.config.regions.len(),
            instances = records.len(),
            "Built instance dataset"
        );

        Ok(records)
    }

    /// List every region concurrently and merge back in configuration order
    async fn list_all_regions(&self) -> Result<Vec<InstanceDescriptor>> {
        let mut listings = JoinSet::new();

        for (index, region) in self.config.regions.iter().enumerate() {
            let inventory = Arc::clone(&self.inventory);
            let region = region.clone();
            listings.spawn(async move {
                let result = inventory.list_instances(&region).await;
                (index, region, result)
            });
        }

        let mut per_region = Vec::with_capacity(self.config.regions.len());
        while let Some(joined) = listings.join_next().await {
            let (index, region, result) = joined
                .map_err(|e| OptimizerError::transport(format!("region listing task failed: {}", e)))?;

            // Returning here drops the JoinSet, which aborts the other listings
            let instances = result.map_err(|e| {
                warn!(region = %region, error = %e, "Region listing failed, aborting run");
                e
            })?;
            per_region.push((index, region, instances));
        }
        per_region.sort_by_key(|(index, _, _)| *index);

        let mut descriptors = Vec::new();
        for (_, region, instances) in per_region {
            for mut descriptor in instances {
                if descriptor.instance_id.trim().is_empty() {
                    return Err(OptimizerError::data_shape(format!(
                        "instance without an id listed in {}",
                        region
                    )));
                }
                if descriptor.region != region {
                    if !descriptor.region.is_empty() {
                        debug!(
                            instance_id = %descriptor.instance_id,
                            reported = %descriptor.region,
                            listed = %region,
                            "Using listing region for instance"
                        );
                    }
                    descriptor.region = region.clone();
                }
                descriptors.push(descriptor);
            }
        }

        Ok(descriptors)
    }

    /// Fetch utilization for every instance with bounded concurrency.
    /// The returned vector is index-aligned with `descriptors`.
    async fn fetch_utilization(
        &self,
        descriptors: &[InstanceDescriptor],
        now: DateTime<Utc>,
    ) -> Result<Vec<f64>> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_fetches.max(1)));
        let mut fetches = JoinSet::new();

        for (position, descriptor) in descriptors.iter().enumerate() {
            let query = MetricsQuery::trailing(
                descriptor.instance_id.clone(),
                descriptor.region.clone(),
                now,
                self.config.window,
                self.config.period_secs,
            );
            let metrics = Arc::clone(&self.metrics);
            let semaphore = Arc::clone(&semaphore);

            fetches.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| OptimizerError::transport(e.to_string()))?;
                let samples = metrics.cpu_utilization(&query).await?;
                Ok::<_, OptimizerError>((position, average_utilization(&samples)))
            });
        }

        let mut results = Vec::with_capacity(descriptors.len());
        while let Some(joined) = fetches.join_next().await {
            let (position, cpu) = joined
                .map_err(|e| OptimizerError::transport(format!("utilization task failed: {}", e)))??;
            results.push((position, cpu));
        }
        results.sort_by_key(|(position, _)| *position);

        Ok(results.into_iter().map(|(_, cpu)| cpu).collect())
    }
}

/// Mean of the sample averages rounded to 2 decimals; no samples means 0
pub fn average_utilization(samples: &[MetricSample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let total: f64 = samples.iter().map(|s| s.average).sum();
    round_to(total / samples.len() as f64, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(average: f64) -> MetricSample {
        MetricSample {
            timestamp: Utc::now(),
            average,
        }
    }

    #[test]
    fn test_average_of_no_samples_is_zero() {
        assert_eq!(average_utilization(&[]), 0.0);
    }

    #[test]
    fn test_average_rounds_to_two_decimals() {
        let samples = vec![sample(1.0), sample(2.0), sample(2.0)];
        assert_eq!(average_utilization(&samples), 1.67);
    }

    #[test]
    fn test_empty_regions_rejected() {
        let result = InventoryConfig::for_regions(Vec::<String>::new());
        assert!(matches!(result, Err(OptimizerError::Configuration(_))));

        let result = InventoryConfig::for_regions([" ", ""]);
        assert!(result.is_err());
    }

    #[test]
    fn test_regions_are_trimmed() {
        let config = InventoryConfig::for_regions(["ap-south-1", " us-east-1 "]).unwrap();
        assert_eq!(config.regions, vec!["ap-south-1", "us-east-1"]);
        assert_eq!(config.period_secs, 300);
        assert_eq!(config.window, Duration::hours(1));
    }
}
