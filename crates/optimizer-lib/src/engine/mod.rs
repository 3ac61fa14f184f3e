//! Optimization engine
//!
//! Classifies instances from the unified dataset and prices the results.

mod idle;
mod rightsizing;
mod savings;


pub use idle::{IdleConfig, IdleResourceDetector, CPU_IDLE_THRESHOLD, CPU_UNDERUTILIZED_THRESHOLD};
pub use rightsizing::{
    RightsizingAnalyzer, RightsizingConfig, LOWER_BOUND, PLACEHOLDER_INSTANCE_ID, UPPER_BOUND,
};
pub use savings::{
    default_pricing, SavingsConfig, SavingsEstimator, HOURS_PER_MONTH, RIGHTSIZE_SAVINGS_RATIO,
};

use std::time::Instant;

use chrono::Utc;

use crate::error::Result;
use crate::models::{
    InstanceRecord, OptimizationReport, Recommendation, RightsizingEntry, SavingsRecord,
    ServiceCostRecord, UnifiedDataset,
};
use crate::observability::{OptimizerMetrics, StructuredLogger};
use crate::processing::{top_services, total_cost, DatasetBuilder};

/// Classifier and estimator settings
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub idle: IdleConfig,
    pub rightsizing: RightsizingConfig,
    pub savings: SavingsConfig,
}

/// Runs the recommendation pipeline; every call fetches a fresh dataset
pub struct OptimizationEngine {
    dataset: DatasetBuilder,
    detector: IdleResourceDetector,
    rightsizer: RightsizingAnalyzer,
    estimator: SavingsEstimator,
    metrics: OptimizerMetrics,
    logger: StructuredLogger,
}

impl OptimizationEngine {
    pub fn new(dataset: DatasetBuilder, config: EngineConfig) -> Self {
        Self {
            dataset,
            detector: IdleResourceDetector::with_config(config.idle),
            rightsizer: RightsizingAnalyzer::with_config(config.rightsizing),
            estimator: SavingsEstimator::with_config(config.savings),
            metrics: OptimizerMetrics::new(),
            logger: StructuredLogger::new("optimization-engine"),
        }
    }

    pub fn dataset(&self) -> &DatasetBuilder {
        &self.dataset
    }

    pub async fn idle_recommendations(&self) -> Result<Vec<Recommendation>> {
        let dataset = self.fetch().await?;
        Ok(self.detector.analyze(&dataset.instance_metrics))
    }

    pub async fn rightsizing(&self) -> Result<Vec<RightsizingEntry>> {
        let dataset = self.fetch().await?;
        Ok(self.rightsizer.analyze(&dataset.instance_metrics))
    }

    pub async fn savings(&self) -> Result<Vec<SavingsRecord>> {
        let dataset = self.fetch().await?;
        let recommendations = self.detector.analyze(&dataset.instance_metrics);
        Ok(self.estimator.estimate(&recommendations))
    }

    /// All three outputs from a single dataset fetch
    pub async fn full_report(&self) -> Result<OptimizationReport> {
        let dataset = self.fetch().await?;
        let report = self.report_for(&dataset.instance_metrics);

        let summary = report.summary();
        self.metrics.set_estimated_savings(summary.estimated_total_savings);
        Ok(report)
    }

    /// Aggregated service costs (optionally only the top `n`) and the overall total
    pub async fn service_costs(&self, top: Option<usize>) -> Result<(Vec<ServiceCostRecord>, f64)> {
        let table = self
            .dataset
            .build_cost_dataset()
            .await
            .map_err(|e| self.record_error(e))?;
        let total = total_cost(&table);

        let table = match top {
            Some(n) => top_services(table, n),
            None => table,
        };
        Ok((table, total))
    }

    /// Total cost over the trailing billing window
    pub async fn total_cost(&self) -> Result<f64> {
        let (_, total) = self.service_costs(None).await?;
        Ok(total)
    }

    /// Classify and price an already-built instance table
    pub fn report_for(&self, instances: &[InstanceRecord]) -> OptimizationReport {
        let idle_recommendations = self.detector.analyze(instances);
        let rightsizing = self.rightsizer.analyze(instances);
        let savings = self.estimator.estimate(&idle_recommendations);

        OptimizationReport {
            generated_at: Utc::now(),
            idle_recommendations,
            rightsizing,
            savings,
        }
    }

    async fn fetch(&self) -> Result<UnifiedDataset> {
        let start = Instant::now();
        let dataset = self
            .dataset
            .build_unified_dataset()
            .await
            .map_err(|e| self.record_error(e))?;

        let elapsed = start.elapsed().as_secs_f64();
        let count = dataset.instance_metrics.len();
        self.metrics.observe_pipeline_latency(elapsed);
        self.metrics.inc_pipeline_runs();
        self.metrics.set_instances_analyzed(count as i64);
        self.logger.log_pipeline_run(count, elapsed);

        Ok(dataset)
    }

    fn record_error(&self, err: crate::error::OptimizerError) -> crate::error::OptimizerError {
        self.metrics.inc_upstream_errors(err.kind());
        err
    }
}
