//! Observability infrastructure for the optimizer
//!
//! Provides:
//! - Prometheus metrics (pipeline latency, instances analyzed, estimated savings, alerts)
//! - Structured JSON logging with tracing

use prometheus::{
    register_gauge, register_histogram, register_int_counter, register_int_counter_vec,
    register_int_gauge, Gauge, Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::models::{AlertDispatch, BudgetDecision};

/// Histogram buckets for pipeline latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<OptimizerMetricsInner> = OnceLock::new();

struct OptimizerMetricsInner {
    pipeline_latency_seconds: Histogram,
    pipeline_runs: IntCounter,
    instances_analyzed: IntGauge,
    estimated_savings_usd: Gauge,
    upstream_errors: IntCounterVec,
    budget_alerts_sent: IntCounter,
    budget_alert_failures: IntCounter,
    reports_saved: IntCounter,
}

impl OptimizerMetricsInner {
    fn new() -> Self {
        Self {
            pipeline_latency_seconds: register_histogram!(
                "cost_optimizer_pipeline_latency_seconds",
                "Time spent building the unified dataset",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register pipeline_latency_seconds"),

            pipeline_runs: register_int_counter!(
                "cost_optimizer_pipeline_runs_total",
                "Total number of completed pipeline runs"
            )
            .expect("Failed to register pipeline_runs"),

            instances_analyzed: register_int_gauge!(
                "cost_optimizer_instances_analyzed",
                "Number of instances in the most recent dataset"
            )
            .expect("Failed to register instances_analyzed"),

            estimated_savings_usd: register_gauge!(
                "cost_optimizer_estimated_monthly_savings_usd",
                "Estimated monthly savings from the most recent full report"
            )
            .expect("Failed to register estimated_savings_usd"),

            upstream_errors: register_int_counter_vec!(
                "cost_optimizer_upstream_errors_total",
                "Pipeline failures by error kind",
                &["kind"]
            )
            .expect("Failed to register upstream_errors"),

            budget_alerts_sent: register_int_counter!(
                "cost_optimizer_budget_alerts_sent_total",
                "Budget alerts delivered"
            )
            .expect("Failed to register budget_alerts_sent"),

            budget_alert_failures: register_int_counter!(
                "cost_optimizer_budget_alert_failures_total",
                "Budget alerts that could not be delivered"
            )
            .expect("Failed to register budget_alert_failures"),

            reports_saved: register_int_counter!(
                "cost_optimizer_reports_saved_total",
                "Reports written to the report store"
            )
            .expect("Failed to register reports_saved"),
        }
    }
}

/// Lightweight handle to the global metrics; clones share the same metrics
#[derive(Clone)]
pub struct OptimizerMetrics {
    _private: (),
}

impl Default for OptimizerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimizerMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(OptimizerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &OptimizerMetricsInner {
        GLOBAL_METRICS.get_or_init(OptimizerMetricsInner::new)
    }

    pub fn observe_pipeline_latency(&self, duration_secs: f64) {
        self.inner().pipeline_latency_seconds.observe(duration_secs);
    }

    pub fn inc_pipeline_runs(&self) {
        self.inner().pipeline_runs.inc();
    }

    pub fn set_instances_analyzed(&self, count: i64) {
        self.inner().instances_analyzed.set(count);
    }

    pub fn set_estimated_savings(&self, usd: f64) {
        self.inner().estimated_savings_usd.set(usd);
    }

    pub fn inc_upstream_errors(&self, kind: &str) {
        self.inner().upstream_errors.with_label_values(&[kind]).inc();
    }

    pub fn inc_budget_alerts_sent(&self) {
        self.inner().budget_alerts_sent.inc();
    }

    pub fn inc_budget_alert_failures(&self) {
        self.inner().budget_alert_failures.inc();
    }

    pub fn inc_reports_saved(&self) {
        self.inner().reports_saved.inc();
    }
}

/// Structured logger for optimizer events
#[derive(Clone)]
pub struct StructuredLogger {
    component: String,
}

impl StructuredLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    pub fn log_startup(&self, version: &str, regions: &[String]) {
        info!(
            event = "optimizer_started",
            component = %self.component,
            version = %version,
            regions = ?regions,
            "Cost optimizer started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "optimizer_shutdown",
            component = %self.component,
            reason = %reason,
            "Cost optimizer shutting down"
        );
    }

    pub fn log_pipeline_run(&self, instances: usize, duration_secs: f64) {
        info!(
            event = "pipeline_run",
            component = %self.component,
            instances = instances,
            duration_secs = duration_secs,
            "Unified dataset built"
        );
    }

    pub fn log_alert_failure(&self, channel: &str, region: &str, error: &str) {
        warn!(
            event = "alert_failed",
            component = %self.component,
            channel = %channel,
            region = %region,
            error = %error,
            "Failed to send alert"
        );
    }

    pub fn log_budget_decision(&self, decision: &BudgetDecision, dispatch: &AlertDispatch) {
        match dispatch {
            AlertDispatch::Failed(reason) => {
                warn!(
                    event = "budget_evaluated",
                    component = %self.component,
                    region = %decision.region,
                    total_cost_usd = decision.total_cost_usd,
                    threshold_usd = decision.threshold_usd,
                    exceeded = decision.exceeded,
                    dispatch = "failed",
                    reason = %reason,
                    "Budget exceeded but alert delivery failed"
                );
            }
            _ => {
                info!(
                    event = "budget_evaluated",
                    component = %self.component,
                    region = %decision.region,
                    total_cost_usd = decision.total_cost_usd,
                    threshold_usd = decision.threshold_usd,
                    exceeded = decision.exceeded,
                    dispatch = ?dispatch,
                    "Budget evaluated"
                );
            }
        }
    }

    pub fn log_report_saved(&self, key: &str, recommendations: usize) {
        info!(
            event = "report_saved",
            component = %self.component,
            key = %key,
            recommendations = recommendations,
            "Cost report saved"
        );
    }

    pub fn log_request_failed(&self, kind: &str, error: &str) {
        warn!(
            event = "request_failed",
            component = %self.component,
            kind = %kind,
            error = %error,
            "Pipeline request failed"
        );
    }
}
