//! Budget threshold evaluation
//!
//! Compares a total cost against the configured ceiling and dispatches at
//! most one alert per evaluation. Dispatch failures are logged and reported
//! in the evaluation result, never returned as errors.

use std::sync::Arc;

use tracing::info;

use super::Notifier;
use crate::models::{AlertDispatch, BudgetDecision, BudgetEvaluation};
use crate::observability::{OptimizerMetrics, StructuredLogger};

/// Default monthly budget ceiling in USD
pub const DEFAULT_BUDGET_THRESHOLD_USD: f64 = 100.0;

/// Subject line of every budget alert
pub const ALERT_SUBJECT: &str = "Budget Threshold Exceeded";

#[derive(Debug, Clone)]
pub struct BudgetConfig {
    pub threshold_usd: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            threshold_usd: DEFAULT_BUDGET_THRESHOLD_USD,
        }
    }
}

pub struct BudgetMonitor {
    config: BudgetConfig,
    notifier: Arc<dyn Notifier>,
    metrics: OptimizerMetrics,
    logger: StructuredLogger,
}

impl BudgetMonitor {
    pub fn new(config: BudgetConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            notifier,
            metrics: OptimizerMetrics::new(),
            logger: StructuredLogger::new("budget-monitor"),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.config.threshold_usd
    }

    /// Alert when `total_cost_usd` is strictly above the threshold
    pub async fn evaluate_cost(&self, total_cost_usd: f64, region: &str) -> BudgetEvaluation {
        let decision = BudgetDecision {
            region: region.to_string(),
            total_cost_usd,
            threshold_usd: self.config.threshold_usd,
            exceeded: total_cost_usd > self.config.threshold_usd,
        };

        let dispatch = if decision.exceeded {
            self.dispatch(&decision).await
        } else {
            info!(
                region = %region,
                total_cost_usd = total_cost_usd,
                threshold_usd = self.config.threshold_usd,
                "Cost within budget. No alert triggered."
            );
            AlertDispatch::NotRequired
        };

        self.logger.log_budget_decision(&decision, &dispatch);
        BudgetEvaluation { decision, dispatch }
    }

    async fn dispatch(&self, decision: &BudgetDecision) -> AlertDispatch {
        let body = format_alert_body(decision);

        match self.notifier.send_alert(ALERT_SUBJECT, &body).await {
            Ok(()) => {
                self.metrics.inc_budget_alerts_sent();
                AlertDispatch::Sent
            }
            Err(e) => {
                self.logger
                    .log_alert_failure(self.notifier.channel(), &decision.region, &e.to_string());
                self.metrics.inc_budget_alert_failures();
                AlertDispatch::Failed(e.to_string())
            }
        }
    }
}

/// Multi-line alert body naming the region, total and threshold
pub fn format_alert_body(decision: &BudgetDecision) -> String {
    format!(
        "\nCost Alert for Region: {}\n\n\
         Total Monthly Cost: ${}\n\
         Threshold Limit: ${}\n\n\
         Recommendation:\n\
         Review running resources and apply optimization.\n",
        decision.region, decision.total_cost_usd, decision.threshold_usd
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::async_trait;
    use crate::error::{OptimizerError, Result};
    use std::sync::Mutex;

    /// Records every alert it is asked to send
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_alert(&self, subject: &str, body: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((subject.to_string(), body.to_string()));
            if self.fail {
                return Err(OptimizerError::notification("channel unreachable"));
            }
            Ok(())
        }

        fn channel(&self) -> &str {
            "recording"
        }
    }

    #[tokio::test]
    async fn test_total_equal_to_threshold_does_not_alert() {
        let notifier = Arc::new(RecordingNotifier::default());
        let monitor = BudgetMonitor::new(BudgetConfig::default(), notifier.clone());

        let evaluation = monitor.evaluate_cost(100.0, "ap-south-1").await;

        assert!(!evaluation.decision.exceeded);
        assert_eq!(evaluation.dispatch, AlertDispatch::NotRequired);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_total_above_threshold_alerts_once() {
        let notifier = Arc::new(RecordingNotifier::default());
        let monitor = BudgetMonitor::new(BudgetConfig::default(), notifier.clone());

        let evaluation = monitor.evaluate_cost(100.01, "ap-south-1").await;

        assert!(evaluation.decision.exceeded);
        assert_eq!(evaluation.dispatch, AlertDispatch::Sent);

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (subject, body) = &sent[0];
        assert_eq!(subject, ALERT_SUBJECT);
        assert!(body.contains("ap-south-1"));
        assert!(body.contains("100.01"));
        assert!(body.contains("Threshold Limit: $100"));
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_reported_not_raised() {
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        let monitor = BudgetMonitor::new(BudgetConfig { threshold_usd: 50.0 }, notifier.clone());

        let evaluation = monitor.evaluate_cost(75.5, "us-east-1").await;

        assert!(evaluation.decision.exceeded);
        assert!(matches!(evaluation.dispatch, AlertDispatch::Failed(_)));
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_alert_body_layout() {
        let body = format_alert_body(&BudgetDecision {
            region: "eu-west-1".to_string(),
            total_cost_usd: 250.5,
            threshold_usd: 200.0,
            exceeded: true,
        });

        assert!(body.contains("Cost Alert for Region: eu-west-1"));
        assert!(body.contains("Total Monthly Cost: $250.5"));
        assert!(body.contains("Threshold Limit: $200"));
        assert!(body.contains("Review running resources and apply optimization."));
    }
}
