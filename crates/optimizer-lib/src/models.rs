//! Core data models for the recommendation pipeline

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Instance lifecycle state as reported by the inventory source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LifecycleState {
    Running,
    Stopped,
    /// Any other provider state (pending, stopping, terminated, ...)
    Other(String),
}

impl LifecycleState {
    pub fn as_str(&self) -> &str {
        match self {
            LifecycleState::Running => "running",
            LifecycleState::Stopped => "stopped",
            LifecycleState::Other(state) => state.as_str(),
        }
    }
}

impl From<String> for LifecycleState {
    fn from(state: String) -> Self {
        match state.as_str() {
            "running" => LifecycleState::Running,
            "stopped" => LifecycleState::Stopped,
            _ => LifecycleState::Other(state),
        }
    }
}

impl From<&str> for LifecycleState {
    fn from(state: &str) -> Self {
        LifecycleState::from(state.to_string())
    }
}

impl From<LifecycleState> for String {
    fn from(state: LifecycleState) -> Self {
        match state {
            LifecycleState::Other(state) => state,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw instance descriptor returned by the inventory source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceDescriptor {
    pub instance_id: String,
    pub instance_type: String,
    pub state: String,
    #[serde(default)]
    pub launch_time: Option<String>,
    #[serde(default)]
    pub region: String,
}

/// One utilization datapoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSample {
    pub timestamp: DateTime<Utc>,
    pub average: f64,
}

/// One row of the instance-metrics table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub instance_id: String,
    pub instance_type: String,
    pub lifecycle_state: LifecycleState,
    pub region: String,
    pub avg_cpu_percent: f64,
}

/// Aggregated cost for one billing dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCostRecord {
    pub service_name: String,
    pub cost_usd: f64,
}

/// Both tables for one pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnifiedDataset {
    pub instance_metrics: Vec<InstanceRecord>,
    pub service_costs: Vec<ServiceCostRecord>,
}

/// Action proposed by the idle classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdleAction {
    Terminate,
    Stop,
    Rightsize,
    #[serde(rename = "Keep Running")]
    KeepRunning,
}

impl IdleAction {
    /// True for actions that remove the whole running cost
    pub fn is_idle(&self) -> bool {
        matches!(self, IdleAction::Terminate | IdleAction::Stop)
    }
}

impl fmt::Display for IdleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdleAction::Terminate => write!(f, "Terminate"),
            IdleAction::Stop => write!(f, "Stop"),
            IdleAction::Rightsize => write!(f, "Rightsize"),
            IdleAction::KeepRunning => write!(f, "Keep Running"),
        }
    }
}

/// Idle classifier output, one per instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub instance_id: String,
    pub instance_type: String,
    #[serde(rename = "state")]
    pub lifecycle_state: LifecycleState,
    pub avg_cpu_percent: f64,
    pub recommended_action: IdleAction,
    pub reason: String,
}

/// Sizing action for running instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RightsizingAction {
    #[serde(rename = "Downsize Instance")]
    Downsize,
    #[serde(rename = "Upsize Instance")]
    Upsize,
    #[serde(rename = "Keep Size")]
    KeepSize,
}

impl fmt::Display for RightsizingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RightsizingAction::Downsize => write!(f, "Downsize Instance"),
            RightsizingAction::Upsize => write!(f, "Upsize Instance"),
            RightsizingAction::KeepSize => write!(f, "Keep Size"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RightsizingRecommendation {
    pub instance_id: String,
    pub current_cpu_percent: f64,
    pub rightsizing_action: RightsizingAction,
    pub reason: String,
}

/// Rightsizing output row, tagged so demonstration data is never taken for a real resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RightsizingEntry {
    Real(RightsizingRecommendation),
    Placeholder(RightsizingRecommendation),
}

impl RightsizingEntry {
    pub fn recommendation(&self) -> &RightsizingRecommendation {
        match self {
            RightsizingEntry::Real(rec) | RightsizingEntry::Placeholder(rec) => rec,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, RightsizingEntry::Placeholder(_))
    }
}

/// Priced recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsRecord {
    pub instance_id: String,
    pub recommended_action: IdleAction,
    pub estimated_monthly_cost_usd: f64,
    pub estimated_monthly_savings_usd: f64,
}

/// Outcome of comparing a total cost against the configured ceiling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetDecision {
    pub region: String,
    pub total_cost_usd: f64,
    pub threshold_usd: f64,
    pub exceeded: bool,
}

/// What happened to the alert for a budget decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum AlertDispatch {
    NotRequired,
    Sent,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEvaluation {
    pub decision: BudgetDecision,
    pub dispatch: AlertDispatch,
}

/// Full report payload, persisted through the report store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub generated_at: DateTime<Utc>,
    pub idle_recommendations: Vec<Recommendation>,
    pub rightsizing: Vec<RightsizingEntry>,
    pub savings: Vec<SavingsRecord>,
}

/// Dashboard stat panel figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSummary {
    pub recommendation_count: usize,
    pub idle_count: usize,
    pub rightsizing_count: usize,
    pub estimated_total_savings: f64,
}

impl OptimizationReport {
    pub fn summary(&self) -> OptimizationSummary {
        let savings: f64 = self
            .savings
            .iter()
            .map(|s| s.estimated_monthly_savings_usd)
            .sum();

        OptimizationSummary {
            recommendation_count: self.idle_recommendations.len(),
            idle_count: self
                .idle_recommendations
                .iter()
                .filter(|r| r.recommended_action.is_idle())
                .count(),
            rightsizing_count: self
                .rightsizing
                .iter()
                .filter(|e| !e.is_placeholder())
                .count(),
            estimated_total_savings: round_to(savings, 2),
        }
    }
}

/// Raw grouped billing response (Cost Explorer shape)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BillingResponse {
    #[serde(default)]
    pub results_by_time: Vec<BillingTimeBucket>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BillingTimeBucket {
    #[serde(default)]
    pub time_period: Option<BillingTimePeriod>,
    #[serde(default)]
    pub groups: Vec<BillingGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BillingTimePeriod {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BillingGroup {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub metrics: HashMap<String, BillingMetric>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BillingMetric {
    pub amount: String,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Round half away from zero to `digits` decimal places
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_state_round_trips_unknown_states() {
        let state: LifecycleState = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(state, LifecycleState::Other("pending".to_string()));
        assert_eq!(serde_json::to_string(&state).unwrap(), "\"pending\"");

        let running: LifecycleState = "running".into();
        assert_eq!(running, LifecycleState::Running);
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(
            serde_json::to_string(&IdleAction::KeepRunning).unwrap(),
            "\"Keep Running\""
        );
        assert_eq!(RightsizingAction::Downsize.to_string(), "Downsize Instance");
    }

    #[test]
    fn test_rightsizing_entry_is_tagged() {
        let entry = RightsizingEntry::Placeholder(RightsizingRecommendation {
            instance_id: "demo-instance".to_string(),
            current_cpu_percent: 8.0,
            rightsizing_action: RightsizingAction::Downsize,
            reason: "demo".to_string(),
        });

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"], "placeholder");
        assert_eq!(json["instance_id"], "demo-instance");
        assert_eq!(json["rightsizing_action"], "Downsize Instance");
    }

    #[test]
    fn test_billing_response_parses_cost_explorer_shape() {
        let raw = r#"{
            "ResultsByTime": [{
                "TimePeriod": {"Start": "2026-01-01", "End": "2026-01-31"},
                "Groups": [{
                    "Keys": ["Amazon Elastic Compute Cloud - Compute"],
                    "Metrics": {"UnblendedCost": {"Amount": "12.5", "Unit": "USD"}}
                }]
            }]
        }"#;

        let response: BillingResponse = serde_json::from_str(raw).unwrap();
        let group = &response.results_by_time[0].groups[0];
        assert_eq!(group.keys[0], "Amazon Elastic Compute Cloud - Compute");
        assert_eq!(group.metrics["UnblendedCost"].amount, "12.5");
    }

    #[test]
    fn test_summary_excludes_placeholder_and_keep_running() {
        let report = OptimizationReport {
            generated_at: Utc::now(),
            idle_recommendations: vec![
                Recommendation {
                    instance_id: "i-1".to_string(),
                    instance_type: "t2.micro".to_string(),
                    lifecycle_state: LifecycleState::Stopped,
                    avg_cpu_percent: 0.0,
                    recommended_action: IdleAction::Terminate,
                    reason: String::new(),
                },
                Recommendation {
                    instance_id: "i-2".to_string(),
                    instance_type: "t2.micro".to_string(),
                    lifecycle_state: LifecycleState::Running,
                    avg_cpu_percent: 45.0,
                    recommended_action: IdleAction::KeepRunning,
                    reason: String::new(),
                },
            ],
            rightsizing: vec![RightsizingEntry::Placeholder(RightsizingRecommendation {
                instance_id: "demo-instance".to_string(),
                current_cpu_percent: 8.0,
                rightsizing_action: RightsizingAction::Downsize,
                reason: String::new(),
            })],
            savings: vec![SavingsRecord {
                instance_id: "i-1".to_string(),
                recommended_action: IdleAction::Terminate,
                estimated_monthly_cost_usd: 8.35,
                estimated_monthly_savings_usd: 8.35,
            }],
        };

        let summary = report.summary();
        assert_eq!(summary.recommendation_count, 2);
        assert_eq!(summary.idle_count, 1);
        assert_eq!(summary.rightsizing_count, 0);
        assert_eq!(summary.estimated_total_savings, 8.35);
    }
}
