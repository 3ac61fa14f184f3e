//! Rightsizing analysis for running instances
//!
//! Only running instances are considered; everything else is left out of
//! the output entirely. When nothing remains, a single placeholder entry is
//! returned so dashboard panels are never empty.

use crate::models::{
    InstanceRecord, LifecycleState, RightsizingAction, RightsizingEntry, RightsizingRecommendation,
};

/// CPU percentage below which an instance is overprovisioned
pub const LOWER_BOUND: f64 = 20.0;

/// CPU percentage above which an instance is undersized
pub const UPPER_BOUND: f64 = 60.0;

/// Instance id carried by the placeholder entry
pub const PLACEHOLDER_INSTANCE_ID: &str = "demo-instance";

#[derive(Debug, Clone)]
pub struct RightsizingConfig {
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Entry returned when no running instance exists
    pub placeholder: RightsizingRecommendation,
}

impl Default for RightsizingConfig {
    fn default() -> Self {
        Self {
            lower_bound: LOWER_BOUND,
            upper_bound: UPPER_BOUND,
            placeholder: RightsizingRecommendation {
                instance_id: PLACEHOLDER_INSTANCE_ID.to_string(),
                current_cpu_percent: 8.0,
                rightsizing_action: RightsizingAction::Downsize,
                reason: "No active workload detected (demonstration data).".to_string(),
            },
        }
    }
}

pub struct RightsizingAnalyzer {
    config: RightsizingConfig,
}

impl RightsizingAnalyzer {
    pub fn new() -> Self {
        Self {
            config: RightsizingConfig::default(),
        }
    }

    pub fn with_config(config: RightsizingConfig) -> Self {
        Self { config }
    }

    /// Sizing entries for running instances, or the placeholder when there are none
    pub fn analyze(&self, instances: &[InstanceRecord]) -> Vec<RightsizingEntry> {
        let entries: Vec<RightsizingEntry> = instances
            .iter()
            .filter(|record| record.lifecycle_state == LifecycleState::Running)
            .map(|record| RightsizingEntry::Real(self.classify(record)))
            .collect();

        if entries.is_empty() {
            return vec![RightsizingEntry::Placeholder(self.config.placeholder.clone())];
        }

        entries
    }

    pub fn classify(&self, record: &InstanceRecord) -> RightsizingRecommendation {
        let cpu = record.avg_cpu_percent;

        let (action, reason) = if cpu < self.config.lower_bound {
            (
                RightsizingAction::Downsize,
                format!("CPU utilization low ({:?}%). Instance overprovisioned.", cpu),
            )
        } else if cpu > self.config.upper_bound {
            (
                RightsizingAction::Upsize,
                format!("CPU utilization high ({:?}%). Instance may be undersized.", cpu),
            )
        } else {
            (
                RightsizingAction::KeepSize,
                "Instance is appropriately sized.".to_string(),
            )
        };

        RightsizingRecommendation {
            instance_id: record.instance_id.clone(),
            current_cpu_percent: cpu,
            rightsizing_action: action,
            reason,
        }
    }
}

impl Default for RightsizingAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, state: &str, cpu: f64) -> InstanceRecord {
        InstanceRecord {
            instance_id: id.to_string(),
            instance_type: "t2.small".to_string(),
            lifecycle_state: state.into(),
            region: "ap-south-1".to_string(),
            avg_cpu_percent: cpu,
        }
    }

    #[test]
    fn test_non_running_instances_are_excluded() {
        let analyzer = RightsizingAnalyzer::new();
        let entries = analyzer.analyze(&[
            record("i-stopped", "stopped", 1.0),
            record("i-running", "running", 45.0),
            record("i-pending", "pending", 1.0),
        ]);

        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_placeholder());
        assert_eq!(entries[0].recommendation().instance_id, "i-running");
    }

    #[test]
    fn test_band_boundaries() {
        let analyzer = RightsizingAnalyzer::new();
        let action = |cpu| analyzer.classify(&record("i", "running", cpu)).rightsizing_action;

        assert_eq!(action(19.99), RightsizingAction::Downsize);
        assert_eq!(action(20.0), RightsizingAction::KeepSize);
        assert_eq!(action(60.0), RightsizingAction::KeepSize);
        assert_eq!(action(60.01), RightsizingAction::Upsize);
    }

    #[test]
    fn test_all_stopped_yields_single_placeholder() {
        let analyzer = RightsizingAnalyzer::new();
        let entries = analyzer.analyze(&[
            record("i-1", "stopped", 0.0),
            record("i-2", "stopped", 0.0),
        ]);

        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_placeholder());
        let placeholder = entries[0].recommendation();
        assert_eq!(placeholder.instance_id, PLACEHOLDER_INSTANCE_ID);
        assert_eq!(placeholder.rightsizing_action, RightsizingAction::Downsize);
        assert_eq!(placeholder.current_cpu_percent, 8.0);
    }

    #[test]
    fn test_empty_input_yields_placeholder() {
        let entries = RightsizingAnalyzer::new().analyze(&[]);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_placeholder());
    }

    #[test]
    fn test_running_low_cpu_is_downsized() {
        let entries = RightsizingAnalyzer::new().analyze(&[record("i-web", "running", 3.0)]);

        assert_eq!(
            entries,
            vec![RightsizingEntry::Real(RightsizingRecommendation {
                instance_id: "i-web".to_string(),
                current_cpu_percent: 3.0,
                rightsizing_action: RightsizingAction::Downsize,
                reason: "CPU utilization low (3.0%). Instance overprovisioned.".to_string(),
            })]
        );
    }

    #[test]
    fn test_reason_keeps_decimal_on_whole_percentages() {
        let analyzer = RightsizingAnalyzer::new();

        let upsize = analyzer.classify(&record("i-db", "running", 70.0));
        assert_eq!(
            upsize.reason,
            "CPU utilization high (70.0%). Instance may be undersized."
        );

        let downsize = analyzer.classify(&record("i-web", "running", 4.25));
        assert!(downsize.reason.contains("(4.25%)"));
    }
}
