//! Idle resource detection
//!
//! Assigns every instance exactly one action. Rules are checked in a fixed
//! order and the first match wins:
//! stopped -> Terminate, cpu < idle -> Stop, cpu < underutilized -> Rightsize,
//! otherwise Keep Running.

use crate::models::{IdleAction, InstanceRecord, LifecycleState, Recommendation};

/// CPU percentage below which an instance is idle
pub const CPU_IDLE_THRESHOLD: f64 = 5.0;

/// CPU percentage below which an instance is underutilized
pub const CPU_UNDERUTILIZED_THRESHOLD: f64 = 20.0;

#[derive(Debug, Clone)]
pub struct IdleConfig {
    pub idle_threshold: f64,
    pub underutilized_threshold: f64,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            idle_threshold: CPU_IDLE_THRESHOLD,
            underutilized_threshold: CPU_UNDERUTILIZED_THRESHOLD,
        }
    }
}

pub struct IdleResourceDetector {
    config: IdleConfig,
}

impl IdleResourceDetector {
    pub fn new() -> Self {
        Self {
            config: IdleConfig::default(),
        }
    }

    pub fn with_config(config: IdleConfig) -> Self {
        Self { config }
    }

    /// One recommendation per record, in input order
    pub fn analyze(&self, instances: &[InstanceRecord]) -> Vec<Recommendation> {
        instances.iter().map(|record| self.classify(record)).collect()
    }

    pub fn classify(&self, record: &InstanceRecord) -> Recommendation {
        let cpu = record.avg_cpu_percent;

        let (action, reason) = if record.lifecycle_state == LifecycleState::Stopped {
            (
                IdleAction::Terminate,
                "Instance is stopped but storage still incurs cost.".to_string(),
            )
        } else if cpu < self.config.idle_threshold {
            (
                IdleAction::Stop,
                format!("CPU utilization very low ({:?}%). Instance is idle.", cpu),
            )
        } else if cpu < self.config.underutilized_threshold {
            (
                IdleAction::Rightsize,
                format!(
                    "CPU utilization moderate ({:?}%). Consider smaller instance.",
                    cpu
                ),
            )
        } else {
            (
                IdleAction::KeepRunning,
                "Instance utilization is healthy.".to_string(),
            )
        };

        Recommendation {
            instance_id: record.instance_id.clone(),
            instance_type: record.instance_type.clone(),
            lifecycle_state: record.lifecycle_state.clone(),
            avg_cpu_percent: cpu,
            recommended_action: action,
            reason,
        }
    }
}

impl Default for IdleResourceDetector {
    fn default() -> Self {
        Self::new()
    }
}
