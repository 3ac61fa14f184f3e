//! Savings estimation
//!
//! Prices each idle-classifier recommendation against an on-demand hourly
//! rate table. Terminate and Stop save the full monthly cost, Rightsize a
//! fixed share of it, Keep Running nothing.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{round_to, IdleAction, Recommendation, SavingsRecord};

/// Simplified month used to turn hourly rates into monthly cost
pub const HOURS_PER_MONTH: f64 = 24.0 * 30.0;

/// Share of the monthly cost assumed saved by rightsizing
pub const RIGHTSIZE_SAVINGS_RATIO: f64 = 0.5;

/// Approximate on-demand hourly pricing (USD)
pub fn default_pricing() -> HashMap<String, f64> {
    [("t2.micro", 0.0116), ("t2.small", 0.023), ("t2.medium", 0.0464)]
        .into_iter()
        .map(|(instance_type, rate)| (instance_type.to_string(), rate))
        .collect()
}

#[derive(Debug, Clone)]
pub struct SavingsConfig {
    /// instance_type -> hourly rate in USD
    pub pricing: HashMap<String, f64>,
    pub hours_per_month: f64,
    pub rightsize_savings_ratio: f64,
    /// Price every instance as this type instead of its own type
    pub fixed_instance_type: Option<String>,
}

impl Default for SavingsConfig {
    fn default() -> Self {
        Self {
            pricing: default_pricing(),
            hours_per_month: HOURS_PER_MONTH,
            rightsize_savings_ratio: RIGHTSIZE_SAVINGS_RATIO,
            fixed_instance_type: None,
        }
    }
}

impl SavingsConfig {
    /// Pricing that treats every instance as `t2.micro`, matching older reports
    pub fn legacy_fixed_type() -> Self {
        Self {
            fixed_instance_type: Some("t2.micro".to_string()),
            ..Self::default()
        }
    }
}

pub struct SavingsEstimator {
    config: SavingsConfig,
}

impl SavingsEstimator {
    pub fn new() -> Self {
        Self {
            config: SavingsConfig::default(),
        }
    }

    pub fn with_config(config: SavingsConfig) -> Self {
        Self { config }
    }

    pub fn estimate(&self, recommendations: &[Recommendation]) -> Vec<SavingsRecord> {
        recommendations.iter().map(|rec| self.price(rec)).collect()
    }

    pub fn price(&self, recommendation: &Recommendation) -> SavingsRecord {
        let instance_type = self
            .config
            .fixed_instance_type
            .as_deref()
            .unwrap_or(&recommendation.instance_type);

        let hourly_rate = self.hourly_rate(instance_type);
        let monthly_cost = hourly_rate * self.config.hours_per_month;

        let savings = match recommendation.recommended_action {
            IdleAction::Terminate | IdleAction::Stop => monthly_cost,
            IdleAction::Rightsize => monthly_cost * self.config.rightsize_savings_ratio.clamp(0.0, 1.0),
            IdleAction::KeepRunning => 0.0,
        };

        SavingsRecord {
            instance_id: recommendation.instance_id.clone(),
            recommended_action: recommendation.recommended_action,
            estimated_monthly_cost_usd: round_to(monthly_cost, 2),
            estimated_monthly_savings_usd: round_to(savings, 2),
        }
    }

    /// Hourly rate for a type; unpriced types cost 0
    pub fn hourly_rate(&self, instance_type: &str) -> f64 {
        match self.config.pricing.get(instance_type) {
            Some(rate) => *rate,
            None => {
                debug!(instance_type = %instance_type, "No pricing for instance type, using 0");
                0.0
            }
        }
    }
}

impl Default for SavingsEstimator {
    fn default() -> Self {
        Self::new()
    }
}
