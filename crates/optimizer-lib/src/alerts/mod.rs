//! Budget alerting
//!
//! This module provides:
//! - Budget threshold evaluation over the billing total
//! - Alert delivery through a pluggable notification channel

mod budget;
mod notifier;

pub use budget::{
    format_alert_body, BudgetConfig, BudgetMonitor, ALERT_SUBJECT, DEFAULT_BUDGET_THRESHOLD_USD,
};
pub use notifier::{AlertPayload, LogNotifier, WebhookNotifier};

use crate::error::Result;

pub use async_trait::async_trait;

/// Delivery channel for alerts
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one alert; failures are `OptimizerError::Notification`
    async fn send_alert(&self, subject: &str, body: &str) -> Result<()>;

    /// Channel name for logs
    fn channel(&self) -> &str;
}
