//! Upstream data sources
//!
//! The pipeline reads inventory, utilization and billing data through the
//! traits below. Handles are injected as `Arc<dyn ...>` by the caller, which
//! owns their construction and credentials.

mod snapshot;

pub use snapshot::{InventorySnapshot, SnapshotSource};

use crate::error::Result;
use crate::models::{BillingResponse, InstanceDescriptor, MetricSample};
use chrono::{DateTime, Duration, NaiveDate, Utc};

pub use async_trait::async_trait;

/// Utilization query granularity (5 minutes)
pub const DEFAULT_PERIOD_SECS: u32 = 300;

/// Billing lookback window in days
pub const BILLING_WINDOW_DAYS: i64 = 30;

/// A CPU utilization query for a single instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsQuery {
    pub instance_id: String,
    /// Region the instance lives in; the query must be issued there
    pub region: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub period_secs: u32,
}

impl MetricsQuery {
    /// Query covering `window` up to `end`
    pub fn trailing(
        instance_id: impl Into<String>,
        region: impl Into<String>,
        end: DateTime<Utc>,
        window: Duration,
        period_secs: u32,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            region: region.into(),
            start: end - window,
            end,
            period_secs,
        }
    }
}

/// Billing query range, end-exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BillingPeriod {
    /// The trailing 30-day window ending at `today`
    pub fn trailing_month(today: NaiveDate) -> Self {
        Self {
            start: today - Duration::days(BILLING_WINDOW_DAYS),
            end: today,
        }
    }
}

/// Lists compute instances for a region
#[async_trait]
pub trait InventorySource: Send + Sync {
    async fn list_instances(&self, region: &str) -> Result<Vec<InstanceDescriptor>>;
}

/// Returns utilization samples for one instance; an empty list is valid
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn cpu_utilization(&self, query: &MetricsQuery) -> Result<Vec<MetricSample>>;
}

/// Returns cost data grouped by service for a period
#[async_trait]
pub trait BillingSource: Send + Sync {
    async fn cost_and_usage(&self, period: &BillingPeriod) -> Result<BillingResponse>;
}
