//! Server configuration

use std::sync::Arc;

use anyhow::{Context, Result};
use optimizer_lib::{
    alerts::{BudgetConfig, LogNotifier, Notifier, WebhookNotifier, DEFAULT_BUDGET_THRESHOLD_USD},
    processing::{InventoryConfig, DEFAULT_MAX_CONCURRENT_FETCHES, DEFAULT_REGION},
    OptimizerError,
};
use serde::Deserialize;

/// Names an optional config file layered under the environment
pub const CONFIG_FILE_ENV: &str = "OPTIMIZER_CONFIG_FILE";

/// Alert delivery channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    #[default]
    Log,
    Webhook,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Comma-separated region list
    #[serde(default = "default_target_regions")]
    pub target_regions: String,

    /// Read API port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Recorded inventory/metrics/billing snapshot
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,

    /// Root directory for persisted reports
    #[serde(default = "default_report_dir")]
    pub report_dir: String,

    #[serde(default = "default_budget_threshold")]
    pub budget_threshold_usd: f64,

    #[serde(default)]
    pub notifier: NotifierKind,

    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Upper bound on in-flight metrics queries
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

fn default_target_regions() -> String {
    DEFAULT_REGION.to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_snapshot_path() -> String {
    "data/snapshot.json".to_string()
}

fn default_report_dir() -> String {
    "output".to_string()
}

fn default_budget_threshold() -> f64 {
    DEFAULT_BUDGET_THRESHOLD_USD
}

fn default_max_concurrent_fetches() -> usize {
    DEFAULT_MAX_CONCURRENT_FETCHES
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            target_regions: default_target_regions(),
            api_port: default_api_port(),
            snapshot_path: default_snapshot_path(),
            report_dir: default_report_dir(),
            budget_threshold_usd: default_budget_threshold(),
            notifier: NotifierKind::default(),
            webhook_url: None,
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

impl ServerConfig {
    /// Load from the optional config file, then `OPTIMIZER_*` environment variables
    pub fn load() -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            builder = builder.add_source(config::File::with_name(&path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("OPTIMIZER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to read configuration")?;

        Self::from_config(config)
    }

    /// Deserialize and validate an already-layered configuration
    pub fn from_config(config: config::Config) -> Result<Self> {
        let parsed: ServerConfig = config
            .try_deserialize()
            .context("invalid configuration")?;
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn validate(&self) -> Result<(), OptimizerError> {
        self.regions()?;
        if self.notifier == NotifierKind::Webhook && self.webhook_url().is_none() {
            return Err(OptimizerError::configuration(
                "notifier = webhook requires webhook_url",
            ));
        }
        Ok(())
    }

    /// Trimmed, non-empty region list
    pub fn regions(&self) -> Result<Vec<String>, OptimizerError> {
        let regions: Vec<String> = self
            .target_regions
            .split(',')
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();

        if regions.is_empty() {
            return Err(OptimizerError::configuration("target_regions is empty"));
        }
        Ok(regions)
    }

    /// Region used for budget evaluation when a request names none
    pub fn primary_region(&self) -> Result<String, OptimizerError> {
        let mut regions = self.regions()?;
        Ok(regions.swap_remove(0))
    }

    fn webhook_url(&self) -> Option<&str> {
        self.webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn inventory_config(&self) -> Result<InventoryConfig, OptimizerError> {
        Ok(InventoryConfig::for_regions(self.regions()?)?
            .with_max_concurrent_fetches(self.max_concurrent_fetches))
    }

    pub fn budget_config(&self) -> BudgetConfig {
        BudgetConfig {
            threshold_usd: self.budget_threshold_usd,
        }
    }

    pub fn build_notifier(&self) -> Result<Arc<dyn Notifier>, OptimizerError> {
        match self.notifier {
            NotifierKind::Log => Ok(Arc::new(LogNotifier)),
            NotifierKind::Webhook => {
                let url = self.webhook_url().ok_or_else(|| {
                    OptimizerError::configuration("notifier = webhook requires webhook_url")
                })?;
                Ok(Arc::new(WebhookNotifier::new(url)?))
            }
        }
    }
}
