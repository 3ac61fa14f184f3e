//! Report persistence
//!
//! Reports are written under date-partitioned keys so a day's output can be
//! found without listing the whole store.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use dashmap::DashMap;

use crate::error::{OptimizerError, Result};
use crate::models::OptimizationReport;
use crate::observability::{OptimizerMetrics, StructuredLogger};

pub use async_trait::async_trait;

/// Object store for rendered reports
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Write `body` under `key` and return the key that was written
    async fn put(&self, key: &str, body: &serde_json::Value) -> Result<String>;
}

/// `reports/YYYY-MM-DD/cost_report.json`
pub fn report_key(date: NaiveDate) -> String {
    format!("reports/{}/cost_report.json", date.format("%Y-%m-%d"))
}

/// Serialize `report` and store it under the key for `date`
pub async fn save_cost_report(
    store: &dyn ReportStore,
    report: &OptimizationReport,
    date: NaiveDate,
) -> Result<String> {
    let body = serde_json::to_value(report)?;
    let key = store.put(&report_key(date), &body).await?;

    OptimizerMetrics::new().inc_reports_saved();
    StructuredLogger::new("report-store").log_report_saved(&key, report.idle_recommendations.len());

    Ok(key)
}

/// Writes pretty JSON files below a root directory, one file per key
pub struct FileReportStore {
    root: PathBuf,
}

impl FileReportStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.split('/').any(|part| part.is_empty() || part == "..") {
            return Err(OptimizerError::configuration(format!(
                "invalid report key: {:?}",
                key
            )));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ReportStore for FileReportStore {
    async fn put(&self, key: &str, body: &serde_json::Value) -> Result<String> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(body)?;
        tokio::fs::write(&path, bytes).await?;
        Ok(key.to_string())
    }
}

/// In-process store used by tests and dry runs
#[derive(Default)]
pub struct MemoryReportStore {
    objects: DashMap<String, serde_json::Value>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.objects.get(key).map(|entry| entry.value().clone())
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.objects.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn put(&self, key: &str, body: &serde_json::Value) -> Result<String> {
        self.objects.insert(key.to_string(), body.clone());
        Ok(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn empty_report() -> OptimizationReport {
        OptimizationReport {
            generated_at: Utc::now(),
            idle_recommendations: vec![],
            rightsizing: vec![],
            savings: vec![],
        }
    }

    #[test]
    fn test_report_key_is_date_partitioned() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(report_key(date), "reports/2026-03-07/cost_report.json");
    }

    #[tokio::test]
    async fn test_memory_store_keeps_latest_body() {
        let store = MemoryReportStore::new();
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();

        let key = save_cost_report(&store, &empty_report(), date).await.unwrap();
        save_cost_report(&store, &empty_report(), date).await.unwrap();

        assert_eq!(store.len(), 1);
        let body = store.get(&key).unwrap();
        assert!(body["idle_recommendations"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_store_writes_under_root() {
        let dir = TempDir::new().unwrap();
        let store = FileReportStore::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();

        let key = save_cost_report(&store, &empty_report(), date).await.unwrap();

        let written = dir.path().join("reports/2026-01-31/cost_report.json");
        assert_eq!(key, "reports/2026-01-31/cost_report.json");
        let contents = std::fs::read_to_string(written).unwrap();
        let parsed: OptimizationReport = serde_json::from_str(&contents).unwrap();
        assert!(parsed.savings.is_empty());
    }

    #[tokio::test]
    async fn test_file_store_rejects_escaping_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileReportStore::new(dir.path());

        let err = store
            .put("../outside.json", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, OptimizerError::Configuration(_)));
    }
}
