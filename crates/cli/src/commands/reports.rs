//! Report persistence commands

use anyhow::Result;

use crate::client::{ApiClient, SavedReport};
use crate::output::{print_json, print_success, OutputFormat};

/// Ask the server to build and persist today's full report
pub async fn save_report(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let result: SavedReport = client.post("reports", &serde_json::json!({})).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => print_success(&format!("Report saved to {}", result.key)),
    }

    Ok(())
}
