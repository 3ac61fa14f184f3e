//! Recommendation-related CLI commands

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::client::{ApiClient, Recommendation, RightsizingEntry, SavingsRecord, Summary};
use crate::output::{
    color_action, format_percent, format_usd, print_info, print_json, print_rows, OutputFormat,
};

/// Row for idle recommendations table
#[derive(Tabled)]
struct IdleRow {
    #[tabled(rename = "Instance")]
    instance_id: String,
    #[tabled(rename = "Type")]
    instance_type: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Avg CPU")]
    cpu: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

/// Row for rightsizing table
#[derive(Tabled)]
struct RightsizingRow {
    #[tabled(rename = "Instance")]
    instance_id: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

/// Row for savings table
#[derive(Tabled)]
struct SavingsRow {
    #[tabled(rename = "Instance")]
    instance_id: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Monthly Cost")]
    cost: String,
    #[tabled(rename = "Monthly Savings")]
    savings: String,
}

/// Show idle classification for every instance
pub async fn get_idle(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let result: Vec<Recommendation> = client.get("idle-resources").await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            let rows: Vec<IdleRow> = result
                .iter()
                .map(|r| IdleRow {
                    instance_id: r.instance_id.clone(),
                    instance_type: r.instance_type.clone(),
                    state: r.state.clone(),
                    cpu: format_percent(r.avg_cpu_percent),
                    action: color_action(&r.recommended_action),
                    reason: r.reason.clone(),
                })
                .collect();
            print_rows(rows, "No instances found");
        }
    }

    Ok(())
}

/// Show rightsizing entries for running instances
pub async fn get_rightsizing(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let result: Vec<RightsizingEntry> = client.get("rightsizing").await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            if result.iter().any(RightsizingEntry::is_placeholder) {
                print_info("No running instances; showing demonstration entry");
            }

            let rows: Vec<RightsizingRow> = result
                .iter()
                .map(|r| RightsizingRow {
                    instance_id: r.instance_id.clone(),
                    cpu: format_percent(r.current_cpu_percent),
                    action: color_action(&r.rightsizing_action),
                    reason: r.reason.clone(),
                })
                .collect();
            print_rows(rows, "No rightsizing entries");
        }
    }

    Ok(())
}

/// Show estimated monthly cost and savings per instance
pub async fn get_savings(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let result: Vec<SavingsRecord> = client.get("savings").await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            let total: f64 = result.iter().map(|r| r.estimated_monthly_savings_usd).sum();

            let rows: Vec<SavingsRow> = result
                .iter()
                .map(|r| SavingsRow {
                    instance_id: r.instance_id.clone(),
                    action: color_action(&r.recommended_action),
                    cost: format_usd(r.estimated_monthly_cost_usd),
                    savings: format_usd(r.estimated_monthly_savings_usd),
                })
                .collect();
            print_rows(rows, "No savings records");
            println!(
                "\n{} {}",
                "Total Savings:".bold(),
                format_usd(total).green().bold()
            );
        }
    }

    Ok(())
}

/// Show dashboard summary figures
pub async fn show_summary(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let result: Summary = client.get("summary").await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            println!("{}", "Optimization Summary".bold());
            println!("{}", "=".repeat(50));
            println!("Instances analyzed:     {}", result.recommendation_count);
            println!("Idle instances:         {}", result.idle_count.to_string().yellow());
            println!("Rightsizing candidates: {}", result.rightsizing_count);
            println!(
                "{}     {}",
                "Estimated Savings:".bold(),
                format_usd(result.estimated_total_savings).green().bold()
            );
        }
    }

    Ok(())
}
