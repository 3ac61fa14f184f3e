//! Cost-related CLI commands

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::client::{ApiClient, BudgetEvaluation, BudgetRequest, ServiceCosts};
use crate::output::{color_dispatch, format_usd, print_json, print_rows, print_warning, OutputFormat};

/// Row for the service cost table
#[derive(Tabled)]
struct ServiceCostRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Cost (30d)")]
    cost: String,
    #[tabled(rename = "Share")]
    share: String,
}

/// Show cost per service over the trailing 30 days
pub async fn show_costs(client: &ApiClient, top: Option<usize>, format: OutputFormat) -> Result<()> {
    let path = match top {
        Some(n) => format!("service-costs?top={}", n),
        None => "service-costs".to_string(),
    };

    let result: ServiceCosts = client.get(&path).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            println!("{}", "Cost by Service".bold());
            println!("{}", "=".repeat(50));

            let rows: Vec<ServiceCostRow> = result
                .services
                .iter()
                .map(|s| ServiceCostRow {
                    service: s.service_name.clone(),
                    cost: format_usd(s.cost_usd),
                    share: share_of(s.cost_usd, result.total_cost_usd),
                })
                .collect();
            print_rows(rows, "No billing data");

            println!(
                "\n{} {}",
                "Total Cost:".bold(),
                format_usd(result.total_cost_usd).cyan().bold()
            );
        }
    }

    Ok(())
}

/// Evaluate the billing total against the server's budget threshold
pub async fn evaluate_budget(
    client: &ApiClient,
    region: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let request = BudgetRequest { region };
    let result: BudgetEvaluation = client.post("budget/evaluate", &request).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            let decision = &result.decision;

            println!("{}", "Budget Evaluation".bold());
            println!("{}", "=".repeat(50));
            println!("Region:                 {}", decision.region.cyan());
            println!("Total Monthly Cost:     {}", format_usd(decision.total_cost_usd));
            println!("Threshold:              {}", format_usd(decision.threshold_usd));

            let verdict = if decision.exceeded {
                "EXCEEDED".red().bold()
            } else {
                "within budget".green()
            };
            println!("Status:                 {}", verdict);
            println!(
                "Alert:                  {}",
                color_dispatch(&result.dispatch.status)
            );

            if let Some(reason) = &result.dispatch.reason {
                print_warning(&format!("Alert delivery failed: {}", reason));
            }
        }
    }

    Ok(())
}

fn share_of(cost: f64, total: f64) -> String {
    if total > 0.0 {
        format!("{:.1}%", cost / total * 100.0)
    } else {
        "-".to_string()
    }
}
