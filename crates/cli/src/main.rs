//! Cloud Cost Optimizer CLI
//!
//! A command-line client for the optimizer server: idle and rightsizing
//! recommendations, savings, service costs, budget checks and reports.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{costs, recommendations, reports};

/// Cloud Cost Optimizer CLI
#[derive(Parser)]
#[command(name = "coptim")]
#[command(author, version, about = "CLI for Cloud Cost Optimizer", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via COPTIM_API_URL env var)
    #[arg(long, env = "COPTIM_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Get instance recommendations
    #[command(subcommand)]
    Get(GetCommands),

    /// Show dashboard summary figures
    Summary,

    /// View cost per service
    #[command(subcommand)]
    Costs(CostsCommands),

    /// Budget threshold checks
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Persisted reports
    #[command(subcommand)]
    Report(ReportCommands),
}

#[derive(Subcommand)]
pub enum GetCommands {
    /// Idle classification for every instance
    Idle,

    /// Rightsizing entries for running instances
    Rightsizing,

    /// Estimated monthly cost and savings
    Savings,
}

#[derive(Subcommand)]
pub enum CostsCommands {
    /// Show cost per service over the trailing 30 days
    Show {
        /// Only the N most expensive services
        #[arg(long)]
        top: Option<usize>,
    },
}

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Compare the billing total with the budget threshold
    Evaluate {
        /// Region named in the alert (server default if not specified)
        #[arg(long, short)]
        region: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Build the full report and persist it on the server
    Save,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize client
    let client = client::ApiClient::new(&cli.api_url)?;

    // Execute command
    match cli.command {
        Commands::Get(get_cmd) => match get_cmd {
            GetCommands::Idle => recommendations::get_idle(&client, cli.format).await?,
            GetCommands::Rightsizing => {
                recommendations::get_rightsizing(&client, cli.format).await?
            }
            GetCommands::Savings => recommendations::get_savings(&client, cli.format).await?,
        },
        Commands::Summary => recommendations::show_summary(&client, cli.format).await?,
        Commands::Costs(CostsCommands::Show { top }) => {
            costs::show_costs(&client, top, cli.format).await?;
        }
        Commands::Budget(BudgetCommands::Evaluate { region }) => {
            costs::evaluate_budget(&client, region, cli.format).await?;
        }
        Commands::Report(ReportCommands::Save) => {
            reports::save_report(&client, cli.format).await?;
        }
    }

    Ok(())
}
