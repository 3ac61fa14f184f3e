//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print rows as a rounded table, or a warning when there are none
pub fn print_rows<T: Tabled>(rows: Vec<T>, empty_message: &str) {
    if rows.is_empty() {
        print_warning(empty_message);
        return;
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format USD amounts
pub fn format_usd(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Format a CPU percentage
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Color a recommended action by urgency
pub fn color_action(action: &str) -> String {
    match action {
        "Terminate" => action.red().bold().to_string(),
        "Stop" => action.red().to_string(),
        "Rightsize" | "Downsize Instance" | "Upsize Instance" => action.yellow().to_string(),
        "Keep Running" | "Keep Size" => action.green().to_string(),
        _ => action.to_string(),
    }
}

/// Color an alert dispatch status
pub fn color_dispatch(status: &str) -> String {
    match status {
        "sent" => status.yellow().to_string(),
        "not_required" => status.green().to_string(),
        "failed" => status.red().to_string(),
        _ => status.to_string(),
    }
}
