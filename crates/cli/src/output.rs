//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Print rows as a table, or the raw value as JSON
pub fn print_rows<T: Tabled, J: Serialize + ?Sized>(
    rows: &[T],
    raw: &J,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("{}", "No items found".yellow());
            } else {
                println!("{}", Table::new(rows).with(Style::rounded()));
            }
        }
        OutputFormat::Json => print_json(raw)?,
    }
    Ok(())
}

pub fn print_json<J: Serialize + ?Sized>(value: &J) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Whole gigabytes as shown in tables
pub fn format_gb(gb: u64) -> String {
    if gb >= 1024 && gb % 1024 == 0 {
        format!("{} TB", gb / 1024)
    } else {
        format!("{} GB", gb)
    }
}

pub fn format_iops(iops: u64) -> String {
    if iops >= 1000 {
        format!("{:.1}k", iops as f64 / 1000.0)
    } else {
        iops.to_string()
    }
}

/// Green when the instance covers the requirement, red when it was a fallback
pub fn color_fit(satisfies: bool) -> String {
    if satisfies {
        "fits".green().to_string()
    } else {
        "undersized".red().bold().to_string()
    }
}
