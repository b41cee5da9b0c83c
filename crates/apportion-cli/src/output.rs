//! Rendering for allocation reports.
//!
//! Every command funnels its rows through [`print_output`]; the format
//! flag decides between a rounded table for humans, JSON or CSV for
//! scripts, and compact per-row lines for `minimal`. Commands with a
//! single headline number print it themselves instead.

use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::cli::OutputFormat;

/// Renders a slice of report rows in the requested format.
pub fn print_output<T: Serialize + Tabled>(data: &[T], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => print_table(data),
        OutputFormat::Json => print_json(data),
        OutputFormat::Csv => print_csv(data),
        OutputFormat::Minimal => print_minimal(data),
    }
}

fn print_table<T: Tabled>(data: &[T]) -> anyhow::Result<()> {
    if data.is_empty() {
        println!("Nothing to report.");
        return Ok(());
    }

    let table = Table::new(data)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::left()))
        .to_string();

    println!("{table}");
    Ok(())
}

fn print_json<T: Serialize>(data: &[T]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

fn print_csv<T: Serialize>(data: &[T]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for item in data {
        wtr.serialize(item)?;
    }
    wtr.flush()?;
    Ok(())
}

/// One compact JSON line per row, for piping.
fn print_minimal<T: Serialize>(data: &[T]) -> anyhow::Result<()> {
    for item in data {
        println!("{}", serde_json::to_string(item)?);
    }
    Ok(())
}

/// Prints a confirmation line with a green check.
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Prints a cautionary line to stderr.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message);
}

/// Prints an informational line.
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// One metric in a summary block.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct KeyValue {
    #[tabled(rename = "Metric")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl KeyValue {
    /// Creates a summary row from an already-formatted value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a summary row from a decimal at a fixed precision.
    pub fn from_decimal(key: impl Into<String>, value: Decimal, precision: u32) -> Self {
        Self {
            key: key.into(),
            value: format!("{:.prec$}", value, prec = precision as usize),
        }
    }
}

/// Prints a bold, underlined section title.
pub fn print_header(title: &str) {
    println!("\n{}", title.bold().underline());
}
