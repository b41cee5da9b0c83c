//! CLI argument definitions.

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{InvestArgs, MarginArgs};

/// Apportion - Constrained portfolio allocation CLI
#[derive(Parser)]
#[command(name = "apportion")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Size leveraged positions against a margin budget
    Margin(MarginArgs),

    /// Spend cash across target weights or review a monthly top-up
    Invest(InvestArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
    /// Minimal output (just the value)
    Minimal,
}
