//! Margin command implementation.
//!
//! Sizes positions so the table consumes the account's margin budget.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::Tabled;

use apportion_core::{MarginBudget, RowPolicy, WeightRule};
use apportion_engine::config::MarginConfig;
use apportion_engine::margin::{allocate_margin, MarginAllocation, PositionSize};
use apportion_engine::DEFAULT_TOLERANCE;

use crate::cli::OutputFormat;
use crate::input::read_portfolio;
use crate::output::{print_header, print_output, print_warning, KeyValue};

/// Arguments for the margin command.
#[derive(Args, Debug)]
pub struct MarginArgs {
    /// Portfolio table (CSV)
    #[arg(short, long)]
    pub portfolio: PathBuf,

    /// Account balance
    #[arg(short, long)]
    pub balance: Decimal,

    /// Target margin usage as a fraction of balance (e.g. 0.4)
    #[arg(short, long)]
    pub margin_fraction: Decimal,

    /// Home-per-foreign conversion rate for rows flagged as foreign
    #[arg(long)]
    pub fx_rate: Option<Decimal>,

    /// Park every row at minimum stake and let one class absorb the
    /// rest of the budget
    #[arg(long, value_name = "CLASS", num_args = 0..=1, default_missing_value = "equity")]
    pub single_dial: Option<String>,

    /// Accept any positive weight total instead of requiring a sum of 1
    #[arg(long)]
    pub lenient_weights: bool,

    /// Drop incomplete rows instead of aborting on them
    #[arg(long)]
    pub skip_invalid: bool,
}

/// One allocation line, formatted for display.
#[derive(Debug, Serialize, Tabled)]
pub struct PositionRow {
    #[tabled(rename = "Instrument")]
    pub name: String,
    #[tabled(rename = "Class")]
    pub class: String,
    #[tabled(rename = "Stake")]
    pub stake: String,
    #[tabled(rename = "Margin")]
    pub margin: String,
    #[tabled(rename = "Notional")]
    pub notional: String,
    #[tabled(rename = "Target %")]
    pub target_pct: String,
    #[tabled(rename = "Achieved %")]
    pub achieved_pct: String,
}

impl PositionRow {
    fn from_position(position: &PositionSize) -> Self {
        Self {
            name: position.name.clone(),
            class: position.asset_class.clone(),
            stake: format!("{:.4}", position.stake),
            margin: format!("{:.2}", position.margin),
            notional: format!("{:.2}", position.notional),
            target_pct: position
                .target_weight_pct
                .map_or_else(|| "-".to_string(), |weight| format!("{:.2}", weight)),
            achieved_pct: format!("{:.2}", position.achieved_weight_pct),
        }
    }
}

/// Execute the margin command.
pub fn execute(args: MarginArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let rows = read_portfolio(&args.portfolio)?;

    let mut budget = MarginBudget::new(args.balance, args.margin_fraction);
    if let Some(rate) = args.fx_rate {
        budget = budget.with_fx_rate(rate);
    }

    let weight_rule = if args.lenient_weights {
        WeightRule::PositiveTotal
    } else {
        WeightRule::SumToOne
    };
    let mut config = match &args.single_dial {
        Some(class) => MarginConfig::single_dial(class.clone()),
        None => MarginConfig::waterfall(weight_rule),
    };
    if args.skip_invalid {
        config = config.with_rows(RowPolicy::SkipInvalid);
    }

    let allocation = allocate_margin(&budget, &rows, &config)?;

    let position_rows: Vec<PositionRow> = allocation
        .positions
        .iter()
        .map(PositionRow::from_position)
        .collect();

    match format {
        OutputFormat::Table => {
            print_header("Margin Allocation");
            print_output(&position_rows, format)?;

            print_header("Summary");
            print_output(&summary_rows(&allocation), format)?;

            if !quiet && allocation.total_margin > allocation.target_margin_cap + DEFAULT_TOLERANCE
            {
                print_warning(&format!(
                    "minimum stakes use {:.2} margin against a {:.2} cap",
                    allocation.total_margin, allocation.target_margin_cap
                ));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&allocation)?);
        }
        OutputFormat::Csv => {
            print_output(&position_rows, format)?;
        }
        OutputFormat::Minimal => {
            println!("{:.2}", allocation.total_margin);
        }
    }

    Ok(())
}

fn summary_rows(allocation: &MarginAllocation) -> Vec<KeyValue> {
    vec![
        KeyValue::new("Total Margin", format!("{:.2}", allocation.total_margin)),
        KeyValue::new("Margin Cap", format!("{:.2}", allocation.target_margin_cap)),
        KeyValue::new(
            "Total Notional",
            format!("{:.2}", allocation.total_notional),
        ),
        KeyValue::new(
            "Margin Utilization",
            format!("{:.2}%", allocation.margin_utilization * 100.0),
        ),
    ]
}
