//! Invest command implementation.
//!
//! Spends a deposit across target weights, or reviews an existing
//! account and names the one purchase worth making this month.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::Tabled;

use apportion_core::{CashAccount, RowPolicy, WeightRule};
use apportion_engine::cash::{allocate_cash, BuildPlan, CashOutcome, HoldingGap, TopUpReview};
use apportion_engine::config::{BuildOrder, DcaConfig, GapMetric};

use crate::cli::OutputFormat;
use crate::input::read_portfolio;
use crate::output::{print_header, print_info, print_output, print_success, KeyValue};

/// Arguments for the invest command.
#[derive(Args, Debug)]
pub struct InvestArgs {
    /// Portfolio table (CSV)
    #[arg(short, long)]
    pub portfolio: PathBuf,

    /// Cash available to invest now
    #[arg(short, long)]
    pub cash: Decimal,

    /// Monthly contribution considered by a top-up review
    #[arg(short, long, default_value = "0")]
    pub monthly: Decimal,

    /// Home-per-foreign conversion rate for rows flagged as foreign
    #[arg(long)]
    pub fx_rate: Option<Decimal>,

    /// Spend in row order instead of heaviest weight first
    #[arg(long)]
    pub input_order: bool,

    /// Rank top-up gaps by currency amount instead of share of target
    #[arg(long)]
    pub absolute_gap: bool,

    /// Abort on incomplete rows instead of dropping them
    #[arg(long)]
    pub strict_rows: bool,

    /// Accept any positive weight total instead of requiring a sum of 1
    #[arg(long)]
    pub lenient_weights: bool,
}

/// One build purchase, formatted for display.
#[derive(Debug, Serialize, Tabled)]
pub struct PurchaseRow {
    #[tabled(rename = "Instrument")]
    pub name: String,
    #[tabled(rename = "Units")]
    pub units: String,
    #[tabled(rename = "Price")]
    pub price: String,
    #[tabled(rename = "Cost")]
    pub cost: String,
}

/// One holding's distance from target, formatted for display.
#[derive(Debug, Serialize, Tabled)]
pub struct GapRow {
    #[tabled(rename = "Instrument")]
    pub name: String,
    #[tabled(rename = "Held")]
    pub held: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Target")]
    pub target: String,
    #[tabled(rename = "Gap")]
    pub gap: String,
    #[tabled(rename = "Gap %")]
    pub gap_pct: String,
}

impl GapRow {
    fn from_gap(gap: &HoldingGap) -> Self {
        Self {
            name: gap.name.clone(),
            held: gap.units_held.normalize().to_string(),
            value: format!("{:.2}", gap.value),
            target: format!("{:.2}", gap.target_value),
            gap: format!("{:.2}", gap.gap),
            gap_pct: format!("{:.2}%", gap.gap_fraction * Decimal::ONE_HUNDRED),
        }
    }
}

/// Execute the invest command.
pub fn execute(args: InvestArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let rows = read_portfolio(&args.portfolio)?;

    let mut account = CashAccount::new(args.cash).with_monthly_contribution(args.monthly);
    if let Some(rate) = args.fx_rate {
        account = account.with_fx_rate(rate);
    }

    let mut config = DcaConfig::default();
    if args.lenient_weights {
        config = config.with_weight_rule(WeightRule::PositiveTotal);
    }
    if args.strict_rows {
        config = config.with_rows(RowPolicy::RequireComplete);
    }
    if args.input_order {
        config = config.with_build_order(BuildOrder::InputOrder);
    }
    if args.absolute_gap {
        config = config.with_gap_metric(GapMetric::Absolute);
    }

    match allocate_cash(&account, &rows, &config)? {
        CashOutcome::Build(plan) => print_build(&plan, format, quiet),
        CashOutcome::TopUp(review) => print_top_up(&review, format, quiet),
    }
}

fn print_build(plan: &BuildPlan, format: OutputFormat, quiet: bool) -> Result<()> {
    let purchase_rows: Vec<PurchaseRow> = plan
        .purchases
        .iter()
        .map(|purchase| PurchaseRow {
            name: purchase.name.clone(),
            units: purchase.units.normalize().to_string(),
            price: format!("{:.2}", purchase.price),
            cost: format!("{:.2}", purchase.cost),
        })
        .collect();

    match format {
        OutputFormat::Table => {
            print_header("Initial Build");
            print_output(&purchase_rows, format)?;

            if !quiet {
                let spent = plan.portfolio_value - plan.cash_remaining;
                let summary = vec![
                    KeyValue::from_decimal("Deposit", plan.portfolio_value, 2),
                    KeyValue::from_decimal("Spent", spent, 2),
                    KeyValue::from_decimal("Cash Remaining", plan.cash_remaining, 2),
                ];
                print_header("Summary");
                print_output(&summary, format)?;
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(plan)?);
        }
        OutputFormat::Csv => {
            print_output(&purchase_rows, format)?;
        }
        OutputFormat::Minimal => {
            println!("{:.2}", plan.cash_remaining);
        }
    }

    Ok(())
}

fn print_top_up(review: &TopUpReview, format: OutputFormat, quiet: bool) -> Result<()> {
    let gap_rows: Vec<GapRow> = review.holdings.iter().map(GapRow::from_gap).collect();

    match format {
        OutputFormat::Table => {
            if !quiet {
                print_header("Holdings vs Target");
                print_output(&gap_rows, format)?;

                let summary = vec![
                    KeyValue::from_decimal("Cash Available", review.cash_available, 2),
                    KeyValue::from_decimal("Portfolio Value", review.portfolio_value, 2),
                ];
                print_header("Summary");
                print_output(&summary, format)?;
                println!();
            }

            match &review.recommendation {
                Some(rec) => print_success(&format!(
                    "Buy {} {} at {:.2} ({:.2} cash left after)",
                    rec.units.normalize(),
                    rec.name,
                    rec.price,
                    rec.cash_after
                )),
                None => print_info("No affordable top-up this month; the cash stays put"),
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(review)?);
        }
        OutputFormat::Csv => {
            print_output(&gap_rows, format)?;
        }
        OutputFormat::Minimal => match &review.recommendation {
            Some(rec) => println!("{}", rec.name),
            None => println!("-"),
        },
    }

    Ok(())
}
