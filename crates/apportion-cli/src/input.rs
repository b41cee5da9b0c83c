//! Portfolio table intake.
//!
//! Reads the CSV the commands share. Blank cells become `None` and the
//! engine's row policy decides what that means; text that LOOKS like a
//! number but is not one aborts the run with the offending line, since
//! silently dropping a typo would misallocate real money.
//!
//! Expected columns, in any order, extra columns ignored:
//! `name,class,price,min_unit,margin_at_min,notional_at_min,weight_pct,shares_held,foreign_currency`

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use apportion_core::validation::parse_field;
use apportion_core::InstrumentInput;

use crate::error::{CliError, CliResult};

/// One CSV record, every cell still text.
#[derive(Debug, Default, Deserialize)]
struct RawRow {
    #[serde(default)]
    name: String,
    #[serde(default)]
    class: String,
    #[serde(default)]
    price: String,
    #[serde(default)]
    min_unit: String,
    #[serde(default)]
    margin_at_min: String,
    #[serde(default)]
    notional_at_min: String,
    #[serde(default)]
    weight_pct: String,
    #[serde(default)]
    shares_held: String,
    #[serde(default)]
    foreign_currency: String,
}

/// Reads a portfolio table from disk.
pub fn read_portfolio(path: &Path) -> CliResult<Vec<InstrumentInput>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize().enumerate() {
        let raw: RawRow = record?;
        // Header occupies line 1; the first record is line 2.
        rows.push(instrument_from_raw(&raw, index + 2)?);
    }
    Ok(rows)
}

fn instrument_from_raw(raw: &RawRow, line: usize) -> CliResult<InstrumentInput> {
    let weight = parse_cell("weight_pct", &raw.weight_pct, line)?
        .map(|pct| pct / Decimal::ONE_HUNDRED);
    let shares_held =
        parse_cell("shares_held", &raw.shares_held, line)?.unwrap_or(Decimal::ZERO);

    Ok(InstrumentInput {
        name: raw.name.clone(),
        asset_class: raw.class.clone(),
        price: parse_cell("price", &raw.price, line)?,
        min_unit: parse_cell("min_unit", &raw.min_unit, line)?,
        margin_at_min: parse_cell("margin_at_min", &raw.margin_at_min, line)?,
        notional_at_min: parse_cell("notional_at_min", &raw.notional_at_min, line)?,
        weight,
        shares_held,
        foreign_currency: parse_flag(&raw.foreign_currency, line)?,
    })
}

fn parse_cell(field: &'static str, text: &str, line: usize) -> CliResult<Option<Decimal>> {
    parse_field(field, text).map_err(|source| CliError::BadCell { line, source })
}

fn parse_flag(text: &str, line: usize) -> CliResult<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "n" => Ok(false),
        "1" | "true" | "yes" | "y" => Ok(true),
        other => Err(CliError::BadFlag {
            line,
            text: other.to_string(),
        }),
    }
}
