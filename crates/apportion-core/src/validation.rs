//! Shared input validation.
//!
//! The checks both allocation families run before touching a budget:
//! weight totals, FX resolution, and field-tagged cell parsing.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use apportion_math::parse::parse_optional_decimal;

use crate::error::{AllocationError, AllocationResult};
use crate::types::{InstrumentInput, WeightRule};

/// Tolerance on the strict weight-sum rule.
pub const WEIGHT_SUM_TOLERANCE: Decimal = dec!(0.001);

/// Checks a weight total against the active rule.
///
/// Individual weights are checked for sign where rows are read in; this
/// is the set-level gate that runs once per allocation, before any
/// budget arithmetic.
pub fn check_weight_total(rule: WeightRule, total: Decimal) -> AllocationResult<()> {
    match rule {
        WeightRule::SumToOne => {
            if (total - Decimal::ONE).abs() > WEIGHT_SUM_TOLERANCE {
                return Err(AllocationError::weight_sum(
                    total,
                    "must sum to 1.0 within 0.001",
                ));
            }
        }
        WeightRule::PositiveTotal => {
            if total <= Decimal::ZERO {
                return Err(AllocationError::weight_sum(total, "must be positive"));
            }
        }
    }
    Ok(())
}

/// Returns the multiplier that converts a row's monetary fields into
/// the account currency.
///
/// Rows not flagged `foreign_currency` convert at 1. A flagged row with
/// no usable account rate is an error naming the row.
pub fn resolve_fx(fx_rate: Option<Decimal>, row: &InstrumentInput) -> AllocationResult<Decimal> {
    if !row.foreign_currency {
        return Ok(Decimal::ONE);
    }
    match fx_rate {
        Some(rate) if rate > Decimal::ZERO => Ok(rate),
        _ => Err(AllocationError::missing_field(&row.name, "fx_rate")),
    }
}

/// Parses a tabular cell, tagging failures with the field name.
///
/// Blank cells are `Ok(None)`; see
/// [`apportion_math::parse::parse_optional_decimal`].
pub fn parse_field(field: &str, text: &str) -> AllocationResult<Option<Decimal>> {
    parse_optional_decimal(text).map_err(|_| AllocationError::parse(field, text.trim()))
}
