//! Margin-budget allocation.
//!
//! Sizes positions so the portfolio consumes as much of the margin cap
//! as it can without materially exceeding it. Two policies share the
//! row intake and the result shape: the waterfall search and the
//! single-dial shortcut.

mod dial;
mod waterfall;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use apportion_core::validation::{check_weight_total, resolve_fx};
use apportion_core::{
    AllocationError, AllocationResult, InstrumentInput, MarginBudget, RowPolicy,
};

use crate::config::{MarginConfig, MarginPolicy};

/// One sized position in a margin allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSize {
    /// Instrument name.
    pub name: String,

    /// Classification, as supplied.
    pub asset_class: String,

    /// Stake in instrument units. Never below the minimum stake.
    pub stake: f64,

    /// Margin consumed at this stake.
    pub margin: f64,

    /// Notional exposure at this stake.
    pub notional: f64,

    /// Supplied target weight, in percent. Absent when the row carried
    /// no weight (the single-dial policy does not require one).
    pub target_weight_pct: Option<f64>,

    /// Share of total notional, in percent.
    pub achieved_weight_pct: f64,
}

/// A complete margin allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginAllocation {
    /// Sized positions, in intake order.
    pub positions: Vec<PositionSize>,

    /// Margin consumed across all positions.
    pub total_margin: f64,

    /// Notional exposure across all positions.
    pub total_notional: f64,

    /// The cap the allocator aimed for.
    pub target_margin_cap: f64,

    /// Total margin as a fraction of account balance.
    pub margin_utilization: f64,
}

/// A validated, FX-converted row in `f64` terms, ready for the search.
#[derive(Debug, Clone)]
pub(crate) struct MarginLeg {
    pub(crate) name: String,
    pub(crate) asset_class: String,
    pub(crate) weight: Option<f64>,
    pub(crate) min_stake: f64,
    pub(crate) margin_per_unit: f64,
    pub(crate) notional_per_unit: f64,
    pub(crate) min_margin: f64,
    pub(crate) min_notional: f64,
}

impl MarginLeg {
    pub(crate) fn weight_or_zero(&self) -> f64 {
        self.weight.unwrap_or(0.0)
    }
}

/// Which optional row fields the active policy insists on.
struct RowNeeds {
    weight: bool,
    notional: bool,
}

/// Allocates the margin budget across the candidate rows.
///
/// Validates the account, reads rows under the configured [`RowPolicy`],
/// applies the policy's weight rule, and runs the configured
/// [`MarginPolicy`].
///
/// # Example
///
/// ```rust
/// use apportion_core::{InstrumentInput, MarginBudget};
/// use apportion_engine::config::MarginConfig;
/// use apportion_engine::margin::allocate_margin;
/// use rust_decimal_macros::dec;
///
/// let budget = MarginBudget::new(dec!(10_000), dec!(0.4));
/// let rows = vec![InstrumentInput::new("US500")
///     .with_asset_class("equity")
///     .with_price(dec!(5000))
///     .with_min_unit(dec!(0.5))
///     .with_margin_at_min(dec!(250))
///     .with_notional_at_min(dec!(2500))
///     .with_weight(dec!(1.0))];
///
/// let allocation = allocate_margin(&budget, &rows, &MarginConfig::default()).unwrap();
/// assert!(allocation.total_margin <= allocation.target_margin_cap + 1e-6);
/// ```
pub fn allocate_margin(
    budget: &MarginBudget,
    rows: &[InstrumentInput],
    config: &MarginConfig,
) -> AllocationResult<MarginAllocation> {
    budget.validate()?;
    match &config.policy {
        MarginPolicy::Waterfall { weight_rule } => {
            let needs = RowNeeds {
                weight: true,
                notional: true,
            };
            let (legs, weight_total) = intake(budget, rows, config.rows, &needs)?;
            if legs.is_empty() {
                return Err(AllocationError::NoValidInstruments);
            }
            check_weight_total(*weight_rule, weight_total)?;
            waterfall::allocate(budget, &legs, &config.search)
        }
        MarginPolicy::SingleDial { dial_class } => {
            let needs = RowNeeds {
                weight: false,
                notional: false,
            };
            let (legs, _) = intake(budget, rows, config.rows, &needs)?;
            if legs.is_empty() {
                return Err(AllocationError::NoValidInstruments);
            }
            dial::allocate(budget, &legs, dial_class)
        }
    }
}

fn intake(
    budget: &MarginBudget,
    rows: &[InstrumentInput],
    policy: RowPolicy,
    needs: &RowNeeds,
) -> AllocationResult<(Vec<MarginLeg>, Decimal)> {
    let mut legs = Vec::with_capacity(rows.len());
    let mut weight_total = Decimal::ZERO;
    for (index, row) in rows.iter().enumerate() {
        match leg_from_row(budget, row, index, needs) {
            Ok(leg) => {
                weight_total += row.weight.unwrap_or(Decimal::ZERO);
                legs.push(leg);
            }
            Err(err) => match policy {
                RowPolicy::RequireComplete => return Err(err),
                RowPolicy::SkipInvalid => {
                    log::debug!("skipping row {}: {err}", index + 1);
                }
            },
        }
    }
    Ok((legs, weight_total))
}

fn leg_from_row(
    budget: &MarginBudget,
    row: &InstrumentInput,
    index: usize,
    needs: &RowNeeds,
) -> AllocationResult<MarginLeg> {
    let name = row.name.trim();
    let label = if name.is_empty() {
        format!("row {}", index + 1)
    } else {
        name.to_string()
    };
    if name.is_empty() {
        return Err(AllocationError::missing_field(label, "name"));
    }

    let fx = resolve_fx(budget.fx_rate, row)?;
    let price = require_positive(&label, "price", row.price)? * fx;
    let min_unit = require_positive(&label, "min_unit", row.min_unit)?;
    let margin_at_min = require_positive(&label, "margin_at_min", row.margin_at_min)? * fx;

    let notional_at_min = if needs.notional {
        Some(require_positive(&label, "notional_at_min", row.notional_at_min)? * fx)
    } else {
        match row.notional_at_min {
            Some(value) if value <= Decimal::ZERO => {
                return Err(AllocationError::missing_field(label, "notional_at_min"));
            }
            other => other.map(|value| value * fx),
        }
    };

    let weight = if needs.weight {
        match row.weight {
            Some(value) if value >= Decimal::ZERO => Some(value),
            _ => return Err(AllocationError::missing_field(label, "weight")),
        }
    } else {
        match row.weight {
            Some(value) if value < Decimal::ZERO => {
                return Err(AllocationError::missing_field(label, "weight"));
            }
            other => other,
        }
    };

    let min_stake = min_unit.to_f64().unwrap_or(0.0);
    let margin_per_unit = (margin_at_min / min_unit).to_f64().unwrap_or(0.0);
    let notional_per_unit = match notional_at_min {
        Some(value) => (value / min_unit).to_f64().unwrap_or(0.0),
        None => price.to_f64().unwrap_or(0.0),
    };

    Ok(MarginLeg {
        name: name.to_string(),
        asset_class: row.asset_class.trim().to_string(),
        weight: weight.map(|value| value.to_f64().unwrap_or(0.0)),
        min_stake,
        margin_per_unit,
        notional_per_unit,
        min_margin: margin_at_min.to_f64().unwrap_or(0.0),
        // Derived from the per-unit rate so share/stake conversions stay
        // exactly consistent inside the search.
        min_notional: min_stake * notional_per_unit,
    })
}

fn require_positive(
    label: &str,
    field: &'static str,
    value: Option<Decimal>,
) -> AllocationResult<Decimal> {
    match value {
        Some(value) if value > Decimal::ZERO => Ok(value),
        _ => Err(AllocationError::missing_field(label, field)),
    }
}

/// Assembles the public result from sized legs.
pub(crate) fn build_allocation(
    budget: &MarginBudget,
    legs: &[MarginLeg],
    stakes: &[f64],
) -> MarginAllocation {
    let cap = budget.cap().to_f64().unwrap_or(0.0);
    let balance = budget.balance.to_f64().unwrap_or(0.0);

    let total_margin: f64 = legs
        .iter()
        .zip(stakes)
        .map(|(leg, stake)| stake * leg.margin_per_unit)
        .sum();
    let total_notional: f64 = legs
        .iter()
        .zip(stakes)
        .map(|(leg, stake)| stake * leg.notional_per_unit)
        .sum();

    let positions = legs
        .iter()
        .zip(stakes)
        .map(|(leg, &stake)| {
            let notional = stake * leg.notional_per_unit;
            PositionSize {
                name: leg.name.clone(),
                asset_class: leg.asset_class.clone(),
                stake,
                margin: stake * leg.margin_per_unit,
                notional,
                target_weight_pct: leg.weight.map(|weight| weight * 100.0),
                achieved_weight_pct: if total_notional > 0.0 {
                    notional / total_notional * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect();

    MarginAllocation {
        positions,
        total_margin,
        total_notional,
        target_margin_cap: cap,
        margin_utilization: if balance > 0.0 {
            total_margin / balance
        } else {
            0.0
        },
    }
}
