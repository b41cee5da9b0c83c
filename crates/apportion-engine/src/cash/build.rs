//! Initial portfolio build.

use rust_decimal::Decimal;

use apportion_core::CashAccount;
use apportion_math::rounding::floor_to_step_decimal;

use super::{BuildPlan, CashLeg, Purchase};
use crate::config::BuildOrder;

/// Spends the deposit across the target weights, one instrument at a
/// time.
///
/// Each leg's target cash is its weight of the original deposit, so a
/// leg that spends under target does not inflate the targets of later
/// legs. Unit counts floor to the lot size; a positive-weight leg
/// priced out of its own target still gets one lot while cash lasts.
pub(crate) fn build_plan(
    account: &CashAccount,
    mut legs: Vec<CashLeg>,
    order: BuildOrder,
) -> BuildPlan {
    if order == BuildOrder::WeightDescending {
        legs.sort_by(|a, b| b.weight.cmp(&a.weight));
    }

    let deposit = account.cash_available;
    let mut remaining = deposit;
    let mut purchases = Vec::new();
    for leg in &legs {
        let target_cash = deposit * leg.weight;
        let desired = floor_to_step_decimal(target_cash / leg.price, leg.lot);
        let affordable = floor_to_step_decimal(remaining / leg.price, leg.lot);
        let mut units = desired.min(affordable);
        if units.is_zero() && leg.weight > Decimal::ZERO && leg.price * leg.lot <= remaining {
            units = leg.lot;
        }
        if units > Decimal::ZERO {
            let cost = units * leg.price;
            remaining -= cost;
            purchases.push(Purchase {
                name: leg.name.clone(),
                units,
                price: leg.price,
                cost,
            });
        }
    }

    BuildPlan {
        purchases,
        cash_remaining: remaining,
        portfolio_value: deposit,
    }
}
