//! Single-dial sizing.
//!
//! Every leg except the dial rides at minimum stake; the dial absorbs
//! whatever margin the cap leaves over. No feasibility check: if the
//! minimums alone exceed the cap, the result simply reports more
//! margin than the cap and the caller can see that.

use rust_decimal::prelude::ToPrimitive;

use apportion_core::{AllocationError, AllocationResult, MarginBudget};

use super::{build_allocation, MarginAllocation, MarginLeg};

pub(crate) fn allocate(
    budget: &MarginBudget,
    legs: &[MarginLeg],
    dial_class: &str,
) -> AllocationResult<MarginAllocation> {
    let wanted = dial_class.trim();
    let matches: Vec<usize> = legs
        .iter()
        .enumerate()
        .filter(|(_, leg)| leg.asset_class.eq_ignore_ascii_case(wanted))
        .map(|(i, _)| i)
        .collect();
    if matches.len() != 1 {
        return Err(AllocationError::AmbiguousDialInstrument {
            class: dial_class.to_string(),
            matches: matches.len(),
        });
    }
    let dial = matches[0];

    let cap = budget.cap().to_f64().unwrap_or(0.0);
    let fixed_margin: f64 = legs
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != dial)
        .map(|(_, leg)| leg.min_margin)
        .sum();
    let residual = cap - fixed_margin;

    let mut stakes: Vec<f64> = legs.iter().map(|leg| leg.min_stake).collect();
    if residual > 0.0 {
        let leg = &legs[dial];
        stakes[dial] = (residual / leg.margin_per_unit).max(leg.min_stake);
    } else {
        log::debug!("minimum stakes leave no margin for the dial");
    }

    Ok(build_allocation(budget, legs, &stakes))
}
