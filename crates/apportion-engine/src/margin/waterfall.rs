//! Waterfall-proportional sizing.
//!
//! Scales the portfolio's total notional, pinning any leg whose
//! proportional share would fall below its minimum stake, and bisects
//! the scale until total margin lands on the cap. Total margin is a
//! piecewise-linear, nondecreasing function of the scale, which is
//! what makes the bisection valid.

use rust_decimal::prelude::ToPrimitive;

use apportion_core::{AllocationError, AllocationResult, MarginBudget};
use apportion_math::search::{bisect_monotone, find_upper_bound};

use super::{build_allocation, MarginAllocation, MarginLeg};
use crate::config::SearchSettings;

/// Stakes produced for one candidate scale, with the pin state that
/// produced them.
pub(crate) struct ScaledStakes {
    pub(crate) stakes: Vec<f64>,
    pub(crate) pinned: Vec<bool>,
}

pub(crate) fn allocate(
    budget: &MarginBudget,
    legs: &[MarginLeg],
    search: &SearchSettings,
) -> AllocationResult<MarginAllocation> {
    let cap = budget.cap().to_f64().unwrap_or(0.0);

    let floor_margin: f64 = legs.iter().map(|leg| leg.min_margin).sum();
    if floor_margin > cap {
        return Err(AllocationError::infeasible_budget(floor_margin, cap));
    }

    // Smallest meaningful scale: every leg at its minimum stake.
    let lo: f64 = legs.iter().map(|leg| leg.min_notional).sum();
    let feasible =
        |scale: f64| total_margin(legs, &stakes_for_scale(legs, scale).stakes) <= cap;

    let start = lo.max(1.0);
    let hi = match find_upper_bound(&feasible, start, search.max_doublings) {
        Ok(hi) => hi,
        Err(_) => {
            return Err(AllocationError::UnboundedSearch {
                doublings: search.max_doublings,
                last_scale: start * f64::from(search.max_doublings).exp2(),
            });
        }
    };
    log::debug!("scale bracketed in [{lo:.3}, {hi:.3}]");

    let scale = bisect_monotone(&feasible, lo, hi, search.bisect_iterations);
    let ScaledStakes { mut stakes, pinned } = stakes_for_scale(legs, scale);

    // The bisection stops a hair under the cap. Close the residual by
    // scaling the free stakes up; pinned legs stay at their minimum.
    let pinned_margin: f64 = legs
        .iter()
        .zip(&stakes)
        .zip(&pinned)
        .filter(|(_, &p)| p)
        .map(|((leg, stake), _)| stake * leg.margin_per_unit)
        .sum();
    let free_margin: f64 = legs
        .iter()
        .zip(&stakes)
        .zip(&pinned)
        .filter(|(_, &p)| !p)
        .map(|((leg, stake), _)| stake * leg.margin_per_unit)
        .sum();

    if free_margin > search.tolerance {
        let boost = (cap - pinned_margin) / free_margin;
        if boost > 1.0 {
            for (i, leg) in legs.iter().enumerate() {
                if !pinned[i] {
                    stakes[i] = (stakes[i] * boost).max(leg.min_stake);
                }
            }
        }
    } else {
        log::warn!("all legs pinned at minimum stake; {:.2} margin of the {cap:.2} cap goes unused", cap - pinned_margin);
    }

    Ok(build_allocation(budget, legs, &stakes))
}

/// Distributes a total-notional scale across the legs.
///
/// Repeatedly pins legs whose weighted share of the free budget falls
/// below their minimum notional, re-dividing the remainder among the
/// rest until the pin set stops changing.
pub(crate) fn stakes_for_scale(legs: &[MarginLeg], scale: f64) -> ScaledStakes {
    let mut pinned = vec![false; legs.len()];
    loop {
        let pool_weight: f64 = legs
            .iter()
            .zip(&pinned)
            .filter(|(_, &p)| !p)
            .map(|(leg, _)| leg.weight_or_zero())
            .sum();
        if pool_weight <= 0.0 {
            break;
        }
        let pinned_notional: f64 = legs
            .iter()
            .zip(&pinned)
            .filter(|(_, &p)| p)
            .map(|(leg, _)| leg.min_notional)
            .sum();
        let free_budget = scale - pinned_notional;

        let mut changed = false;
        for (i, leg) in legs.iter().enumerate() {
            if pinned[i] {
                continue;
            }
            let share = free_budget * leg.weight_or_zero() / pool_weight;
            if share < leg.min_notional {
                pinned[i] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let pool_weight: f64 = legs
        .iter()
        .zip(&pinned)
        .filter(|(_, &p)| !p)
        .map(|(leg, _)| leg.weight_or_zero())
        .sum();
    if pool_weight <= 0.0 {
        // Everything pinned: the scale buys nothing beyond the minimums.
        return ScaledStakes {
            stakes: legs.iter().map(|leg| leg.min_stake).collect(),
            pinned: vec![true; legs.len()],
        };
    }
    let pinned_notional: f64 = legs
        .iter()
        .zip(&pinned)
        .filter(|(_, &p)| p)
        .map(|(leg, _)| leg.min_notional)
        .sum();
    let free_budget = scale - pinned_notional;

    let stakes = legs
        .iter()
        .zip(&pinned)
        .map(|(leg, &p)| {
            if p {
                leg.min_stake
            } else {
                free_budget * leg.weight_or_zero() / pool_weight / leg.notional_per_unit
            }
        })
        .collect();
    ScaledStakes { stakes, pinned }
}

pub(crate) fn total_margin(legs: &[MarginLeg], stakes: &[f64]) -> f64 {
    legs.iter()
        .zip(stakes)
        .map(|(leg, stake)| stake * leg.margin_per_unit)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(name: &str, weight: f64, min_stake: f64, mpu: f64, npu: f64) -> MarginLeg {
        MarginLeg {
            name: name.to_string(),
            asset_class: String::new(),
            weight: Some(weight),
            min_stake,
            margin_per_unit: mpu,
            notional_per_unit: npu,
            min_margin: min_stake * mpu,
            min_notional: min_stake * npu,
        }
    }

    fn three_legs() -> Vec<MarginLeg> {
        vec![
            leg("US500", 0.55, 0.5, 500.0, 5000.0),
            leg("Bonds", 0.35, 1.0, 120.0, 1200.0),
            leg("Gold", 0.10, 0.3, 300.0, 2000.0),
        ]
    }

    #[test]
    fn test_large_scale_leaves_all_legs_free() {
        let legs = three_legs();
        let scaled = stakes_for_scale(&legs, 100_000.0);
        assert!(scaled.pinned.iter().all(|&p| !p));
        // Shares split 55/35/10 over the full scale.
        assert!((scaled.stakes[0] * 5000.0 - 55_000.0).abs() < 1e-6);
        assert!((scaled.stakes[1] * 1200.0 - 35_000.0).abs() < 1e-6);
        assert!((scaled.stakes[2] * 2000.0 - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_small_share_pins_at_minimum() {
        let legs = three_legs();
        // Gold's 10% of 5700 is 570, under its 600 minimum notional.
        let scaled = stakes_for_scale(&legs, 5700.0);
        assert_eq!(scaled.pinned, vec![false, false, true]);
        assert!((scaled.stakes[2] - 0.3).abs() < 1e-12);
        // The free legs split the remaining 5100 by 55:35.
        assert!((scaled.stakes[0] - 0.623_333_333).abs() < 1e-6);
        assert!((scaled.stakes[1] - 1.652_777_778).abs() < 1e-6);
    }

    #[test]
    fn test_tiny_scale_pins_everything() {
        let legs = three_legs();
        let scaled = stakes_for_scale(&legs, 10.0);
        assert!(scaled.pinned.iter().all(|&p| p));
        assert!((scaled.stakes[0] - 0.5).abs() < 1e-12);
        assert!((scaled.stakes[1] - 1.0).abs() < 1e-12);
        assert!((scaled.stakes[2] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_total_margin_is_nondecreasing_in_scale() {
        let legs = three_legs();
        let mut last = 0.0;
        for step in 0..200 {
            let scale = 100.0 + 400.0 * f64::from(step);
            let margin = total_margin(&legs, &stakes_for_scale(&legs, scale).stakes);
            assert!(
                margin >= last - 1e-9,
                "margin fell from {last} to {margin} at scale {scale}"
            );
            last = margin;
        }
    }

    #[test]
    fn test_zero_weight_leg_rides_at_minimum() {
        let legs = vec![
            leg("A", 1.0, 1.0, 10.0, 100.0),
            leg("B", 0.0, 2.0, 5.0, 50.0),
        ];
        let scaled = stakes_for_scale(&legs, 10_000.0);
        assert!(!scaled.pinned[0]);
        assert!(scaled.pinned[1]);
        assert!((scaled.stakes[1] - 2.0).abs() < 1e-12);
    }
}
