//! Property-based tests for allocation invariants.
//!
//! These tests verify the promises the allocators make regardless of
//! the table they are fed:
//! - No stake ever lands below its broker minimum
//! - Total margin never materially exceeds the cap
//! - Achieved weights sum to 100%
//! - Feasibility is decided by the minimum-margin sum alone
//! - A build plan never spends cash it does not have

use approx::assert_relative_eq;
use apportion_engine::prelude::*;
use proptest::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

/// Generates a margin table with N instruments of varying minimums.
fn generate_margin_rows(n: usize, seed: u64) -> Vec<InstrumentInput> {
    let units = [dec!(0.1), dec!(0.25), dec!(0.5), dec!(1), dec!(2)];
    let mut rows = Vec::with_capacity(n);
    for i in 0..n {
        // Use deterministic pseudo-random values based on seed and index
        let hash = simple_hash(seed, i as u64);

        let price = Decimal::new(5_000 + (hash % 1_000_000) as i64, 2);
        let min_unit = units[hash as usize % units.len()];
        let margin_rate = Decimal::new(5 + (hash % 20) as i64, 2);
        let notional_at_min = price * min_unit;
        let margin_at_min = notional_at_min * margin_rate;

        rows.push(
            InstrumentInput::new(format!("I{i}"))
                .with_asset_class("mixed")
                .with_price(price)
                .with_min_unit(min_unit)
                .with_margin_at_min(margin_at_min)
                .with_notional_at_min(notional_at_min)
                .with_weight(Decimal::from(1 + (hash % 100) as i64)),
        );
    }
    rows
}

fn generate_budget(seed: u64) -> MarginBudget {
    let hash = simple_hash(seed, 999);
    MarginBudget::new(
        Decimal::from(10_000 + (hash % 90_000) as i64),
        Decimal::new(10 + (hash % 40) as i64, 2),
    )
}

/// Simple deterministic hash for test data generation.
fn simple_hash(seed: u64, i: u64) -> u64 {
    let mut x = seed.wrapping_add(i).wrapping_mul(0x517cc1b727220a95);
    x ^= x >> 32;
    x = x.wrapping_mul(0x517cc1b727220a95);
    x ^= x >> 32;
    x
}

fn lenient_waterfall() -> MarginConfig {
    MarginConfig::waterfall(WeightRule::PositiveTotal)
}

// =============================================================================
// PROPERTY: STAKES RESPECT MINIMUMS
// =============================================================================

#[test]
fn property_stakes_never_fall_below_minimums() {
    for seed in 0..10 {
        for size in [2, 3, 5, 8, 12] {
            let rows = generate_margin_rows(size, seed);
            let budget = generate_budget(seed);
            let Ok(allocation) = allocate_margin(&budget, &rows, &lenient_waterfall()) else {
                continue;
            };

            for (position, row) in allocation.positions.iter().zip(&rows) {
                let min_stake = row.min_unit.and_then(|u| u.to_f64()).unwrap_or(0.0);
                assert!(
                    position.stake >= min_stake - 1e-9,
                    "stake {} under minimum {} for {} (size={}, seed={})",
                    position.stake,
                    min_stake,
                    position.name,
                    size,
                    seed
                );
            }
        }
    }
}

// =============================================================================
// PROPERTY: TOTAL MARGIN RESPECTS THE CAP
// =============================================================================

#[test]
fn property_total_margin_respects_the_cap() {
    for seed in 0..10 {
        for size in [2, 3, 5, 8, 12] {
            let rows = generate_margin_rows(size, seed);
            let budget = generate_budget(seed);
            let Ok(allocation) = allocate_margin(&budget, &rows, &lenient_waterfall()) else {
                continue;
            };

            assert!(
                allocation.total_margin <= allocation.target_margin_cap + 1e-6,
                "margin {} exceeds cap {} (size={}, seed={})",
                allocation.total_margin,
                allocation.target_margin_cap,
                size,
                seed
            );
        }
    }
}

// =============================================================================
// PROPERTY: ACHIEVED WEIGHTS SUM TO 100%
// =============================================================================

#[test]
fn property_achieved_weights_sum_to_100() {
    for seed in 0..10 {
        for size in [2, 3, 5, 8, 12] {
            let rows = generate_margin_rows(size, seed);
            let budget = generate_budget(seed);
            let Ok(allocation) = allocate_margin(&budget, &rows, &lenient_waterfall()) else {
                continue;
            };

            let total: f64 = allocation
                .positions
                .iter()
                .map(|p| p.achieved_weight_pct)
                .sum();
            assert_relative_eq!(total, 100.0, epsilon = 1e-6);
        }
    }
}

// =============================================================================
// PROPERTY: FEASIBILITY IS THE MINIMUM-MARGIN SUM
// =============================================================================

#[test]
fn property_feasibility_matches_the_minimum_margin_sum() {
    for seed in 0..20 {
        for size in [2, 5, 12] {
            let rows = generate_margin_rows(size, seed);
            let budget = generate_budget(seed);

            let floor: f64 = rows
                .iter()
                .filter_map(|r| r.margin_at_min)
                .filter_map(|m| m.to_f64())
                .sum();
            let cap = budget.cap().to_f64().unwrap_or(0.0);

            let result = allocate_margin(&budget, &rows, &lenient_waterfall());
            if floor > cap {
                assert!(
                    matches!(result, Err(AllocationError::InfeasibleBudget { .. })),
                    "floor {} over cap {} must be infeasible (size={}, seed={})",
                    floor,
                    cap,
                    size,
                    seed
                );
            } else {
                assert!(
                    result.is_ok(),
                    "floor {} within cap {} must allocate (size={}, seed={}): {:?}",
                    floor,
                    cap,
                    size,
                    seed,
                    result
                );
            }
        }
    }
}

// =============================================================================
// PROPERTY: THE DIAL LANDS EXACTLY ON CAP OR FLOOR
// =============================================================================

#[test]
fn property_dial_margin_is_cap_or_minimum_floor() {
    for seed in 0..10 {
        for size in [2, 4, 7] {
            let mut rows = generate_margin_rows(size, seed);
            rows[0].asset_class = "equity".to_string();
            let budget = generate_budget(seed);

            let floor: f64 = rows
                .iter()
                .filter_map(|r| r.margin_at_min)
                .filter_map(|m| m.to_f64())
                .sum();
            let cap = budget.cap().to_f64().unwrap_or(0.0);

            let allocation =
                allocate_margin(&budget, &rows, &MarginConfig::single_dial("equity")).unwrap();
            let expected = cap.max(floor);
            assert_relative_eq!(allocation.total_margin, expected, epsilon = 1e-6);
        }
    }
}

// =============================================================================
// PROPERTY: CASH PLANS NEVER OVERSPEND
// =============================================================================

proptest! {
    #[test]
    fn prop_build_never_overspends(
        cash in 1u32..100_000,
        table in prop::collection::vec((1u32..100, 1u32..500_000), 1..12),
    ) {
        let account = CashAccount::new(Decimal::from(cash));
        let rows: Vec<InstrumentInput> = table
            .iter()
            .enumerate()
            .map(|(i, (weight, price_cents))| {
                InstrumentInput::new(format!("I{i}"))
                    .with_price(Decimal::new(i64::from(*price_cents), 2))
                    .with_weight(Decimal::from(*weight))
            })
            .collect();
        let config = DcaConfig::default().with_weight_rule(WeightRule::PositiveTotal);

        let outcome = allocate_cash(&account, &rows, &config).unwrap();
        let CashOutcome::Build(plan) = outcome else {
            panic!("fresh accounts always build");
        };

        let spent: Decimal = plan.purchases.iter().map(|p| p.cost).sum();
        prop_assert!(plan.cash_remaining >= Decimal::ZERO);
        prop_assert_eq!(spent + plan.cash_remaining, Decimal::from(cash));
    }

    #[test]
    fn prop_build_units_are_lot_multiples(
        cash in 100u32..100_000,
        table in prop::collection::vec((1u32..100, 1u32..200_000, 0usize..4), 1..8),
    ) {
        let lots = [dec!(0.1), dec!(0.5), dec!(1), dec!(5)];
        let account = CashAccount::new(Decimal::from(cash));
        let rows: Vec<InstrumentInput> = table
            .iter()
            .enumerate()
            .map(|(i, (weight, price_cents, lot))| {
                InstrumentInput::new(format!("I{i}"))
                    .with_price(Decimal::new(i64::from(*price_cents), 2))
                    .with_weight(Decimal::from(*weight))
                    .with_min_unit(lots[*lot])
            })
            .collect();
        let config = DcaConfig::default().with_weight_rule(WeightRule::PositiveTotal);

        let outcome = allocate_cash(&account, &rows, &config).unwrap();
        let CashOutcome::Build(plan) = outcome else {
            panic!("fresh accounts always build");
        };

        for purchase in &plan.purchases {
            let lot = rows
                .iter()
                .find(|r| r.name == purchase.name)
                .and_then(|r| r.min_unit)
                .unwrap();
            prop_assert_eq!(purchase.units % lot, Decimal::ZERO);
        }
    }

    #[test]
    fn prop_top_up_recommendation_is_affordable_and_underweight(
        cash in 1u32..50_000,
        monthly in 0u32..5_000,
        table in prop::collection::vec((1u32..100, 1u32..200_000, 0u32..20), 2..10),
    ) {
        prop_assume!(table.iter().any(|(_, _, held)| *held > 0));

        let account = CashAccount::new(Decimal::from(cash))
            .with_monthly_contribution(Decimal::from(monthly));
        let rows: Vec<InstrumentInput> = table
            .iter()
            .enumerate()
            .map(|(i, (weight, price_cents, held))| {
                InstrumentInput::new(format!("I{i}"))
                    .with_price(Decimal::new(i64::from(*price_cents), 2))
                    .with_weight(Decimal::from(*weight))
                    .with_shares_held(Decimal::from(*held))
            })
            .collect();
        let config = DcaConfig::default().with_weight_rule(WeightRule::PositiveTotal);

        let outcome = allocate_cash(&account, &rows, &config).unwrap();
        let CashOutcome::TopUp(review) = outcome else {
            panic!("held shares always review");
        };

        if let Some(rec) = &review.recommendation {
            prop_assert!(rec.cost <= review.cash_available);
            prop_assert_eq!(rec.cash_after, review.cash_available - rec.cost);
            let gap = review
                .holdings
                .iter()
                .find(|h| h.name == rec.name)
                .map(|h| h.gap)
                .unwrap();
            prop_assert!(gap > Decimal::ZERO);
        }
    }
}
