//! Monthly top-up review.

use rust_decimal::Decimal;

use apportion_core::CashAccount;

use super::{CashLeg, HoldingGap, Recommendation, TopUpReview};
use crate::config::GapMetric;

/// Measures every holding against its target and recommends one lot of
/// the widest affordable gap.
///
/// Ties go to the earliest row. Overweight holdings and lots that cost
/// more than the available cash are never recommended; when nothing
/// qualifies the review carries no recommendation at all.
pub(crate) fn review(account: &CashAccount, legs: &[CashLeg], metric: GapMetric) -> TopUpReview {
    let cash = account.cash_available + account.monthly_contribution;
    let invested: Decimal = legs.iter().map(|leg| leg.price * leg.held).sum();
    let portfolio_value = cash + invested;

    let holdings: Vec<HoldingGap> = legs
        .iter()
        .map(|leg| {
            let value = leg.price * leg.held;
            let target_value = portfolio_value * leg.weight;
            let gap = target_value - value;
            let gap_fraction = if target_value.is_zero() {
                Decimal::ZERO
            } else {
                gap / target_value
            };
            HoldingGap {
                name: leg.name.clone(),
                price: leg.price,
                units_held: leg.held,
                value,
                target_value,
                gap,
                gap_fraction,
            }
        })
        .collect();

    let mut best: Option<(usize, Decimal)> = None;
    for (i, gap) in holdings.iter().enumerate() {
        if gap.gap <= Decimal::ZERO {
            continue;
        }
        let leg = &legs[i];
        if leg.price * leg.lot > cash {
            continue;
        }
        let score = match metric {
            GapMetric::Relative => gap.gap_fraction,
            GapMetric::Absolute => gap.gap,
        };
        let better = match best {
            Some((_, top)) => score > top,
            None => true,
        };
        if better {
            best = Some((i, score));
        }
    }

    let recommendation = best.map(|(i, _)| {
        let leg = &legs[i];
        let cost = leg.price * leg.lot;
        Recommendation {
            name: leg.name.clone(),
            units: leg.lot,
            price: leg.price,
            cost,
            cash_after: cash - cost,
        }
    });

    TopUpReview {
        holdings,
        cash_available: cash,
        portfolio_value,
        recommendation,
    }
}
