//! Cash allocation for unleveraged accounts.
//!
//! One entry point covers two situations. An empty account gets a
//! full build plan that spends the deposit across the target weights;
//! an account already holding shares gets a drip review that names the
//! single most underweight instrument worth one more lot. All cash
//! arithmetic stays in [`Decimal`].

mod build;
mod topup;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use apportion_core::validation::{check_weight_total, resolve_fx};
use apportion_core::{
    AllocationError, AllocationResult, CashAccount, InstrumentInput, RowPolicy, WeightRule,
};

use crate::config::DcaConfig;

/// One instrument purchase in a build plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    /// Instrument name.
    pub name: String,

    /// Units bought, always a whole multiple of the lot size.
    pub units: Decimal,

    /// Unit price after any FX conversion.
    pub price: Decimal,

    /// Cash spent on this purchase.
    pub cost: Decimal,
}

/// The result of spending a fresh deposit across the target weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildPlan {
    /// Purchases in execution order. Instruments priced out of the
    /// deposit do not appear.
    pub purchases: Vec<Purchase>,

    /// Cash left after every purchase.
    pub cash_remaining: Decimal,

    /// The deposit the plan was built against.
    pub portfolio_value: Decimal,
}

/// How far one holding sits from its target value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingGap {
    /// Instrument name.
    pub name: String,

    /// Unit price after any FX conversion.
    pub price: Decimal,

    /// Units currently held.
    pub units_held: Decimal,

    /// Market value of the holding.
    pub value: Decimal,

    /// Target value at the instrument's weight of total portfolio value.
    pub target_value: Decimal,

    /// Target value minus current value. Positive means underweight.
    pub gap: Decimal,

    /// Gap as a fraction of target value; zero when the target is zero.
    pub gap_fraction: Decimal,
}

/// The single purchase a top-up review recommends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Instrument name.
    pub name: String,

    /// Units to buy: one lot.
    pub units: Decimal,

    /// Unit price after any FX conversion.
    pub price: Decimal,

    /// Cash the purchase consumes.
    pub cost: Decimal,

    /// Cash left if the purchase executes.
    pub cash_after: Decimal,
}

/// A drip review of an account that already holds shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopUpReview {
    /// Every instrument's distance from target, in intake order.
    pub holdings: Vec<HoldingGap>,

    /// Spendable cash: the account's cash plus the monthly contribution.
    pub cash_available: Decimal,

    /// Cash plus the market value of all holdings.
    pub portfolio_value: Decimal,

    /// The one purchase worth making, if any gap is affordable.
    pub recommendation: Option<Recommendation>,
}

/// What the cash allocator decided to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CashOutcome {
    /// No shares held anywhere: spend the deposit.
    Build(BuildPlan),

    /// Shares exist: review the gaps and drip into the widest.
    TopUp(TopUpReview),
}

/// A validated, FX-converted cash row.
#[derive(Debug, Clone)]
pub(crate) struct CashLeg {
    pub(crate) name: String,
    pub(crate) price: Decimal,
    pub(crate) weight: Decimal,
    pub(crate) lot: Decimal,
    pub(crate) held: Decimal,
}

/// Allocates cash across the candidate rows.
///
/// Validates the account, reads rows under the configured [`RowPolicy`],
/// applies the weight rule, and picks the mode: a [`BuildPlan`] when no
/// row holds any shares, a [`TopUpReview`] otherwise.
///
/// # Example
///
/// ```rust
/// use apportion_core::{CashAccount, InstrumentInput};
/// use apportion_engine::cash::{allocate_cash, CashOutcome};
/// use apportion_engine::config::DcaConfig;
/// use rust_decimal_macros::dec;
///
/// let account = CashAccount::new(dec!(1000));
/// let rows = vec![
///     InstrumentInput::new("Global").with_price(dec!(100)).with_weight(dec!(0.6)),
///     InstrumentInput::new("Bonds").with_price(dec!(50)).with_weight(dec!(0.4)),
/// ];
///
/// match allocate_cash(&account, &rows, &DcaConfig::default()).unwrap() {
///     CashOutcome::Build(plan) => assert_eq!(plan.cash_remaining, dec!(0)),
///     CashOutcome::TopUp(_) => unreachable!("no shares held"),
/// }
/// ```
pub fn allocate_cash(
    account: &CashAccount,
    rows: &[InstrumentInput],
    config: &DcaConfig,
) -> AllocationResult<CashOutcome> {
    account.validate()?;
    let (mut legs, weight_total) = intake(account, rows, config.rows)?;
    if legs.is_empty() {
        return Err(AllocationError::NoValidInstruments);
    }
    check_weight_total(config.weight_rule, weight_total)?;
    if config.weight_rule == WeightRule::PositiveTotal {
        // Free-form weights act as shares of their own total.
        for leg in &mut legs {
            leg.weight /= weight_total;
        }
    }

    if legs.iter().all(|leg| leg.held.is_zero()) {
        Ok(CashOutcome::Build(build::build_plan(
            account,
            legs,
            config.build_order,
        )))
    } else {
        Ok(CashOutcome::TopUp(topup::review(
            account,
            &legs,
            config.gap_metric,
        )))
    }
}

fn intake(
    account: &CashAccount,
    rows: &[InstrumentInput],
    policy: RowPolicy,
) -> AllocationResult<(Vec<CashLeg>, Decimal)> {
    let mut legs = Vec::with_capacity(rows.len());
    let mut weight_total = Decimal::ZERO;
    for (index, row) in rows.iter().enumerate() {
        match leg_from_row(account, row, index) {
            Ok(leg) => {
                weight_total += leg.weight;
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
    account: &CashAccount,
    row: &InstrumentInput,
    index: usize,
) -> AllocationResult<CashLeg> {
    let name = row.name.trim();
    let label = if name.is_empty() {
        format!("row {}", index + 1)
    } else {
        name.to_string()
    };
    if name.is_empty() {
        return Err(AllocationError::missing_field(label, "name"));
    }

    let fx = resolve_fx(account.fx_rate, row)?;
    let price = match row.price {
        Some(price) if price > Decimal::ZERO => price * fx,
        _ => return Err(AllocationError::missing_field(label, "price")),
    };
    let weight = match row.weight {
        Some(weight) if weight >= Decimal::ZERO => weight,
        _ => return Err(AllocationError::missing_field(label, "weight")),
    };
    let lot = match row.min_unit {
        None => Decimal::ONE,
        Some(lot) if lot > Decimal::ZERO => lot,
        Some(_) => return Err(AllocationError::missing_field(label, "min_unit")),
    };
    if row.shares_held < Decimal::ZERO {
        return Err(AllocationError::missing_field(label, "shares_held"));
    }

    Ok(CashLeg {
        name: name.to_string(),
        price,
        weight,
        lot,
        held: row.shares_held,
    })
}
