//! Account contexts for the two allocation families.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AllocationError, AllocationResult};

/// The margin side of an account: balance and how much of it the
/// allocator may commit as margin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginBudget {
    /// Account balance in the base currency.
    pub balance: Decimal,

    /// Fraction of the balance to commit as margin, strictly between
    /// 0 and 1. The cap is `balance * target_margin_fraction`.
    pub target_margin_fraction: Decimal,

    /// Rate applied to rows flagged `foreign_currency`.
    /// 1 unit of the foreign currency = `fx_rate` units of base.
    #[serde(default)]
    pub fx_rate: Option<Decimal>,
}

impl MarginBudget {
    /// Creates a margin budget.
    #[must_use]
    pub fn new(balance: Decimal, target_margin_fraction: Decimal) -> Self {
        Self {
            balance,
            target_margin_fraction,
            fx_rate: None,
        }
    }

    /// Sets the FX rate for foreign-currency rows.
    #[must_use]
    pub fn with_fx_rate(mut self, rate: Decimal) -> Self {
        self.fx_rate = Some(rate);
        self
    }

    /// The margin cap the allocators aim for.
    #[must_use]
    pub fn cap(&self) -> Decimal {
        self.balance * self.target_margin_fraction
    }

    /// Validates the account fields.
    pub fn validate(&self) -> AllocationResult<()> {
        if self.balance <= Decimal::ZERO {
            return Err(AllocationError::invalid_account(
                "balance",
                format!("must be positive, got {}", self.balance),
            ));
        }
        if self.target_margin_fraction <= Decimal::ZERO
            || self.target_margin_fraction >= Decimal::ONE
        {
            return Err(AllocationError::invalid_account(
                "target_margin_fraction",
                format!(
                    "must be strictly between 0 and 1, got {}",
                    self.target_margin_fraction
                ),
            ));
        }
        validate_fx_rate(self.fx_rate)
    }
}

/// The cash side of an account: what is available to invest now and
/// what arrives each period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashAccount {
    /// Cash available before any periodic contribution.
    pub cash_available: Decimal,

    /// Periodic contribution added in a top-up round.
    #[serde(default)]
    pub monthly_contribution: Decimal,

    /// Rate applied to rows flagged `foreign_currency`.
    #[serde(default)]
    pub fx_rate: Option<Decimal>,
}

impl CashAccount {
    /// Creates a cash account with no periodic contribution.
    #[must_use]
    pub fn new(cash_available: Decimal) -> Self {
        Self {
            cash_available,
            monthly_contribution: Decimal::ZERO,
            fx_rate: None,
        }
    }

    /// Sets the periodic contribution.
    #[must_use]
    pub fn with_monthly_contribution(mut self, contribution: Decimal) -> Self {
        self.monthly_contribution = contribution;
        self
    }

    /// Sets the FX rate for foreign-currency rows.
    #[must_use]
    pub fn with_fx_rate(mut self, rate: Decimal) -> Self {
        self.fx_rate = Some(rate);
        self
    }

    /// Validates the account fields.
    pub fn validate(&self) -> AllocationResult<()> {
        if self.cash_available < Decimal::ZERO {
            return Err(AllocationError::invalid_account(
                "cash_available",
                format!("must not be negative, got {}", self.cash_available),
            ));
        }
        if self.monthly_contribution < Decimal::ZERO {
            return Err(AllocationError::invalid_account(
                "monthly_contribution",
                format!("must not be negative, got {}", self.monthly_contribution),
            ));
        }
        validate_fx_rate(self.fx_rate)
    }
}

fn validate_fx_rate(fx_rate: Option<Decimal>) -> AllocationResult<()> {
    match fx_rate {
        Some(rate) if rate <= Decimal::ZERO => Err(AllocationError::invalid_account(
            "fx_rate",
            format!("must be positive, got {rate}"),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_margin_cap() {
        let budget = MarginBudget::new(dec!(10000), dec!(0.4));
        assert_eq!(budget.cap(), dec!(4000));
    }

    #[test]
    fn test_margin_validate_bounds() {
        assert!(MarginBudget::new(dec!(10000), dec!(0.4)).validate().is_ok());

        let zero_balance = MarginBudget::new(Decimal::ZERO, dec!(0.4));
        assert!(matches!(
            zero_balance.validate(),
            Err(AllocationError::InvalidAccount { .. })
        ));

        // The fraction bounds are exclusive on both ends.
        for fraction in [dec!(0), dec!(1), dec!(1.2), dec!(-0.1)] {
            let budget = MarginBudget::new(dec!(10000), fraction);
            assert!(budget.validate().is_err(), "fraction {fraction} accepted");
        }
    }

    #[test]
    fn test_cash_validate() {
        assert!(CashAccount::new(dec!(1000)).validate().is_ok());
        assert!(CashAccount::new(Decimal::ZERO).validate().is_ok());

        let negative = CashAccount::new(dec!(-1));
        assert!(negative.validate().is_err());

        let negative_monthly = CashAccount::new(dec!(100)).with_monthly_contribution(dec!(-200));
        assert!(negative_monthly.validate().is_err());
    }

    #[test]
    fn test_fx_rate_must_be_positive() {
        let budget = MarginBudget::new(dec!(10000), dec!(0.4)).with_fx_rate(Decimal::ZERO);
        assert!(budget.validate().is_err());

        let account = CashAccount::new(dec!(1000)).with_fx_rate(dec!(1.25));
        assert!(account.validate().is_ok());
    }

    #[test]
    fn test_serde_round_trip() {
        let budget = MarginBudget::new(dec!(25000), dec!(0.35)).with_fx_rate(dec!(0.79));
        let json = serde_json::to_string(&budget).unwrap();
        let parsed: MarginBudget = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, budget);
    }
}
