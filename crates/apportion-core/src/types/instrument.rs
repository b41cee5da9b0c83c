//! Instrument rows as supplied by the caller.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the candidate instrument table.
///
/// Monetary fields are optional because tabular sources leave cells
/// blank; which fields must actually be present depends on the
/// allocation mode, so the row itself stays permissive and the engines
/// enforce their own required sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentInput {
    /// Identifier. Must be non-empty for the row to be considered valid.
    pub name: String,

    /// Free-text classification (e.g. `equity`, `bond`, `commodity`).
    /// Matched case-insensitively when a policy designates a class.
    #[serde(default)]
    pub asset_class: String,

    /// Unit price. Must be > 0 to be usable.
    #[serde(default)]
    pub price: Option<Decimal>,

    /// Minimum stake / lot size. Defaults to one unit in cash mode.
    #[serde(default)]
    pub min_unit: Option<Decimal>,

    /// Margin consumed at exactly `min_unit`. Margin scales linearly
    /// from this anchor: `margin_per_unit = margin_at_min / min_unit`.
    #[serde(default)]
    pub margin_at_min: Option<Decimal>,

    /// Notional exposure at exactly `min_unit`. Scales like margin.
    #[serde(default)]
    pub notional_at_min: Option<Decimal>,

    /// Target portfolio weight as a fraction in [0, 1].
    #[serde(default)]
    pub weight: Option<Decimal>,

    /// Current holding, in units. Used by the cash allocator to decide
    /// between an initial build and a top-up review.
    #[serde(default)]
    pub shares_held: Decimal,

    /// When true, monetary fields are quoted in a foreign currency and
    /// converted through the account `fx_rate` at intake.
    #[serde(default)]
    pub foreign_currency: bool,
}

impl InstrumentInput {
    /// Creates a row with just a name; everything else starts absent.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asset_class: String::new(),
            price: None,
            min_unit: None,
            margin_at_min: None,
            notional_at_min: None,
            weight: None,
            shares_held: Decimal::ZERO,
            foreign_currency: false,
        }
    }

    /// Sets the asset class.
    #[must_use]
    pub fn with_asset_class(mut self, asset_class: impl Into<String>) -> Self {
        self.asset_class = asset_class.into();
        self
    }

    /// Sets the unit price.
    #[must_use]
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Sets the minimum stake / lot size.
    #[must_use]
    pub fn with_min_unit(mut self, min_unit: Decimal) -> Self {
        self.min_unit = Some(min_unit);
        self
    }

    /// Sets the margin consumed at minimum stake.
    #[must_use]
    pub fn with_margin_at_min(mut self, margin: Decimal) -> Self {
        self.margin_at_min = Some(margin);
        self
    }

    /// Sets the notional exposure at minimum stake.
    #[must_use]
    pub fn with_notional_at_min(mut self, notional: Decimal) -> Self {
        self.notional_at_min = Some(notional);
        self
    }

    /// Sets the target weight (fraction, not percent).
    #[must_use]
    pub fn with_weight(mut self, weight: Decimal) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Sets the current holding.
    #[must_use]
    pub fn with_shares_held(mut self, shares: Decimal) -> Self {
        self.shares_held = shares;
        self
    }

    /// Marks the row as quoted in a foreign currency.
    #[must_use]
    pub fn in_foreign_currency(mut self) -> Self {
        self.foreign_currency = true;
        self
    }

    /// True when the row carries an existing position.
    #[must_use]
    pub fn has_holdings(&self) -> bool {
        self.shares_held > Decimal::ZERO
    }

    /// Case-insensitive class match.
    #[must_use]
    pub fn is_class(&self, class: &str) -> bool {
        self.asset_class.eq_ignore_ascii_case(class.trim())
    }
}
