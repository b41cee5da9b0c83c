//! # Apportion Engine
//!
//! Allocation engines for constrained portfolios: a margin-budget
//! waterfall with a single-dial alternative, and a cash allocator that
//! builds a fresh portfolio or drips a monthly contribution into an
//! existing one.
//!
//! ## Features
//!
//! - **Margin waterfall**: proportional sizing under a margin cap,
//!   pinning legs at broker minimums and bisecting the portfolio scale
//!   until the cap is spent
//! - **Single dial**: everything at minimum stake, one chosen
//!   instrument absorbs the rest of the cap
//! - **Cash build**: spend a deposit across target weights in whole
//!   lots, largest weight first
//! - **Top-up review**: find the most underweight holding and
//!   recommend one lot of it
//! - **Policy knobs**: weight rules, row handling, build order and gap
//!   metric are all configuration, not code paths
//!
//! ## Quick Start
//!
//! ```rust
//! use apportion_core::{InstrumentInput, MarginBudget};
//! use apportion_engine::config::MarginConfig;
//! use apportion_engine::margin::allocate_margin;
//! use rust_decimal_macros::dec;
//!
//! let budget = MarginBudget::new(dec!(10_000), dec!(0.4));
//! let rows = vec![
//!     InstrumentInput::new("US500")
//!         .with_asset_class("equity")
//!         .with_price(dec!(5000))
//!         .with_min_unit(dec!(0.5))
//!         .with_margin_at_min(dec!(250))
//!         .with_notional_at_min(dec!(2500))
//!         .with_weight(dec!(0.55)),
//!     InstrumentInput::new("Bonds")
//!         .with_asset_class("bond")
//!         .with_price(dec!(1200))
//!         .with_min_unit(dec!(1))
//!         .with_margin_at_min(dec!(120))
//!         .with_notional_at_min(dec!(1200))
//!         .with_weight(dec!(0.45)),
//! ];
//!
//! let allocation = allocate_margin(&budget, &rows, &MarginConfig::default())?;
//! assert!(allocation.total_margin <= allocation.target_margin_cap + 1e-6);
//! # Ok::<(), apportion_core::AllocationError>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod cash;
pub mod config;
pub mod margin;

pub use cash::{
    allocate_cash, BuildPlan, CashOutcome, HoldingGap, Purchase, Recommendation, TopUpReview,
};
pub use config::{
    BuildOrder, DcaConfig, GapMetric, MarginConfig, MarginPolicy, SearchSettings,
    DEFAULT_DIAL_CLASS, DEFAULT_TOLERANCE,
};
pub use margin::{allocate_margin, MarginAllocation, PositionSize};

/// Prelude module for convenient imports.
///
/// ```rust
/// use apportion_engine::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cash::{
        allocate_cash, BuildPlan, CashOutcome, HoldingGap, Purchase, Recommendation, TopUpReview,
    };
    pub use crate::config::{
        BuildOrder, DcaConfig, GapMetric, MarginConfig, MarginPolicy, SearchSettings,
    };
    pub use crate::margin::{allocate_margin, MarginAllocation, PositionSize};
    pub use apportion_core::prelude::*;
}
