//! # Apportion Core
//!
//! Domain model and validation for the Apportion allocation calculators.
//!
//! This crate holds the vocabulary the allocators share:
//!
//! - **Instrument rows**: [`InstrumentInput`], permissive by design so
//!   tabular sources with blank cells can be represented as-is
//! - **Account contexts**: [`MarginBudget`] and [`CashAccount`]
//! - **Policies**: [`WeightRule`] and [`RowPolicy`]
//! - **Validation**: weight-total checks, FX resolution, cell parsing
//! - **Errors**: [`AllocationError`], one variant per way a run can be
//!   refused
//!
//! ## Design Philosophy
//!
//! - **Pure data**: no allocation logic lives here
//! - **Mode-agnostic rows**: which fields are required is decided by the
//!   engine consuming the row, not by the row itself
//! - **Decimal money**: monetary inputs never pass through `f64`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod types;
pub mod validation;

pub use error::{AllocationError, AllocationResult};
pub use types::{CashAccount, InstrumentInput, MarginBudget, RowPolicy, WeightRule};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{AllocationError, AllocationResult};
    pub use crate::types::{CashAccount, InstrumentInput, MarginBudget, RowPolicy, WeightRule};
    pub use crate::validation::{
        check_weight_total, parse_field, resolve_fx, WEIGHT_SUM_TOLERANCE,
    };

    // Re-export commonly used types from dependencies
    pub use rust_decimal::Decimal;
    pub use rust_decimal_macros::dec;
}
