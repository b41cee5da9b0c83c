//! # Apportion Math
//!
//! Numeric utilities for the Apportion allocation calculators.
//!
//! This crate provides:
//!
//! - **Rounding**: Step-aligned flooring for lot and stake arithmetic
//! - **Parsing**: Blank-tolerant numeric parsing for tabular input
//! - **Search**: Monotone-predicate bisection and bracket expansion
//!
//! ## Design Philosophy
//!
//! - **Deterministic**: Fixed iteration counts, no hidden state
//! - **Numerical Stability**: Careful handling of edge cases
//! - **Generic**: Works with `f64` and `Decimal` where appropriate

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod parse;
pub mod rounding;
pub mod search;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::parse::parse_optional_decimal;
    pub use crate::rounding::{floor_to_step, floor_to_step_decimal};
    pub use crate::search::{
        bisect_monotone, find_upper_bound, DEFAULT_BISECT_ITERATIONS, DEFAULT_MAX_DOUBLINGS,
    };
}

pub use error::{MathError, MathResult};
