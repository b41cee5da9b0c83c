//! Core types for the allocation calculators.

mod account;
mod instrument;
mod policy;

pub use account::{CashAccount, MarginBudget};
pub use instrument::InstrumentInput;
pub use policy::{RowPolicy, WeightRule};
