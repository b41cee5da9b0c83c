//! CLI command implementations.

pub mod invest;
pub mod margin;

// Re-export submodules for convenience
pub use invest::InvestArgs;
pub use margin::MarginArgs;
