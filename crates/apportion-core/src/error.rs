//! Error types for allocation.
//!
//! Every way an allocation run can be refused is a variant here, so a
//! caller can tell a bad input apart from an unreachable budget target.

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for allocation operations.
pub type AllocationResult<T> = Result<T, AllocationError>;

/// Errors that can occur during allocation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    /// A numeric cell did not parse.
    #[error("Invalid number '{text}' for {field}")]
    Parse {
        /// The field the cell belongs to.
        field: String,
        /// The offending text, trimmed.
        text: String,
    },

    /// A required per-instrument field is absent or fails its bound.
    #[error("Missing or invalid {field} for '{row}'")]
    MissingField {
        /// The instrument name (or positional label when unnamed).
        row: String,
        /// The field that failed.
        field: String,
    },

    /// Account-level validation failure.
    #[error("Invalid account: {field} {reason}")]
    InvalidAccount {
        /// The account field that failed.
        field: String,
        /// Why it failed.
        reason: String,
    },

    /// Nothing left to allocate after row filtering.
    #[error("No valid instruments to allocate")]
    NoValidInstruments,

    /// Weight set failed validation.
    #[error("Invalid weights: total {total} ({requirement})")]
    WeightSum {
        /// The observed weight total.
        total: Decimal,
        /// What the active rule required.
        requirement: String,
    },

    /// A policy needed exactly one instrument in a designated class.
    #[error("Expected exactly one '{class}' instrument, found {matches}")]
    AmbiguousDialInstrument {
        /// The designated class.
        class: String,
        /// How many rows matched it.
        matches: usize,
    },

    /// Minimum stakes alone exceed the margin cap.
    #[error(
        "Infeasible budget: minimum stakes need {required:.2} margin \
         but the cap is {cap:.2} (short {shortfall:.2})"
    )]
    InfeasibleBudget {
        /// Margin consumed with every instrument at minimum stake.
        required: f64,
        /// The margin cap.
        cap: f64,
        /// How much the cap falls short.
        shortfall: f64,
    },

    /// The margin search could not bracket the cap.
    #[error("Margin never reaches the cap: gave up after {doublings} doublings (scale {last_scale:.3e})")]
    UnboundedSearch {
        /// Doublings attempted while expanding the bracket.
        doublings: u32,
        /// The last scale probed.
        last_scale: f64,
    },
}

impl AllocationError {
    /// Creates a parse error.
    #[must_use]
    pub fn parse(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Parse {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Creates a missing field error.
    #[must_use]
    pub fn missing_field(row: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            row: row.into(),
            field: field.into(),
        }
    }

    /// Creates an invalid account error.
    #[must_use]
    pub fn invalid_account(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAccount {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a weight sum error.
    #[must_use]
    pub fn weight_sum(total: Decimal, requirement: impl Into<String>) -> Self {
        Self::WeightSum {
            total,
            requirement: requirement.into(),
        }
    }

    /// Creates an infeasible budget error from the two sides of the check.
    #[must_use]
    pub fn infeasible_budget(required: f64, cap: f64) -> Self {
        Self::InfeasibleBudget {
            required,
            cap,
            shortfall: required - cap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_display() {
        let err = AllocationError::parse("price", "12x");
        assert_eq!(err.to_string(), "Invalid number '12x' for price");

        let err = AllocationError::missing_field("Gold", "margin_at_min");
        assert!(err.to_string().contains("Gold"));
        assert!(err.to_string().contains("margin_at_min"));

        let err = AllocationError::weight_sum(dec!(0.95), "must sum to 1.0 within 0.001");
        assert!(err.to_string().contains("0.95"));
    }

    #[test]
    fn test_infeasible_budget_reports_shortfall() {
        let err = AllocationError::infeasible_budget(45.0, 40.0);
        assert_eq!(
            err,
            AllocationError::InfeasibleBudget {
                required: 45.0,
                cap: 40.0,
                shortfall: 5.0,
            }
        );
        assert!(err.to_string().contains("short 5.00"));
    }

    #[test]
    fn test_dial_error_display() {
        let err = AllocationError::AmbiguousDialInstrument {
            class: "equity".to_string(),
            matches: 0,
        };
        assert_eq!(
            err.to_string(),
            "Expected exactly one 'equity' instrument, found 0"
        );
    }
}
