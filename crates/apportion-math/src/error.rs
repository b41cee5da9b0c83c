//! Error types for numeric operations.

use thiserror::Error;

/// A specialized Result type for numeric operations.
pub type MathResult<T> = Result<T, MathError>;

/// Errors that can occur during numeric operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// Text that should have held a number did not parse.
    #[error("Invalid number: '{text}'")]
    InvalidNumber {
        /// The offending text, trimmed.
        text: String,
    },

    /// Bracket expansion exhausted its doubling allowance.
    #[error("No upper bound found within {doublings} doublings from {start}")]
    BracketNotFound {
        /// Starting point of the expansion.
        start: f64,
        /// Number of doublings attempted.
        doublings: u32,
    },
}

impl MathError {
    /// Creates an invalid number error.
    #[must_use]
    pub fn invalid_number(text: impl Into<String>) -> Self {
        Self::InvalidNumber { text: text.into() }
    }
}
