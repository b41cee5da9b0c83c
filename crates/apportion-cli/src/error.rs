//! CLI error types.

use apportion_core::AllocationError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// A cell in the portfolio table failed to parse.
    #[error("Line {line}: {source}")]
    BadCell {
        /// 1-based line in the CSV file, counting the header.
        line: usize,
        /// The underlying parse failure.
        source: AllocationError,
    },

    /// The foreign-currency column held something other than a flag.
    #[error("Line {line}: unrecognized yes/no value '{text}' for foreign_currency")]
    BadFlag {
        /// 1-based line in the CSV file, counting the header.
        line: usize,
        /// The offending cell text.
        text: String,
    },

    /// CSV reading failed.
    #[error("Failed to read the portfolio table: {0}")]
    Csv(#[from] csv::Error),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
