//! Blank-tolerant numeric parsing for tabular input.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{MathError, MathResult};

/// Parses a numeric cell where blank means absent.
///
/// Leading and trailing whitespace is ignored. An empty or all-whitespace
/// string is `Ok(None)`. Anything else must parse as a decimal number,
/// with scientific notation accepted as a fallback.
///
/// # Example
///
/// ```rust
/// use apportion_math::parse::parse_optional_decimal;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_optional_decimal("  ").unwrap(), None);
/// assert_eq!(
///     parse_optional_decimal("2.5").unwrap(),
///     Some(Decimal::new(25, 1))
/// );
/// assert!(parse_optional_decimal("n/a").is_err());
/// ```
pub fn parse_optional_decimal(text: &str) -> MathResult<Option<Decimal>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map(Some)
        .map_err(|_| MathError::invalid_number(trimmed))
}
