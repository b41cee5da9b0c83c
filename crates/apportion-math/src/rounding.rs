//! Step-aligned rounding.

use rust_decimal::Decimal;

/// Rounds `x` down to the nearest multiple of `step`.
///
/// A non-positive `step` disables alignment and returns `x` unchanged.
/// Negative inputs floor away from zero, matching `f64::floor`.
///
/// # Example
///
/// ```rust
/// use apportion_math::rounding::floor_to_step;
///
/// assert_eq!(floor_to_step(7.8, 2.0), 6.0);
/// assert_eq!(floor_to_step(7.8, 0.0), 7.8);
/// ```
pub fn floor_to_step(x: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return x;
    }
    (x / step).floor() * step
}

/// Exact `Decimal` twin of [`floor_to_step`].
///
/// Used where cash accounting must not pick up binary floating-point
/// noise (lot counts, whole-unit purchase sizing).
pub fn floor_to_step_decimal(x: Decimal, step: Decimal) -> Decimal {
    if step <= Decimal::ZERO {
        return x;
    }
    (x / step).floor() * step
}
