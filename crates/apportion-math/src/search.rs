//! Monotone-predicate search primitives.
//!
//! Budget allocation needs the largest scale at which a feasibility
//! predicate still holds, not the root of a continuous function. These
//! helpers implement that supremum search: expand an upper bound by
//! doubling, then bisect a fixed number of times.

use crate::error::{MathError, MathResult};

/// Default number of bisection iterations.
pub const DEFAULT_BISECT_ITERATIONS: u32 = 80;

/// Default doubling allowance when expanding an upper bound.
pub const DEFAULT_MAX_DOUBLINGS: u32 = 60;

/// Bisects for the supremum of a monotone predicate.
///
/// `predicate` must hold at `lo`, fail at `hi`, and switch exactly once
/// in between. Runs exactly `iterations` halvings and returns the
/// greatest tested point where the predicate held (`lo` itself when no
/// midpoint passes). The iteration count, not a tolerance, sets the
/// precision: each iteration halves the bracket.
///
/// # Example
///
/// ```rust
/// use apportion_math::search::bisect_monotone;
///
/// let boundary = bisect_monotone(|x| x * x <= 2.0, 1.0, 2.0, 60);
/// assert!((boundary - std::f64::consts::SQRT_2).abs() < 1e-12);
/// ```
pub fn bisect_monotone<P>(predicate: P, lo: f64, hi: f64, iterations: u32) -> f64
where
    P: Fn(f64) -> bool,
{
    let mut lo = lo;
    let mut hi = hi;
    for _ in 0..iterations {
        let mid = 0.5 * (lo + hi);
        if predicate(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Expands an upper bound by doubling until `predicate` fails.
///
/// Checks `start` first, then doubles up to `max_doublings` times,
/// returning the first point where the predicate fails. That point is a
/// valid upper end for [`bisect_monotone`]. Fails with
/// [`MathError::BracketNotFound`] when the allowance is exhausted with
/// the predicate still holding.
pub fn find_upper_bound<P>(predicate: P, start: f64, max_doublings: u32) -> MathResult<f64>
where
    P: Fn(f64) -> bool,
{
    let mut hi = start;
    if !predicate(hi) {
        return Ok(hi);
    }
    for _ in 0..max_doublings {
        hi *= 2.0;
        if !predicate(hi) {
            return Ok(hi);
        }
    }
    Err(MathError::BracketNotFound {
        start,
        doublings: max_doublings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_bisect_finds_sqrt_2() {
        let boundary = bisect_monotone(|x| x * x <= 2.0, 1.0, 2.0, DEFAULT_BISECT_ITERATIONS);
        assert_relative_eq!(boundary, std::f64::consts::SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_bisect_returns_lo_when_nothing_passes() {
        let boundary = bisect_monotone(|x| x <= 1.0, 1.0, 2.0, 40);
        assert_eq!(boundary, 1.0);
    }

    #[test]
    fn test_bisect_approaches_hi_when_everything_passes() {
        let boundary = bisect_monotone(|_| true, 1.0, 2.0, 40);
        assert_relative_eq!(boundary, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_find_upper_bound_doubles_past_boundary() {
        let hi = find_upper_bound(|x| x <= 100.0, 1.0, DEFAULT_MAX_DOUBLINGS).unwrap();
        assert_eq!(hi, 128.0);
    }

    #[test]
    fn test_find_upper_bound_start_already_fails() {
        let hi = find_upper_bound(|x| x <= 0.5, 1.0, DEFAULT_MAX_DOUBLINGS).unwrap();
        assert_eq!(hi, 1.0);
    }

    #[test]
    fn test_find_upper_bound_exhausts_allowance() {
        let err = find_upper_bound(|_| true, 1.0, 10).unwrap_err();
        assert_eq!(
            err,
            MathError::BracketNotFound {
                start: 1.0,
                doublings: 10,
            }
        );
    }

    proptest! {
        #[test]
        fn prop_bisect_recovers_threshold(boundary in 1.0f64..1_000_000.0) {
            let found = bisect_monotone(
                |x| x <= boundary,
                0.0,
                2_000_000.0,
                DEFAULT_BISECT_ITERATIONS,
            );
            prop_assert!((found - boundary).abs() <= 1e-6 * boundary.max(1.0));
            prop_assert!(found <= boundary);
        }

        #[test]
        fn prop_upper_bound_brackets_threshold(boundary in 1.0f64..1e12) {
            let hi = find_upper_bound(|x| x <= boundary, 1.0, DEFAULT_MAX_DOUBLINGS).unwrap();
            prop_assert!(hi > boundary);
            prop_assert!(hi <= boundary * 2.0);
        }
    }
}
