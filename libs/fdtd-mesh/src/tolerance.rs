//! # Tolerance
//!
//! Tolerance-aware comparisons for mesh line positions. Every place the
//! mesher compares two positions goes through one [`Tolerance`] so that
//! deduplication, boundary matching and fixed-line lookups agree.

use config::constants::{POSITION_EPSILON, SPACING_RTOL};
use serde::{Deserialize, Serialize};

/// Position comparison with a single configurable epsilon.
///
/// Two values are equal when `|a - b| <= epsilon * max(1, |a|, |b|)`.
///
/// # Example
///
/// ```rust
/// use fdtd_mesh::Tolerance;
///
/// let tol = Tolerance::default();
/// assert!(tol.eq(1.0, 1.0 + 1e-12));
/// assert!(tol.lt(1.0, 1.1));
/// assert!(!tol.lt(1.0, 1.0 + 1e-12));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Relative epsilon, absolute below magnitude one.
    pub epsilon: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            epsilon: POSITION_EPSILON,
        }
    }
}

impl Tolerance {
    /// Creates a tolerance with the given epsilon.
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    #[inline]
    fn scale(&self, a: f64, b: f64) -> f64 {
        self.epsilon * 1f64.max(a.abs()).max(b.abs())
    }

    /// `a == b` within tolerance.
    #[inline]
    pub fn eq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.scale(a, b)
    }

    /// `a < b` and not equal within tolerance.
    #[inline]
    pub fn lt(&self, a: f64, b: f64) -> bool {
        a < b && !self.eq(a, b)
    }

    /// `a > b` and not equal within tolerance.
    #[inline]
    pub fn gt(&self, a: f64, b: f64) -> bool {
        a > b && !self.eq(a, b)
    }

    /// `a <= b` within tolerance.
    #[inline]
    pub fn le(&self, a: f64, b: f64) -> bool {
        a < b || self.eq(a, b)
    }

    /// `a >= b` within tolerance.
    #[inline]
    pub fn ge(&self, a: f64, b: f64) -> bool {
        a > b || self.eq(a, b)
    }

    /// `lower <= value <= upper` within tolerance.
    #[inline]
    pub fn within(&self, value: f64, lower: f64, upper: f64) -> bool {
        self.ge(value, lower) && self.le(value, upper)
    }

    /// True when any element of `values` equals `value` within tolerance.
    pub fn contains(&self, values: &[f64], value: f64) -> bool {
        values.iter().any(|&v| self.eq(v, value))
    }

    /// Relative closeness used for spacings and extents.
    ///
    /// Uses [`SPACING_RTOL`] relative to `b`, with no absolute floor.
    #[inline]
    pub fn close(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= SPACING_RTOL * b.abs()
    }

    /// Ceiling that ignores float noise just above an integer.
    ///
    /// `ceil(4.0000000000001)` is 5 but the value is meant to be 4.
    #[inline]
    pub fn ceil(&self, value: f64) -> f64 {
        let rounded = value.round();
        if self.eq(value, rounded) {
            rounded
        } else {
            value.ceil()
        }
    }
}
