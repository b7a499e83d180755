//! # Geometric Series Solver
//!
//! Pure numeric routines behind graded meshing. A graded run of cells starts
//! from a spacing `s` and grows by a constant `factor` per cell, so the
//! distance covered by `count` lines is
//!
//! ```text
//! s * (factor + factor^2 + ... + factor^(count - 1))
//! ```
//!
//! The mesher needs this relation solved in every direction: the factor for
//! a term count, the term count for a factor, and the point where two runs
//! grown from opposite ends meet.
//!
//! ## Example
//!
//! ```rust
//! use fdtd_mesh::series::{factor_for_term_count, series_sum};
//!
//! let factor = factor_for_term_count(6, 0.1, 2.0).unwrap();
//! assert!((series_sum(factor, 6, 0.1) - 2.0).abs() < 1e-9);
//! ```

mod root;


pub(crate) use root::brent;

use crate::error::{MeshError, MeshResult};
use config::constants::{MAX_SERIES_TERMS, SERIES_FACTOR_SEED};

/// Factor span below which the closed form is replaced by `spacing * terms`.
const UNIT_FACTOR_EPSILON: f64 = 1e-15;

/// Sum of a geometric series of spacings.
///
/// # Arguments
///
/// * `factor` - Ratio between successive spacings
/// * `count` - Number of lines; the series has `count - 1` terms
/// * `spacing` - Base spacing; the first term is `spacing * factor`
///
/// # Returns
///
/// `spacing * sum(factor^k, k = 1..count-1)`, zero for fewer than two lines.
pub fn series_sum(factor: f64, count: usize, spacing: f64) -> f64 {
    if count < 2 {
        return 0.0;
    }
    let terms = (count - 1) as f64;
    let delta = factor - 1.0;

    if delta.abs() < UNIT_FACTOR_EPSILON {
        return spacing * terms;
    }
    if factor <= 0.0 {
        return spacing * (1..count).map(|k| factor.powi(k as i32)).sum::<f64>();
    }

    // factor^terms - 1 without cancellation near factor == 1
    let growth = (terms * delta.ln_1p()).exp_m1();
    spacing * factor * growth / delta
}

/// Root-finds the factor such that `count` lines starting at
/// `smaller_spacing` span exactly `distance`.
///
/// The returned factor is the unique positive root and may be below one
/// when `distance` is short for the requested count.
///
/// # Errors
///
/// [`MeshError::GeometricSeries`] for fewer than two lines, non-positive
/// spacing or distance, or when no bracket can be found.
pub fn factor_for_term_count(count: usize, smaller_spacing: f64, distance: f64) -> MeshResult<f64> {
    if count < 2 {
        return Err(MeshError::series(format!(
            "a series needs at least two lines, got {count}"
        )));
    }
    if !(smaller_spacing > 0.0 && distance > 0.0) || !distance.is_finite() {
        return Err(MeshError::series(format!(
            "invalid series target: spacing {smaller_spacing}, distance {distance}"
        )));
    }

    let residual = |factor: f64| Ok(series_sum(factor, count, smaller_spacing) - distance);

    // series_sum is increasing in factor on (0, inf) and zero at zero
    let mut lower = 0.0;
    let mut upper = SERIES_FACTOR_SEED;
    while series_sum(upper, count, smaller_spacing) < distance {
        lower = upper;
        upper *= 2.0;
        if !upper.is_finite() {
            return Err(MeshError::series(format!(
                "no factor reaches distance {distance} with {count} lines of spacing {smaller_spacing}"
            )));
        }
    }

    brent(residual, lower, upper)
}

/// Upper bound on the factor of a run between two spacings.
///
/// The run must not grow faster than `max_factor`, nor overshoot the
/// boundary spacing `ratio` before its last term.
pub fn factor_upper_bound(count: usize, ratio: f64, max_factor: f64) -> f64 {
    if count < 2 {
        return max_factor;
    }
    max_factor.min(ratio.powf(1.0 / (count - 1) as f64))
}

/// Term count for a target factor, with the factor re-solved so the series
/// sums exactly to `distance`.
///
/// The count is estimated from the closed-form sum and rounded up, so the
/// exact factor never exceeds `factor`. If the exact factor falls below one
/// the count is reduced until it no longer does.
///
/// # Returns
///
/// `(adjusted_factor, count)`. A distance shorter than one spacing yields
/// `(1.0, 1)`: a single line, no growth.
///
/// # Errors
///
/// [`MeshError::GeometricSeries`] when `factor <= 1`, the estimate exceeds
/// [`MAX_SERIES_TERMS`], or the count reaches zero.
pub fn term_count_for_factor(factor: f64, spacing: f64, distance: f64) -> MeshResult<(f64, usize)> {
    if !(factor > 1.0) {
        return Err(MeshError::series(format!(
            "growth factor must exceed one, got {factor}"
        )));
    }
    if !(spacing > 0.0) {
        return Err(MeshError::series(format!(
            "spacing must be positive, got {spacing}"
        )));
    }
    if distance <= 0.0 {
        return Ok((1.0, 1));
    }

    let estimate = ((1.0 - (distance / spacing + 1.0) * (1.0 - factor)).ln() / factor.ln() + 1.0).ceil();
    if !estimate.is_finite() || estimate > MAX_SERIES_TERMS as f64 {
        return Err(MeshError::series(format!(
            "term estimate {estimate} for spacing {spacing} over {distance} is out of range"
        )));
    }

    let mut count = estimate as usize;
    loop {
        match count {
            0 => {
                return Err(MeshError::series(
                    "term count reached zero while reducing the series; this must not happen",
                ))
            }
            1 => return Ok((1.0, 1)),
            _ => {
                let exact = factor_for_term_count(count, spacing, distance)?;
                if exact >= 1.0 {
                    return Ok((exact, count));
                }
                count -= 1;
            }
        }
    }
}

/// Spacing reached after growing from `spacing` over `distance` at
/// `max_factor`.
pub fn spacing_at_distance(spacing: f64, distance: f64, max_factor: f64) -> MeshResult<f64> {
    let (factor, count) = term_count_for_factor(max_factor, spacing, distance)?;
    Ok(spacing * factor.powi(count as i32 - 1))
}

/// Offset from the lower end of `[0, total_distance]` where spacings grown
/// from both ends at `max_factor` become equal.
///
/// Splits an interval into two independently graded halves. When the two
/// growth curves do not cross inside the interval the midpoint is returned.
pub fn distance_where_spacings_converge(
    lower_spacing: f64,
    upper_spacing: f64,
    total_distance: f64,
    max_factor: f64,
) -> MeshResult<f64> {
    let residual = |offset: f64| -> MeshResult<f64> {
        let from_lower = spacing_at_distance(lower_spacing, offset, max_factor)?;
        let from_upper = spacing_at_distance(upper_spacing, total_distance - offset, max_factor)?;
        Ok(from_upper - from_lower)
    };

    let at_lower = residual(0.0)?;
    let at_upper = residual(total_distance)?;
    if at_lower.signum() == at_upper.signum() && at_lower != 0.0 && at_upper != 0.0 {
        return Ok(total_distance / 2.0);
    }

    brent(residual, 0.0, total_distance)
}

/// Factor and term count of a single graded run across `distance`.
///
/// Starts from `max(ceil(distance / larger_spacing) + 1, min_terms)` lines
/// and adds lines until the factor drops below both `max_factor` and the
/// per-step growth allowed by `larger_spacing / smaller_spacing`.
///
/// # Returns
///
/// `(factor, count)` for a run anchored at the smaller spacing.
pub fn series_term_count(
    min_terms: usize,
    smaller_spacing: f64,
    larger_spacing: f64,
    distance: f64,
    max_factor: f64,
) -> MeshResult<(f64, usize)> {
    let ratio = larger_spacing / smaller_spacing;
    let mut count = ((distance / larger_spacing).ceil() as usize + 1)
        .max(min_terms)
        .max(2);
    let mut factor = factor_for_term_count(count, smaller_spacing, distance)?;

    while factor >= factor_upper_bound(count, ratio, max_factor) {
        count += 1;
        if count > MAX_SERIES_TERMS {
            return Err(MeshError::series(format!(
                "no admissible factor below {max_factor} within {MAX_SERIES_TERMS} lines"
            )));
        }
        factor = factor_for_term_count(count, smaller_spacing, distance)?;
    }

    Ok((factor, count))
}
