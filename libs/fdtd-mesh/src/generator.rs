//! # Line Generator
//!
//! Places lines across one interval given the spacing required at each end.
//!
//! ## Strategy
//!
//! 1. **Uniform**: end spacings roughly equal, lines are evenly spaced
//! 2. **Single run**: one geometric run grows from the finer end to the
//!    coarser end when there is no room to grow and shrink again
//! 3. **Split**: two runs grow from both ends and meet where their spacings
//!    converge, capped at the maximum spacing of the region

use crate::error::{MeshError, MeshResult};
use crate::lines::remove_duplicates;
use crate::series::{
    distance_where_spacings_converge, series_term_count, spacing_at_distance,
    term_count_for_factor,
};
use crate::tolerance::Tolerance;

/// `count` evenly spaced positions from `lower` to `upper`, both included.
pub fn linspace(lower: f64, upper: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![lower],
        _ => {
            let step = (upper - lower) / (count - 1) as f64;
            let mut lines: Vec<f64> = (0..count).map(|i| lower + step * i as f64).collect();
            lines[count - 1] = upper;
            lines
        }
    }
}

/// Lines across `[lower, upper]` with a constant growth factor.
///
/// Roughly equal end spacings give evenly spaced lines, at least
/// `min_lines` of them. Otherwise spacings grow geometrically away from the
/// finer end, with the factor kept below `smoothness`. Both ends are placed
/// exactly on the bounds.
///
/// # Example
///
/// ```rust
/// use fdtd_mesh::generator::lines_const_factor;
/// use fdtd_mesh::Tolerance;
///
/// let lines = lines_const_factor(0.0, 4.0, 1.0, 1.0, 5, 1.2, &Tolerance::default()).unwrap();
/// assert_eq!(lines, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
/// ```
pub fn lines_const_factor(
    lower: f64,
    upper: f64,
    lower_spacing: f64,
    upper_spacing: f64,
    min_lines: usize,
    smoothness: f64,
    tol: &Tolerance,
) -> MeshResult<Vec<f64>> {
    let distance = upper - lower;
    if distance <= 0.0 {
        return Ok(vec![lower]);
    }
    if !(lower_spacing > 0.0 && upper_spacing > 0.0) {
        return Err(MeshError::series(format!(
            "boundary spacings must be positive, got {lower_spacing} and {upper_spacing}"
        )));
    }

    if tol.close(lower_spacing, upper_spacing) {
        let count = (tol.ceil(distance / lower_spacing) as usize + 1).max(min_lines);
        return Ok(linspace(lower, upper, count));
    }

    let smaller = lower_spacing.min(upper_spacing);
    let larger = lower_spacing.max(upper_spacing);
    let (factor, count) = series_term_count(min_lines, smaller, larger, distance, smoothness)?;

    let mut lines = Vec::with_capacity(count);
    let mut offset = 0.0;
    let mut spacing = smaller;
    if lower_spacing < upper_spacing {
        lines.push(lower);
        for _ in 1..count {
            spacing *= factor;
            offset += spacing;
            lines.push(lower + offset);
        }
    } else {
        lines.push(upper);
        for _ in 1..count {
            spacing *= factor;
            offset += spacing;
            lines.push(upper - offset);
        }
        lines.reverse();
    }

    lines[0] = lower;
    lines[count - 1] = upper;
    Ok(lines)
}

/// Generates lines for one interval.
///
/// Holds the per-axis parameters that stay constant while the intervals of
/// an axis are meshed.
#[derive(Debug, Clone, Copy)]
pub struct LineGenerator<'a> {
    pub min_lines: usize,
    pub smoothness: f64,
    pub tolerance: Tolerance,
    /// Fixed lines of the axis; they survive deduplication of split runs.
    pub fixed: &'a [f64],
}

impl<'a> LineGenerator<'a> {
    pub fn new(min_lines: usize, smoothness: f64, tolerance: Tolerance, fixed: &'a [f64]) -> Self {
        Self {
            min_lines,
            smoothness,
            tolerance,
            fixed,
        }
    }

    /// Lines spanning `[lower, upper]`, both ends included.
    ///
    /// # Arguments
    ///
    /// * `lower_spacing` - Required spacing next to `lower`
    /// * `upper_spacing` - Required spacing next to `upper`
    /// * `max_spacing` - Largest spacing allowed where split runs meet
    ///
    /// # Errors
    ///
    /// [`MeshError::GeometricSeries`] when a series can not be solved.
    pub fn generate(
        &self,
        lower: f64,
        upper: f64,
        lower_spacing: f64,
        upper_spacing: f64,
        max_spacing: f64,
    ) -> MeshResult<Vec<f64>> {
        let distance = upper - lower;
        if distance <= 0.0 {
            return Ok(vec![lower]);
        }
        let tol = &self.tolerance;
        let smaller = lower_spacing.min(upper_spacing);
        let larger = lower_spacing.max(upper_spacing);

        if distance / larger < self.min_lines as f64
            || spacing_at_distance(smaller, distance, self.smoothness)? < larger
        {
            return lines_const_factor(
                lower,
                upper,
                lower_spacing,
                upper_spacing,
                self.min_lines,
                self.smoothness,
                tol,
            );
        }

        let offset =
            distance_where_spacings_converge(lower_spacing, upper_spacing, distance, self.smoothness)?;
        let midpoint = lower + offset;
        let (lower_factor, mut lower_count) =
            term_count_for_factor(self.smoothness, lower_spacing, midpoint - lower)?;
        let (upper_factor, mut upper_count) =
            term_count_for_factor(self.smoothness, upper_spacing, upper - midpoint)?;

        let mid_spacing = max_spacing
            .min(lower_spacing * lower_factor.powi(lower_count as i32))
            .min(upper_spacing * upper_factor.powi(upper_count as i32));

        while lower_count + upper_count < self.min_lines {
            lower_count += 1;
            upper_count += 1;
        }

        let mut lines = lines_const_factor(
            lower,
            midpoint,
            lower_spacing,
            mid_spacing,
            lower_count,
            self.smoothness,
            tol,
        )?;
        lines.extend(lines_const_factor(
            midpoint,
            upper,
            mid_spacing,
            upper_spacing,
            upper_count,
            self.smoothness,
            tol,
        )?);

        Ok(remove_duplicates(&lines, self.fixed, tol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spacings(lines: &[f64]) -> Vec<f64> {
        lines.windows(2).map(|w| w[1] - w[0]).collect()
    }

    fn generator() -> LineGenerator<'static> {
        LineGenerator::new(5, 1.3, Tolerance::default(), &[])
    }

    // =========================================================================
    // CONSTANT FACTOR RUNS
    // =========================================================================

    #[test]
    fn test_linspace_endpoints() {
        assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
        assert_eq!(linspace(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_uniform_exact_multiple() {
        let tol = Tolerance::default();
        let s = 0.1;
        let lines = lines_const_factor(0.0, 4.0 * s, s, s, 0, 1.2, &tol).unwrap();
        assert_eq!(lines.len(), 5);
        for spacing in spacings(&lines) {
            assert_relative_eq!(spacing, s, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_uniform_non_multiple() {
        let tol = Tolerance::default();
        let lines = lines_const_factor(0.0, 4.5, 1.0, 1.0, 0, 1.2, &tol).unwrap();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], 0.0);
        assert_eq!(lines[5], 4.5);
        assert!(spacings(&lines).iter().all(|&s| s <= 1.0));
    }

    #[test]
    fn test_uniform_honors_min_lines() {
        let tol = Tolerance::default();
        let lines = lines_const_factor(0.0, 1.0, 1.0, 1.0, 5, 1.2, &tol).unwrap();
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_geometric_run_grows_from_finer_end() {
        let tol = Tolerance::default();
        let lines = lines_const_factor(0.0, 10.0, 0.1, 2.0, 0, 1.3, &tol).unwrap();
        assert_eq!(lines[0], 0.0);
        assert_eq!(*lines.last().unwrap(), 10.0);
        let steps = spacings(&lines);
        for pair in steps.windows(2) {
            assert!(pair[1] > pair[0]);
            assert!(pair[1] / pair[0] < 1.3 + 1e-9);
        }
    }

    #[test]
    fn test_geometric_run_mirrors_for_finer_upper_end() {
        let tol = Tolerance::default();
        let lines = lines_const_factor(0.0, 10.0, 2.0, 0.1, 0, 1.3, &tol).unwrap();
        assert_eq!(lines[0], 0.0);
        assert_eq!(*lines.last().unwrap(), 10.0);
        let steps = spacings(&lines);
        for pair in steps.windows(2) {
            assert!(pair[1] < pair[0]);
        }
    }

    #[test]
    fn test_zero_width_interval() {
        let tol = Tolerance::default();
        assert_eq!(lines_const_factor(3.0, 3.0, 1.0, 1.0, 5, 1.2, &tol).unwrap(), vec![3.0]);
        assert_eq!(generator().generate(3.0, 3.0, 1.0, 2.0, 1.0).unwrap(), vec![3.0]);
    }

    #[test]
    fn test_rejects_zero_spacing() {
        let tol = Tolerance::default();
        assert!(lines_const_factor(0.0, 1.0, 0.0, 1.0, 5, 1.2, &tol).is_err());
    }

    // =========================================================================
    // INTERVAL GENERATION
    // =========================================================================

    #[test]
    fn test_generate_uniform_fallback() {
        let lines = generator().generate(0.0, 0.4, 0.1, 0.1, 0.1).unwrap();
        assert_eq!(lines.len(), 5);
        for spacing in spacings(&lines) {
            assert_relative_eq!(spacing, 0.1, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_generate_split_grows_and_shrinks() {
        let lines = generator().generate(0.0, 20.0, 0.1, 0.1, 1.0).unwrap();
        assert_eq!(lines[0], 0.0);
        assert_eq!(*lines.last().unwrap(), 20.0);
        assert!(lines.windows(2).all(|w| w[1] > w[0]));

        let steps = spacings(&lines);
        let largest = steps.iter().cloned().fold(0.0, f64::max);
        assert!(largest > 0.5, "largest spacing {largest}");
        assert!(steps[0] < 0.2);
        assert!(steps[steps.len() - 1] < 0.2);
    }

    #[test]
    fn test_generate_honors_min_lines() {
        let lines = LineGenerator::new(9, 1.3, Tolerance::default(), &[])
            .generate(0.0, 1.0, 0.5, 0.5, 0.5)
            .unwrap();
        assert!(lines.len() >= 9);
    }

    #[test]
    fn test_generate_is_sorted_and_spans_interval() {
        for &(ls, us) in &[(0.01, 0.5), (0.5, 0.01), (0.05, 0.08), (0.2, 0.2)] {
            let lines = generator().generate(-1.0, 2.0, ls, us, 0.5).unwrap();
            assert_eq!(lines[0], -1.0);
            assert_eq!(*lines.last().unwrap(), 2.0);
            assert!(lines.windows(2).all(|w| w[1] > w[0]), "{ls} {us}: {lines:?}");
        }
    }
}
