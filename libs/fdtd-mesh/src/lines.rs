//! # Mesh Line Sets
//!
//! The sorted, duplicate-free list of line positions on one axis, plus the
//! deduplication rule shared by boundaries, metal bounds and lines: near
//! duplicates collapse onto one exemplar, and a fixed position always wins
//! over a movable one.

use crate::tolerance::Tolerance;
use std::ops::Range;

/// Removes near-duplicates from a sorted list.
///
/// Identical values always collapse. When two values are within tolerance
/// and only one of them is fixed, the fixed one is kept. Two distinct fixed
/// values are both kept, however close.
///
/// Fixed membership is exact: a fixed position is the very value that was
/// registered, so generated lines that merely land near it are movable.
///
/// # Example
///
/// ```rust
/// use fdtd_mesh::lines::remove_duplicates;
/// use fdtd_mesh::Tolerance;
///
/// let fixed = [1.0 + 1e-12];
/// let lines = remove_duplicates(&[0.0, 1.0, 1.0 + 1e-12, 2.0], &fixed, &Tolerance::default());
/// assert_eq!(lines, vec![0.0, 1.0 + 1e-12, 2.0]);
/// ```
pub fn remove_duplicates(sorted: &[f64], fixed: &[f64], tol: &Tolerance) -> Vec<f64> {
    let is_fixed = |value: f64| fixed.iter().any(|&f| f == value);
    let mut result: Vec<f64> = Vec::with_capacity(sorted.len());

    for &value in sorted {
        if let Some(&last) = result.last() {
            if value == last {
                continue;
            }
            if tol.eq(value, last) {
                match (is_fixed(last), is_fixed(value)) {
                    (_, false) => continue,
                    (false, true) => {
                        result.pop();
                    }
                    (true, true) => {}
                }
            }
        }
        result.push(value);
    }

    result
}

/// Sorted line positions on one axis.
///
/// # Example
///
/// ```rust
/// use fdtd_mesh::lines::MeshLineSet;
/// use fdtd_mesh::Tolerance;
///
/// let tol = Tolerance::default();
/// let mut lines = MeshLineSet::new();
/// lines.insert(&[2.0, 0.0, 1.0], &[], &tol);
/// assert_eq!(lines.as_slice(), &[0.0, 1.0, 2.0]);
/// assert_eq!(lines.below(1.0, &tol), Some((0, 0.0)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshLineSet {
    lines: Vec<f64>,
}

impl MeshLineSet {
    /// Creates an empty line set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a line set from arbitrary positions.
    pub fn from_positions(positions: &[f64], fixed: &[f64], tol: &Tolerance) -> Self {
        let mut set = Self::new();
        set.insert(positions, fixed, tol);
        set
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.lines
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.lines.get(index).copied()
    }

    #[inline]
    pub fn first(&self) -> Option<f64> {
        self.lines.first().copied()
    }

    #[inline]
    pub fn last(&self) -> Option<f64> {
        self.lines.last().copied()
    }

    /// Spacing between line `index` and the line after it.
    pub fn spacing_after(&self, index: usize) -> Option<f64> {
        Some(self.get(index + 1)? - self.get(index)?)
    }

    /// Merges positions into the set, keeping it sorted and deduplicated.
    pub fn insert(&mut self, positions: &[f64], fixed: &[f64], tol: &Tolerance) {
        self.lines.extend_from_slice(positions);
        self.lines.sort_by(f64::total_cmp);
        self.lines = remove_duplicates(&self.lines, fixed, tol);
    }

    /// Removes every line within `[lower, upper]`.
    pub fn clear_range(&mut self, lower: f64, upper: f64, tol: &Tolerance) {
        let start = self.lines.partition_point(|&l| tol.lt(l, lower));
        let end = self.lines.partition_point(|&l| tol.le(l, upper));
        if start < end {
            self.lines.drain(start..end);
        }
    }

    /// Removes the lines at the given index range.
    pub fn remove(&mut self, range: Range<usize>) {
        let end = range.end.min(self.lines.len());
        let start = range.start.min(end);
        self.lines.drain(start..end);
    }

    /// Index and position of the line nearest to `pos`.
    ///
    /// Ties between two lines resolve to the upper one.
    pub fn nearest(&self, pos: f64) -> Option<(usize, f64)> {
        if self.lines.is_empty() {
            return None;
        }
        let idx = self.lines.partition_point(|&l| l < pos);
        if idx == 0 {
            return Some((0, self.lines[0]));
        }
        if idx == self.lines.len() {
            return Some((idx - 1, self.lines[idx - 1]));
        }
        let lower = self.lines[idx - 1];
        let upper = self.lines[idx];
        if pos - lower < upper - pos {
            Some((idx - 1, lower))
        } else {
            Some((idx, upper))
        }
    }

    /// Nearest line strictly below `pos`.
    pub fn below(&self, pos: f64, tol: &Tolerance) -> Option<(usize, f64)> {
        let count = self.lines.partition_point(|&l| tol.lt(l, pos));
        count.checked_sub(1).map(|idx| (idx, self.lines[idx]))
    }

    /// Nearest line at or below `pos`.
    pub fn below_inclusive(&self, pos: f64, tol: &Tolerance) -> Option<(usize, f64)> {
        let count = self.lines.partition_point(|&l| tol.le(l, pos));
        count.checked_sub(1).map(|idx| (idx, self.lines[idx]))
    }

    /// Nearest line strictly above `pos`.
    pub fn above(&self, pos: f64, tol: &Tolerance) -> Option<(usize, f64)> {
        let idx = self.lines.partition_point(|&l| tol.le(l, pos));
        self.get(idx).map(|line| (idx, line))
    }

    /// Nearest line at or above `pos`.
    pub fn above_inclusive(&self, pos: f64, tol: &Tolerance) -> Option<(usize, f64)> {
        let idx = self.lines.partition_point(|&l| tol.lt(l, pos));
        self.get(idx).map(|line| (idx, line))
    }

    /// Lines within `[lower, upper]`, compared exactly.
    pub fn within(&self, lower: f64, upper: f64) -> &[f64] {
        let start = self.lines.partition_point(|&l| l < lower);
        let end = self.lines.partition_point(|&l| l <= upper);
        &self.lines[start..end.max(start)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[f64]) -> MeshLineSet {
        MeshLineSet::from_positions(values, &[], &Tolerance::default())
    }

    // =========================================================================
    // DEDUPLICATION
    // =========================================================================

    #[test]
    fn test_remove_duplicates_identical() {
        let tol = Tolerance::default();
        assert_eq!(remove_duplicates(&[1.0, 1.0, 2.0], &[], &tol), vec![1.0, 2.0]);
    }

    #[test]
    fn test_remove_duplicates_keeps_first_movable() {
        let tol = Tolerance::default();
        let lines = remove_duplicates(&[1.0, 1.0 + 1e-12, 3.0], &[], &tol);
        assert_eq!(lines, vec![1.0, 3.0]);
    }

    #[test]
    fn test_remove_duplicates_fixed_wins_either_side() {
        let tol = Tolerance::default();
        let near = 1.0 + 1e-12;
        assert_eq!(remove_duplicates(&[1.0, near], &[1.0], &tol), vec![1.0]);
        assert_eq!(remove_duplicates(&[1.0, near], &[near], &tol), vec![near]);
    }

    #[test]
    fn test_remove_duplicates_distinct_fixed_kept() {
        let tol = Tolerance::default();
        let near = 1.0 + 1e-12;
        assert_eq!(remove_duplicates(&[1.0, near], &[1.0, near], &tol), vec![1.0, near]);
    }

    // =========================================================================
    // LINE SET
    // =========================================================================

    #[test]
    fn test_insert_sorts_and_merges() {
        let tol = Tolerance::default();
        let mut lines = set(&[0.0, 2.0]);
        lines.insert(&[1.0, 2.0 + 1e-13, -1.0], &[], &tol);
        assert_eq!(lines.as_slice(), &[-1.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_nearest() {
        let lines = set(&[0.0, 1.0, 3.0]);
        assert_eq!(lines.nearest(-5.0), Some((0, 0.0)));
        assert_eq!(lines.nearest(1.9), Some((1, 1.0)));
        assert_eq!(lines.nearest(2.0), Some((2, 3.0)));
        assert_eq!(lines.nearest(9.0), Some((2, 3.0)));
        assert_eq!(MeshLineSet::new().nearest(0.0), None);
    }

    #[test]
    fn test_below_and_above() {
        let tol = Tolerance::default();
        let lines = set(&[0.0, 1.0, 2.0]);
        assert_eq!(lines.below(1.0, &tol), Some((0, 0.0)));
        assert_eq!(lines.below_inclusive(1.0, &tol), Some((1, 1.0)));
        assert_eq!(lines.above(1.0, &tol), Some((2, 2.0)));
        assert_eq!(lines.above_inclusive(1.0, &tol), Some((1, 1.0)));
        assert_eq!(lines.below(0.0, &tol), None);
        assert_eq!(lines.above(2.0, &tol), None);
        assert_eq!(lines.above(1.5, &tol), Some((2, 2.0)));
    }

    #[test]
    fn test_clear_range_inclusive() {
        let tol = Tolerance::default();
        let mut lines = set(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        lines.clear_range(1.0, 3.0, &tol);
        assert_eq!(lines.as_slice(), &[0.0, 4.0]);
        lines.clear_range(5.0, 6.0, &tol);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_remove_clamps_range() {
        let mut lines = set(&[0.0, 1.0, 2.0]);
        lines.remove(1..10);
        assert_eq!(lines.as_slice(), &[0.0]);
        lines.remove(3..1);
        assert_eq!(lines.as_slice(), &[0.0]);
    }

    #[test]
    fn test_within() {
        let lines = set(&[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(lines.within(0.5, 2.0), &[1.0, 2.0]);
        assert!(lines.within(3.5, 4.0).is_empty());
    }

    #[test]
    fn test_spacing_after() {
        let lines = set(&[0.0, 0.5, 2.0]);
        assert_eq!(lines.spacing_after(1), Some(1.5));
        assert_eq!(lines.spacing_after(2), None);
    }
}
