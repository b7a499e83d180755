//! # PML Uniformity
//!
//! Lines inside a PML slab must be evenly spaced along the boundary
//! direction. The smoother re-levels each slab to a uniform spacing that
//! stays within the smoothness bound of the first cell outside it, then
//! regenerates the transition out to the nearest interval boundary.

use crate::bounded::BoundedType;
use crate::error::{MeshError, MeshResult};
use crate::generator::lines_const_factor;
use crate::geometry::{Axis, BoundarySide, BoundingBox};
use crate::lines::MeshLineSet;
use crate::settings::PmlCells;
use crate::tolerance::Tolerance;
use glam::DVec3;
use tracing::{debug, warn};

// =============================================================================
// SLAB GEOMETRY
// =============================================================================

/// The six PML slabs in (xmin, xmax, ymin, ymax, zmin, zmax) order.
///
/// Each slab spans the full simulation box across its boundary and
/// `cells` cells along it.
///
/// # Errors
///
/// [`MeshError::InvalidIndex`] when an axis has too few lines for its PML.
pub fn pml_boxes(lines: [&[f64]; 3], cells: &PmlCells) -> MeshResult<[BoundingBox; 6]> {
    let mut first = DVec3::ZERO;
    let mut last = DVec3::ZERO;
    for axis in Axis::ALL {
        let axis_lines = lines[axis.index()];
        let (Some(&lo), Some(&hi)) = (axis_lines.first(), axis_lines.last()) else {
            return Err(MeshError::invalid_index(axis, 0, 0));
        };
        first[axis.index()] = lo;
        last[axis.index()] = hi;
    }

    let mut boxes = [BoundingBox::new(first, last); 6];
    for (slot, side) in boxes.iter_mut().zip(BoundarySide::ALL) {
        let axis = side.axis();
        let axis_lines = lines[axis.index()];
        let count = cells.get(side);
        let len = axis_lines.len();
        let (outer, inner) = if side.is_lower() {
            (axis_lines.first(), axis_lines.get(count))
        } else {
            let inner = len.checked_sub(1 + count).and_then(|idx| axis_lines.get(idx));
            (axis_lines.last(), inner)
        };
        let (Some(&outer), Some(&inner)) = (outer, inner) else {
            return Err(MeshError::invalid_index(axis, count, len));
        };

        let mut min = first;
        let mut max = last;
        min[axis.index()] = outer;
        max[axis.index()] = inner;
        *slot = BoundingBox::new(min, max);
    }
    Ok(boxes)
}

// =============================================================================
// SMOOTHER
// =============================================================================

/// Re-levels the PML slabs of one axis.
#[derive(Debug, Clone, Copy)]
pub struct PmlSmoother<'a> {
    pub smoothness: f64,
    pub tolerance: Tolerance,
    pub fixed: &'a [f64],
    /// Intervals of the axis in ascending size order.
    pub ordered: &'a [BoundedType],
}

impl<'a> PmlSmoother<'a> {
    /// Makes the `cells` outermost cells at `side` uniform.
    ///
    /// # Returns
    ///
    /// True when lines were moved.
    ///
    /// # Errors
    ///
    /// [`MeshError::PmlGrowth`] when the uniform spacing would be finer
    /// than the smoothness bound allows next to the first interior cell.
    pub fn smooth(&self, lines: &mut MeshLineSet, side: BoundarySide, cells: usize) -> MeshResult<bool> {
        let tol = &self.tolerance;
        let len = lines.len();
        if cells == 0 || len < cells + 2 {
            debug!(%side, cells, lines = len, "PML slab has no interior neighbor, skipping");
            return Ok(false);
        }

        let all = lines.as_slice();
        let (slab, limit) = if side.is_lower() {
            (&all[..=cells], all[cells + 1] - all[cells])
        } else {
            (&all[len - 1 - cells..], all[len - 1 - cells] - all[len - 2 - cells])
        };
        if slab.iter().any(|&line| tol.contains(self.fixed, line)) {
            warn!(%side, "PML slab contains a fixed line, leaving it untouched");
            return Ok(false);
        }

        let (first, last) = (slab[0], slab[cells]);
        let mut spacing = (last - first) / cells as f64;
        if spacing > limit && spacing / limit >= self.smoothness {
            spacing = limit * self.smoothness;
        } else if spacing < limit && limit / spacing >= self.smoothness {
            return Err(MeshError::PmlGrowth { side });
        }

        if slab.windows(2).all(|w| tol.close(w[1] - w[0], spacing)) {
            debug!(%side, spacing, "PML slab already uniform");
            return Ok(false);
        }

        debug!(%side, spacing, limit, cells, "levelling PML slab");
        if side.is_lower() {
            self.level_lower(lines, first, spacing, cells)?;
        } else {
            self.level_upper(lines, last, spacing, cells)?;
        }
        Ok(true)
    }

    fn level_lower(
        &self,
        lines: &mut MeshLineSet,
        outer: f64,
        spacing: f64,
        cells: usize,
    ) -> MeshResult<()> {
        let tol = &self.tolerance;
        let slab: Vec<f64> = (0..=cells).map(|i| outer + spacing * i as f64).collect();
        let inner = slab[cells];
        lines.clear_range(outer, inner, tol);
        lines.insert(&slab, self.fixed, tol);

        // Regenerate up to the far end of the interval holding the slab edge
        let Some(other_bound) = self
            .ordered
            .iter()
            .find(|bt| bt.lower <= inner && inner < bt.upper)
            .map(|bt| bt.upper)
        else {
            return Ok(());
        };
        let Some((idx_below, line_below)) = lines.below(other_bound, tol) else {
            return Ok(());
        };
        if tol.le(line_below, inner) {
            return Ok(());
        }
        let Some(upper_spacing) = lines.spacing_after(idx_below) else {
            return Ok(());
        };

        let transition =
            lines_const_factor(inner, line_below, spacing, upper_spacing, 0, self.smoothness, tol)?;
        lines.remove(cells + 1..idx_below);
        lines.insert(&transition, self.fixed, tol);
        Ok(())
    }

    fn level_upper(
        &self,
        lines: &mut MeshLineSet,
        outer: f64,
        spacing: f64,
        cells: usize,
    ) -> MeshResult<()> {
        let tol = &self.tolerance;
        let slab: Vec<f64> = (0..=cells).rev().map(|i| outer - spacing * i as f64).collect();
        let inner = slab[0];
        lines.clear_range(inner, outer, tol);
        lines.insert(&slab, self.fixed, tol);

        let Some(other_bound) = self
            .ordered
            .iter()
            .find(|bt| bt.lower < inner && inner <= bt.upper)
            .map(|bt| bt.lower)
        else {
            return Ok(());
        };
        let Some((idx_above, line_above)) = lines.above(other_bound, tol) else {
            return Ok(());
        };
        if tol.ge(line_above, inner) || idx_above == 0 {
            return Ok(());
        }
        let Some(lower_spacing) = lines.spacing_after(idx_above - 1) else {
            return Ok(());
        };

        let transition =
            lines_const_factor(line_above, inner, lower_spacing, spacing, 0, self.smoothness, tol)?;
        let end = lines.len() - (cells + 1);
        lines.remove(idx_above + 1..end);
        lines.insert(&transition, self.fixed, tol);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounded::RegionKind;
    use approx::assert_relative_eq;

    fn spacings(lines: &[f64]) -> Vec<f64> {
        lines.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Uneven slab over [0, 10], unit cells from 10 to 20.
    fn uneven_lower_slab() -> MeshLineSet {
        let mut positions = vec![0.0, 0.5, 2.0, 3.0, 3.5, 5.0, 6.0, 7.5, 8.0, 9.0, 10.0];
        positions.extend((11..=20).map(f64::from));
        MeshLineSet::from_positions(&positions, &[], &Tolerance::default())
    }

    fn smoother(ordered: &[BoundedType]) -> PmlSmoother<'_> {
        PmlSmoother {
            smoothness: 1.5,
            tolerance: Tolerance::default(),
            fixed: &[],
            ordered,
        }
    }

    #[test]
    fn test_lower_slab_becomes_uniform() {
        let ordered = [BoundedType::new(RegionKind::Air, 0.0, 20.0)];
        let mut lines = uneven_lower_slab();
        let moved = smoother(&ordered)
            .smooth(&mut lines, BoundarySide::XMin, 10)
            .unwrap();
        assert!(moved);

        let slab = &lines.as_slice()[..=10];
        assert_eq!(slab[0], 0.0);
        assert_eq!(slab[10], 10.0);
        for spacing in spacings(slab) {
            assert_relative_eq!(spacing, 1.0, max_relative = 1e-12);
        }
        for pair in spacings(lines.as_slice()).windows(2) {
            let ratio = (pair[1] / pair[0]).max(pair[0] / pair[1]);
            assert!(ratio <= 1.5 + 1e-9);
        }
        assert_eq!(*lines.as_slice().last().unwrap(), 20.0);
    }

    #[test]
    fn test_upper_slab_becomes_uniform() {
        let mut positions: Vec<f64> = (0..=10).map(f64::from).collect();
        positions.extend([10.5, 12.0, 13.0, 13.5, 15.0, 16.0, 17.5, 18.0, 19.0, 20.0]);
        let mut lines = MeshLineSet::from_positions(&positions, &[], &Tolerance::default());
        let ordered = [BoundedType::new(RegionKind::Air, 0.0, 20.0)];

        assert!(smoother(&ordered)
            .smooth(&mut lines, BoundarySide::XMax, 10)
            .unwrap());
        let all = lines.as_slice();
        let slab = &all[all.len() - 11..];
        for spacing in spacings(slab) {
            assert_relative_eq!(spacing, 1.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_coarse_slab_is_clamped() {
        // Slab of four 2.0 cells next to 1.0 cells: clamped to 1.5
        let mut positions = vec![0.0, 1.0, 4.0, 6.0, 8.0];
        positions.extend((9..=20).map(f64::from));
        let mut lines = MeshLineSet::from_positions(&positions, &[], &Tolerance::default());
        let ordered = [BoundedType::new(RegionKind::Air, 0.0, 20.0)];

        assert!(smoother(&ordered)
            .smooth(&mut lines, BoundarySide::XMin, 4)
            .unwrap());
        let slab = &lines.as_slice()[..=4];
        for spacing in spacings(slab) {
            assert_relative_eq!(spacing, 1.5, max_relative = 1e-12);
        }
        assert!(lines.as_slice().windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_fine_slab_is_growth_error() {
        let mut positions: Vec<f64> = (0..=4).map(|i| 0.1 * f64::from(i)).collect();
        positions.extend([1.4, 2.4]);
        let mut lines = MeshLineSet::from_positions(&positions, &[], &Tolerance::default());
        let ordered = [BoundedType::new(RegionKind::Air, 0.0, 2.4)];
        let err = smoother(&ordered)
            .smooth(&mut lines, BoundarySide::YMin, 4)
            .unwrap_err();
        assert_eq!(err, MeshError::PmlGrowth { side: BoundarySide::YMin });
    }

    #[test]
    fn test_uniform_slab_untouched() {
        let positions: Vec<f64> = (0..=20).map(f64::from).collect();
        let mut lines = MeshLineSet::from_positions(&positions, &[], &Tolerance::default());
        let ordered = [BoundedType::new(RegionKind::Air, 0.0, 20.0)];
        assert!(!smoother(&ordered)
            .smooth(&mut lines, BoundarySide::ZMax, 8)
            .unwrap());
        assert_eq!(lines.as_slice(), positions.as_slice());
    }

    #[test]
    fn test_slab_with_fixed_line_untouched() {
        let mut lines = uneven_lower_slab();
        let before = lines.clone();
        let ordered = [BoundedType::new(RegionKind::Air, 0.0, 20.0)];
        let fixed = [3.5];
        let smoother = PmlSmoother {
            fixed: &fixed,
            ..smoother(&ordered)
        };
        assert!(!smoother.smooth(&mut lines, BoundarySide::XMin, 10).unwrap());
        assert_eq!(lines, before);
    }

    #[test]
    fn test_pml_boxes() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [0.0, 1.0, 2.0];
        let z = [-1.0, 1.0];
        let cells = PmlCells([[2, 1], [1, 1], [0, 0]]);
        let boxes = pml_boxes([&x, &y, &z], &cells).unwrap();
        assert_eq!(boxes[0].bounds(Axis::X), (0.0, 2.0));
        assert_eq!(boxes[0].bounds(Axis::Y), (0.0, 2.0));
        assert_eq!(boxes[1].bounds(Axis::X), (3.0, 4.0));
        assert_eq!(boxes[3].bounds(Axis::Y), (1.0, 2.0));
        assert!(boxes[4].has_zero_dim());
        assert!(!boxes[0].has_zero_dim());
    }

    #[test]
    fn test_pml_boxes_too_few_lines() {
        let x = [0.0, 1.0];
        let err = pml_boxes([&x, &x, &x], &PmlCells::uniform(2)).unwrap_err();
        assert!(matches!(err, MeshError::InvalidIndex { axis: Axis::X, .. }));
    }
}
