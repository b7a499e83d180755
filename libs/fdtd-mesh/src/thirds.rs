//! # Thirds Rule
//!
//! Spacing adjustments around conductor boundaries. The field sample closest
//! to a conductor edge sits one third of a cell inside the conductor and two
//! thirds of a cell outside of it, rather than on the edge itself.
//!
//! The rule acts in two places:
//!
//! - **Boundary spacing**: an interval next to an already meshed neighbor
//!   takes its boundary spacing from the neighbor's nearest line, scaled up
//!   when the boundary is a movable metal edge
//! - **Inward shift**: after a first pass the working bounds of the interval
//!   move inward and its lines are generated again

use crate::bounded::RegionKind;

/// What is known about the far side of an interval boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryNeighbor {
    /// Distance from the boundary to the nearest existing line across it.
    pub gap: Option<f64>,
    /// The neighboring interval already has lines.
    pub meshed: bool,
    /// Type of the neighboring interval.
    pub kind: Option<RegionKind>,
    /// The boundary is a metal edge that is not pinned by a fixed line.
    pub movable_metal_bound: bool,
}

impl BoundaryNeighbor {
    /// A boundary with nothing meshed across it.
    pub fn open() -> Self {
        Self {
            gap: None,
            meshed: false,
            kind: None,
            movable_metal_bound: false,
        }
    }
}

/// Thirds-rule policy parameterized by the metal resolution.
///
/// # Example
///
/// ```rust
/// use fdtd_mesh::thirds::MetalAdjacencyPolicy;
///
/// let policy = MetalAdjacencyPolicy::new(0.5);
/// assert!((policy.nonmetal_shift(0.3) - 0.2).abs() < 1e-12);
/// assert!((policy.metal_shift(0.3, false) - 0.1).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetalAdjacencyPolicy {
    pub metal_res: f64,
}

impl MetalAdjacencyPolicy {
    pub fn new(metal_res: f64) -> Self {
        Self { metal_res }
    }

    /// Spacing required next to a boundary.
    ///
    /// Starts from `base` and tightens to a multiple of the gap to the
    /// neighbor's nearest line when the neighbor is meshed. The multiple is
    /// one on ordinary boundaries, and on a movable metal edge three halves
    /// toward a nonmetal neighbor or three otherwise, since the neighbor's
    /// line sits a third or two thirds of a cell from the edge.
    pub fn boundary_spacing(&self, base: f64, neighbor: &BoundaryNeighbor) -> f64 {
        match neighbor.gap {
            Some(gap) if neighbor.meshed => {
                let factor = if !neighbor.movable_metal_bound {
                    1.0
                } else if neighbor.kind == Some(RegionKind::Nonmetal) {
                    1.5
                } else {
                    3.0
                };
                base.min(factor * gap)
            }
            _ => base,
        }
    }

    /// Inward shift of a metal interval bound.
    ///
    /// One third of the edge cell, or two thirds when a meshed metal
    /// neighbor already claims the other third.
    #[inline]
    pub fn metal_shift(&self, edge_spacing: f64, metal_neighbor_meshed: bool) -> f64 {
        if metal_neighbor_meshed {
            2.0 * edge_spacing / 3.0
        } else {
            edge_spacing / 3.0
        }
    }

    /// Inward shift of a nonmetal interval bound that touches metal.
    ///
    /// The metal side is meshed at no more than the metal resolution, so
    /// the shift is capped by it.
    #[inline]
    pub fn nonmetal_shift(&self, edge_spacing: f64) -> f64 {
        2.0 * edge_spacing.min(self.metal_res) / 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn meshed(gap: f64, kind: RegionKind, movable_metal_bound: bool) -> BoundaryNeighbor {
        BoundaryNeighbor {
            gap: Some(gap),
            meshed: true,
            kind: Some(kind),
            movable_metal_bound,
        }
    }

    #[test]
    fn test_open_boundary_keeps_base() {
        let policy = MetalAdjacencyPolicy::new(1.0);
        assert_eq!(policy.boundary_spacing(0.4, &BoundaryNeighbor::open()), 0.4);

        let unmeshed = BoundaryNeighbor {
            meshed: false,
            ..meshed(0.01, RegionKind::Metal, true)
        };
        assert_eq!(policy.boundary_spacing(0.4, &unmeshed), 0.4);
    }

    #[test]
    fn test_plain_boundary_matches_gap() {
        let policy = MetalAdjacencyPolicy::new(1.0);
        let neighbor = meshed(0.1, RegionKind::Metal, false);
        assert_eq!(policy.boundary_spacing(0.4, &neighbor), 0.1);
        // Gap larger than base never widens the spacing
        let neighbor = meshed(0.9, RegionKind::Metal, false);
        assert_eq!(policy.boundary_spacing(0.4, &neighbor), 0.4);
    }

    #[test]
    fn test_metal_edge_scales_gap() {
        let policy = MetalAdjacencyPolicy::new(1.0);
        assert_relative_eq!(
            policy.boundary_spacing(1.0, &meshed(0.1, RegionKind::Nonmetal, true)),
            0.15
        );
        assert_relative_eq!(
            policy.boundary_spacing(1.0, &meshed(0.1, RegionKind::Metal, true)),
            0.3
        );
        assert_relative_eq!(
            policy.boundary_spacing(1.0, &meshed(0.1, RegionKind::Air, true)),
            0.3
        );
    }

    /// A line one third of a cell inside the metal, seen from the nonmetal
    /// side, yields a cell whose remaining two thirds land outside.
    #[test]
    fn test_thirds_split_across_metal_edge() {
        let policy = MetalAdjacencyPolicy::new(1.0);
        let s = 0.3;
        let inside_gap = policy.metal_shift(s, false);
        let spacing = policy.boundary_spacing(1.0, &meshed(inside_gap, RegionKind::Metal, true));
        assert_relative_eq!(spacing, s, max_relative = 1e-12);
        let outside_gap = policy.nonmetal_shift(spacing);
        assert_relative_eq!(outside_gap, 2.0 * s / 3.0, max_relative = 1e-12);
        assert_relative_eq!(inside_gap + outside_gap, s, max_relative = 1e-12);
    }

    #[test]
    fn test_metal_shift_thirds() {
        let policy = MetalAdjacencyPolicy::new(1.0);
        assert_relative_eq!(policy.metal_shift(0.3, false), 0.1);
        assert_relative_eq!(policy.metal_shift(0.3, true), 0.2);
    }

    #[test]
    fn test_nonmetal_shift_capped_by_metal_res() {
        let policy = MetalAdjacencyPolicy::new(0.15);
        assert_relative_eq!(policy.nonmetal_shift(0.3), 0.1);
        assert_relative_eq!(policy.nonmetal_shift(0.06), 0.04);
    }
}
