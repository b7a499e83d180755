//! # Mesh Report
//!
//! Advisory checks run on a finished mesh. None of these block emission:
//! every finding is logged at `warn` level and collected into a
//! [`MeshReport`] for the caller to inspect.

use crate::geometry::{Axis, BoundarySide, BoundingBox, PhysicalPrimitive};
use crate::tolerance::Tolerance;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

// =============================================================================
// FINDINGS
// =============================================================================

/// Adjacent cells whose size ratio exceeds the smoothness bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothnessViolation {
    pub axis: Axis,
    /// Line closing the offending cell.
    pub position: f64,
    /// Larger cell over smaller cell.
    pub ratio: f64,
    pub smoothness: f64,
    /// The three lines forming the two cells.
    pub lines: [f64; 3],
}

/// A cell inside a PML slab that differs from the slab's first cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PmlNonuniformity {
    pub side: BoundarySide,
    pub position: f64,
    pub spacing: f64,
    pub expected: f64,
}

/// A point inside a PML slab whose material differs from the slab's outer
/// face along the boundary direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructuralNonuniformity {
    pub side: BoundarySide,
    pub position: DVec3,
}

/// Advisory findings of one finalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshReport {
    pub smoothness_violations: Vec<SmoothnessViolation>,
    pub pml_nonuniformities: Vec<PmlNonuniformity>,
    pub structural_nonuniformities: Vec<StructuralNonuniformity>,
}

impl MeshReport {
    /// True when no check found anything.
    pub fn is_clean(&self) -> bool {
        self.smoothness_violations.is_empty()
            && self.pml_nonuniformities.is_empty()
            && self.structural_nonuniformities.is_empty()
    }
}

// =============================================================================
// CHECKS
// =============================================================================

/// Flags every pair of adjacent cells whose ratio exceeds `smoothness`.
pub fn check_smoothness(
    axis: Axis,
    lines: &[f64],
    smoothness: f64,
    tol: &Tolerance,
) -> Vec<SmoothnessViolation> {
    lines
        .windows(3)
        .filter_map(|w| {
            let previous = w[1] - w[0];
            let spacing = w[2] - w[1];
            let ratio = (spacing / previous).max(previous / spacing);
            if !tol.gt(ratio, smoothness) {
                return None;
            }
            warn!(
                %axis,
                position = w[2],
                ratio,
                smoothness,
                lines = ?w,
                "mesh line violates smoothness"
            );
            Some(SmoothnessViolation {
                axis,
                position: w[2],
                ratio,
                smoothness,
                lines: [w[0], w[1], w[2]],
            })
        })
        .collect()
}

/// Flags every cell of a PML slab that differs from the first one.
///
/// Spacings are compared with the relative spacing tolerance.
///
/// `slab` holds the lines of the slab along its boundary direction.
pub fn check_pml_uniformity(
    side: BoundarySide,
    slab: &[f64],
    tol: &Tolerance,
) -> Vec<PmlNonuniformity> {
    let Some(expected) = slab.get(1).zip(slab.first()).map(|(b, a)| b - a) else {
        return Vec::new();
    };
    slab.windows(2)
        .skip(1)
        .filter_map(|w| {
            let spacing = w[1] - w[0];
            if tol.close(spacing, expected) {
                return None;
            }
            warn!(%side, position = w[1], spacing, expected, "PML mesh lines are not uniform");
            Some(PmlNonuniformity {
                side,
                position: w[1],
                spacing,
                expected,
            })
        })
        .collect()
}

fn inside(prim: &PhysicalPrimitive, point: DVec3, tol: &Tolerance) -> bool {
    Axis::ALL.iter().all(|&axis| {
        let (lower, upper) = prim.bounds.bounds(axis);
        tol.within(point[axis.index()], lower, upper)
    })
}

/// True when every primitive contains both points or neither.
fn same_membership(prims: &[PhysicalPrimitive], a: DVec3, b: DVec3, tol: &Tolerance) -> bool {
    prims
        .iter()
        .all(|prim| inside(prim, a, tol) == inside(prim, b, tol))
}

/// Checks that material does not change along the boundary direction of a
/// PML slab.
///
/// For every cross-section line pair inside the slab, the set of primitives
/// containing each point along the boundary direction must match the set at
/// the slab's first line. The inner face is left out. Reports the first
/// offending point, if any.
///
/// # Arguments
///
/// * `slab` - The PML slab box
/// * `lines` - Mesh lines of each axis inside `slab`
pub fn check_pml_structure(
    side: BoundarySide,
    slab: &BoundingBox,
    lines: &[Vec<f64>; 3],
    prims: &[PhysicalPrimitive],
    tol: &Tolerance,
) -> Option<StructuralNonuniformity> {
    if slab.has_zero_dim() {
        return None;
    }
    let axis = side.axis();
    let [first_other, second_other] = axis.others();
    let (slab_lower, slab_upper) = slab.bounds(axis);
    // Structures may start right at the inner face
    let inner = if side.is_lower() { slab_upper } else { slab_lower };
    let along: Vec<f64> = lines[axis.index()]
        .iter()
        .copied()
        .filter(|&a| !tol.eq(a, inner))
        .collect();
    let (&start, rest) = along.split_first()?;

    let point = |a: f64, b: f64, c: f64| {
        let mut p = DVec3::ZERO;
        p[axis.index()] = a;
        p[first_other.index()] = b;
        p[second_other.index()] = c;
        p
    };

    for &b in &lines[first_other.index()] {
        for &c in &lines[second_other.index()] {
            let reference = point(start, b, c);
            for &a in rest {
                let position = point(a, b, c);
                if !same_membership(prims, reference, position, tol) {
                    warn!(
                        %side,
                        x = position.x,
                        y = position.y,
                        z = position.z,
                        "PML does not contain uniform structure"
                    );
                    return Some(StructuralNonuniformity { side, position });
                }
            }
        }
    }
    None
}
