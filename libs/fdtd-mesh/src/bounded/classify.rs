//! Material classification at an axis position.

use crate::geometry::{Axis, Material, PhysicalPrimitive};
use crate::tolerance::Tolerance;

/// Material that governs mesh density at `pos` on `axis`.
///
/// Among the primitives whose extent on `axis` covers `pos`, the one with
/// the smallest extent wins, so thin sheets and traces dominate the coarse
/// fills they sit on. Extents that tie within relative tolerance resolve to
/// conductor. Returns `None` where nothing covers the position.
///
/// # Example
///
/// ```rust
/// use fdtd_mesh::bounded::type_at;
/// use fdtd_mesh::geometry::{Axis, Material, PhysicalPrimitive};
/// use fdtd_mesh::Tolerance;
/// use glam::DVec3;
///
/// let prims = [
///     PhysicalPrimitive::dielectric(DVec3::ZERO, DVec3::new(10.0, 1.0, 1.0)),
///     PhysicalPrimitive::conductor(DVec3::new(4.0, 0.0, 0.0), DVec3::new(5.0, 1.0, 1.0)),
/// ];
/// let tol = Tolerance::default();
/// assert_eq!(type_at(&prims, Axis::X, 4.5, &tol), Some(Material::Conductor));
/// assert_eq!(type_at(&prims, Axis::X, 2.0, &tol), Some(Material::Dielectric));
/// assert_eq!(type_at(&prims, Axis::X, 12.0, &tol), None);
/// ```
pub fn type_at(
    prims: &[PhysicalPrimitive],
    axis: Axis,
    pos: f64,
    tol: &Tolerance,
) -> Option<Material> {
    let mut smallest = f64::INFINITY;
    let mut current = None;

    for prim in prims {
        let (lower, upper) = prim.bounds.bounds(axis);
        if !tol.within(pos, lower, upper) {
            continue;
        }
        let size = upper - lower;
        if smallest.is_finite() && tol.close(size, smallest) {
            if prim.is_conductor() {
                current = Some(Material::Conductor);
                smallest = size;
            }
        } else if size < smallest {
            smallest = size;
            current = Some(prim.material);
        }
    }

    current
}
