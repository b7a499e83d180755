//! Construction of the classified interval sequence for one axis.

use super::{type_at, BoundedType, RegionKind};
use crate::error::{MeshError, MeshResult};
use crate::geometry::{Axis, PhysicalPrimitive};
use crate::lines::remove_duplicates;
use crate::settings::SimulationExtent;
use crate::tolerance::Tolerance;
use tracing::debug;

// =============================================================================
// BOUNDARY EXTRACTION
// =============================================================================

/// Fixed line positions on `axis`.
///
/// Every primitive that is flat on `axis` pins a line at its position.
/// User-registered fixed lines are merged in. Near-duplicates collapse.
pub fn fixed_lines(
    prims: &[PhysicalPrimitive],
    axis: Axis,
    user_fixed: &[f64],
    tol: &Tolerance,
) -> Vec<f64> {
    let mut fixed: Vec<f64> = prims
        .iter()
        .map(|prim| prim.bounds.bounds(axis))
        .filter(|&(lower, upper)| tol.eq(lower, upper))
        .map(|(lower, _)| lower)
        .chain(user_fixed.iter().copied())
        .collect();
    fixed.sort_by(f64::total_cmp);
    remove_duplicates(&fixed, &[], tol)
}

/// Sorted, deduplicated boundary positions on `axis`.
///
/// Both ends of every primitive plus every fixed line. Fixed positions win
/// over movable ones within tolerance.
pub fn boundaries(
    prims: &[PhysicalPrimitive],
    axis: Axis,
    fixed: &[f64],
    tol: &Tolerance,
) -> Vec<f64> {
    let mut bounds: Vec<f64> = prims
        .iter()
        .flat_map(|prim| {
            let (lower, upper) = prim.bounds.bounds(axis);
            [lower, upper]
        })
        .chain(fixed.iter().copied())
        .collect();
    bounds.sort_by(f64::total_cmp);
    remove_duplicates(&bounds, fixed, tol)
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Pairs consecutive boundaries into classified intervals.
///
/// Each interval is classified at its midpoint. A fixed boundary also emits
/// a zero-width interval classified at the boundary itself, so a sheet's
/// own type survives next to its neighbors.
pub fn build_bounded_types(
    prims: &[PhysicalPrimitive],
    axis: Axis,
    bounds: &[f64],
    fixed: &[f64],
    tol: &Tolerance,
) -> Vec<BoundedType> {
    let mut types = Vec::with_capacity(bounds.len() * 2);
    let mut last: Option<f64> = None;

    for &bound in bounds {
        if let Some(prev) = last {
            let kind = RegionKind::from(type_at(prims, axis, (prev + bound) / 2.0, tol));
            types.push(BoundedType::new(kind, prev, bound));
        }
        if tol.contains(fixed, bound) {
            let kind = RegionKind::from(type_at(prims, axis, bound, tol));
            types.push(BoundedType::new(kind, bound, bound));
        }
        last = Some(bound);
    }

    types
}

// =============================================================================
// EXPANSION
// =============================================================================

/// Extends the interval sequence with air out to the simulation bounds.
///
/// # Arguments
///
/// * `types` - Interval sequence in position order, not empty
/// * `extent` - Expansion cell counts or absolute bounds
/// * `nonmetal_res` - Cell size of the expansion, in drawing units
///
/// # Returns
///
/// The simulation bounds `(lower, upper)` on this axis.
///
/// # Errors
///
/// [`MeshError::Configuration`] when absolute bounds cut into geometry.
/// `types` is untouched in that case.
pub fn expand_to_simulation_bounds(
    types: &mut Vec<BoundedType>,
    axis: Axis,
    extent: &SimulationExtent,
    nonmetal_res: f64,
    tol: &Tolerance,
) -> MeshResult<(f64, f64)> {
    let (existing_lower, existing_upper) = match (types.first(), types.last()) {
        (Some(first), Some(last)) => (first.lower, last.upper),
        _ => return Err(MeshError::EmptyGeometry),
    };

    match extent {
        SimulationExtent::Absolute(bounds) => {
            let [lower, upper] = bounds[axis.index()];
            if tol.gt(lower, existing_lower) || tol.lt(upper, existing_upper) {
                return Err(MeshError::configuration(format!(
                    "simulation bounds [{lower}, {upper}] on axis {axis} would cut geometry \
                     spanning [{existing_lower}, {existing_upper}]"
                )));
            }
            if !tol.eq(lower, existing_lower) {
                types.insert(0, BoundedType::new(RegionKind::Air, lower, existing_lower));
            }
            if !tol.eq(upper, existing_upper) {
                types.push(BoundedType::new(RegionKind::Air, existing_upper, upper));
            }
        }
        SimulationExtent::Expand(cells) => {
            let [lower_cells, upper_cells] = cells[axis.index()];
            if lower_cells != 0 {
                let lower = existing_lower - nonmetal_res * lower_cells as f64;
                types.insert(0, BoundedType::new(RegionKind::Air, lower, existing_lower));
            }
            if upper_cells != 0 {
                let upper = existing_upper + nonmetal_res * upper_cells as f64;
                types.push(BoundedType::new(RegionKind::Air, existing_upper, upper));
            }
        }
    }

    let sim_bounds = match (types.first(), types.last()) {
        (Some(first), Some(last)) => (first.lower, last.upper),
        _ => return Err(MeshError::EmptyGeometry),
    };
    debug!(%axis, lower = sim_bounds.0, upper = sim_bounds.1, "resolved simulation bounds");
    Ok(sim_bounds)
}

// =============================================================================
// METAL BOUNDS
// =============================================================================

/// Endpoints of every non-degenerate metal interval, sorted and deduplicated
/// with fixed lines taking precedence.
pub fn metal_bounds(types: &[BoundedType], fixed: &[f64], tol: &Tolerance) -> Vec<f64> {
    let mut bounds: Vec<f64> = types
        .iter()
        .filter(|bt| bt.is_metal() && !tol.eq(bt.lower, bt.upper))
        .flat_map(|bt| [bt.lower, bt.upper])
        .collect();
    bounds.sort_by(f64::total_cmp);
    remove_duplicates(&bounds, fixed, tol)
}

/// Intervals ordered by ascending size. Equal sizes keep position order.
pub fn size_ordered(types: &[BoundedType]) -> Vec<BoundedType> {
    let mut ordered = types.to_vec();
    ordered.sort_by(|a, b| a.size().total_cmp(&b.size()));
    ordered
}
