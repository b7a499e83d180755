//! Line generation for a single axis.
//!
//! Axes never share state while meshing, so each one runs in its own
//! [`AxisBuild`] and the engine only commits the results once every axis
//! succeeded.

use crate::bounded::{
    boundaries, build_bounded_types, expand_to_simulation_bounds, fixed_lines, metal_bounds,
    size_ordered, BoundedType, RegionKind,
};
use crate::error::{MeshError, MeshResult};
use crate::generator::LineGenerator;
use crate::geometry::{Axis, BoundarySide, PhysicalPrimitive};
use crate::lines::MeshLineSet;
use crate::pml::PmlSmoother;
use crate::settings::{PmlCells, ResolvedConfig, SimulationExtent};
use crate::thirds::{BoundaryNeighbor, MetalAdjacencyPolicy};
use crate::tolerance::Tolerance;
use tracing::debug;

/// Finished lines of one axis.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AxisOutcome {
    pub axis: Axis,
    pub lines: MeshLineSet,
    pub fixed: Vec<f64>,
    /// Span of the final lines, after trimming.
    pub sim_bounds: (f64, f64),
}

/// Working state while meshing one axis.
#[derive(Debug, Clone)]
pub(crate) struct AxisBuild<'a> {
    axis: Axis,
    cfg: &'a ResolvedConfig,
    fixed: Vec<f64>,
    /// Intervals in position order.
    types: Vec<BoundedType>,
    /// Intervals in meshing order, smallest first.
    ordered: Vec<BoundedType>,
    metal_bounds: Vec<f64>,
    /// Expanded bounds before trimming.
    sim_bounds: (f64, f64),
    /// Unshifted bounds of every interval meshed so far.
    meshed: Vec<(f64, f64)>,
    lines: MeshLineSet,
}

impl<'a> AxisBuild<'a> {
    /// Classifies the axis and expands it to the simulation bounds.
    ///
    /// # Errors
    ///
    /// [`MeshError::Configuration`] when absolute simulation bounds cut into
    /// geometry, [`MeshError::EmptyGeometry`] without primitives.
    pub fn new(
        axis: Axis,
        prims: &[PhysicalPrimitive],
        user_fixed: &[f64],
        cfg: &'a ResolvedConfig,
    ) -> MeshResult<Self> {
        let tol = &cfg.tolerance;
        let fixed = fixed_lines(prims, axis, user_fixed, tol);
        let bounds = boundaries(prims, axis, &fixed, tol);
        let mut types = build_bounded_types(prims, axis, &bounds, &fixed, tol);
        let sim_bounds =
            expand_to_simulation_bounds(&mut types, axis, &cfg.extent, cfg.nonmetal_res, tol)?;
        let metal_bounds = metal_bounds(&types, &fixed, tol);
        let ordered = size_ordered(&types);

        debug!(
            %axis,
            intervals = types.len(),
            fixed = fixed.len(),
            metal_bounds = metal_bounds.len(),
            "classified axis"
        );

        Ok(Self {
            axis,
            cfg,
            fixed,
            types,
            ordered,
            metal_bounds,
            sim_bounds,
            meshed: Vec::new(),
            lines: MeshLineSet::new(),
        })
    }

    /// Meshes every interval, trims surplus air and levels the PML slabs.
    ///
    /// # Errors
    ///
    /// Any series or PML failure, or [`MeshError::Configuration`] when the
    /// axis ends up with too few lines to hold its PML.
    pub fn run(mut self, pml: &PmlCells) -> MeshResult<AxisOutcome> {
        self.mesh_all()?;
        self.trim(pml);
        self.smooth_pml(pml)?;

        let required = pml.lower(self.axis).max(pml.upper(self.axis));
        let sim_bounds = match self.lines.first().zip(self.lines.last()) {
            Some(bounds) if self.lines.len() > required => bounds,
            _ => {
                return Err(MeshError::configuration(format!(
                    "axis {} has {} lines, too few for a PML of {required} cells",
                    self.axis,
                    self.lines.len()
                )))
            }
        };

        debug!(axis = %self.axis, lines = self.lines.len(), "axis meshed");
        Ok(AxisOutcome {
            axis: self.axis,
            lines: self.lines,
            fixed: self.fixed,
            sim_bounds,
        })
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    #[inline]
    fn tol(&self) -> &Tolerance {
        &self.cfg.tolerance
    }

    fn is_fixed(&self, pos: f64) -> bool {
        self.tol().contains(&self.fixed, pos)
    }

    fn is_metal_bound(&self, pos: f64) -> bool {
        self.tol().contains(&self.metal_bounds, pos)
    }

    /// True when `pos` lies inside an interval that has been meshed.
    fn pos_meshed(&self, pos: f64) -> bool {
        let tol = self.tol();
        self.meshed
            .iter()
            .any(|&(lower, upper)| tol.within(pos, lower, upper))
    }

    /// First sheet-free interval ending at `pos`.
    fn type_below(&self, pos: f64) -> Option<&BoundedType> {
        let tol = self.tol();
        self.types
            .iter()
            .find(|bt| !bt.is_degenerate() && tol.eq(bt.upper, pos))
    }

    /// First sheet-free interval starting at `pos`.
    fn type_above(&self, pos: f64) -> Option<&BoundedType> {
        let tol = self.tol();
        self.types
            .iter()
            .find(|bt| !bt.is_degenerate() && tol.eq(bt.lower, pos))
    }

    fn neighbor_below(&self, pos: f64) -> BoundaryNeighbor {
        let neighbor = self.type_below(pos);
        BoundaryNeighbor {
            gap: self.lines.below(pos, self.tol()).map(|(_, line)| pos - line),
            meshed: neighbor.is_some_and(|bt| self.pos_meshed(bt.midpoint())),
            kind: neighbor.map(|bt| bt.kind),
            movable_metal_bound: self.is_metal_bound(pos) && !self.is_fixed(pos),
        }
    }

    fn neighbor_above(&self, pos: f64) -> BoundaryNeighbor {
        let neighbor = self.type_above(pos);
        BoundaryNeighbor {
            gap: self.lines.above(pos, self.tol()).map(|(_, line)| line - pos),
            meshed: neighbor.is_some_and(|bt| self.pos_meshed(bt.midpoint())),
            kind: neighbor.map(|bt| bt.kind),
            movable_metal_bound: self.is_metal_bound(pos) && !self.is_fixed(pos),
        }
    }

    /// Span that trimming keeps: every interval that is not air and every
    /// fixed line.
    fn kept_extent(&self) -> Option<(f64, f64)> {
        self.types
            .iter()
            .filter(|bt| bt.kind != RegionKind::Air)
            .flat_map(|bt| [bt.lower, bt.upper])
            .chain(self.fixed.iter().copied())
            .fold(None, |acc, pos| match acc {
                None => Some((pos, pos)),
                Some((lo, hi)) => Some((f64::min(lo, pos), f64::max(hi, pos))),
            })
    }

    // =========================================================================
    // INTERVAL MESHING
    // =========================================================================

    /// Meshes the intervals smallest first.
    fn mesh_all(&mut self) -> MeshResult<()> {
        for idx in 0..self.ordered.len() {
            let bt = self.ordered[idx];
            self.mesh_interval(&bt)?;
        }
        Ok(())
    }

    /// Generates the lines of one interval and merges them in.
    fn mesh_interval(&mut self, bt: &BoundedType) -> MeshResult<()> {
        let tol = self.cfg.tolerance;
        if bt.is_degenerate() {
            self.lines.insert(&[bt.lower], &self.fixed, &tol);
            self.meshed.push((bt.lower, bt.upper));
            return Ok(());
        }

        let is_metal = bt.is_metal();
        let resolution = self.cfg.resolution(is_metal);
        let base = resolution.min(bt.size() / (self.cfg.min_lines - 1) as f64);
        let policy = MetalAdjacencyPolicy::new(self.cfg.metal_res);
        let lower_spacing = policy.boundary_spacing(base, &self.neighbor_below(bt.lower));
        let upper_spacing = policy.boundary_spacing(base, &self.neighbor_above(bt.upper));

        let generator = LineGenerator::new(
            self.cfg.min_lines,
            self.cfg.smoothness(self.axis),
            tol,
            &self.fixed,
        );
        let (mut lower, mut upper) = (bt.lower, bt.upper);
        let mut lines = generator.generate(lower, upper, lower_spacing, upper_spacing, resolution)?;

        if let Some((first, last)) = edge_spacings(&lines) {
            if is_metal {
                if !tol.eq(lower, self.sim_bounds.0) && !self.is_fixed(lower) {
                    let metal_neighbor = self.pos_meshed(lower)
                        && self.type_below(lower).is_some_and(BoundedType::is_metal);
                    lower += policy.metal_shift(first, metal_neighbor);
                }
                if !tol.eq(upper, self.sim_bounds.1) && !self.is_fixed(upper) {
                    let metal_neighbor = self.pos_meshed(upper)
                        && self.type_above(upper).is_some_and(BoundedType::is_metal);
                    upper -= policy.metal_shift(last, metal_neighbor);
                }
                (lower, upper) = uncrossed(lower, upper, &tol);
                lines = generator.generate(lower, upper, lower_spacing, upper_spacing, resolution)?;
            } else {
                let mut shifted = false;
                if self.is_metal_bound(lower) {
                    lower += policy.nonmetal_shift(first);
                    shifted = true;
                }
                if self.is_metal_bound(upper) {
                    upper -= policy.nonmetal_shift(last);
                    shifted = true;
                }
                if shifted {
                    (lower, upper) = uncrossed(lower, upper, &tol);
                    lines =
                        generator.generate(lower, upper, lower_spacing, upper_spacing, resolution)?;
                }
            }
        }

        debug!(
            axis = %self.axis,
            kind = ?bt.kind,
            lower = bt.lower,
            upper = bt.upper,
            lower_spacing,
            upper_spacing,
            count = lines.len(),
            "meshed interval"
        );
        self.lines.insert(&lines, &self.fixed, &tol);
        self.meshed.push((bt.lower, bt.upper));
        Ok(())
    }

    // =========================================================================
    // TRIMMING AND PML
    // =========================================================================

    /// Drops air lines beyond what the PML needs outside the geometry and
    /// the fixed lines.
    ///
    /// Only expanded extents are trimmed; absolute bounds are kept as given.
    fn trim(&mut self, pml: &PmlCells) {
        if matches!(self.cfg.extent, SimulationExtent::Absolute(_)) {
            return;
        }
        let Some((lowest, highest)) = self.kept_extent() else {
            return;
        };
        let tol = self.cfg.tolerance;

        let lower_cells = pml.lower(self.axis);
        if lower_cells > 0 {
            if let Some((idx, _)) = self.lines.below(lowest, &tol) {
                if idx > lower_cells {
                    self.lines.remove(0..idx - lower_cells);
                    debug!(axis = %self.axis, removed = idx - lower_cells, "trimmed lower air");
                }
            }
        }

        let upper_cells = pml.upper(self.axis);
        if upper_cells > 0 {
            if let Some((idx, _)) = self.lines.above(highest, &tol) {
                let len = self.lines.len();
                let beyond = len - 1 - idx;
                if beyond > upper_cells {
                    let removed = beyond - upper_cells;
                    self.lines.remove(len - removed..len);
                    debug!(axis = %self.axis, removed, "trimmed upper air");
                }
            }
        }
    }

    fn smooth_pml(&mut self, pml: &PmlCells) -> MeshResult<()> {
        let smoother = PmlSmoother {
            smoothness: self.cfg.smoothness(self.axis),
            tolerance: self.cfg.tolerance,
            fixed: &self.fixed,
            ordered: &self.ordered,
        };
        for lower in [true, false] {
            let side = BoundarySide::new(self.axis, lower);
            smoother.smooth(&mut self.lines, side, pml.get(side))?;
        }
        Ok(())
    }
}

/// Shifted interval bounds that passed each other meet halfway.
fn uncrossed(lower: f64, upper: f64, tol: &Tolerance) -> (f64, f64) {
    if tol.gt(lower, upper) {
        let mid = 0.5 * (lower + upper);
        (mid, mid)
    } else {
        (lower, upper)
    }
}

/// First and last spacing of a generated run.
fn edge_spacings(lines: &[f64]) -> Option<(f64, f64)> {
    let n = lines.len();
    if n < 2 {
        return None;
    }
    Some((lines[1] - lines[0], lines[n - 1] - lines[n - 2]))
}

#[cfg(test)]
impl AxisBuild<'_> {
    pub fn lines(&self) -> &[f64] {
        self.lines.as_slice()
    }

    pub fn types(&self) -> &[BoundedType] {
        &self.types
    }

    pub fn mesh(&mut self) -> MeshResult<()> {
        self.mesh_all()
    }

    pub fn trim_for(&mut self, pml: &PmlCells) {
        self.trim(pml);
    }
}
