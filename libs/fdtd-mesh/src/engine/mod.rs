//! # Mesh Engine
//!
//! Owns the mesh lines of a simulation and drives generation end to end.
//!
//! ## Pipeline
//!
//! ```text
//! primitives -> per-axis meshing (parallel) -> commit -> grid sink
//!            -> PML display -> post-mesh -> advisory report
//! ```
//!
//! The three axes are meshed independently. Lines are committed only when
//! all of them succeed, so a failed build leaves the previous lines in place.

mod axis;


use crate::error::{MeshError, MeshResult};
use crate::generator::linspace;
use crate::geometry::{
    physical_primitives, total_bounds, Axis, BoundarySide, BoundingBox, IdAllocator,
    PhysicalPrimitive, Primitive,
};
use crate::lines::MeshLineSet;
use crate::pml::pml_boxes;
use crate::report::{check_pml_structure, check_pml_uniformity, check_smoothness, MeshReport};
use crate::settings::{MeshConfig, PmlCells, SimulationContext};
use crate::sink::GridSink;
use axis::{AxisBuild, AxisOutcome};
use glam::DVec3;
use rayon::prelude::*;
use tracing::{info, warn};

/// State of a successful build.
#[derive(Debug, Clone)]
struct BuiltMesh {
    lines: [MeshLineSet; 3],
    fixed: [Vec<f64>; 3],
    sim_bounds: BoundingBox,
    pml: PmlCells,
    primitives: Vec<PhysicalPrimitive>,
}

/// Which sink notifications a finalization sends.
#[derive(Debug, Clone, Copy)]
struct Finalize {
    show_pml: bool,
    post_mesh: bool,
}

/// Rectilinear FDTD mesh generator.
///
/// # Example
///
/// ```rust
/// use fdtd_mesh::geometry::PhysicalPrimitive;
/// use fdtd_mesh::{Axis, FrequencyContext, MeshConfig, MeshEngine, PmlCells, RectilinearGrid};
/// use glam::DVec3;
///
/// let ctx = FrequencyContext::new(10e9, 1e-3).with_pml(PmlCells::none());
/// let board = PhysicalPrimitive::dielectric(DVec3::ZERO, DVec3::new(10.0, 10.0, 1.6));
///
/// let mut engine = MeshEngine::new(MeshConfig::default()).unwrap();
/// let mut grid = RectilinearGrid::new();
/// engine.build(&ctx, &[board], &mut grid).unwrap();
///
/// assert_eq!(grid.lines(Axis::Z), engine.lines(Axis::Z));
/// assert!(engine.lines(Axis::Z).windows(2).all(|w| w[1] > w[0]));
/// ```
#[derive(Debug, Clone)]
pub struct MeshEngine {
    config: MeshConfig,
    user_fixed: [Vec<f64>; 3],
    state: Option<BuiltMesh>,
    ids: IdAllocator,
}

impl MeshEngine {
    /// Creates an engine with no lines.
    ///
    /// # Errors
    ///
    /// [`MeshError::Configuration`] for an invalid configuration.
    pub fn new(config: MeshConfig) -> MeshResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            user_fixed: Default::default(),
            state: None,
            ids: IdAllocator::new(),
        })
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    /// True once a build committed lines.
    pub fn is_built(&self) -> bool {
        self.state.is_some()
    }

    /// Current lines of `axis`, sorted ascending. Empty before a build.
    pub fn lines(&self, axis: Axis) -> &[f64] {
        self.state
            .as_ref()
            .map(|state| state.lines[axis.index()].as_slice())
            .unwrap_or_default()
    }

    /// Fixed lines of `axis` from the last build.
    pub fn fixed_lines(&self, axis: Axis) -> &[f64] {
        self.state
            .as_ref()
            .map(|state| state.fixed[axis.index()].as_slice())
            .unwrap_or_default()
    }

    /// Simulation bounds from the last build.
    ///
    /// These span the final lines, so surplus air trimmed for the PML is
    /// not included.
    pub fn simulation_bounds(&self) -> Option<BoundingBox> {
        self.state.as_ref().map(|state| state.sim_bounds)
    }

    fn built(&self) -> MeshResult<&BuiltMesh> {
        self.state.as_ref().ok_or_else(not_built)
    }

    // =========================================================================
    // BUILD
    // =========================================================================

    /// Registers a line that must appear in the next build.
    ///
    /// # Errors
    ///
    /// [`MeshError::Configuration`] for a non-finite position or when the
    /// mesh was already built.
    pub fn add_fixed_line(&mut self, axis: Axis, position: f64) -> MeshResult<()> {
        if self.state.is_some() {
            return Err(MeshError::configuration(
                "fixed lines must be registered before the mesh is built",
            ));
        }
        if !position.is_finite() {
            return Err(MeshError::configuration(format!(
                "fixed line on axis {axis} must be finite, got {position}"
            )));
        }
        let fixed = &mut self.user_fixed[axis.index()];
        fixed.push(position);
        fixed.sort_by(f64::total_cmp);
        Ok(())
    }

    /// Builds the mesh from the full primitive set of the geometry kernel.
    ///
    /// Primitives without a conductor or dielectric property are ignored.
    pub fn build_from_primitives(
        &mut self,
        ctx: &dyn SimulationContext,
        prims: &[Primitive],
        sink: &mut dyn GridSink,
    ) -> MeshResult<MeshReport> {
        self.build(ctx, &physical_primitives(prims), sink)
    }

    /// Generates lines on all three axes and publishes them to `sink`.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Wavelength and PML queries of the owning simulation
    /// * `prims` - Conductor and dielectric primitives
    /// * `sink` - Receives the lines, the PML display and the post-mesh call
    ///
    /// # Returns
    ///
    /// Advisory findings on the finished mesh.
    ///
    /// # Errors
    ///
    /// - [`MeshError::EmptyGeometry`] without primitives
    /// - [`MeshError::Configuration`] for invalid settings or simulation
    ///   bounds that cut geometry
    /// - [`MeshError::GeometricSeries`] or [`MeshError::PmlGrowth`] when line
    ///   placement fails
    ///
    /// On error no lines are committed and nothing is sent to `sink`.
    pub fn build(
        &mut self,
        ctx: &dyn SimulationContext,
        prims: &[PhysicalPrimitive],
        sink: &mut dyn GridSink,
    ) -> MeshResult<MeshReport> {
        if prims.is_empty() {
            return Err(MeshError::EmptyGeometry);
        }
        let resolved = self.config.resolve(ctx.min_wavelength())?;
        let pml = ctx.pml_cells();
        info!(
            primitives = prims.len(),
            bounds = ?total_bounds(prims),
            metal_res = resolved.metal_res,
            nonmetal_res = resolved.nonmetal_res,
            "generating mesh"
        );

        let user_fixed = &self.user_fixed;
        let outcomes = Axis::ALL
            .par_iter()
            .map(|&axis| {
                AxisBuild::new(axis, prims, &user_fixed[axis.index()], &resolved)?.run(&pml)
            })
            .collect::<MeshResult<Vec<AxisOutcome>>>()?;

        let mut lines: [MeshLineSet; 3] = Default::default();
        let mut fixed: [Vec<f64>; 3] = Default::default();
        let mut min = DVec3::ZERO;
        let mut max = DVec3::ZERO;
        for outcome in outcomes {
            let idx = outcome.axis.index();
            lines[idx] = outcome.lines;
            fixed[idx] = outcome.fixed;
            min[idx] = outcome.sim_bounds.0;
            max[idx] = outcome.sim_bounds.1;
        }

        self.state = Some(BuiltMesh {
            lines,
            fixed,
            sim_bounds: BoundingBox::new(min, max),
            pml,
            primitives: prims.to_vec(),
        });

        let report = self.finalize(
            sink,
            Finalize {
                show_pml: self.config.show_pml,
                post_mesh: true,
            },
        )?;
        info!(
            x = self.lines(Axis::X).len(),
            y = self.lines(Axis::Y).len(),
            z = self.lines(Axis::Z).len(),
            clean = report.is_clean(),
            "mesh generated"
        );
        Ok(report)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Index and position of the line nearest to `position`.
    pub fn nearest_line(&self, axis: Axis, position: f64) -> Option<(usize, f64)> {
        self.state
            .as_ref()
            .and_then(|state| state.lines[axis.index()].nearest(position))
    }

    /// Position of line `index` on `axis`.
    ///
    /// # Errors
    ///
    /// [`MeshError::InvalidIndex`] when out of range.
    pub fn line_at(&self, axis: Axis, index: usize) -> MeshResult<f64> {
        let lines = self.lines(axis);
        lines
            .get(index)
            .copied()
            .ok_or_else(|| MeshError::invalid_index(axis, index, lines.len()))
    }

    /// Box spanned by the lines, with or without the PML slabs.
    ///
    /// # Errors
    ///
    /// [`MeshError::Configuration`] before a build, [`MeshError::InvalidIndex`]
    /// when an axis has too few lines for its PML.
    pub fn simulation_box(&self, include_pml: bool) -> MeshResult<BoundingBox> {
        let state = self.built()?;
        let mut min = DVec3::ZERO;
        let mut max = DVec3::ZERO;
        for axis in Axis::ALL {
            let lines = state.lines[axis.index()].as_slice();
            let len = lines.len();
            let (lower, upper) = if include_pml {
                (0, len.checked_sub(1))
            } else {
                let upper_cells = state.pml.upper(axis);
                (state.pml.lower(axis), len.checked_sub(1 + upper_cells))
            };
            let upper = upper.ok_or_else(|| MeshError::invalid_index(axis, len, len))?;
            let (Some(&lo), Some(&hi)) = (lines.get(lower), lines.get(upper)) else {
                return Err(MeshError::invalid_index(axis, lower, len));
            };
            min[axis.index()] = lo;
            max[axis.index()] = hi;
        }
        Ok(BoundingBox::new(min, max))
    }

    /// The six PML slabs in (xmin, xmax, ymin, ymax, zmin, zmax) order.
    ///
    /// # Errors
    ///
    /// [`MeshError::Configuration`] before a build, [`MeshError::InvalidIndex`]
    /// when an axis has too few lines for its PML.
    pub fn pml_boxes(&self) -> MeshResult<[BoundingBox; 6]> {
        let state = self.built()?;
        let [x, y, z] = &state.lines;
        pml_boxes([x.as_slice(), y.as_slice(), z.as_slice()], &state.pml)
    }

    /// Lines of every axis that fall inside `bounds`.
    pub fn lines_in_box(&self, bounds: &BoundingBox) -> [Vec<f64>; 3] {
        Axis::ALL.map(|axis| {
            let (lower, upper) = bounds.bounds(axis);
            self.state.as_ref().map_or_else(Vec::new, |state| {
                state.lines[axis.index()].within(lower, upper).to_vec()
            })
        })
    }

    // =========================================================================
    // EDITING
    // =========================================================================

    /// Inserts one line after the mesh was built and republishes.
    ///
    /// # Errors
    ///
    /// [`MeshError::Configuration`] before a build or for a non-finite
    /// position.
    pub fn add_manual_line(
        &mut self,
        axis: Axis,
        position: f64,
        sink: &mut dyn GridSink,
    ) -> MeshResult<MeshReport> {
        if !position.is_finite() {
            return Err(MeshError::configuration(format!(
                "line on axis {axis} must be finite, got {position}"
            )));
        }
        let tol = self.config.tolerance;
        let state = self.state.as_mut().ok_or_else(not_built)?;
        let idx = axis.index();
        state.lines[idx].insert(&[position], &state.fixed[idx], &tol);
        self.finalize(
            sink,
            Finalize {
                show_pml: false,
                post_mesh: true,
            },
        )
    }

    /// Respaces the lines `lower..=upper` on `axis` evenly.
    ///
    /// The end lines stay in place; the lines between them are replaced.
    ///
    /// # Errors
    ///
    /// - [`MeshError::InvalidIndex`] when `upper` is out of range
    /// - [`MeshError::Configuration`] when `lower` is not below `upper`
    /// - [`MeshError::ImmovableLine`] when a fixed line lies in the range
    /// - [`MeshError::SmoothnessConflict`] when the new spacing would break
    ///   the smoothness bound against a neighboring cell
    ///
    /// Lines are unchanged on error.
    pub fn set_lines_equidistant(
        &mut self,
        axis: Axis,
        lower: usize,
        upper: usize,
        sink: &mut dyn GridSink,
    ) -> MeshResult<MeshReport> {
        let tol = self.config.tolerance;
        let smoothness = self.config.smoothness[axis.index()];
        let state = self.state.as_mut().ok_or_else(not_built)?;
        let idx = axis.index();
        let all = state.lines[idx].as_slice();
        let len = all.len();

        if upper >= len {
            return Err(MeshError::invalid_index(axis, upper, len));
        }
        if lower >= upper {
            return Err(MeshError::configuration(format!(
                "equidistant range on axis {axis} must increase, got {lower}..={upper}"
            )));
        }
        if upper - lower == 1 {
            warn!(%axis, lower, upper, "equidistant range spans a single cell, nothing to respace");
        }
        if let Some(&position) = all[lower..=upper]
            .iter()
            .find(|&&line| tol.contains(&state.fixed[idx], line))
        {
            return Err(MeshError::ImmovableLine { axis, position });
        }

        let (first, last) = (all[lower], all[upper]);
        let spacing = (last - first) / (upper - lower) as f64;
        let neighbors = [
            lower.checked_sub(1).map(|prev| first - all[prev]),
            all.get(upper + 1).map(|&next| next - last),
        ];
        for neighbor in neighbors.into_iter().flatten() {
            let ratio = (neighbor / spacing).max(spacing / neighbor);
            if tol.gt(ratio, smoothness) {
                return Err(MeshError::SmoothnessConflict {
                    axis,
                    spacing,
                    neighbor,
                    smoothness,
                });
            }
        }

        let evenly = linspace(first, last, upper - lower + 1);
        let fixed = &state.fixed[idx];
        let lines = &mut state.lines[idx];
        lines.clear_range(first, last, &tol);
        lines.insert(&evenly, fixed, &tol);

        self.finalize(
            sink,
            Finalize {
                show_pml: false,
                post_mesh: false,
            },
        )
    }

    // =========================================================================
    // FINALIZATION
    // =========================================================================

    /// Publishes the committed lines and runs the advisory checks.
    fn finalize(&mut self, sink: &mut dyn GridSink, stage: Finalize) -> MeshResult<MeshReport> {
        let state = self.built()?;
        for axis in Axis::ALL {
            sink.clear_lines(axis);
            for &line in state.lines[axis.index()].as_slice() {
                sink.add_line(axis, line);
            }
        }

        if stage.show_pml {
            self.display_pml(sink)?;
        }
        if stage.post_mesh {
            sink.post_mesh();
        }
        self.report()
    }

    fn display_pml(&mut self, sink: &mut dyn GridSink) -> MeshResult<()> {
        let boxes = self.pml_boxes()?;
        for (side, slab) in BoundarySide::ALL.into_iter().zip(boxes) {
            if slab.has_zero_dim() {
                continue;
            }
            let name = self.ids.name(&format!("pml_{side}"));
            sink.show_pml(&name, side, &slab);
        }
        Ok(())
    }

    fn report(&self) -> MeshResult<MeshReport> {
        let state = self.built()?;
        let tol = &self.config.tolerance;
        let mut report = MeshReport::default();

        for axis in Axis::ALL {
            report.smoothness_violations.extend(check_smoothness(
                axis,
                state.lines[axis.index()].as_slice(),
                self.config.smoothness[axis.index()],
                tol,
            ));
        }

        // Too few lines for the PML is reported by the accessors instead
        let Ok(boxes) = self.pml_boxes() else {
            return Ok(report);
        };
        for (side, slab) in BoundarySide::ALL.into_iter().zip(boxes) {
            if slab.has_zero_dim() {
                continue;
            }
            let inside = self.lines_in_box(&slab);
            report.pml_nonuniformities.extend(check_pml_uniformity(
                side,
                &inside[side.axis().index()],
                tol,
            ));
            report.structural_nonuniformities.extend(check_pml_structure(
                side,
                &slab,
                &inside,
                &state.primitives,
                tol,
            ));
        }
        Ok(report)
    }
}

fn not_built() -> MeshError {
    MeshError::configuration("mesh has not been built")
}
