//! # Mesh Settings
//!
//! User-facing mesh configuration and the read-only view of the owning
//! simulation. Resolutions are stored as fractions of the minimum wavelength
//! and scaled to lengths by [`MeshConfig::resolve`] once the simulation
//! context is known.
//!
//! ## Example
//!
//! ```rust
//! use fdtd_mesh::{FrequencyContext, MeshConfig, SimulationContext};
//!
//! let ctx = FrequencyContext::new(10e9, 1e-3);
//! let config = MeshConfig::default().with_min_lines(7);
//! let scaled = config.resolve(ctx.min_wavelength()).unwrap();
//! assert!((scaled.metal_res - ctx.min_wavelength() / 20.0).abs() < 1e-12);
//! ```

use crate::error::{MeshError, MeshResult};
use crate::geometry::{Axis, BoundarySide};
use crate::tolerance::Tolerance;
use config::constants::{
    wavelength, DEFAULT_EXPANSION_CELLS, DEFAULT_METAL_RES, DEFAULT_MIN_LINES,
    DEFAULT_NONMETAL_RES, DEFAULT_PML_CELLS, DEFAULT_SMOOTHNESS,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// SIMULATION EXTENT
// =============================================================================

/// How the outer simulation bounds are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimulationExtent {
    /// Grow the geometry's bounding box by `[[lower, upper]; 3]` cells of the
    /// nonmetal resolution.
    Expand([[usize; 2]; 3]),
    /// Exact `[[lower, upper]; 3]` bounds. They may not cut into geometry.
    Absolute([[f64; 2]; 3]),
}

impl Default for SimulationExtent {
    fn default() -> Self {
        SimulationExtent::Expand([[DEFAULT_EXPANSION_CELLS; 2]; 3])
    }
}

// =============================================================================
// PML CELL COUNTS
// =============================================================================

/// PML cell counts per axis and side, as `[[lower, upper]; 3]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PmlCells(pub [[usize; 2]; 3]);

impl PmlCells {
    /// Same count on all six sides.
    pub fn uniform(cells: usize) -> Self {
        Self([[cells; 2]; 3])
    }

    /// No PML on any side.
    pub fn none() -> Self {
        Self::uniform(0)
    }

    /// Cell count at one side.
    #[inline]
    pub fn get(&self, side: BoundarySide) -> usize {
        self.0[side.axis().index()][usize::from(!side.is_lower())]
    }

    #[inline]
    pub fn lower(&self, axis: Axis) -> usize {
        self.0[axis.index()][0]
    }

    #[inline]
    pub fn upper(&self, axis: Axis) -> usize {
        self.0[axis.index()][1]
    }
}

impl Default for PmlCells {
    fn default() -> Self {
        Self::uniform(DEFAULT_PML_CELLS)
    }
}

// =============================================================================
// SIMULATION CONTEXT
// =============================================================================

/// Read-only queries the mesher makes against the simulation that owns it.
///
/// The simulation owns the engine; the engine only borrows this view for the
/// duration of a call and never mutates through it.
pub trait SimulationContext: Sync {
    /// Smallest wavelength of interest, in drawing units.
    fn min_wavelength(&self) -> f64;

    /// PML cell counts of the boundary conditions.
    fn pml_cells(&self) -> PmlCells;
}

/// Simulation context derived from a maximum frequency.
///
/// # Example
///
/// ```rust
/// use fdtd_mesh::{FrequencyContext, PmlCells, SimulationContext};
///
/// let ctx = FrequencyContext::new(1e9, 1.0).with_pml(PmlCells::uniform(4));
/// assert!((ctx.min_wavelength() - 0.299_792_458).abs() < 1e-12);
/// assert_eq!(ctx.pml_cells(), PmlCells::uniform(4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyContext {
    /// Highest simulated frequency in hertz.
    pub max_frequency: f64,
    /// Length of one drawing unit in meters.
    pub unit: f64,
    pub pml: PmlCells,
}

impl FrequencyContext {
    /// Context with the default PML on every side.
    pub fn new(max_frequency: f64, unit: f64) -> Self {
        Self {
            max_frequency,
            unit,
            pml: PmlCells::default(),
        }
    }

    pub fn with_pml(mut self, pml: PmlCells) -> Self {
        self.pml = pml;
        self
    }
}

impl SimulationContext for FrequencyContext {
    fn min_wavelength(&self) -> f64 {
        wavelength(self.max_frequency, self.unit)
    }

    fn pml_cells(&self) -> PmlCells {
        self.pml
    }
}

// =============================================================================
// MESH CONFIGURATION
// =============================================================================

/// Mesh generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    /// Metal resolution as a fraction of the minimum wavelength.
    pub metal_res: f64,
    /// Nonmetal resolution as a fraction of the minimum wavelength.
    pub nonmetal_res: f64,
    /// Maximum ratio between adjacent cells, per axis.
    pub smoothness: [f64; 3],
    /// Minimum number of lines across any non-degenerate interval.
    pub min_lines: usize,
    pub extent: SimulationExtent,
    pub tolerance: Tolerance,
    /// Ask the grid sink to display the PML slabs after meshing.
    pub show_pml: bool,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            metal_res: DEFAULT_METAL_RES,
            nonmetal_res: DEFAULT_NONMETAL_RES,
            smoothness: [DEFAULT_SMOOTHNESS; 3],
            min_lines: DEFAULT_MIN_LINES,
            extent: SimulationExtent::default(),
            tolerance: Tolerance::default(),
            show_pml: true,
        }
    }
}

impl MeshConfig {
    pub fn with_metal_res(mut self, metal_res: f64) -> Self {
        self.metal_res = metal_res;
        self
    }

    pub fn with_nonmetal_res(mut self, nonmetal_res: f64) -> Self {
        self.nonmetal_res = nonmetal_res;
        self
    }

    pub fn with_smoothness(mut self, smoothness: [f64; 3]) -> Self {
        self.smoothness = smoothness;
        self
    }

    pub fn with_min_lines(mut self, min_lines: usize) -> Self {
        self.min_lines = min_lines;
        self
    }

    pub fn with_extent(mut self, extent: SimulationExtent) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_show_pml(mut self, show_pml: bool) -> Self {
        self.show_pml = show_pml;
        self
    }

    /// Checks every parameter for a usable value.
    ///
    /// # Errors
    ///
    /// [`MeshError::Configuration`] naming the first offending parameter.
    pub fn validate(&self) -> MeshResult<()> {
        if !(self.metal_res > 0.0 && self.metal_res.is_finite()) {
            return Err(MeshError::configuration(format!(
                "metal resolution must be positive, got {}",
                self.metal_res
            )));
        }
        if !(self.nonmetal_res > 0.0 && self.nonmetal_res.is_finite()) {
            return Err(MeshError::configuration(format!(
                "nonmetal resolution must be positive, got {}",
                self.nonmetal_res
            )));
        }
        for axis in Axis::ALL {
            let smooth = self.smoothness[axis.index()];
            if !(smooth > 1.0 && smooth.is_finite()) {
                return Err(MeshError::configuration(format!(
                    "smoothness on axis {axis} must exceed one, got {smooth}"
                )));
            }
        }
        if self.min_lines < 2 {
            return Err(MeshError::configuration(format!(
                "at least two lines per interval are required, got {}",
                self.min_lines
            )));
        }
        if !(self.tolerance.epsilon >= 0.0 && self.tolerance.epsilon.is_finite()) {
            return Err(MeshError::configuration(format!(
                "tolerance must be non-negative, got {}",
                self.tolerance.epsilon
            )));
        }
        if let SimulationExtent::Absolute(bounds) = self.extent {
            for axis in Axis::ALL {
                let [lower, upper] = bounds[axis.index()];
                if !(lower < upper) {
                    return Err(MeshError::configuration(format!(
                        "simulation bounds on axis {axis} must increase, got [{lower}, {upper}]"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Validates and scales resolutions by the minimum wavelength.
    ///
    /// # Errors
    ///
    /// [`MeshError::Configuration`] for an invalid configuration or a
    /// non-positive wavelength.
    pub fn resolve(&self, min_wavelength: f64) -> MeshResult<ResolvedConfig> {
        self.validate()?;
        if !(min_wavelength > 0.0 && min_wavelength.is_finite()) {
            return Err(MeshError::configuration(format!(
                "minimum wavelength must be positive, got {min_wavelength}"
            )));
        }
        Ok(ResolvedConfig {
            metal_res: self.metal_res * min_wavelength,
            nonmetal_res: self.nonmetal_res * min_wavelength,
            smoothness: self.smoothness,
            min_lines: self.min_lines,
            extent: self.extent,
            tolerance: self.tolerance,
        })
    }
}

/// Configuration with resolutions in drawing units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedConfig {
    pub metal_res: f64,
    pub nonmetal_res: f64,
    pub smoothness: [f64; 3],
    pub min_lines: usize,
    pub extent: SimulationExtent,
    pub tolerance: Tolerance,
}

impl ResolvedConfig {
    /// Target resolution for a material class.
    #[inline]
    pub fn resolution(&self, is_metal: bool) -> f64 {
        if is_metal {
            self.metal_res
        } else {
            self.nonmetal_res
        }
    }

    #[inline]
    pub fn smoothness(&self, axis: Axis) -> f64 {
        self.smoothness[axis.index()]
    }
}
