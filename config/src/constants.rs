//! # Configuration Constants
//!
//! Centralized constants for the FDTD meshing pipeline. Tolerances, default
//! resolutions, smoothness bounds and numeric solver limits are defined here.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **Resolution**: Default mesh densities relative to the minimum wavelength
//! - **Boundaries**: Default expansion and PML cell counts
//! - **Solver**: Limits for the geometric-series root finders
//! - **Physics**: Physical constants used to derive the wavelength scale

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for comparing mesh line positions.
///
/// Two positions whose difference is within this tolerance (scaled by the
/// magnitude of the larger position when it exceeds one) are the same line.
///
/// # Example
///
/// ```rust
/// use config::constants::POSITION_EPSILON;
///
/// fn same_line(a: f64, b: f64) -> bool {
///     (a - b).abs() <= POSITION_EPSILON
/// }
///
/// assert!(same_line(0.5, 0.5 + 1e-13));
/// ```
pub const POSITION_EPSILON: f64 = 1e-10;

/// Relative tolerance for "roughly equal" spacings and extents.
///
/// Used when deciding whether two boundary spacings are equal enough to mesh
/// an interval uniformly, when two primitive extents tie during material
/// classification, and when a PML slab is already at its target spacing.
///
/// # Example
///
/// ```rust
/// use config::constants::SPACING_RTOL;
///
/// let (a, b): (f64, f64) = (1.0, 1.0005);
/// assert!((a - b).abs() <= SPACING_RTOL * b);
/// ```
pub const SPACING_RTOL: f64 = 1e-3;

// =============================================================================
// RESOLUTION CONSTANTS
// =============================================================================

/// Default conductor resolution as a fraction of the minimum wavelength.
///
/// # Example
///
/// ```rust
/// use config::constants::DEFAULT_METAL_RES;
///
/// let lmin = 20.0;
/// assert_eq!(DEFAULT_METAL_RES * lmin, 1.0);
/// ```
pub const DEFAULT_METAL_RES: f64 = 1.0 / 20.0;

/// Default dielectric and air resolution as a fraction of the minimum
/// wavelength.
///
/// # Example
///
/// ```rust
/// use config::constants::{DEFAULT_METAL_RES, DEFAULT_NONMETAL_RES};
///
/// assert!(DEFAULT_NONMETAL_RES > DEFAULT_METAL_RES);
/// ```
pub const DEFAULT_NONMETAL_RES: f64 = 1.0 / 10.0;

/// Default maximum ratio between two adjacent cell sizes.
///
/// # Example
///
/// ```rust
/// use config::constants::DEFAULT_SMOOTHNESS;
///
/// let (a, b): (f64, f64) = (1.0, 1.15);
/// assert!(a.max(b) / a.min(b) < DEFAULT_SMOOTHNESS);
/// ```
pub const DEFAULT_SMOOTHNESS: f64 = 1.2;

/// Default minimum number of lines spanning any non-degenerate interval.
///
/// Both interval endpoints count, so five lines make four cells.
pub const DEFAULT_MIN_LINES: usize = 5;

// =============================================================================
// BOUNDARY CONSTANTS
// =============================================================================

/// Default number of nonmetal-resolution cells added beyond the geometry on
/// each side of each axis.
///
/// # Example
///
/// ```rust
/// use config::constants::{DEFAULT_EXPANSION_CELLS, DEFAULT_PML_CELLS};
///
/// assert!(DEFAULT_EXPANSION_CELLS >= DEFAULT_PML_CELLS);
/// ```
pub const DEFAULT_EXPANSION_CELLS: usize = 8;

/// Default number of PML cells on each boundary.
pub const DEFAULT_PML_CELLS: usize = 8;

// =============================================================================
// SOLVER CONSTANTS
// =============================================================================

/// Initial guess for the geometric-series factor.
///
/// Root finding brackets the factor starting from this seed and widens the
/// bracket upward until the series overshoots the target distance.
pub const SERIES_FACTOR_SEED: f64 = 1.5;

/// Maximum iterations for a single bracketed root search.
pub const ROOT_MAX_ITERATIONS: usize = 200;

/// Absolute convergence tolerance of the bracketed root search.
pub const ROOT_TOLERANCE: f64 = 1e-14;

/// Upper limit on the number of terms in a single geometric series.
///
/// Safety limit so a degenerate spacing can not loop forever while the term
/// count is being increased.
///
/// # Example
///
/// ```rust
/// use config::constants::MAX_SERIES_TERMS;
///
/// let requested = 2_000_000;
/// assert!(requested > MAX_SERIES_TERMS);
/// ```
pub const MAX_SERIES_TERMS: usize = 1_000_000;

// =============================================================================
// PHYSICAL CONSTANTS
// =============================================================================

/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Free-space wavelength in drawing units.
///
/// # Arguments
///
/// * `frequency` - Frequency in Hz
/// * `unit` - Size of one drawing unit in meters (1e-3 for millimeters)
///
/// # Example
///
/// ```rust
/// use config::constants::wavelength;
///
/// // 1 GHz in millimeters is just under 300 mm
/// let lambda = wavelength(1e9, 1e-3);
/// assert!((lambda - 299.792458).abs() < 1e-9);
/// ```
#[inline]
pub fn wavelength(frequency: f64, unit: f64) -> f64 {
    SPEED_OF_LIGHT / frequency / unit
}
