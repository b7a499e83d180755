//! # Mesh Errors
//!
//! Error types for mesh generation. Every variant aborts the current
//! operation before any line reaches the grid sink.
//!
//! ## Error Policy
//!
//! - Configuration problems are reported before meshing starts
//! - Solver failures are invariant violations, never silently patched
//! - Advisory conditions (smoothness, PML uniformity) are not errors; they
//!   are collected in a [`MeshReport`](crate::report::MeshReport)

use crate::geometry::{Axis, BoundarySide};
use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur during mesh generation.
///
/// ## Example
///
/// ```rust
/// use fdtd_mesh::{Axis, MeshError};
///
/// let err = MeshError::invalid_index(Axis::X, 12, 10);
/// assert!(err.to_string().contains("12"));
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    /// Invalid configuration value or simulation bounds.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Axis index outside `0..=2`.
    #[error("Invalid axis index {index}, expected 0, 1 or 2")]
    InvalidAxis { index: usize },

    /// Mesh line index outside the current line set.
    #[error("Mesh line index {index} on axis {axis} is outside 0..{len}")]
    InvalidIndex { axis: Axis, index: usize, len: usize },

    /// The geometric series solver could not find a valid factor.
    #[error("Geometric series failure: {message}")]
    GeometricSeries { message: String },

    /// PML smoothing would have to enlarge the simulation box.
    #[error(
        "PML smoothing on {side} would grow the simulation box; structures inside the PML are \
         probably not uniform along the boundary direction"
    )]
    PmlGrowth { side: BoundarySide },

    /// A fixed line was asked to move.
    #[error("Line at {position} on axis {axis} is fixed and can not be moved")]
    ImmovableLine { axis: Axis, position: f64 },

    /// Re-spacing a line range would break smoothness against its neighbors.
    #[error(
        "Equidistant spacing {spacing} on axis {axis} breaks smoothness {smoothness} against \
         neighbor spacing {neighbor}"
    )]
    SmoothnessConflict {
        axis: Axis,
        spacing: f64,
        neighbor: f64,
        smoothness: f64,
    },

    /// No physical primitive was supplied.
    #[error("No physical primitives to mesh")]
    EmptyGeometry,
}

impl MeshError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a geometric series failure.
    pub fn series(message: impl Into<String>) -> Self {
        Self::GeometricSeries {
            message: message.into(),
        }
    }

    /// Creates an invalid line index error.
    pub fn invalid_index(axis: Axis, index: usize, len: usize) -> Self {
        Self::InvalidIndex { axis, index, len }
    }

    /// Returns true for errors caused by caller input rather than an
    /// internal invariant violation.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::InvalidAxis { .. } | Self::InvalidIndex { .. }
        )
    }
}

// =============================================================================
// RESULT TYPE ALIAS
// =============================================================================

/// Result type alias for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

// =============================================================================
// TESTS
// =============================================================================
