//! # Grid Sinks
//!
//! The write side of the mesher. A [`GridSink`] receives the finished lines
//! of every axis, optionally the PML display boxes, and a notification once
//! the grid is complete.

use crate::geometry::{Axis, BoundarySide, BoundingBox};

/// Receiver of generated mesh lines.
pub trait GridSink {
    /// Drops every line on `axis`.
    fn clear_lines(&mut self, axis: Axis);

    /// Adds one line on `axis`.
    fn add_line(&mut self, axis: Axis, position: f64);

    /// Called once after all lines of a finalization were written.
    fn post_mesh(&mut self) {}

    /// Displays a PML slab. Purely cosmetic; the default ignores it.
    fn show_pml(&mut self, _name: &str, _side: BoundarySide, _slab: &BoundingBox) {}
}

/// A named PML display box recorded by [`RectilinearGrid`].
#[derive(Debug, Clone, PartialEq)]
pub struct PmlDisplay {
    pub name: String,
    pub side: BoundarySide,
    pub slab: BoundingBox,
}

/// In-memory rectilinear grid.
///
/// # Example
///
/// ```rust
/// use fdtd_mesh::{Axis, GridSink, RectilinearGrid};
///
/// let mut grid = RectilinearGrid::new();
/// grid.add_line(Axis::Y, 1.5);
/// grid.add_line(Axis::Y, 0.5);
/// assert_eq!(grid.lines(Axis::Y), &[1.5, 0.5]);
/// grid.clear_lines(Axis::Y);
/// assert!(grid.lines(Axis::Y).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RectilinearGrid {
    lines: [Vec<f64>; 3],
    post_mesh_calls: usize,
    pml: Vec<PmlDisplay>,
}

impl RectilinearGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines of `axis` in the order they were added.
    pub fn lines(&self, axis: Axis) -> &[f64] {
        &self.lines[axis.index()]
    }

    /// Number of completed finalizations.
    pub fn post_mesh_calls(&self) -> usize {
        self.post_mesh_calls
    }

    /// PML boxes received for display.
    pub fn pml_displays(&self) -> &[PmlDisplay] {
        &self.pml
    }
}

impl GridSink for RectilinearGrid {
    fn clear_lines(&mut self, axis: Axis) {
        self.lines[axis.index()].clear();
    }

    fn add_line(&mut self, axis: Axis, position: f64) {
        self.lines[axis.index()].push(position);
    }

    fn post_mesh(&mut self) {
        self.post_mesh_calls += 1;
    }

    fn show_pml(&mut self, name: &str, side: BoundarySide, slab: &BoundingBox) {
        self.pml.push(PmlDisplay {
            name: name.to_string(),
            side,
            slab: *slab,
        });
    }
}
