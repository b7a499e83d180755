//! # FDTD Mesh
//!
//! Non-uniform rectilinear mesh generation for FDTD electromagnetic
//! simulations. Places grid lines on each axis from axis-aligned conductor
//! and dielectric primitives.
//!
//! ## Architecture
//!
//! ```text
//! primitives → bounded types → line generator → PML smoother → grid sink
//!                                   ↑
//!                          geometric series solver
//! ```
//!
//! ## Rules
//!
//! - **Resolution**: metal and nonmetal regions are meshed at fractions of
//!   the minimum wavelength
//! - **Smoothness**: adjacent cells never differ by more than a bounded ratio
//! - **Thirds rule**: conductor edges sit between lines, one third of a cell
//!   inside the metal
//! - **PML**: the outer slabs of the grid are evenly spaced
//!
//! ## Usage
//!
//! ```rust
//! use fdtd_mesh::geometry::PhysicalPrimitive;
//! use fdtd_mesh::{Axis, FrequencyContext, MeshConfig, MeshEngine, RectilinearGrid};
//! use glam::DVec3;
//!
//! let ctx = FrequencyContext::new(5e9, 1e-3);
//! let prims = [
//!     PhysicalPrimitive::dielectric(DVec3::ZERO, DVec3::new(40.0, 20.0, 1.6)),
//!     PhysicalPrimitive::conductor(DVec3::new(0.0, 9.0, 1.6), DVec3::new(40.0, 11.0, 1.6)),
//! ];
//!
//! let mut engine = MeshEngine::new(MeshConfig::default()).unwrap();
//! let mut grid = RectilinearGrid::new();
//! let report = engine.build(&ctx, &prims, &mut grid).unwrap();
//!
//! // The trace is a sheet, so its plane is a mesh line
//! assert!(engine.lines(Axis::Z).contains(&1.6));
//! println!("{} smoothness findings", report.smoothness_violations.len());
//! ```

pub mod bounded;
pub mod engine;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod lines;
pub mod pml;
pub mod report;
pub mod series;
pub mod settings;
pub mod sink;
pub mod thirds;
pub mod tolerance;

pub use engine::MeshEngine;
pub use error::{MeshError, MeshResult};
pub use geometry::{Axis, BoundarySide, BoundingBox};
pub use report::MeshReport;
pub use settings::{FrequencyContext, MeshConfig, PmlCells, SimulationContext, SimulationExtent};
pub use sink::{GridSink, RectilinearGrid};
pub use tolerance::Tolerance;
