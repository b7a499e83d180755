//! # Bounded Types
//!
//! Per-axis partition of the simulation extent into classified intervals.
//! Each interval is the unit of line generation; its region kind selects
//! the target resolution.
//!
//! ## Pipeline
//!
//! ```text
//! primitives -> fixed lines -> boundaries -> classified intervals
//!            -> expansion to simulation bounds -> metal bounds
//! ```

mod builder;
mod classify;


pub use builder::{
    boundaries, build_bounded_types, expand_to_simulation_bounds, fixed_lines, metal_bounds,
    size_ordered,
};
pub use classify::type_at;

use crate::geometry::Material;
use serde::{Deserialize, Serialize};

/// Resolved type governing the mesh density of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionKind {
    Metal,
    Nonmetal,
    Air,
}

impl From<Option<Material>> for RegionKind {
    fn from(material: Option<Material>) -> Self {
        match material {
            Some(Material::Conductor) => RegionKind::Metal,
            Some(Material::Dielectric) => RegionKind::Nonmetal,
            None => RegionKind::Air,
        }
    }
}

/// A classified interval `[lower, upper]` on one axis.
///
/// Zero-width intervals stand for thin sheets sitting on a fixed line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundedType {
    pub kind: RegionKind,
    pub lower: f64,
    pub upper: f64,
}

impl BoundedType {
    pub fn new(kind: RegionKind, lower: f64, upper: f64) -> Self {
        Self { kind, lower, upper }
    }

    #[inline]
    pub fn size(&self) -> f64 {
        self.upper - self.lower
    }

    #[inline]
    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }

    /// True for a sheet interval with both ends on the same position.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.lower == self.upper
    }

    #[inline]
    pub fn is_metal(&self) -> bool {
        self.kind == RegionKind::Metal
    }
}
