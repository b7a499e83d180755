//! # Geometry Input
//!
//! Axis-aligned primitives supplied by the host geometry kernel, reduced to
//! what the mesher needs: a bounding box and a material class.
//!
//! ## Example
//!
//! ```rust
//! use fdtd_mesh::geometry::{physical_primitives, BoundingBox, Primitive, PropertyKind};
//! use glam::DVec3;
//!
//! let prims = vec![
//!     Primitive::new(BoundingBox::new(DVec3::ZERO, DVec3::ONE), PropertyKind::Metal),
//!     Primitive::new(BoundingBox::new(DVec3::ZERO, DVec3::ONE), PropertyKind::Probe),
//! ];
//! assert_eq!(physical_primitives(&prims).len(), 1);
//! ```

use crate::error::{MeshError, MeshResult};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// AXES AND BOUNDARIES
// =============================================================================

/// One of the three Cartesian axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Index of the axis: 0, 1 or 2.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The two axes perpendicular to this one, in cyclic order.
    pub fn others(self) -> [Axis; 2] {
        match self {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::Z, Axis::X],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }
}

impl TryFrom<usize> for Axis {
    type Error = MeshError;

    fn try_from(index: usize) -> MeshResult<Self> {
        match index {
            0 => Ok(Axis::X),
            1 => Ok(Axis::Y),
            2 => Ok(Axis::Z),
            _ => Err(MeshError::InvalidAxis { index }),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

/// One of the six outer boundaries of the simulation box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundarySide {
    XMin,
    XMax,
    YMin,
    YMax,
    ZMin,
    ZMax,
}

impl BoundarySide {
    /// All sides in (xmin, xmax, ymin, ymax, zmin, zmax) order.
    pub const ALL: [BoundarySide; 6] = [
        BoundarySide::XMin,
        BoundarySide::XMax,
        BoundarySide::YMin,
        BoundarySide::YMax,
        BoundarySide::ZMin,
        BoundarySide::ZMax,
    ];

    /// Side on the given axis.
    pub fn new(axis: Axis, lower: bool) -> Self {
        match (axis, lower) {
            (Axis::X, true) => BoundarySide::XMin,
            (Axis::X, false) => BoundarySide::XMax,
            (Axis::Y, true) => BoundarySide::YMin,
            (Axis::Y, false) => BoundarySide::YMax,
            (Axis::Z, true) => BoundarySide::ZMin,
            (Axis::Z, false) => BoundarySide::ZMax,
        }
    }

    /// Axis perpendicular to this boundary.
    pub fn axis(self) -> Axis {
        match self {
            BoundarySide::XMin | BoundarySide::XMax => Axis::X,
            BoundarySide::YMin | BoundarySide::YMax => Axis::Y,
            BoundarySide::ZMin | BoundarySide::ZMax => Axis::Z,
        }
    }

    /// True for the minimum side of the axis.
    pub fn is_lower(self) -> bool {
        matches!(
            self,
            BoundarySide::XMin | BoundarySide::YMin | BoundarySide::ZMin
        )
    }
}

impl fmt::Display for BoundarySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = if self.is_lower() { "min" } else { "max" };
        write!(f, "{}{}", self.axis(), bound)
    }
}

// =============================================================================
// BOUNDING BOX
// =============================================================================

/// Axis-aligned box with corners ordered so that `min <= max` per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: DVec3,
    pub max: DVec3,
}

impl BoundingBox {
    /// Creates a box from two opposite corners in any order.
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// `[lower, upper]` on one axis.
    #[inline]
    pub fn bounds(&self, axis: Axis) -> (f64, f64) {
        (self.min[axis.index()], self.max[axis.index()])
    }

    /// Size on one axis.
    #[inline]
    pub fn extent(&self, axis: Axis) -> f64 {
        self.max[axis.index()] - self.min[axis.index()]
    }

    /// True when the box is flat on at least one axis.
    pub fn has_zero_dim(&self) -> bool {
        Axis::ALL.iter().any(|&axis| self.extent(axis) == 0.0)
    }

    /// True when `point` lies inside or on the box.
    pub fn contains(&self, point: DVec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Smallest box enclosing both.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

// =============================================================================
// PRIMITIVES
// =============================================================================

/// Property kinds of the host geometry kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    Metal,
    ConductingSheet,
    LumpedElement,
    Material,
    Excitation,
    Probe,
    DumpBox,
}

impl PropertyKind {
    /// Material class of the property, `None` for non-physical kinds.
    pub fn material(self) -> Option<Material> {
        match self {
            PropertyKind::Metal | PropertyKind::ConductingSheet | PropertyKind::LumpedElement => {
                Some(Material::Conductor)
            }
            PropertyKind::Material => Some(Material::Dielectric),
            PropertyKind::Excitation | PropertyKind::Probe | PropertyKind::DumpBox => None,
        }
    }
}

/// Material class that governs mesh density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    Conductor,
    Dielectric,
}

/// A host kernel primitive: bounding box and property kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub bounds: BoundingBox,
    pub kind: PropertyKind,
}

impl Primitive {
    /// Creates a primitive.
    pub fn new(bounds: BoundingBox, kind: PropertyKind) -> Self {
        Self { bounds, kind }
    }
}

/// A primitive that takes part in meshing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalPrimitive {
    pub bounds: BoundingBox,
    pub material: Material,
}

impl PhysicalPrimitive {
    /// Creates a physical primitive.
    pub fn new(bounds: BoundingBox, material: Material) -> Self {
        Self { bounds, material }
    }

    /// Conductor box between two corners.
    pub fn conductor(a: DVec3, b: DVec3) -> Self {
        Self::new(BoundingBox::new(a, b), Material::Conductor)
    }

    /// Dielectric box between two corners.
    pub fn dielectric(a: DVec3, b: DVec3) -> Self {
        Self::new(BoundingBox::new(a, b), Material::Dielectric)
    }

    #[inline]
    pub fn is_conductor(&self) -> bool {
        self.material == Material::Conductor
    }
}

/// Keeps only conductors and dielectrics.
pub fn physical_primitives(prims: &[Primitive]) -> Vec<PhysicalPrimitive> {
    prims
        .iter()
        .filter_map(|prim| {
            prim.kind
                .material()
                .map(|material| PhysicalPrimitive::new(prim.bounds, material))
        })
        .collect()
}

/// Bounding box of all primitives, `None` when empty.
pub fn total_bounds(prims: &[PhysicalPrimitive]) -> Option<BoundingBox> {
    prims
        .iter()
        .map(|prim| prim.bounds)
        .reduce(|acc, bounds| acc.union(&bounds))
}

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Sequential identifier allocator owned by one engine.
///
/// Names generated structures (PML display boxes) without any state shared
/// between engines.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Creates an allocator starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next identifier.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Returns `prefix_<id>` with the next identifier.
    pub fn name(&mut self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.next_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_roundtrip_index() {
        for axis in Axis::ALL {
            assert_eq!(Axis::try_from(axis.index()).unwrap(), axis);
        }
    }

    #[test]
    fn test_axis_invalid_index() {
        assert_eq!(Axis::try_from(3), Err(MeshError::InvalidAxis { index: 3 }));
    }

    #[test]
    fn test_boundary_side_names() {
        let names: Vec<String> = BoundarySide::ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["xmin", "xmax", "ymin", "ymax", "zmin", "zmax"]);
    }

    #[test]
    fn test_boundary_side_axis() {
        for side in BoundarySide::ALL {
            assert_eq!(BoundarySide::new(side.axis(), side.is_lower()), side);
        }
    }

    #[test]
    fn test_bounding_box_normalizes_corners() {
        let bbox = BoundingBox::new(DVec3::new(2.0, 0.0, 5.0), DVec3::new(0.0, 1.0, 3.0));
        assert_eq!(bbox.min, DVec3::new(0.0, 0.0, 3.0));
        assert_eq!(bbox.max, DVec3::new(2.0, 1.0, 5.0));
        assert_eq!(bbox.extent(Axis::Z), 2.0);
    }

    #[test]
    fn test_bounding_box_zero_dim() {
        let sheet = BoundingBox::new(DVec3::ZERO, DVec3::new(1.0, 1.0, 0.0));
        assert!(sheet.has_zero_dim());
        assert!(!BoundingBox::new(DVec3::ZERO, DVec3::ONE).has_zero_dim());
    }

    #[test]
    fn test_bounding_box_contains() {
        let bbox = BoundingBox::new(DVec3::ZERO, DVec3::ONE);
        assert!(bbox.contains(DVec3::splat(0.5)));
        assert!(bbox.contains(DVec3::ONE));
        assert!(!bbox.contains(DVec3::new(0.5, 0.5, 1.5)));
    }

    #[test]
    fn test_property_materials() {
        assert_eq!(PropertyKind::ConductingSheet.material(), Some(Material::Conductor));
        assert_eq!(PropertyKind::LumpedElement.material(), Some(Material::Conductor));
        assert_eq!(PropertyKind::Material.material(), Some(Material::Dielectric));
        assert_eq!(PropertyKind::DumpBox.material(), None);
    }

    #[test]
    fn test_total_bounds() {
        let prims = [
            PhysicalPrimitive::conductor(DVec3::ZERO, DVec3::ONE),
            PhysicalPrimitive::dielectric(DVec3::splat(-1.0), DVec3::splat(0.5)),
        ];
        let bounds = total_bounds(&prims).unwrap();
        assert_eq!(bounds.min, DVec3::splat(-1.0));
        assert_eq!(bounds.max, DVec3::ONE);
        assert!(total_bounds(&[]).is_none());
    }

    #[test]
    fn test_id_allocator_is_per_instance() {
        let mut a = IdAllocator::new();
        let mut b = IdAllocator::new();
        assert_eq!(a.name("pml"), "pml_0");
        assert_eq!(a.name("pml"), "pml_1");
        assert_eq!(b.name("pml"), "pml_0");
    }
}
