//! Coordinate systems, point and vector types, and bounding boxes.

use euclid::{Point3D, Transform3D, Vector3D};

mod aab;
pub use aab::*;

/// Coordinates that are not locked to any grid; the scalar type of every position,
/// distance and direction in this crate.
pub type FreeCoordinate = f64;

/// Unit-of-measure type for the shared coordinate system of all scene objects, after
/// each object's own transform has been applied.
#[derive(Debug, Eq, PartialEq)]
#[allow(clippy::exhaustive_enums)]
pub enum World {}

/// Unit-of-measure type for coordinates relative to a single object, before its
/// transform is applied.
#[derive(Debug, Eq, PartialEq)]
#[allow(clippy::exhaustive_enums)]
pub enum Local {}

/// A point in [`World`] space.
pub type WorldPoint = Point3D<FreeCoordinate, World>;
/// A displacement in [`World`] space.
pub type WorldVector = Vector3D<FreeCoordinate, World>;
/// A point in an object's [`Local`] space.
pub type LocalPoint = Point3D<FreeCoordinate, Local>;
/// Transform from an object's [`Local`] space to [`World`] space.
pub type LocalToWorld = Transform3D<FreeCoordinate, Local, World>;

/// Returns whether all components of `point` are finite.
#[inline]
pub(crate) fn point_is_finite<U>(point: Point3D<FreeCoordinate, U>) -> bool {
    point.x.is_finite() && point.y.is_finite() && point.z.is_finite()
}
