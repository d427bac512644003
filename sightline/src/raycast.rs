//! Rays and the ray-intersection seam used by the occlusion probe.

use crate::math::{FreeCoordinate, WorldPoint, WorldVector};

/// A ray; a half-infinite line segment, used as finite by the caller's choice of
/// maximum distance.
#[allow(clippy::exhaustive_structs)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// The sole endpoint of the ray.
    pub origin: WorldPoint,

    /// The direction in which the ray extends.
    ///
    /// [`RayIntersect`] implementations are given unit-length directions, so that
    /// distances along the ray are world distances.
    pub direction: WorldVector,
}

impl Ray {
    /// Constructs a [`Ray`] from convertible types (e.g. tuples or 3-element arrays).
    /// Other than the use of [`Into`], this is equivalent to a struct literal.
    ///
    /// ```
    /// use sightline::euclid::{point3, vec3};
    /// use sightline::Ray;
    ///
    /// assert_eq!(
    ///     Ray::new([1., 2., 3.], [4., 5., 6.]),
    ///     Ray {
    ///         origin: point3(1., 2., 3.),
    ///         direction: vec3(4., 5., 6.),
    ///     }
    /// );
    /// ```
    pub fn new(origin: impl Into<WorldPoint>, direction: impl Into<WorldVector>) -> Self {
        Self {
            origin: origin.into(),
            direction: direction.into(),
        }
    }

    /// Returns the point at parameter `t` along the ray, `origin + direction * t`.
    #[inline]
    pub fn at(self, t: FreeCoordinate) -> WorldPoint {
        self.origin + self.direction * t
    }
}

/// A ray-versus-geometry intersection test: the only question the occlusion probe asks
/// of the scene.
///
/// Implemented by [`MeshScene`](crate::mesh_scene::MeshScene), and by any
/// `Fn(Ray, f64) -> bool` closure for custom or test geometry.
pub trait RayIntersect {
    /// Returns whether `ray` hits any geometry at a distance greater than zero and at most
    /// `max_distance` from its origin.
    ///
    /// `ray.direction` has unit length.
    fn intersects(&self, ray: Ray, max_distance: FreeCoordinate) -> bool;
}

impl<F> RayIntersect for F
where
    F: Fn(Ray, FreeCoordinate) -> bool,
{
    #[inline]
    fn intersects(&self, ray: Ray, max_distance: FreeCoordinate) -> bool {
        self(ray, max_distance)
    }
}
