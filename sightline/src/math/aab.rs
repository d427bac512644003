use core::fmt;

/// Acts as polyfill for float methods
#[cfg(not(feature = "std"))]
#[allow(unused_imports)]
use num_traits::float::Float as _;

use euclid::Vector3D;

use crate::math::{FreeCoordinate, WorldPoint, WorldVector};

/// Axis-Aligned Box data type, in [`World`](crate::math::World) coordinates.
///
/// Used as a cheap rejection test before testing a ray against every triangle of an object.
#[derive(Copy, Clone, PartialEq)]
pub struct Aab {
    // The upper >= lower checks reject NaNs.
    lower_bounds: WorldPoint,
    upper_bounds: WorldPoint,
}

impl Aab {
    /// Constructs an [`Aab`] from most-negative and most-positive corner points.
    ///
    /// Returns [`None`] if the points are not in the proper order or if they are NaN.
    #[inline]
    pub fn checked_from_lower_upper(
        lower_bounds: WorldPoint,
        upper_bounds: WorldPoint,
    ) -> Option<Self> {
        if lower_bounds.x <= upper_bounds.x
            && lower_bounds.y <= upper_bounds.y
            && lower_bounds.z <= upper_bounds.z
        {
            Some(Self {
                lower_bounds,
                upper_bounds,
            })
        } else {
            None
        }
    }

    /// Returns the smallest box containing all of the given points, or [`None`] if there
    /// are no points or any of them is NaN.
    pub fn from_points(points: impl IntoIterator<Item = WorldPoint>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (lower, upper) = points.fold((first, first), |(lower, upper), p| {
            (lower.min(p), upper.max(p))
        });
        Self::checked_from_lower_upper(lower, upper)
    }

    /// The most negative corner of the box.
    #[inline]
    pub const fn lower_bounds(&self) -> WorldPoint {
        self.lower_bounds
    }

    /// The most positive corner of the box.
    #[inline]
    pub const fn upper_bounds(&self) -> WorldPoint {
        self.upper_bounds
    }

    /// Returns whether this AAB, including the boundary, contains the point.
    #[inline]
    pub fn contains(&self, point: WorldPoint) -> bool {
        self.lower_bounds.x <= point.x
            && point.x <= self.upper_bounds.x
            && self.lower_bounds.y <= point.y
            && point.y <= self.upper_bounds.y
            && self.lower_bounds.z <= point.z
            && point.z <= self.upper_bounds.z
    }

    /// Enlarges the AAB by moving each face outward by the specified distance.
    ///
    /// If this would result in a negative or NaN size, produces a zero size AAB located
    /// at the center point of `self`.
    #[must_use]
    #[inline]
    pub fn expand(self, distance: FreeCoordinate) -> Self {
        let distance_vec = Vector3D::splat(distance);
        match Self::checked_from_lower_upper(
            self.lower_bounds - distance_vec,
            self.upper_bounds + distance_vec,
        ) {
            Some(aab) => aab,
            None => {
                let center = self.lower_bounds.lerp(self.upper_bounds, 0.5);
                Self {
                    lower_bounds: center,
                    upper_bounds: center,
                }
            }
        }
    }

    /// Returns whether the segment from `origin` to `origin + direction * max_t`
    /// touches this box, using the slab method.
    ///
    /// `direction` need not be normalized; `max_t` is measured in multiples of it.
    pub fn intersects_segment(
        &self,
        origin: WorldPoint,
        direction: WorldVector,
        max_t: FreeCoordinate,
    ) -> bool {
        let origin = origin.to_array();
        let direction = direction.to_array();
        let lower = self.lower_bounds.to_array();
        let upper = self.upper_bounds.to_array();

        let mut t_enter: FreeCoordinate = 0.0;
        let mut t_exit: FreeCoordinate = max_t;
        for axis in 0..3 {
            if direction[axis] == 0.0 {
                // Parallel to this slab: must already be within it.
                if origin[axis] < lower[axis] || origin[axis] > upper[axis] {
                    return false;
                }
            } else {
                let inverse = direction[axis].recip();
                let mut t_lower = (lower[axis] - origin[axis]) * inverse;
                let mut t_upper = (upper[axis] - origin[axis]) * inverse;
                if t_lower > t_upper {
                    core::mem::swap(&mut t_lower, &mut t_upper);
                }
                t_enter = t_enter.max(t_lower);
                t_exit = t_exit.min(t_upper);
                if t_enter > t_exit {
                    return false;
                }
            }
        }
        true
    }
}

impl fmt::Debug for Aab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Aab {
            lower_bounds: l,
            upper_bounds: u,
        } = *self;
        f.debug_tuple("Aab")
            .field(&(l.x..=u.x))
            .field(&(l.y..=u.y))
            .field(&(l.z..=u.z))
            .finish()
    }
}

/// [`Aab`] rejects NaN values, so it can implement [`Eq`]
/// even though it contains floats.
impl Eq for Aab {}

#[cfg(test)]
mod tests {
    use super::*;
    use euclid::{point3, vec3};
    use pretty_assertions::assert_eq;

    fn unit_cube() -> Aab {
        Aab::checked_from_lower_upper(point3(0., 0., 0.), point3(1., 1., 1.)).unwrap()
    }

    #[test]
    fn new_wrong_order() {
        assert_eq!(
            Aab::checked_from_lower_upper(point3(2., 1., 1.), point3(1., 2., 2.)),
            None
        );
        assert_eq!(
            Aab::checked_from_lower_upper(point3(1., 1., 2.), point3(2., 2., 1.)),
            None
        );
    }

    #[test]
    fn new_nan() {
        assert_eq!(
            Aab::checked_from_lower_upper(point3(0., 0., 0.), point3(1., 1., f64::NAN)),
            None
        );
    }

    #[test]
    fn from_points() {
        assert_eq!(
            Aab::from_points([point3(1., -2., 3.), point3(-1., 5., 0.), point3(0., 0., 0.)]),
            Aab::checked_from_lower_upper(point3(-1., -2., 0.), point3(1., 5., 3.))
        );
        assert_eq!(Aab::from_points([]), None);
    }

    #[test]
    fn contains_includes_boundary() {
        let aab = unit_cube();
        assert!(aab.contains(point3(0., 0.5, 1.)));
        assert!(!aab.contains(point3(0., 0.5, 1.0001)));
    }

    #[test]
    fn expand_negative_collapses_to_center() {
        assert_eq!(
            unit_cube().expand(-2.0),
            Aab::checked_from_lower_upper(point3(0.5, 0.5, 0.5), point3(0.5, 0.5, 0.5)).unwrap()
        );
    }

    #[test]
    fn segment_through_box() {
        let aab = unit_cube();
        assert!(aab.intersects_segment(point3(-1., 0.5, 0.5), vec3(1., 0., 0.), 10.));
        // Stops short of the box.
        assert!(!aab.intersects_segment(point3(-1., 0.5, 0.5), vec3(1., 0., 0.), 0.5));
        // Points away from the box.
        assert!(!aab.intersects_segment(point3(-1., 0.5, 0.5), vec3(-1., 0., 0.), 10.));
        // Parallel to a slab, outside it.
        assert!(!aab.intersects_segment(point3(-1., 2., 0.5), vec3(1., 0., 0.), 10.));
        // Starts inside.
        assert!(aab.intersects_segment(point3(0.5, 0.5, 0.5), vec3(0., 1., 0.), 0.1));
    }
}
