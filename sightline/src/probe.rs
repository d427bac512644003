//! The per-vertex visibility test: a screen-frustum check followed by a sphere-occlusion
//! probe of rays from the camera.

/// Acts as polyfill for float methods
#[cfg(not(feature = "std"))]
#[allow(unused_imports)]
use num_traits::float::Float as _;

use euclid::vec3;

use crate::camera::CameraModel;
use crate::math::{FreeCoordinate, WorldPoint, WorldVector};
use crate::raycast::{Ray, RayIntersect};


/// Parameters of the occlusion probe.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
pub struct ProbeOptions {
    /// Half the side length of the cube of sample points around each vertex.
    pub radius: FreeCoordinate,
    /// Number of sample points along each axis; the probe casts the cube of this many rays.
    /// Values less than 1 are treated as 1, which samples only the vertex itself.
    pub samples_per_axis: u32,
    /// Distance from the camera at which probe rays start, so that geometry touching the
    /// camera position does not block everything.
    pub ray_start_offset: FreeCoordinate,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            radius: 0.1,
            samples_per_axis: 5,
            ray_start_offset: 0.01,
        }
    }
}

impl ProbeOptions {
    /// Returns a copy with a different sample grid.
    #[must_use]
    pub fn with_samples(mut self, radius: FreeCoordinate, samples_per_axis: u32) -> Self {
        self.radius = radius;
        self.samples_per_axis = samples_per_axis;
        self
    }

    /// Returns a copy with a different ray start offset.
    #[must_use]
    pub fn with_ray_start_offset(mut self, ray_start_offset: FreeCoordinate) -> Self {
        self.ray_start_offset = ray_start_offset;
        self
    }

    /// Number of samples per axis after clamping to at least 1.
    pub fn effective_samples_per_axis(&self) -> u32 {
        self.samples_per_axis.max(1)
    }

    /// Returns the offset of every sample point from the vertex, spanning `[-radius, radius]`
    /// on each axis in equal steps; X varies slowest.
    ///
    /// Offsets are computed from integer step numbers so that exactly
    /// [`effective_samples_per_axis()`](Self::effective_samples_per_axis) values are produced
    /// per axis regardless of rounding.
    pub fn sample_offsets(&self) -> impl Iterator<Item = WorldVector> + use<> {
        let n = self.effective_samples_per_axis();
        let radius = self.radius;
        // Symmetric about zero: step i of n maps to radius * (2i - (n - 1)) / (n - 1).
        let coordinate = move |step: u32| -> FreeCoordinate {
            if n == 1 {
                0.0
            } else {
                let last = FreeCoordinate::from(n - 1);
                radius * (2.0 * FreeCoordinate::from(step) - last) / last
            }
        };
        (0..n).flat_map(move |i| {
            (0..n).flat_map(move |j| {
                (0..n).map(move |k| vec3(coordinate(i), coordinate(j), coordinate(k)))
            })
        })
    }
}

/// The result of testing one vertex against the camera.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(clippy::exhaustive_enums)]
pub enum Classification {
    /// In frame, and at least one probe sample has an unobstructed line of sight.
    Visible,
    /// At or behind the camera's eye plane.
    BehindCamera,
    /// In front of the camera but projected outside the viewport.
    OutOfFrame,
    /// In frame, but every probe sample is hidden by geometry.
    OccludedByMesh,
}

impl Classification {
    #[allow(missing_docs)]
    pub fn is_visible(self) -> bool {
        self == Self::Visible
    }

    #[allow(missing_docs)]
    pub fn is_out_of_frame(self) -> bool {
        self == Self::OutOfFrame
    }

    #[allow(missing_docs)]
    pub fn is_occluded_by_mesh(self) -> bool {
        self == Self::OccludedByMesh
    }
}

/// Classifies a world-space point as seen by `camera`, asking `oracle` about obstructions.
///
/// The frustum stage rejects points at depth ≤ 0 as [`Classification::BehindCamera`] and
/// points outside the viewport as [`Classification::OutOfFrame`]. Points between the eye and
/// the near plane are not rejected. Points that pass are then given to [`sphere_visible`].
pub fn classify<C, O>(
    point: WorldPoint,
    camera: &C,
    oracle: &O,
    options: &ProbeOptions,
) -> Classification
where
    C: CameraModel + ?Sized,
    O: RayIntersect + ?Sized,
{
    let screen = camera.world_to_screen(point);
    if !in_front(screen.depth) {
        log::trace!("{point:?} is behind the camera (depth {depth})", depth = screen.depth);
        return Classification::BehindCamera;
    }
    if !camera.viewport().contains(screen) {
        log::trace!(
            "{point:?} is outside the screen at ({x}, {y})",
            x = screen.x,
            y = screen.y
        );
        return Classification::OutOfFrame;
    }
    if sphere_visible(point, camera, oracle, options) {
        Classification::Visible
    } else {
        log::trace!("{point:?} is hidden on all probe samples");
        Classification::OccludedByMesh
    }
}

/// The occlusion probe: returns whether any sample point around `point` can be reached by a
/// ray from the camera without `oracle` reporting a hit.
///
/// Samples at depth ≤ 0 are skipped. Each ray starts `options.ray_start_offset` from the
/// camera toward its sample and is tested over the full camera-to-sample distance.
pub fn sphere_visible<C, O>(
    point: WorldPoint,
    camera: &C,
    oracle: &O,
    options: &ProbeOptions,
) -> bool
where
    C: CameraModel + ?Sized,
    O: RayIntersect + ?Sized,
{
    let eye = camera.position();
    options.sample_offsets().any(|offset| {
        let sample = point + offset;
        if !in_front(camera.world_to_screen(sample).depth) {
            return false;
        }
        let to_sample = sample - eye;
        let distance = to_sample.length();
        let Some(direction) = to_sample.try_normalize() else {
            return false;
        };
        let ray = Ray {
            origin: eye + direction * options.ray_start_offset,
            direction,
        };
        !oracle.intersects(ray, distance)
    })
}

/// Strictly positive depth; NaN is not in front.
#[inline]
fn in_front(depth: FreeCoordinate) -> bool {
    depth > 0.0
}
