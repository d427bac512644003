//! Perspective camera: pose, projection between world and screen space, and frustum
//! geometry.

use core::fmt;

/// Acts as polyfill for float methods
#[cfg(not(feature = "std"))]
#[allow(unused_imports)]
use num_traits::float::Float as _;

use euclid::vec3;

use crate::math::{FreeCoordinate, WorldPoint, WorldVector, point_is_finite};

#[cfg(test)]
mod tests;

// -------------------------------------------------------------------------------------------------

/// The view of the world that vertices are classified against.
///
/// [`Camera`] is the implementation normally used; the trait exists so that callers with
/// their own projection (or a recorded one) can drive a capture.
pub trait CameraModel {
    /// Position of the camera's eye, the apex of its frustum.
    fn position(&self) -> WorldPoint;

    /// Projects a world-space point to screen space.
    ///
    /// The result's `x` and `y` are pixels from the bottom-left corner of the viewport, and
    /// its `depth` is the distance in front of the camera along its view axis; points behind
    /// the camera have negative depth.
    fn world_to_screen(&self, point: WorldPoint) -> ScreenPoint;

    /// Size of the screen in pixels.
    fn viewport(&self) -> Viewport;

    /// The near-plane corners and apex of the camera's view volume.
    fn frustum(&self) -> FrustumSnapshot;
}

impl<T: ?Sized + CameraModel> CameraModel for &T {
    fn position(&self) -> WorldPoint {
        (**self).position()
    }
    fn world_to_screen(&self, point: WorldPoint) -> ScreenPoint {
        (**self).world_to_screen(point)
    }
    fn viewport(&self) -> Viewport {
        (**self).viewport()
    }
    fn frustum(&self) -> FrustumSnapshot {
        (**self).frustum()
    }
}

/// A point in screen space: pixel coordinates from the bottom-left corner of the viewport,
/// plus depth along the view axis.
#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(clippy::exhaustive_structs)]
pub struct ScreenPoint {
    /// Pixels rightward from the left edge.
    pub x: FreeCoordinate,
    /// Pixels upward from the bottom edge.
    pub y: FreeCoordinate,
    /// Distance in front of the camera, measured along its forward axis.
    pub depth: FreeCoordinate,
}

/// Dimensions of the screen, in pixels.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(clippy::exhaustive_structs)]
pub struct Viewport {
    #[allow(missing_docs)]
    pub width: u32,
    #[allow(missing_docs)]
    pub height: u32,
}

impl Viewport {
    /// Width divided by height.
    #[inline]
    pub fn aspect_ratio(&self) -> FreeCoordinate {
        FreeCoordinate::from(self.width) / FreeCoordinate::from(self.height)
    }

    /// Returns whether the screen position of `point` lies within `[0, width] × [0, height]`,
    /// edges included. Depth is not considered.
    #[inline]
    pub fn contains(&self, point: ScreenPoint) -> bool {
        (0.0..=FreeCoordinate::from(self.width)).contains(&point.x)
            && (0.0..=FreeCoordinate::from(self.height)).contains(&point.y)
    }
}

/// The camera's near-plane corners and eye position, in world space, as captured once per
/// capture cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(clippy::exhaustive_structs)]
pub struct FrustumSnapshot {
    #[allow(missing_docs)]
    pub bottom_left: WorldPoint,
    #[allow(missing_docs)]
    pub top_left: WorldPoint,
    #[allow(missing_docs)]
    pub top_right: WorldPoint,
    #[allow(missing_docs)]
    pub bottom_right: WorldPoint,
    /// The camera position.
    pub apex: WorldPoint,
}

impl FrustumSnapshot {
    /// The four near-plane corners, in the order bottom-left, top-left, top-right,
    /// bottom-right.
    pub fn corners(&self) -> [WorldPoint; 4] {
        [
            self.bottom_left,
            self.top_left,
            self.top_right,
            self.bottom_right,
        ]
    }
}

// -------------------------------------------------------------------------------------------------

/// Position and orientation of a camera.
///
/// The basis is orthonormal and right-handed: `right = forward × up`. With no rotation the
/// camera looks along −Z with +Y up, so +X is to its right.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    position: WorldPoint,
    forward: WorldVector,
    up: WorldVector,
    right: WorldVector,
}

impl Pose {
    /// Constructs a pose from an eye position and view direction.
    ///
    /// `up` need not be perpendicular to `forward`; it is only used to choose the roll
    /// angle. Returns an error if either vector is zero-length or they are parallel.
    pub fn new(
        position: WorldPoint,
        forward: WorldVector,
        up: WorldVector,
    ) -> Result<Self, CameraError> {
        if !point_is_finite(position)
            || !point_is_finite(forward.to_point())
            || !point_is_finite(up.to_point())
        {
            return Err(CameraError::NonFinitePose);
        }
        let forward = forward
            .try_normalize()
            .ok_or(CameraError::DegeneratePose)?;
        let up = up.try_normalize().ok_or(CameraError::DegeneratePose)?;
        let right = forward.cross(up);
        if right.length() < 1e-9 {
            return Err(CameraError::DegeneratePose);
        }
        let right = right.normalize();
        let up = right.cross(forward);
        Ok(Self {
            position,
            forward,
            up,
            right,
        })
    }

    /// Constructs a pose at `eye` looking toward `target`.
    pub fn look_at(
        eye: WorldPoint,
        target: WorldPoint,
        up: WorldVector,
    ) -> Result<Self, CameraError> {
        Self::new(eye, target - eye, up)
    }

    /// Constructs a pose at `eye` from yaw and pitch angles in degrees, with +Y up.
    ///
    /// Zero yaw and pitch looks along −Z. Positive yaw turns toward −X (counterclockwise as
    /// seen from above) and positive pitch looks upward. Pitch must be strictly between
    /// −90° and 90°.
    pub fn from_yaw_pitch(
        eye: WorldPoint,
        yaw_degrees: FreeCoordinate,
        pitch_degrees: FreeCoordinate,
    ) -> Result<Self, CameraError> {
        let (yaw_sin, yaw_cos) = yaw_degrees.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = pitch_degrees.to_radians().sin_cos();
        Self::new(
            eye,
            vec3(-yaw_sin * pitch_cos, pitch_sin, -yaw_cos * pitch_cos),
            vec3(0., 1., 0.),
        )
    }

    /// The eye position.
    #[inline]
    pub fn position(&self) -> WorldPoint {
        self.position
    }

    /// Unit vector in the direction of view.
    #[inline]
    pub fn forward(&self) -> WorldVector {
        self.forward
    }

    /// Unit vector toward the top of the screen.
    #[inline]
    pub fn up(&self) -> WorldVector {
        self.up
    }

    /// Unit vector toward the right of the screen.
    #[inline]
    pub fn right(&self) -> WorldVector {
        self.right
    }
}

/// Projection parameters of a [`Camera`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
pub struct CameraOptions {
    /// Vertical field of view, in degrees.
    pub fov_y: FreeCoordinate,
    /// Distance from the eye to the near clipping plane, whose corners make up the
    /// [`FrustumSnapshot`].
    pub near: FreeCoordinate,
    /// Distance from the eye to the far clipping plane.
    pub far: FreeCoordinate,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fov_y: 60.0,
            near: 0.3,
            far: 1000.0,
        }
    }
}

impl CameraOptions {
    /// Returns a copy with the field of view replaced.
    #[must_use]
    pub fn with_fov_y(mut self, fov_y: FreeCoordinate) -> Self {
        self.fov_y = fov_y;
        self
    }

    /// Returns a copy with the clipping plane distances replaced.
    #[must_use]
    pub fn with_clip_planes(mut self, near: FreeCoordinate, far: FreeCoordinate) -> Self {
        self.near = near;
        self.far = far;
        self
    }
}

/// A validated perspective camera.
///
/// All constructors check their inputs, so a [`Camera`] always has a nonempty viewport,
/// a usable field of view, and an orthonormal pose.
#[derive(Clone, Copy, PartialEq)]
pub struct Camera {
    options: CameraOptions,
    viewport: Viewport,
    pose: Pose,

    /// Derived: `tan(fov_y / 2)`.
    tan_half_fov: FreeCoordinate,
}

impl Camera {
    /// Constructs a camera, rejecting degenerate parameters.
    pub fn new(options: CameraOptions, viewport: Viewport, pose: Pose) -> Result<Self, CameraError> {
        let CameraOptions { fov_y, near, far } = options;
        if viewport.width == 0 || viewport.height == 0 {
            return Err(CameraError::ZeroViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        if fov_y.is_nan() || fov_y <= 0.0 || fov_y >= 180.0 {
            return Err(CameraError::FieldOfView(fov_y));
        }
        if !(near.is_finite() && near > 0.0) {
            return Err(CameraError::NearPlane(near));
        }
        if far.is_nan() || far <= near {
            return Err(CameraError::FarPlane { near, far });
        }
        Ok(Self {
            options,
            viewport,
            pose,
            tan_half_fov: (fov_y.to_radians() / 2.0).tan(),
        })
    }

    /// Returns the projection parameters.
    pub fn options(&self) -> CameraOptions {
        self.options
    }

    /// Returns the pose.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Returns a camera identical to this one but with a different pose.
    #[must_use]
    pub fn with_pose(self, pose: Pose) -> Self {
        Self { pose, ..self }
    }

    /// Projects a world-space point to screen space. See [`CameraModel::world_to_screen`].
    ///
    /// Points at exactly zero depth have non-finite `x` and `y`.
    pub fn world_to_screen(&self, point: WorldPoint) -> ScreenPoint {
        let Pose {
            position,
            forward,
            up,
            right,
        } = self.pose;
        let relative = point - position;
        let depth = relative.dot(forward);
        let half_height = depth * self.tan_half_fov;
        let half_width = half_height * self.viewport.aspect_ratio();
        let ndc_x = relative.dot(right) / half_width;
        let ndc_y = relative.dot(up) / half_height;
        ScreenPoint {
            x: (ndc_x + 1.0) * 0.5 * FreeCoordinate::from(self.viewport.width),
            y: (ndc_y + 1.0) * 0.5 * FreeCoordinate::from(self.viewport.height),
            depth,
        }
    }

    /// Inverse of [`Camera::world_to_screen`]: returns the world-space point which projects
    /// to the given pixel coordinates at the given depth.
    pub fn screen_to_world(&self, point: ScreenPoint) -> WorldPoint {
        self.viewport_to_world(
            point.x / FreeCoordinate::from(self.viewport.width),
            point.y / FreeCoordinate::from(self.viewport.height),
            point.depth,
        )
    }

    /// Returns the world-space point at normalized viewport coordinates `(vx, vy)`, where
    /// `(0, 0)` is the bottom-left corner of the screen and `(1, 1)` the top-right, at
    /// `depth` in front of the camera.
    pub fn viewport_to_world(
        &self,
        vx: FreeCoordinate,
        vy: FreeCoordinate,
        depth: FreeCoordinate,
    ) -> WorldPoint {
        let Pose {
            position,
            forward,
            up,
            right,
        } = self.pose;
        let half_height = depth * self.tan_half_fov;
        let half_width = half_height * self.viewport.aspect_ratio();
        position
            + forward * depth
            + right * ((vx * 2.0 - 1.0) * half_width)
            + up * ((vy * 2.0 - 1.0) * half_height)
    }

    /// Returns the frustum corners on the near plane and the apex.
    pub fn frustum(&self) -> FrustumSnapshot {
        let near = self.options.near;
        FrustumSnapshot {
            bottom_left: self.viewport_to_world(0.0, 0.0, near),
            top_left: self.viewport_to_world(0.0, 1.0, near),
            top_right: self.viewport_to_world(1.0, 1.0, near),
            bottom_right: self.viewport_to_world(1.0, 0.0, near),
            apex: self.pose.position,
        }
    }
}

impl CameraModel for Camera {
    fn position(&self) -> WorldPoint {
        self.pose.position
    }
    fn world_to_screen(&self, point: WorldPoint) -> ScreenPoint {
        Camera::world_to_screen(self, point)
    }
    fn viewport(&self) -> Viewport {
        self.viewport
    }
    fn frustum(&self) -> FrustumSnapshot {
        Camera::frustum(self)
    }
}

impl fmt::Debug for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            options,
            viewport,
            pose,
            tan_half_fov: _, // derived
        } = self;
        f.debug_struct("Camera")
            .field("options", options)
            .field("viewport", viewport)
            .field("pose", pose)
            .finish_non_exhaustive()
    }
}

/// Error from [`Camera::new`] or a [`Pose`] constructor when the parameters cannot produce
/// a usable projection.
#[derive(Clone, Copy, Debug, PartialEq, displaydoc::Display)]
#[non_exhaustive]
pub enum CameraError {
    /// viewport size {width}×{height} has zero area
    ZeroViewport {
        #[allow(missing_docs)]
        width: u32,
        #[allow(missing_docs)]
        height: u32,
    },
    /// vertical field of view {0}° is not between 0° and 180°
    FieldOfView(FreeCoordinate),
    /// near plane distance {0} is not positive and finite
    NearPlane(FreeCoordinate),
    /// far plane distance {far} is not beyond near plane distance {near}
    FarPlane {
        #[allow(missing_docs)]
        near: FreeCoordinate,
        #[allow(missing_docs)]
        far: FreeCoordinate,
    },
    /// camera pose contains a non-finite coordinate
    NonFinitePose,
    /// camera forward and up directions are zero-length or parallel
    DegeneratePose,
}

impl core::error::Error for CameraError {}
