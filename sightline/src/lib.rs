//! Sampling which mesh vertices a camera can see.
//!
//! A capture walks every mesh a [`SceneProvider`] offers, registers each distinct
//! (owner, world position) vertex in a [`VertexRegistry`](registry::VertexRegistry),
//! builds triangle connectivity between those vertices, and classifies each vertex
//! against a [`CameraModel`] as visible, behind the camera, out of frame, or hidden
//! behind other geometry. The geometry test for the last case is delegated to a
//! [`RayIntersect`] oracle.
//!
//! The result is a [`Snapshot`], which [`export`] can format as CSV or as a text report.
//!
//! [`MeshScene`](mesh_scene::MeshScene) is an in-memory triangle scene which serves as
//! both the [`SceneProvider`] and the [`RayIntersect`] oracle.
//!
//! ## Package features
//!
//! * `std` (default): implements [`std::error::Error`] and uses `std`'s float math.
//!   Without it, the library is `no_std` and requires only `alloc`.
//! * `auto-threads`: classifies vertices in parallel with [`rayon`](https://docs.rs/rayon).
//! * `serde`: serialization for option and geometry types.

#![no_std]
// Crate-specific lint settings. (General settings can be found in the workspace manifest.)
#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    warn(clippy::std_instead_of_core, clippy::std_instead_of_alloc)
)]

#[cfg(any(feature = "std", test))]
#[cfg_attr(test, macro_use)]
extern crate std;
#[allow(unused_imports)]
#[macro_use]
extern crate alloc;

pub mod adjacency;
pub mod camera;
mod capture;
pub mod export;
pub mod math;
pub mod mesh_scene;
pub mod probe;
pub mod raycast;
pub mod registry;
pub mod scene;
pub mod util;

pub use camera::{Camera, CameraModel};
pub use capture::*;
pub use raycast::{Ray, RayIntersect};
pub use scene::{MeshView, ObjectId, SceneProvider};

// reexport for convenience of dependents and our tests
#[doc(hidden)]
pub use euclid;
