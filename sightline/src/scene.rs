//! The seam through which a capture enumerates scene geometry.

use core::fmt;

use crate::math::{LocalPoint, LocalToWorld, WorldPoint};

/// Identifies the scene object which owns a mesh.
///
/// Two vertices at the same world position are distinct if their owners differ.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[allow(clippy::exhaustive_structs)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Borrowed view of one mesh in a scene: its owner, placement, and triangle data.
#[derive(Clone, Copy, Debug)]
#[allow(clippy::exhaustive_structs)]
pub struct MeshView<'a> {
    /// The object this mesh belongs to.
    pub owner: ObjectId,
    /// Transform from the mesh's own coordinates to world coordinates.
    pub transform: LocalToWorld,
    /// Vertex positions in the mesh's own coordinates.
    pub positions: &'a [LocalPoint],
    /// Flat triangle list: each consecutive three entries index into `positions`.
    pub indices: &'a [u32],
}

impl MeshView<'_> {
    /// Returns the world-space position of the vertex at `index`, or [`None`] if there is no
    /// such vertex or the transform cannot map it (a projective transform sending it to
    /// infinity).
    pub fn world_position(&self, index: usize) -> Option<WorldPoint> {
        self.transform
            .transform_point3d(*self.positions.get(index)?)
    }

    /// Returns the world-space positions of all vertices, in order, with the same
    /// [`None`] cases as [`MeshView::world_position`].
    pub fn world_positions(&self) -> impl Iterator<Item = Option<WorldPoint>> + '_ {
        self.positions
            .iter()
            .map(|&p| self.transform.transform_point3d(p))
    }
}

/// Source of the meshes a capture examines.
///
/// Implemented by [`MeshScene`](crate::mesh_scene::MeshScene). Implementations for other
/// scene representations need only produce a [`MeshView`] per mesh; the order in which
/// meshes are produced determines vertex ordinal IDs, so it should be stable for a given
/// scene.
pub trait SceneProvider {
    /// Enumerates every mesh in the scene.
    fn meshes(&self) -> impl Iterator<Item = MeshView<'_>>;
}

impl<T: ?Sized + SceneProvider> SceneProvider for &T {
    fn meshes(&self) -> impl Iterator<Item = MeshView<'_>> {
        (**self).meshes()
    }
}
