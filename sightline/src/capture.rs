//! One capture cycle: registration, adjacency, and classification of a scene's vertices.

use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::adjacency::{AdjacencyBuilder, TriangleIdentity, TriangleSet};
use crate::camera::{CameraModel, FrustumSnapshot};
use crate::probe::{Classification, ProbeOptions};
use crate::raycast::RayIntersect;
use crate::registry::{VertexRecord, VertexRegistry};
use crate::scene::SceneProvider;
use crate::util::SyncIfThreaded;


/// Options controlling a capture.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
pub struct CaptureOptions {
    /// Parameters of the per-vertex occlusion probe.
    pub probe: ProbeOptions,
    /// Whether triangles are deduplicated by corner sequence or corner set.
    pub triangle_identity: TriangleIdentity,
}

impl CaptureOptions {
    #[allow(missing_docs)]
    #[must_use]
    pub fn with_probe(mut self, probe: ProbeOptions) -> Self {
        self.probe = probe;
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn with_triangle_identity(mut self, triangle_identity: TriangleIdentity) -> Self {
        self.triangle_identity = triangle_identity;
        self
    }
}

/// Performs one capture cycle of `scene` as seen by `camera`.
///
/// Each mesh is traversed once: its vertices are registered, then its triangles are added.
/// Meshes are visited in the order the scene provides them, which determines the vertex
/// ordinals. Once every mesh is in, each distinct vertex is classified exactly once against
/// `oracle`.
///
/// Vertices whose position the mesh transform cannot map are left out, with a warning, and
/// so are the triangles using them.
pub fn capture<S, C, O>(scene: &S, camera: &C, oracle: &O, options: &CaptureOptions) -> Snapshot
where
    S: SceneProvider + ?Sized,
    C: CameraModel + SyncIfThreaded + ?Sized,
    O: RayIntersect + SyncIfThreaded + ?Sized,
{
    let frustum = camera.frustum();
    let mut registry = VertexRegistry::new(camera.position());
    let mut adjacency = AdjacencyBuilder::new(options.triangle_identity);

    for mesh in scene.meshes() {
        let world_positions: Vec<_> = mesh.world_positions().collect();
        for (index, position) in world_positions.iter().enumerate() {
            match *position {
                Some(position) => {
                    registry.register(mesh.owner, position);
                }
                None => log::warn!(
                    "object {owner}: vertex {index} has no world position",
                    owner = mesh.owner
                ),
            }
        }
        adjacency.add_mesh(&mut registry, mesh.owner, &world_positions, mesh.indices);
    }

    registry.classify_all(camera, oracle, &options.probe);

    let snapshot = Snapshot {
        vertices: registry.into_records(),
        triangles: adjacency.finish(),
        frustum,
    };
    log::debug!("captured {}", snapshot.stats());
    snapshot
}

/// The outcome of one capture cycle: every distinct vertex with its classification and
/// neighbors, the distinct triangles, and the camera's frustum at the time.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    vertices: Vec<VertexRecord>,
    triangles: TriangleSet,
    frustum: FrustumSnapshot,
}

impl Snapshot {
    /// Vertices in ordinal order; the record at index `i` has ID `i`.
    pub fn vertices(&self) -> &[VertexRecord] {
        &self.vertices
    }

    #[allow(missing_docs)]
    pub fn triangles(&self) -> &TriangleSet {
        &self.triangles
    }

    #[allow(missing_docs)]
    pub fn frustum(&self) -> &FrustumSnapshot {
        &self.frustum
    }

    /// Iterates over the vertices classified as visible.
    pub fn visible_vertices(&self) -> impl Iterator<Item = &VertexRecord> {
        self.vertices.iter().filter(|v| v.is_visible())
    }

    /// Counts of what the capture found.
    pub fn stats(&self) -> CaptureStats {
        let mut stats = CaptureStats {
            vertices: self.vertices.len(),
            triangles: self.triangles.len(),
            skipped_triangles: self.triangles.skipped(),
            duplicate_triangles: self.triangles.duplicates(),
            ..CaptureStats::default()
        };
        for vertex in &self.vertices {
            match vertex.classification() {
                Some(Classification::Visible) => stats.visible += 1,
                Some(Classification::BehindCamera) => stats.behind_camera += 1,
                Some(Classification::OutOfFrame) => stats.out_of_frame += 1,
                Some(Classification::OccludedByMesh) => stats.occluded += 1,
                None => {}
            }
        }
        stats
    }
}

/// Summary counts of a [`Snapshot`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[allow(clippy::exhaustive_structs)]
#[allow(missing_docs)]
pub struct CaptureStats {
    pub vertices: usize,
    pub triangles: usize,
    pub visible: usize,
    pub behind_camera: usize,
    pub out_of_frame: usize,
    pub occluded: usize,
    pub skipped_triangles: usize,
    pub duplicate_triangles: usize,
}

impl fmt::Display for CaptureStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let &Self {
            vertices,
            triangles,
            visible,
            behind_camera,
            out_of_frame,
            occluded,
            skipped_triangles,
            duplicate_triangles,
        } = self;
        write!(
            f,
            "{vertices} vertices ({visible} visible, {behind_camera} behind camera, \
            {out_of_frame} out of frame, {occluded} occluded), \
            {triangles} triangles ({skipped_triangles} skipped, {duplicate_triangles} duplicate)"
        )
    }
}

/// Runs captures one at a time, rejecting a capture requested while another is running.
#[derive(Debug, Default)]
pub struct Capturer {
    busy: AtomicBool,
    options: CaptureOptions,
}

impl Capturer {
    #[allow(missing_docs)]
    pub fn new(options: CaptureOptions) -> Self {
        Self {
            busy: AtomicBool::new(false),
            options,
        }
    }

    #[allow(missing_docs)]
    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    /// Performs a [`capture`] with this capturer's options, unless one is already in
    /// progress.
    ///
    /// The capturer becomes idle again when the capture finishes, including by panicking.
    pub fn try_capture<S, C, O>(
        &self,
        scene: &S,
        camera: &C,
        oracle: &O,
    ) -> Result<Snapshot, CaptureError>
    where
        S: SceneProvider + ?Sized,
        C: CameraModel + SyncIfThreaded + ?Sized,
        O: RayIntersect + SyncIfThreaded + ?Sized,
    {
        if self.busy.swap(true, Ordering::Acquire) {
            return Err(CaptureError::Busy);
        }
        let _idle_on_exit = scopeguard::guard((), |()| self.busy.store(false, Ordering::Release));
        Ok(capture(scene, camera, oracle, &self.options))
    }
}

/// Error from [`Capturer::try_capture`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, displaydoc::Display)]
#[non_exhaustive]
pub enum CaptureError {
    /// a capture is already in progress
    Busy,
}

impl core::error::Error for CaptureError {}
