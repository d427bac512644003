//! Deduplicated vertices of one capture cycle, keyed by owner and exact world position.

use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use ordered_float::OrderedFloat;

use crate::camera::CameraModel;
use crate::math::{FreeCoordinate, WorldPoint};
use crate::probe::{Classification, ProbeOptions, classify};
use crate::raycast::RayIntersect;
use crate::scene::ObjectId;
use crate::util::SyncIfThreaded;

/// Ordinal of a distinct vertex within one capture: zero-based, in order of first sighting.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct VertexId(usize);

impl VertexId {
    /// Returns the ordinal as an index into [`VertexRegistry::iter`] order.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Everything known about one distinct vertex.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexRecord {
    id: VertexId,
    owner: ObjectId,
    position: WorldPoint,
    distance_to_camera: FreeCoordinate,
    classification: Option<Classification>,
    neighbors: Vec<VertexId>,
}

impl VertexRecord {
    #[allow(missing_docs)]
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// The object whose mesh this vertex came from.
    pub fn owner(&self) -> ObjectId {
        self.owner
    }

    /// World-space position, exactly as registered.
    pub fn position(&self) -> WorldPoint {
        self.position
    }

    /// Euclidean distance from the camera position of the capture cycle.
    pub fn distance_to_camera(&self) -> FreeCoordinate {
        self.distance_to_camera
    }

    /// The result of the visibility test, or [`None`] if the registry has not been
    /// classified yet.
    pub fn classification(&self) -> Option<Classification> {
        self.classification
    }

    /// Whether the vertex was classified as visible.
    pub fn is_visible(&self) -> bool {
        self.classification.is_some_and(Classification::is_visible)
    }

    /// Vertices sharing a triangle edge with this one, in the order first connected,
    /// without duplicates, and never including this vertex itself.
    pub fn neighbors(&self) -> &[VertexId] {
        &self.neighbors
    }
}

type VertexKey = (ObjectId, [OrderedFloat<FreeCoordinate>; 3]);

fn vertex_key(owner: ObjectId, position: WorldPoint) -> VertexKey {
    // Adding zero turns -0.0 into 0.0 so that both zeroes are the same key.
    let coordinate = |c: FreeCoordinate| OrderedFloat(c + 0.0);
    (
        owner,
        [
            coordinate(position.x),
            coordinate(position.y),
            coordinate(position.z),
        ],
    )
}

/// The set of distinct vertices seen during one capture cycle.
///
/// Vertices are identified by owner and exact world position: close but unequal positions
/// are different vertices, and so are equal positions under different owners.
#[derive(Clone, Debug)]
pub struct VertexRegistry {
    camera_position: WorldPoint,
    records: Vec<VertexRecord>,
    index: HashMap<VertexKey, VertexId>,
}

impl VertexRegistry {
    /// Constructs an empty registry measuring distances from `camera_position`.
    pub fn new(camera_position: WorldPoint) -> Self {
        Self {
            camera_position,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// The camera position distances are measured from.
    pub fn camera_position(&self) -> WorldPoint {
        self.camera_position
    }

    /// Returns the ID of the vertex of `owner` at `position`, registering it with the next
    /// ordinal if it has not been seen before.
    ///
    /// Registering an already known vertex does not change it.
    pub fn register(&mut self, owner: ObjectId, position: WorldPoint) -> VertexId {
        let next_id = VertexId(self.records.len());
        let &mut id = self
            .index
            .entry(vertex_key(owner, position))
            .or_insert(next_id);
        if id == next_id {
            self.records.push(VertexRecord {
                id,
                owner,
                position,
                distance_to_camera: (position - self.camera_position).length(),
                classification: None,
                neighbors: Vec::new(),
            });
        }
        id
    }

    /// Returns the ID of the vertex of `owner` at `position`, if it has been registered.
    pub fn lookup(&self, owner: ObjectId, position: WorldPoint) -> Option<VertexId> {
        self.index.get(&vertex_key(owner, position)).copied()
    }

    #[allow(missing_docs)]
    pub fn get(&self, id: VertexId) -> Option<&VertexRecord> {
        self.records.get(id.0)
    }

    /// Number of distinct vertices.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over all vertices in ordinal order.
    pub fn iter(&self) -> core::slice::Iter<'_, VertexRecord> {
        self.records.iter()
    }

    /// Records that `a` and `b` share a triangle edge. Self-links are ignored.
    pub(crate) fn link(&mut self, a: VertexId, b: VertexId) {
        if a == b {
            return;
        }
        for (from, to) in [(a, b), (b, a)] {
            let neighbors = &mut self.records[from.0].neighbors;
            if !neighbors.contains(&to) {
                neighbors.push(to);
            }
        }
    }

    /// Classifies every vertex and stores the result in its record.
    ///
    /// With the `auto-threads` feature this is done in parallel; the results are the same.
    pub fn classify_all<C, O>(&mut self, camera: &C, oracle: &O, options: &ProbeOptions)
    where
        C: CameraModel + SyncIfThreaded + ?Sized,
        O: RayIntersect + SyncIfThreaded + ?Sized,
    {
        let classify_one = |record: &mut VertexRecord| {
            record.classification = Some(classify(record.position, camera, oracle, options));
        };

        #[cfg(feature = "auto-threads")]
        {
            use rayon::iter::{IntoParallelRefMutIterator as _, ParallelIterator as _};
            self.records.par_iter_mut().for_each(classify_one);
        }
        #[cfg(not(feature = "auto-threads"))]
        self.records.iter_mut().for_each(classify_one);
    }

    /// Consumes the registry, returning the records in ordinal order.
    pub fn into_records(self) -> Vec<VertexRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a VertexRegistry {
    type Item = &'a VertexRecord;
    type IntoIter = core::slice::Iter<'a, VertexRecord>;
    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
