//! Triangle connectivity: turns each mesh's index buffer into registry vertex IDs,
//! neighbor links, and a deduplicated triangle set.

use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;

use crate::math::WorldPoint;
use crate::registry::{VertexId, VertexRegistry};
use crate::scene::ObjectId;

/// Ordinal of a distinct triangle within one capture: zero-based, in order of first sighting.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TriangleId(usize);

impl TriangleId {
    #[allow(missing_docs)]
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TriangleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A distinct triangle, with its corners in the order first encountered.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriangleRecord {
    id: TriangleId,
    corners: [VertexId; 3],
}

impl TriangleRecord {
    #[allow(missing_docs)]
    pub fn id(&self) -> TriangleId {
        self.id
    }

    #[allow(missing_docs)]
    pub fn corners(&self) -> [VertexId; 3] {
        self.corners
    }
}

/// When two triangles with the same corner vertices count as the same triangle.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[allow(clippy::exhaustive_enums)]
pub enum TriangleIdentity {
    /// Only identical corner sequences are the same triangle; rotations and reflections of
    /// the sequence are distinct.
    #[default]
    Ordered,
    /// Any two triangles with the same set of corners are the same triangle.
    Unordered,
}

impl TriangleIdentity {
    fn key(self, mut corners: [VertexId; 3]) -> [VertexId; 3] {
        match self {
            TriangleIdentity::Ordered => corners,
            TriangleIdentity::Unordered => {
                corners.sort_unstable();
                corners
            }
        }
    }
}

/// Why a triangle could not be added.
#[derive(Clone, Copy, Debug, PartialEq, displaydoc::Display)]
#[non_exhaustive]
pub enum CornerError {
    /// corner index {index} is outside the vertex array of length {len}
    IndexOutOfRange {
        #[allow(missing_docs)]
        index: u32,
        #[allow(missing_docs)]
        len: usize,
    },
    /// vertex {index} has no usable world position
    NoPosition {
        #[allow(missing_docs)]
        index: u32,
    },
    /// no vertex of object {owner} is registered at {position:?}
    NotRegistered {
        #[allow(missing_docs)]
        owner: ObjectId,
        #[allow(missing_docs)]
        position: WorldPoint,
    },
}

impl core::error::Error for CornerError {}

/// The triangles of one capture, with counts of what was left out.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriangleSet {
    triangles: Vec<TriangleRecord>,
    skipped: usize,
    duplicates: usize,
}

impl TriangleSet {
    /// Distinct triangles in ordinal order.
    pub fn triangles(&self) -> &[TriangleRecord] {
        &self.triangles
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Number of triangles left out because a corner could not be resolved.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Number of triangles merged into an earlier identical one.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

/// Accumulates triangles for one capture cycle, linking their corners in a
/// [`VertexRegistry`] as it goes.
#[derive(Debug)]
pub struct AdjacencyBuilder {
    identity: TriangleIdentity,
    seen: HashMap<[VertexId; 3], TriangleId>,
    set: TriangleSet,
}

impl AdjacencyBuilder {
    #[allow(missing_docs)]
    pub fn new(identity: TriangleIdentity) -> Self {
        Self {
            identity,
            seen: HashMap::new(),
            set: TriangleSet::default(),
        }
    }

    /// Adds the triangle whose corners are the registered vertices of `owner` at `corners`.
    ///
    /// The corner vertices are linked pairwise as neighbors (a vertex is never its own
    /// neighbor). If an identical triangle was already added, its ID is returned and the
    /// duplicate is counted.
    ///
    /// Vertices are only looked up, not registered; an unregistered corner is an error.
    pub fn add_triangle(
        &mut self,
        registry: &mut VertexRegistry,
        owner: ObjectId,
        corners: [WorldPoint; 3],
    ) -> Result<TriangleId, CornerError> {
        let [a, b, c] = corners.map(|position| {
            registry
                .lookup(owner, position)
                .ok_or(CornerError::NotRegistered { owner, position })
        });
        Ok(self.add_resolved(registry, [a?, b?, c?]))
    }

    /// Adds every complete triangle of one mesh.
    ///
    /// `world_positions` holds the mesh's vertices, already registered in `registry` except
    /// where [`None`]. Triangles that cannot be resolved are skipped with a warning and
    /// counted; trailing indices that do not make a whole triangle are ignored with
    /// a warning.
    pub fn add_mesh(
        &mut self,
        registry: &mut VertexRegistry,
        owner: ObjectId,
        world_positions: &[Option<WorldPoint>],
        indices: &[u32],
    ) {
        let triangles = indices.chunks_exact(3);
        let remainder = triangles.remainder().len();
        if remainder != 0 {
            log::warn!(
                "object {owner}: ignoring {remainder} trailing triangle indices \
                (index count {count} is not a multiple of 3)",
                count = indices.len()
            );
        }

        for (triangle_number, triangle) in triangles.enumerate() {
            let resolved = resolve_corners(world_positions, triangle).and_then(|corners| {
                self.add_triangle(registry, owner, corners)
            });
            if let Err(error) = resolved {
                log::warn!("object {owner}: skipping triangle {triangle_number}: {error}");
                self.set.skipped += 1;
            }
        }
    }

    fn add_resolved(&mut self, registry: &mut VertexRegistry, corners: [VertexId; 3]) -> TriangleId {
        let next_id = TriangleId(self.set.triangles.len());
        let &mut id = self
            .seen
            .entry(self.identity.key(corners))
            .or_insert(next_id);
        if id != next_id {
            self.set.duplicates += 1;
            return id;
        }

        self.set.triangles.push(TriangleRecord { id, corners });
        let [a, b, c] = corners;
        registry.link(a, b);
        registry.link(a, c);
        registry.link(b, c);
        id
    }

    /// Finishes the capture cycle's triangles.
    pub fn finish(self) -> TriangleSet {
        self.set
    }
}

fn resolve_corners(
    world_positions: &[Option<WorldPoint>],
    triangle: &[u32],
) -> Result<[WorldPoint; 3], CornerError> {
    let corner = |index: u32| -> Result<WorldPoint, CornerError> {
        world_positions
            .get(index as usize)
            .ok_or(CornerError::IndexOutOfRange {
                index,
                len: world_positions.len(),
            })?
            .ok_or(CornerError::NoPosition { index })
    };
    Ok([corner(triangle[0])?, corner(triangle[1])?, corner(triangle[2])?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString as _;
    use euclid::point3;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const OWNER: ObjectId = ObjectId(1);

    fn positions() -> Vec<Option<WorldPoint>> {
        vec![
            Some(point3(0., 0., 0.)),
            Some(point3(1., 0., 0.)),
            Some(point3(0., 1., 0.)),
            Some(point3(1., 1., 0.)),
        ]
    }

    fn registered(positions: &[Option<WorldPoint>]) -> (VertexRegistry, Vec<VertexId>) {
        let mut registry = VertexRegistry::new(point3(0., 0., 5.));
        let ids = positions
            .iter()
            .flatten()
            .map(|&p| registry.register(OWNER, p))
            .collect();
        (registry, ids)
    }

    fn neighbor_indices(registry: &VertexRegistry, index: usize) -> Vec<usize> {
        registry
            .iter()
            .nth(index)
            .unwrap()
            .neighbors()
            .iter()
            .map(|n| n.index())
            .collect()
    }

    #[test]
    fn single_triangle() {
        let positions = positions();
        let (mut registry, _) = registered(&positions);
        let mut builder = AdjacencyBuilder::new(TriangleIdentity::Ordered);
        builder.add_mesh(&mut registry, OWNER, &positions, &[0, 1, 2]);
        let set = builder.finish();

        assert_eq!(set.len(), 1);
        assert_eq!(
            set.triangles()[0].corners().map(VertexId::index),
            [0, 1, 2]
        );
        assert_eq!(neighbor_indices(&registry, 0), vec![1, 2]);
        assert_eq!(neighbor_indices(&registry, 1), vec![0, 2]);
        assert_eq!(neighbor_indices(&registry, 2), vec![0, 1]);
        assert_eq!(neighbor_indices(&registry, 3), Vec::<usize>::new());
    }

    #[test]
    fn shared_edge_is_linked_once() {
        let positions = positions();
        let (mut registry, _) = registered(&positions);
        let mut builder = AdjacencyBuilder::new(TriangleIdentity::Ordered);
        builder.add_mesh(&mut registry, OWNER, &positions, &[0, 1, 2, 1, 3, 2]);
        assert_eq!(builder.finish().len(), 2);
        assert_eq!(neighbor_indices(&registry, 1), vec![0, 2, 3]);
        assert_eq!(neighbor_indices(&registry, 2), vec![0, 1, 3]);
    }

    #[rstest]
    #[case::ordered_identical(TriangleIdentity::Ordered, [0, 1, 2], 1, 1)]
    #[case::ordered_rotated(TriangleIdentity::Ordered, [1, 2, 0], 2, 0)]
    #[case::ordered_reflected(TriangleIdentity::Ordered, [0, 2, 1], 2, 0)]
    #[case::unordered_identical(TriangleIdentity::Unordered, [0, 1, 2], 1, 1)]
    #[case::unordered_rotated(TriangleIdentity::Unordered, [1, 2, 0], 1, 1)]
    #[case::unordered_reflected(TriangleIdentity::Unordered, [0, 2, 1], 1, 1)]
    fn dedup(
        #[case] identity: TriangleIdentity,
        #[case] second: [u32; 3],
        #[case] expected_len: usize,
        #[case] expected_duplicates: usize,
    ) {
        let positions = positions();
        let (mut registry, _) = registered(&positions);
        let mut builder = AdjacencyBuilder::new(identity);
        let mut indices = vec![0, 1, 2];
        indices.extend(second);
        builder.add_mesh(&mut registry, OWNER, &positions, &indices);
        let set = builder.finish();
        assert_eq!(
            (set.len(), set.duplicates(), set.skipped()),
            (expected_len, expected_duplicates, 0)
        );
        let ids: Vec<usize> = set.triangles().iter().map(|t| t.id().index()).collect();
        assert_eq!(ids, (0..expected_len).collect::<Vec<_>>());
    }

    #[test]
    fn degenerate_triangle_has_no_self_links() {
        let positions = positions();
        let (mut registry, _) = registered(&positions);
        let mut builder = AdjacencyBuilder::new(TriangleIdentity::Ordered);
        builder.add_mesh(&mut registry, OWNER, &positions, &[0, 0, 1]);
        assert_eq!(builder.finish().len(), 1);
        assert_eq!(neighbor_indices(&registry, 0), vec![1]);
        assert_eq!(neighbor_indices(&registry, 1), vec![0]);
    }

    #[test]
    fn unresolvable_triangles_are_skipped() {
        let mut positions = positions();
        positions.push(None);
        let (mut registry, _) = registered(&positions);
        let mut builder = AdjacencyBuilder::new(TriangleIdentity::Ordered);
        builder.add_mesh(
            &mut registry,
            OWNER,
            &positions,
            &[0, 1, 9, 0, 1, 4, 0, 1, 2, 3],
        );
        let set = builder.finish();
        assert_eq!((set.len(), set.skipped()), (1, 2));
    }

    #[test]
    fn unregistered_corner_is_an_error() {
        let positions = positions();
        let (mut registry, _) = registered(&positions);
        let mut builder = AdjacencyBuilder::new(TriangleIdentity::Ordered);
        let error = builder
            .add_triangle(
                &mut registry,
                ObjectId(2),
                [point3(0., 0., 0.), point3(1., 0., 0.), point3(0., 1., 0.)],
            )
            .unwrap_err();
        assert_eq!(
            error,
            CornerError::NotRegistered {
                owner: ObjectId(2),
                position: point3(0., 0., 0.)
            }
        );
        assert!(builder.finish().is_empty());
    }

    #[test]
    fn corner_error_display() {
        assert_eq!(
            CornerError::IndexOutOfRange { index: 9, len: 4 }.to_string(),
            "corner index 9 is outside the vertex array of length 4"
        );
    }
}
