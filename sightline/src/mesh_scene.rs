//! An in-memory triangle-mesh scene, usable as both the [`SceneProvider`] and the
//! [`RayIntersect`] oracle of a capture.

use alloc::vec::Vec;

/// Acts as polyfill for float methods
#[cfg(not(feature = "std"))]
#[allow(unused_imports)]
use num_traits::float::Float as _;

use euclid::point3;

use crate::math::{Aab, FreeCoordinate, LocalPoint, LocalToWorld, WorldPoint, WorldVector};
use crate::raycast::{Ray, RayIntersect};
use crate::scene::{MeshView, ObjectId, SceneProvider};

/// Determinants smaller than this are treated as a ray parallel to the triangle's plane.
const PARALLEL_EPSILON: FreeCoordinate = 1e-12;

/// Bounding boxes are enlarged by this much so that rays grazing a flat object's plane
/// are not rejected by rounding error.
const BOUNDS_MARGIN: FreeCoordinate = 1e-9;

// -------------------------------------------------------------------------------------------------

/// Vertex positions and a flat triangle index list.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(clippy::exhaustive_structs)]
pub struct Mesh {
    /// Vertex positions, in the owning object's coordinates.
    pub positions: Vec<LocalPoint>,
    /// Each consecutive three entries index into `positions` to make a triangle.
    pub indices: Vec<u32>,
}

impl Mesh {
    /// A mesh consisting of a single triangle.
    pub fn triangle(corners: [LocalPoint; 3]) -> Self {
        Self {
            positions: corners.to_vec(),
            indices: vec![0, 1, 2],
        }
    }

    /// A planar quadrilateral with corners given in winding order, split into the triangles
    /// (0, 1, 2) and (0, 2, 3).
    pub fn quad(corners: [LocalPoint; 4]) -> Self {
        Self {
            positions: corners.to_vec(),
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    /// An axis-aligned box centered on the origin with the given half-size on each axis,
    /// made of 8 shared vertices and 12 outward-wound triangles.
    pub fn cube(half_extent: FreeCoordinate) -> Self {
        let h = half_extent;
        Self {
            positions: vec![
                point3(-h, -h, -h),
                point3(h, -h, -h),
                point3(h, h, -h),
                point3(-h, h, -h),
                point3(-h, -h, h),
                point3(h, -h, h),
                point3(h, h, h),
                point3(-h, h, h),
            ],
            indices: vec![
                0, 3, 2, 0, 2, 1, // −Z
                4, 5, 6, 4, 6, 7, // +Z
                0, 4, 7, 0, 7, 3, // −X
                1, 2, 6, 1, 6, 5, // +X
                0, 1, 5, 0, 5, 4, // −Y
                3, 7, 6, 3, 6, 2, // +Y
            ],
        }
    }

    /// Number of complete triangles in the index list.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A [`Mesh`] placed in the world.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(clippy::exhaustive_structs)]
pub struct SceneObject {
    /// Owner identity of every vertex of the mesh.
    pub id: ObjectId,
    /// Placement of the mesh in the world.
    pub transform: LocalToWorld,
    #[allow(missing_docs)]
    pub mesh: Mesh,
}

impl SceneObject {
    /// Constructs an object with the identity transform.
    pub fn new(id: ObjectId, mesh: Mesh) -> Self {
        Self {
            id,
            transform: LocalToWorld::identity(),
            mesh,
        }
    }

    /// Returns this object with its transform replaced.
    #[must_use]
    pub fn with_transform(self, transform: LocalToWorld) -> Self {
        Self { transform, ..self }
    }
}

/// World-space data derived from a [`SceneObject`] for ray tests.
#[derive(Clone, Debug)]
struct ObjectGeometry {
    bounds: Option<Aab>,
    triangles: Vec<[WorldPoint; 3]>,
}

impl ObjectGeometry {
    fn new(object: &SceneObject) -> Self {
        let world: Vec<Option<WorldPoint>> = object
            .mesh
            .positions
            .iter()
            .map(|&p| object.transform.transform_point3d(p))
            .collect();
        let corner = |index: u32| -> Option<WorldPoint> { *world.get(index as usize)? };

        // Triangles with unusable corners cannot be hit; the capture reports them separately.
        let triangles: Vec<[WorldPoint; 3]> = object
            .mesh
            .indices
            .chunks_exact(3)
            .filter_map(|tri| Some([corner(tri[0])?, corner(tri[1])?, corner(tri[2])?]))
            .collect();
        let bounds = Aab::from_points(triangles.iter().flatten().copied())
            .map(|aab| aab.expand(BOUNDS_MARGIN));

        Self { bounds, triangles }
    }
}

/// A set of [`SceneObject`]s, with their world-space triangles precomputed for ray tests.
///
/// Objects are enumerated by [`SceneProvider::meshes`] in the order they were added.
#[derive(Clone, Debug, Default)]
pub struct MeshScene {
    objects: Vec<SceneObject>,
    geometry: Vec<ObjectGeometry>,
}

impl MeshScene {
    /// Constructs an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object to the scene.
    pub fn insert(&mut self, object: SceneObject) {
        self.geometry.push(ObjectGeometry::new(&object));
        self.objects.push(object);
    }

    /// Returns the objects in the scene, in insertion order.
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Returns the number of objects in the scene.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns whether the scene contains no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Returns the distance along `ray` to the nearest triangle hit in `(0, max_distance]`,
    /// if any.
    pub fn first_hit(&self, ray: Ray, max_distance: FreeCoordinate) -> Option<FreeCoordinate> {
        self.candidate_triangles(ray, max_distance)
            .filter_map(|triangle| ray_triangle_distance(ray, triangle))
            .filter(|&t| t > 0.0 && t <= max_distance)
            .min_by(FreeCoordinate::total_cmp)
    }

    fn candidate_triangles(
        &self,
        ray: Ray,
        max_distance: FreeCoordinate,
    ) -> impl Iterator<Item = &[WorldPoint; 3]> {
        self.geometry
            .iter()
            .filter(move |geometry| {
                geometry.bounds.is_some_and(|bounds| {
                    bounds.intersects_segment(ray.origin, ray.direction, max_distance)
                })
            })
            .flat_map(|geometry| geometry.triangles.iter())
    }
}

impl FromIterator<SceneObject> for MeshScene {
    fn from_iter<T: IntoIterator<Item = SceneObject>>(iter: T) -> Self {
        let mut scene = MeshScene::new();
        for object in iter {
            scene.insert(object);
        }
        scene
    }
}

impl SceneProvider for MeshScene {
    fn meshes(&self) -> impl Iterator<Item = MeshView<'_>> {
        self.objects.iter().map(|object| MeshView {
            owner: object.id,
            transform: object.transform,
            positions: &object.mesh.positions,
            indices: &object.mesh.indices,
        })
    }
}

impl RayIntersect for MeshScene {
    fn intersects(&self, ray: Ray, max_distance: FreeCoordinate) -> bool {
        self.candidate_triangles(ray, max_distance).any(|triangle| {
            ray_triangle_distance(ray, triangle).is_some_and(|t| t > 0.0 && t <= max_distance)
        })
    }
}

/// Möller–Trumbore ray/triangle intersection, accepting hits on either side.
///
/// Returns the ray parameter `t` of the hit (a distance if the direction is a unit vector),
/// which may be negative, or [`None`] if the ray's line misses the triangle or is parallel
/// to it.
fn ray_triangle_distance(ray: Ray, [v0, v1, v2]: &[WorldPoint; 3]) -> Option<FreeCoordinate> {
    let edge1: WorldVector = *v1 - *v0;
    let edge2: WorldVector = *v2 - *v0;
    let p = ray.direction.cross(edge2);
    let determinant = edge1.dot(p);
    if determinant.abs() < PARALLEL_EPSILON {
        return None;
    }
    let inverse = determinant.recip();

    let s = ray.origin - *v0;
    let u = s.dot(p) * inverse;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inverse;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    Some(edge2.dot(q) * inverse)
}
