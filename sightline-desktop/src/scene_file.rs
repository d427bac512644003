//! JSON scene files: a camera and a list of meshes placed in the world.
//!
//! ```json
//! {
//!     "camera": {
//!         "position": [0, 1, 5],
//!         "look_at": [0, 0, 0],
//!         "viewport": [800, 600]
//!     },
//!     "objects": [
//!         {
//!             "id": 1,
//!             "translation": [0, 0, -2],
//!             "vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
//!             "triangles": [0, 1, 2]
//!         }
//!     ]
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use sightline::camera::{CameraOptions, Pose, Viewport};
use sightline::euclid::{Angle, Point3D, Vector3D, point3, vec3};
use sightline::math::{FreeCoordinate, LocalToWorld};
use sightline::mesh_scene::{Mesh, MeshScene, SceneObject};
use sightline::{Camera, ObjectId};

type Coordinates = [FreeCoordinate; 3];

/// Contents of a scene file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[allow(clippy::exhaustive_structs)]
pub struct SceneFile {
    #[allow(missing_docs)]
    pub camera: CameraSpec,
    #[allow(missing_docs)]
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
}

/// Camera description. The orientation is given either by `look_at` (with optional `up`)
/// or by `yaw` and `pitch` in degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[allow(clippy::exhaustive_structs, missing_docs)]
pub struct CameraSpec {
    pub position: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub look_at: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaw: Option<FreeCoordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<FreeCoordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fov_y: Option<FreeCoordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub near: Option<FreeCoordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub far: Option<FreeCoordinate>,
    /// Width and height in pixels.
    pub viewport: [u32; 2],
}

/// One mesh and its placement.
///
/// The placement is applied as scale, then rotation about Z, X, and Y in that order
/// (angles in degrees), then translation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[allow(clippy::exhaustive_structs, missing_docs)]
pub struct ObjectSpec {
    pub id: u64,
    #[serde(default)]
    pub translation: Coordinates,
    #[serde(default)]
    pub rotation: Coordinates,
    #[serde(default = "unit_scale")]
    pub scale: Coordinates,
    pub vertices: Vec<Coordinates>,
    pub triangles: Vec<u32>,
}

fn unit_scale() -> Coordinates {
    [1.0; 3]
}

impl CameraSpec {
    /// Validates and constructs the camera.
    pub fn to_camera(&self) -> Result<Camera, anyhow::Error> {
        let defaults = CameraOptions::default();
        let options = CameraOptions::default()
            .with_fov_y(self.fov_y.unwrap_or(defaults.fov_y))
            .with_clip_planes(
                self.near.unwrap_or(defaults.near),
                self.far.unwrap_or(defaults.far),
            );
        let [width, height] = self.viewport;
        Ok(Camera::new(options, Viewport { width, height }, self.pose()?)?)
    }

    fn pose(&self) -> Result<Pose, anyhow::Error> {
        let eye = Point3D::from(self.position);
        let pose = match (self.look_at, self.yaw, self.pitch) {
            (Some(target), None, None) => Pose::look_at(
                eye,
                Point3D::from(target),
                self.up.map_or(vec3(0., 1., 0.), Vector3D::from),
            )?,
            (None, yaw, pitch) => {
                if self.up.is_some() {
                    anyhow::bail!("camera \"up\" is only used with \"look_at\"");
                }
                Pose::from_yaw_pitch(eye, yaw.unwrap_or(0.0), pitch.unwrap_or(0.0))?
            }
            (Some(_), _, _) => {
                anyhow::bail!("camera has both \"look_at\" and \"yaw\"/\"pitch\"")
            }
        };
        Ok(pose)
    }
}

impl ObjectSpec {
    /// The object's local-to-world transform.
    pub fn transform(&self) -> LocalToWorld {
        let [sx, sy, sz] = self.scale;
        let [rx, ry, rz] = self.rotation;
        LocalToWorld::scale(sx, sy, sz)
            .then_rotate(0., 0., 1., Angle::degrees(rz))
            .then_rotate(1., 0., 0., Angle::degrees(rx))
            .then_rotate(0., 1., 0., Angle::degrees(ry))
            .then_translate(Vector3D::from(self.translation))
    }

    /// Converts to a [`SceneObject`]. Index validity is not checked here; out-of-range
    /// triangles are skipped during capture.
    pub fn to_scene_object(&self) -> SceneObject {
        SceneObject::new(
            ObjectId(self.id),
            Mesh {
                positions: self
                    .vertices
                    .iter()
                    .map(|&[x, y, z]| point3(x, y, z))
                    .collect(),
                indices: self.triangles.clone(),
            },
        )
        .with_transform(self.transform())
    }
}

/// A scene file converted to the types a capture uses.
#[derive(Clone, Debug)]
#[allow(clippy::exhaustive_structs)]
pub struct LoadedScene {
    #[allow(missing_docs)]
    pub scene: MeshScene,
    #[allow(missing_docs)]
    pub camera: Camera,
}

impl SceneFile {
    /// Converts the file contents, validating the camera.
    pub fn to_loaded(&self) -> Result<LoadedScene, anyhow::Error> {
        let mut scene = MeshScene::new();
        let mut seen_ids = std::collections::HashSet::new();
        for object in &self.objects {
            if !seen_ids.insert(object.id) {
                // Vertices of both objects are still distinct since their positions are
                // compared together with the ID, but it is probably a mistake.
                log::warn!("object ID {id} is used more than once", id = object.id);
            }
            scene.insert(object.to_scene_object());
        }
        Ok(LoadedScene {
            scene,
            camera: self.camera.to_camera().context("invalid camera")?,
        })
    }
}

/// Parses scene file text.
pub fn parse_scene(text: &str) -> Result<LoadedScene, anyhow::Error> {
    let file: SceneFile = serde_json::from_str(text)?;
    file.to_loaded()
}

/// Reads and parses a scene file.
pub fn load_scene(path: &Path) -> Result<LoadedScene, anyhow::Error> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read scene file {path}", path = path.display()))?;
    parse_scene(&text).with_context(|| format!("failed to load scene file {path}", path = path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sightline::SceneProvider as _;

    const SCENE: &str = r#"{
        "camera": {
            "position": [0, 1, 5],
            "look_at": [0, 1, 0],
            "fov_y": 90,
            "viewport": [640, 480]
        },
        "objects": [
            {
                "id": 1,
                "translation": [0, 0, -2],
                "scale": [2, 2, 2],
                "vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
                "triangles": [0, 1, 2]
            },
            {
                "id": 2,
                "vertices": [],
                "triangles": []
            }
        ]
    }"#;

    #[test]
    fn parse() {
        let loaded = parse_scene(SCENE).unwrap();
        assert_eq!(loaded.scene.len(), 2);
        assert_eq!(loaded.camera.pose().position(), point3(0., 1., 5.));
        assert_eq!(loaded.camera.pose().forward(), vec3(0., 0., -1.));
        assert_eq!(loaded.camera.options().fov_y, 90.0);
        assert_eq!(loaded.camera.options().near, 0.3);

        let mesh = loaded.scene.meshes().next().unwrap();
        assert_eq!(mesh.owner, ObjectId(1));
        assert_eq!(mesh.world_position(1), Some(point3(2., 0., -2.)));
    }

    #[test]
    fn half_turn_about_y() {
        let object = ObjectSpec {
            id: 1,
            translation: [0.0; 3],
            rotation: [0., 180., 0.],
            scale: unit_scale(),
            vertices: vec![],
            triangles: vec![],
        };
        let p = object.transform().transform_point3d(point3(1., 0., 0.)).unwrap();
        assert!((p - point3(-1., 0., 0.)).length() < 1e-12, "{p:?}");
    }

    #[test]
    fn yaw_pitch_camera() {
        let loaded = parse_scene(
            r#"{ "camera": { "position": [0, 0, 0], "yaw": 0, "viewport": [10, 10] } }"#,
        )
        .unwrap();
        assert_eq!(loaded.camera.pose().forward(), vec3(0., 0., -1.));
        assert!(loaded.scene.is_empty());
    }

    #[test]
    fn errors() {
        let error = |text: &str| format!("{:#}", parse_scene(text).unwrap_err());
        assert!(
            error(r#"{ "camera": { "position": [0, 0, 0], "viewport": [0, 10] } }"#)
                .contains("zero area")
        );
        assert!(
            error(
                r#"{ "camera": { "position": [0, 0, 0], "look_at": [1, 0, 0], "yaw": 3,
                "viewport": [10, 10] } }"#
            )
            .contains("both")
        );
        assert!(error(r#"{ "camera": { "position": [0, 0, 0] } }"#).contains("viewport"));
        assert!(
            error(r#"{ "camera": { "position": [0, 0, 0], "viewport": [1, 1], "zoom": 2 } }"#)
                .contains("zoom")
        );
    }

    #[test]
    fn load_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let message = format!("{:#}", load_scene(&path).unwrap_err());
        assert!(message.contains("missing.json"), "{message}");
    }
}
