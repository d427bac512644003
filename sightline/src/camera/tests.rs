use super::*;
use alloc::string::ToString as _;
use euclid::point3;
use pretty_assertions::assert_eq;
use rstest::rstest;

const VIEWPORT: Viewport = Viewport {
    width: 800,
    height: 600,
};

/// Camera at (0, 0, 5) looking toward the origin.
fn test_camera() -> Camera {
    Camera::new(
        CameraOptions::default(),
        VIEWPORT,
        Pose::look_at(point3(0., 0., 5.), point3(0., 0., 0.), vec3(0., 1., 0.)).unwrap(),
    )
    .unwrap()
}

fn assert_close(actual: WorldPoint, expected: WorldPoint) {
    assert!(
        (actual - expected).length() < 1e-9,
        "{actual:?} != {expected:?}"
    );
}

#[test]
fn look_at_basis() {
    let pose = Pose::look_at(point3(0., 0., 5.), point3(0., 0., 0.), vec3(0., 2., 0.)).unwrap();
    assert_eq!(pose.forward(), vec3(0., 0., -1.));
    assert_eq!(pose.up(), vec3(0., 1., 0.));
    assert_eq!(pose.right(), vec3(1., 0., 0.));
}

#[test]
fn look_at_orthonormalizes_tilted_up() {
    let pose = Pose::look_at(point3(0., 0., 0.), point3(0., 0., -1.), vec3(0., 1., -1.)).unwrap();
    assert!((pose.up() - vec3(0., 1., 0.)).length() < 1e-12);
    assert!(pose.up().dot(pose.forward()).abs() < 1e-12);
}

#[rstest]
#[case(0., 0., vec3(0., 0., -1.))]
#[case(90., 0., vec3(-1., 0., 0.))]
#[case(180., 0., vec3(0., 0., 1.))]
#[case(0., 45., vec3(0., 0.5f64.sqrt(), -(0.5f64.sqrt())))]
fn yaw_pitch_forward(#[case] yaw: f64, #[case] pitch: f64, #[case] expected: WorldVector) {
    let pose = Pose::from_yaw_pitch(point3(1., 2., 3.), yaw, pitch).unwrap();
    assert!(
        (pose.forward() - expected).length() < 1e-12,
        "{:?}",
        pose.forward()
    );
    assert_eq!(pose.position(), point3(1., 2., 3.));
}

#[rstest]
#[case::zero_forward(vec3(0., 0., 0.), vec3(0., 1., 0.), CameraError::DegeneratePose)]
#[case::zero_up(vec3(0., 0., -1.), vec3(0., 0., 0.), CameraError::DegeneratePose)]
#[case::parallel(vec3(0., 1., 0.), vec3(0., 3., 0.), CameraError::DegeneratePose)]
#[case::nan(vec3(f64::NAN, 0., -1.), vec3(0., 1., 0.), CameraError::NonFinitePose)]
fn bad_pose(#[case] forward: WorldVector, #[case] up: WorldVector, #[case] error: CameraError) {
    assert_eq!(Pose::new(point3(0., 0., 0.), forward, up), Err(error));
}

#[rstest]
#[case::zero_width(
    CameraOptions::default(),
    Viewport { width: 0, height: 10 },
    CameraError::ZeroViewport { width: 0, height: 10 },
)]
#[case::fov_zero(
    CameraOptions::default().with_fov_y(0.0),
    VIEWPORT,
    CameraError::FieldOfView(0.0),
)]
#[case::fov_180(
    CameraOptions::default().with_fov_y(180.0),
    VIEWPORT,
    CameraError::FieldOfView(180.0),
)]
#[case::near_zero(
    CameraOptions::default().with_clip_planes(0.0, 10.0),
    VIEWPORT,
    CameraError::NearPlane(0.0),
)]
#[case::far_before_near(
    CameraOptions::default().with_clip_planes(2.0, 1.0),
    VIEWPORT,
    CameraError::FarPlane { near: 2.0, far: 1.0 },
)]
fn bad_camera(
    #[case] options: CameraOptions,
    #[case] viewport: Viewport,
    #[case] error: CameraError,
) {
    let pose = Pose::from_yaw_pitch(point3(0., 0., 0.), 0., 0.).unwrap();
    assert_eq!(Camera::new(options, viewport, pose), Err(error));
}

#[test]
fn error_display() {
    assert_eq!(
        CameraError::ZeroViewport {
            width: 0,
            height: 10
        }
        .to_string(),
        "viewport size 0×10 has zero area"
    );
    assert_eq!(
        CameraError::FieldOfView(200.0).to_string(),
        "vertical field of view 200° is not between 0° and 180°"
    );
}

#[test]
fn project_center() {
    let camera = test_camera();
    assert_eq!(
        camera.world_to_screen(point3(0., 0., 0.)),
        ScreenPoint {
            x: 400.0,
            y: 300.0,
            depth: 5.0
        }
    );
}

#[test]
fn project_orientation() {
    let camera = test_camera();
    let right_up = camera.world_to_screen(point3(1., 1., 0.));
    assert!(right_up.x > 400.0);
    assert!(right_up.y > 300.0);
    let behind = camera.world_to_screen(point3(0., 0., 6.));
    assert_eq!(behind.depth, -1.0);
}

#[test]
fn project_top_edge() {
    let camera = test_camera();
    // At depth 5 with a 60° field of view, the top edge is 5 tan(30°) above the axis.
    let top = 5.0 * 30f64.to_radians().tan();
    let projected = camera.world_to_screen(point3(0., top, 0.));
    assert!((projected.y - 600.0).abs() < 1e-9, "{projected:?}");
}

#[test]
fn screen_to_world_inverts_world_to_screen() {
    let camera = test_camera();
    for point in [
        point3(0.3, -0.7, 1.0),
        point3(-2.0, 1.5, -4.0),
        point3(10.0, 0.0, -50.0),
    ] {
        assert_close(camera.screen_to_world(camera.world_to_screen(point)), point);
    }
}

#[test]
fn frustum_corners() {
    let camera = test_camera();
    let frustum = camera.frustum();
    assert_eq!(frustum.apex, point3(0., 0., 5.));

    let half_height = 0.3 * 30f64.to_radians().tan();
    let half_width = half_height * 800.0 / 600.0;
    let z = 5.0 - 0.3;
    assert_close(frustum.bottom_left, point3(-half_width, -half_height, z));
    assert_close(frustum.top_left, point3(-half_width, half_height, z));
    assert_close(frustum.top_right, point3(half_width, half_height, z));
    assert_close(frustum.bottom_right, point3(half_width, -half_height, z));

    let projected = camera.world_to_screen(frustum.top_right);
    assert!((projected.x - 800.0).abs() < 1e-9);
    assert!((projected.depth - 0.3).abs() < 1e-12);
}

#[test]
fn viewport_contains_edges() {
    let at = |x, y| ScreenPoint { x, y, depth: 1.0 };
    assert!(VIEWPORT.contains(at(0.0, 0.0)));
    assert!(VIEWPORT.contains(at(800.0, 600.0)));
    assert!(!VIEWPORT.contains(at(-5.0, 300.0)));
    assert!(!VIEWPORT.contains(at(400.0, 600.5)));
    assert!(!VIEWPORT.contains(at(f64::NAN, 300.0)));
}
