#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use sightline::camera::{CameraOptions, Pose, Viewport};
use sightline::euclid::{point3, vec3};
use sightline::math::{FreeCoordinate, LocalToWorld};
use sightline::mesh_scene::{Mesh, MeshScene, SceneObject};
use sightline::probe::{ProbeOptions, classify};
use sightline::{Camera, CaptureOptions, ObjectId, Ray, capture};

fn camera() -> Camera {
    Camera::new(
        CameraOptions::default(),
        Viewport {
            width: 800,
            height: 600,
        },
        Pose::look_at(point3(0., 2., 8.), point3(0., 0., 0.), vec3(0., 1., 0.)).unwrap(),
    )
    .unwrap()
}

/// A row of cubes in front of a wall.
fn scene() -> MeshScene {
    let wall = SceneObject::new(
        ObjectId(0),
        Mesh::quad([
            point3(-20., -20., -5.),
            point3(20., -20., -5.),
            point3(20., 20., -5.),
            point3(-20., 20., -5.),
        ]),
    );
    let cubes = (1..=10u32).map(|i| {
        let i_f = f64::from(i);
        SceneObject::new(ObjectId(u64::from(i)), Mesh::cube(0.4))
            .with_transform(LocalToWorld::translation(i_f - 5.5, 0., -(i_f % 3.)))
    });
    MeshScene::from_iter([wall].into_iter().chain(cubes))
}

pub fn probe_bench(c: &mut Criterion) {
    let camera = camera();
    let scene = scene();
    let options = ProbeOptions::default();

    c.bench_function("probe: unobstructed vertex", |b| {
        let nothing = |_: Ray, _: FreeCoordinate| false;
        b.iter(|| classify(black_box(point3(0., 0., 0.)), &camera, &nothing, &options))
    });

    c.bench_function("probe: fully occluded vertex", |b| {
        // Every sample is tested before giving up.
        b.iter(|| classify(black_box(point3(0.1, 0.1, -6.)), &camera, &scene, &options))
    });

    c.bench_function("capture: cubes and wall", |b| {
        b.iter(|| capture(&scene, &camera, &scene, black_box(&CaptureOptions::default())))
    });
}

criterion_group!(benches, probe_bench);
criterion_main!(benches);
