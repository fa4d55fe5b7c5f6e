use glam::{Quat, Vec3};
use physync_physics::{
    ManualClock, PhysicsBridge, PhysicsConfig, Registration, RenderTarget, StepReport,
};
use physync_scene::{Geometry, InstancedMesh, Mesh, PlaneGeometry, Scene, terrain_geometry};
use std::time::Duration;

const FRAME: Duration = Duration::from_nanos(16_666_667);

fn bridge() -> (PhysicsBridge, ManualClock) {
    let clock = ManualClock::new();
    let bridge =
        PhysicsBridge::with_clock(PhysicsConfig::default(), Box::new(clock.clone())).unwrap();
    (bridge, clock)
}

fn tick(bridge: &mut PhysicsBridge, clock: &ManualClock, scene: &mut Scene) -> StepReport {
    clock.advance(FRAME);
    bridge.step(scene)
}

fn flat_ground(scene: &mut Scene) -> physync_common::MeshId {
    let plane = PlaneGeometry::new(40.0, 40.0, 4, 4).unwrap();
    scene.add_mesh(Mesh::new(Geometry::Plane(plane)))
}

#[test]
fn falling_box_descends_then_rests_on_ground() {
    let (mut bridge, clock) = bridge();
    let mut scene = Scene::new();
    let ground = flat_ground(&mut scene);
    let crate_ = scene.add_mesh(
        Mesh::new(Geometry::cuboid(1.0, 1.0, 1.0)).at(Vec3::new(0.0, 5.0, 0.0)),
    );
    bridge.add_mesh(&scene, "ground", ground, 0.0).unwrap();
    bridge.add_mesh(&scene, "crate", crate_, 1.0).unwrap();

    bridge.step(&mut scene);
    let mut last = scene.mesh(crate_).unwrap().position.y;
    for _ in 0..120 {
        tick(&mut bridge, &clock, &mut scene);
        let y = scene.mesh(crate_).unwrap().position.y;
        assert!(y <= last + 1e-6, "crate rose from {last} to {y}");
        last = y;
    }
    assert!(last < 5.0);

    for _ in 0..1200 {
        tick(&mut bridge, &clock, &mut scene);
    }
    // ground top is y = 0, so the crate's center rests half a unit above it
    let y = scene.mesh(crate_).unwrap().position.y;
    assert!((y - 0.5).abs() < 0.02, "crate settled at {y}");
    assert!(!bridge.contacts().is_empty());
}

#[test]
fn re_adding_a_single_mesh_reuses_its_body() {
    let (mut bridge, _clock) = bridge();
    let mut scene = Scene::new();
    let mesh = scene.add_mesh(Mesh::new(Geometry::sphere(0.5)).at(Vec3::new(0.0, 3.0, 0.0)));

    let first = bridge.add_mesh(&scene, "ball", mesh, 1.0).unwrap();
    let second = bridge.add_mesh(&scene, "ball-again", mesh, 1.0).unwrap();
    assert_eq!(first, second);
    assert_eq!(bridge.engine().body_count(), 1);
    assert_eq!(bridge.engine().body_count(), bridge.registry().body_count());
    assert_eq!(
        bridge.registry().handle_for("ball"),
        bridge.registry().handle_for("ball-again")
    );

    bridge.set_mesh_position(mesh, Vec3::new(1.0, 2.0, 3.0), 0);
    bridge.step(&mut scene);
    assert_eq!(scene.mesh(mesh).unwrap().position, Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn one_step_copies_body_pose_exactly() {
    let (mut bridge, clock) = bridge();
    let mut scene = Scene::new();
    let mesh = scene.add_mesh(
        Mesh::new(Geometry::sphere(0.5))
            .at(Vec3::new(2.0, 8.0, -1.0))
            .rotated(Quat::from_rotation_z(0.4)),
    );
    bridge.add_mesh(&scene, "ball", mesh, 2.0).unwrap();
    bridge.step(&mut scene);
    tick(&mut bridge, &clock, &mut scene);

    let state = bridge.body_state("ball").unwrap();
    let synced = scene.mesh(mesh).unwrap();
    assert_eq!(synced.position, state.position);
    assert_eq!(synced.quaternion, state.rotation);
}

#[test]
fn zero_delta_step_still_synchronizes() {
    let (mut bridge, _clock) = bridge();
    let mut scene = Scene::new();
    let mesh = scene.add_mesh(Mesh::new(Geometry::cuboid(1.0, 1.0, 1.0)));
    bridge.add_mesh(&scene, "box", mesh, 1.0).unwrap();

    bridge.step(&mut scene);
    bridge.set_mesh_position(mesh, Vec3::new(4.0, 3.0, 2.0), 0);
    // clock has not moved
    let report = bridge.step(&mut scene);
    assert_eq!(report.delta, Some(0.0));
    assert_eq!(report.substeps, 0);
    assert_eq!(report.sync.meshes, 1);
    let synced = scene.mesh(mesh).unwrap();
    assert_eq!(synced.position, Vec3::new(4.0, 3.0, 2.0));
    assert_eq!(synced.quaternion, Quat::IDENTITY);
}

#[test]
fn set_mesh_position_then_read_is_at_rest() {
    let (mut bridge, clock) = bridge();
    let mut scene = Scene::new();
    let mesh = scene.add_mesh(
        Mesh::new(Geometry::cylinder(0.5, 0.5, 1.0)).at(Vec3::new(0.0, 10.0, 0.0)),
    );
    bridge.add_mesh(&scene, "can", mesh, 1.0).unwrap();
    bridge.step(&mut scene);
    for _ in 0..10 {
        tick(&mut bridge, &clock, &mut scene);
    }

    bridge.set_mesh_position(mesh, Vec3::new(-1.0, 6.0, 0.5), 0);
    let state = bridge.body_state("can").unwrap();
    assert_eq!(state.linear_velocity, Vec3::ZERO);
    assert_eq!(state.angular_velocity, Vec3::ZERO);
    assert_eq!(state.position, Vec3::new(-1.0, 6.0, 0.5));
    assert_eq!(state.rotation, Quat::IDENTITY);
}

#[test]
fn instanced_bodies_write_their_own_slots() {
    let (mut bridge, clock) = bridge();
    let mut scene = Scene::new();
    let mut im = InstancedMesh::new(Geometry::cuboid(1.0, 1.0, 1.0), 4);
    im.set_instance_transform(1, Vec3::new(-3.0, 6.0, 0.0), Quat::IDENTITY);
    im.set_instance_transform(3, Vec3::new(3.0, 6.0, 0.0), Quat::IDENTITY);
    im.physics_index = 3;
    let mesh = scene.add_instanced(im);

    bridge.add_mesh(&scene, "right", mesh, 1.0).unwrap();
    scene.instanced_mut(mesh).unwrap().physics_index = 1;
    let Some(Registration::Instanced(bodies)) = bridge.add_mesh(&scene, "left", mesh, 1.0)
    else {
        panic!("expected instanced registration");
    };
    assert_eq!(bodies.len(), 2);
    assert_eq!(bridge.registry().handle_for("right"), Some(bodies[0]));
    assert_eq!(bridge.registry().handle_for("left"), Some(bodies[1]));

    let version = scene.instanced(mesh).unwrap().instance_matrix.version();
    bridge.step(&mut scene);
    tick(&mut bridge, &clock, &mut scene);
    let buffer = &scene.instanced(mesh).unwrap().instance_matrix;
    // marked once per step
    assert_eq!(buffer.version(), version + 2);
    assert!(buffer.needs_update());

    let left = buffer.matrix_at(1).w_axis;
    let right = buffer.matrix_at(3).w_axis;
    assert!((left.x + 3.0).abs() < 1e-4 && left.y < 6.0);
    assert!((right.x - 3.0).abs() < 1e-4 && right.y < 6.0);
    // unregistered slots keep their matrices
    assert_eq!(buffer.matrix_at(0), glam::Mat4::IDENTITY);
}

#[test]
fn registering_an_instance_twice_returns_the_same_sequence() {
    let (mut bridge, _clock) = bridge();
    let mut scene = Scene::new();
    let mesh = scene.add_instanced(InstancedMesh::new(Geometry::sphere(0.5), 2));
    let first = bridge.add_mesh(&scene, "a", mesh, 1.0);
    let second = bridge.add_mesh(&scene, "a", mesh, 1.0);
    assert_eq!(first, second);
    assert_eq!(bridge.engine().body_count(), 1);
    let Some(RenderTarget::Instanced(bodies)) = bridge.registry().target(mesh) else {
        panic!("expected instanced target");
    };
    assert_eq!(bodies.used_count(), 1);
}

#[test]
fn generated_terrain_holds_a_ball() {
    let (mut bridge, _clock) = bridge();
    let mut scene = Scene::new();
    let heights = physync_scene::generate_height(16, 16, -2.0, 2.0);
    let terrain = terrain_geometry(30.0, 30.0, 16, 16, &heights).unwrap();
    let ground = scene.add_mesh(Mesh::new(terrain));
    let ball = scene.add_mesh(Mesh::new(Geometry::sphere(0.5)).at(Vec3::new(0.0, 6.0, 0.0)));
    bridge.add_mesh(&scene, "terrain", ground, 0.0).unwrap();
    bridge.add_mesh(&scene, "ball", ball, 1.0).unwrap();

    for _ in 0..600 {
        bridge.step_by(&mut scene, 1.0 / 60.0);
    }
    let y = scene.mesh(ball).unwrap().position.y;
    assert!(y > -3.0, "ball fell through terrain to {y}");
}

#[test]
fn removed_mesh_is_skipped_by_sync() {
    let (mut bridge, _clock) = bridge();
    let mut scene = Scene::new();
    let mesh = scene.add_mesh(Mesh::new(Geometry::sphere(1.0)));
    bridge.add_mesh(&scene, "ghost", mesh, 1.0).unwrap();
    scene.remove(mesh);

    let report = bridge.step_by(&mut scene, 1.0 / 60.0);
    assert_eq!(report.sync.meshes, 0);
    assert_eq!(report.sync.skipped, 1);
}
