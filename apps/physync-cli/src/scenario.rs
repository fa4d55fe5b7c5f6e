use anyhow::Context;
use glam::{Quat, Vec3};
use physync_common::MeshId;
use physync_physics::PhysicsBridge;
use physync_scene::{
    Geometry, InstancedMesh, Mesh, PlaneGeometry, Scene, SceneDesc, generate_height,
    terrain_geometry,
};

const TERRAIN_EXTENT: f32 = 100.0;

/// Flat static ground plane at y = 0.
pub fn ground(bridge: &mut PhysicsBridge, scene: &mut Scene) -> anyhow::Result<MeshId> {
    let plane = PlaneGeometry::new(TERRAIN_EXTENT, TERRAIN_EXTENT, 8, 8)?;
    let mesh = scene.add_mesh(Mesh::new(Geometry::Plane(plane)));
    bridge
        .add_mesh(scene, "ground", mesh, 0.0)
        .context("ground plane produced no body")?;
    Ok(mesh)
}

/// One unit box dropped from `height`.
pub fn drop_box(
    bridge: &mut PhysicsBridge,
    scene: &mut Scene,
    height: f32,
) -> anyhow::Result<MeshId> {
    let mesh = scene.add_mesh(
        Mesh::new(Geometry::cuboid(1.0, 1.0, 1.0))
            .at(Vec3::new(0.0, height, 0.0))
            .rotated(Quat::from_rotation_y(0.3)),
    );
    bridge
        .add_mesh(scene, "box", mesh, 1.0)
        .context("box produced no body")?;
    Ok(mesh)
}

/// A column of `count` crates drawn by one instanced mesh, one body per
/// instance.
pub fn stack(bridge: &mut PhysicsBridge, scene: &mut Scene, count: usize) -> anyhow::Result<MeshId> {
    let mut crates = InstancedMesh::new(Geometry::cuboid(1.0, 1.0, 1.0), count);
    for i in 0..crates.count() {
        let position = Vec3::new(0.02 * i as f32, 1.0 + i as f32 * 1.1, 0.0);
        crates.set_instance_transform(i, position, Quat::IDENTITY);
    }
    let count = crates.count();
    let mesh = scene.add_instanced(crates);

    for i in 0..count {
        if let Some(im) = scene.instanced_mut(mesh) {
            im.physics_index = i;
        }
        bridge
            .add_mesh(scene, format!("crate-{i}"), mesh, 1.0)
            .with_context(|| format!("crate {i} produced no body"))?;
    }
    Ok(mesh)
}

/// Generated sine terrain with `balls` spheres dropped over it.
pub fn terrain(
    bridge: &mut PhysicsBridge,
    scene: &mut Scene,
    desc: &mut SceneDesc,
    samples: usize,
    min_height: f32,
    max_height: f32,
    balls: usize,
) -> anyhow::Result<Vec<MeshId>> {
    let heights = generate_height(samples, samples, min_height, max_height);
    let geometry = terrain_geometry(TERRAIN_EXTENT, TERRAIN_EXTENT, samples, samples, &heights)?;
    let mesh = scene.add_mesh(Mesh::new(geometry));
    let id = desc.add_terrain("grass");
    bridge
        .add_mesh(scene, id.clone(), mesh, 0.0)
        .with_context(|| format!("terrain {id} produced no body"))?;

    let mut meshes = vec![mesh];
    for i in 0..balls {
        let angle = i as f32 * 0.9;
        let radius = 2.0 + i as f32 * 1.5;
        let position = Vec3::new(
            radius * angle.cos(),
            max_height + 5.0,
            radius * angle.sin(),
        );
        let ball = scene.add_mesh(Mesh::new(Geometry::sphere(0.5)).at(position));
        bridge
            .add_mesh(scene, format!("ball-{i}"), ball, 1.0)
            .with_context(|| format!("ball {i} produced no body"))?;
        meshes.push(ball);
    }
    Ok(meshes)
}
