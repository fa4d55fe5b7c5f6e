use glam::{Quat, Vec3};
use physync_common::MeshId;
use physync_scene::{INSTANCE_STRIDE, Scene};
use rapier3d::prelude::RigidBody;
use serde::Serialize;

use crate::convert::{to_quat, to_vec3};
use crate::registry::{BodyRegistry, RenderTarget};
use crate::world::PhysicsWorld;

/// Reusable holder for one body transform. Every load overwrites both fields.
#[derive(Debug, Clone, Copy)]
pub struct TransformScratch {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for TransformScratch {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl TransformScratch {
    pub fn load_body(&mut self, body: &RigidBody) {
        let pose = body.position();
        self.position = to_vec3(&pose.translation.vector);
        self.rotation = to_quat(&pose.rotation);
    }

    pub fn load(&mut self, position: Vec3, rotation: Quat) {
        self.position = position;
        self.rotation = rotation;
    }

    pub fn load_origin(&mut self) {
        *self = Self::default();
    }
}

/// Write the column-major rotation/translation matrix for `rotation` and
/// `position` into the first 16 floats of `out`.
pub fn compose_into(position: Vec3, rotation: Quat, out: &mut [f32]) {
    let [x, y, z, w] = rotation.to_array();
    let (x2, y2, z2) = (x + x, y + y, z + z);
    let (xx, xy, xz) = (x * x2, x * y2, x * z2);
    let (yy, yz, zz) = (y * y2, y * z2, z * z2);
    let (wx, wy, wz) = (w * x2, w * y2, w * z2);

    out[..INSTANCE_STRIDE].copy_from_slice(&[
        1.0 - (yy + zz),
        xy + wz,
        xz - wy,
        0.0,
        xy - wz,
        1.0 - (xx + zz),
        yz + wx,
        0.0,
        xz + wy,
        yz - wx,
        1.0 - (xx + yy),
        0.0,
        position.x,
        position.y,
        position.z,
        1.0,
    ]);
}

/// What one synchronization pass touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub meshes: usize,
    pub instances: usize,
    pub skipped: usize,
}

/// Copy every registered body's pose back onto its render target.
///
/// Instanced buffers are marked dirty once per call. Meshes that have left
/// the scene are skipped.
pub fn sync_transforms(
    world: &PhysicsWorld,
    registry: &BodyRegistry,
    scene: &mut Scene,
    scratch: &mut TransformScratch,
) -> SyncStats {
    let mut stats = SyncStats::default();
    for (mesh, target) in registry.targets() {
        let synced = match target {
            RenderTarget::Single(handle) => {
                let Some(body) = world.body(handle.raw()) else {
                    continue;
                };
                sync_single(scene, mesh, body, scratch)
            }
            RenderTarget::Instanced(bodies) => {
                let Some(instanced) = scene.instanced_mut(mesh) else {
                    stale(mesh, &mut stats);
                    continue;
                };
                let buffer = instanced.instance_matrix.as_mut_slice();
                for (index, handle) in bodies.iter() {
                    match world.body(handle.raw()) {
                        Some(body) => scratch.load_body(body),
                        None => scratch.load_origin(),
                    }
                    let start = index * INSTANCE_STRIDE;
                    compose_into(
                        scratch.position,
                        scratch.rotation,
                        &mut buffer[start..start + INSTANCE_STRIDE],
                    );
                    stats.instances += 1;
                }
                instanced.instance_matrix.mark_dirty();
                true
            }
        };
        if synced {
            stats.meshes += 1;
        } else {
            stale(mesh, &mut stats);
        }
    }
    stats
}

fn sync_single(
    scene: &mut Scene,
    mesh: MeshId,
    body: &RigidBody,
    scratch: &mut TransformScratch,
) -> bool {
    let Some(m) = scene.mesh_mut(mesh) else {
        return false;
    };
    scratch.load_body(body);
    m.position = scratch.position;
    m.quaternion = scratch.rotation;
    true
}

fn stale(mesh: MeshId, stats: &mut SyncStats) {
    tracing::debug!(%mesh, "tracked mesh left the scene, skipping");
    stats.skipped += 1;
}
