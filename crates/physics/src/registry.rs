use glam::{Quat, Vec3};
use physync_common::{MeshId, ObjectId, Transform};
use physync_scene::{InstancedMesh, Scene, SceneObject};
use rapier3d::prelude::RigidBodyHandle;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::shape::{ShapeDescriptor, ShapeMapper};
use crate::sync::TransformScratch;
use crate::world::PhysicsWorld;

/// Opaque reference to a body owned by the [`PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

impl BodyHandle {
    pub fn raw(self) -> RigidBodyHandle {
        self.0
    }
}

/// Bodies backing the instances of one instanced mesh, in registration order.
#[derive(Debug, Clone, Default)]
pub struct InstanceBodies {
    bodies: Vec<BodyHandle>,
    instances: Vec<usize>,
    used: BTreeSet<usize>,
}

impl InstanceBodies {
    pub fn bodies(&self) -> &[BodyHandle] {
        &self.bodies
    }

    /// `(instance index, body)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, BodyHandle)> + '_ {
        self.instances.iter().copied().zip(self.bodies.iter().copied())
    }

    pub fn is_used(&self, instance: usize) -> bool {
        self.used.contains(&instance)
    }

    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    pub fn body_for(&self, instance: usize) -> Option<BodyHandle> {
        self.instances
            .iter()
            .position(|&i| i == instance)
            .map(|slot| self.bodies[slot])
    }
}

/// Where a mesh's bodies write their transforms back to.
#[derive(Debug, Clone)]
pub enum RenderTarget {
    Single(BodyHandle),
    Instanced(InstanceBodies),
}

impl RenderTarget {
    pub fn body_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Instanced(ib) => ib.bodies.len(),
        }
    }
}

/// Result of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Single(BodyHandle),
    /// Every body of the instanced mesh, in registration order.
    Instanced(Vec<BodyHandle>),
}

/// Maps logical ids and mesh identities to the bodies created for them.
///
/// # Invariants
/// - Every body has exactly one render target.
/// - At most one body exists per (instanced mesh, instance index).
/// - `tracked` lists each mesh with a target once, in first-registration order.
#[derive(Debug, Default)]
pub struct BodyRegistry {
    by_id: BTreeMap<ObjectId, BodyHandle>,
    targets: HashMap<MeshId, RenderTarget>,
    tracked: Vec<MeshId>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the body for a scene mesh. Returns `None` when the mesh is
    /// missing from the scene or its geometry has no collision shape.
    pub fn add_mesh(
        &mut self,
        world: &mut PhysicsWorld,
        mapper: &ShapeMapper,
        scene: &Scene,
        id: ObjectId,
        mesh: MeshId,
        mass: f32,
    ) -> Option<Registration> {
        let Some(object) = scene.get(mesh) else {
            tracing::warn!(%id, %mesh, "mesh is not in the scene");
            return None;
        };
        let Some(shape) = mapper.shape_for(object.geometry()) else {
            tracing::debug!(%id, kind = object.geometry().kind(), "no collision shape, visual only");
            return None;
        };
        let registration = match object {
            SceneObject::Mesh(m) => Registration::Single(self.register_single(
                world,
                id,
                mesh,
                &shape,
                mass,
                m.position,
                m.quaternion,
            )),
            SceneObject::Instanced(im) => {
                Registration::Instanced(self.register_instance(world, id, mesh, im, &shape, mass))
            }
        };
        Some(registration)
    }

    /// Create the body for a single mesh.
    ///
    /// A mesh that already has a body keeps it; `id` then aliases that body.
    ///
    /// # Panics
    /// If `mesh` is registered as an instanced mesh.
    #[allow(clippy::too_many_arguments)]
    pub fn register_single(
        &mut self,
        world: &mut PhysicsWorld,
        id: ObjectId,
        mesh: MeshId,
        shape: &ShapeDescriptor,
        mass: f32,
        position: Vec3,
        rotation: Quat,
    ) -> BodyHandle {
        match self.targets.get(&mesh) {
            Some(RenderTarget::Single(existing)) => {
                let existing = *existing;
                tracing::debug!(%id, %mesh, "mesh already has a body");
                self.by_id.insert(id, existing);
                return existing;
            }
            Some(RenderTarget::Instanced(_)) => panic!("{mesh} is registered as an instanced mesh"),
            None => {}
        }

        let handle = BodyHandle(world.add_body(shape, mass, position, rotation));
        tracing::debug!(%id, %mesh, kind = shape.kind(), mass, "registered body");
        self.targets.insert(mesh, RenderTarget::Single(handle));
        self.tracked.push(mesh);
        self.by_id.insert(id, handle);
        handle
    }

    /// Create the body for the instanced mesh's current `physics_index`.
    ///
    /// Registering an index that already has a body creates nothing and
    /// returns the existing sequence; `id` then aliases that body.
    ///
    /// # Panics
    /// If `physics_index` is outside the instance buffer.
    pub fn register_instance(
        &mut self,
        world: &mut PhysicsWorld,
        id: ObjectId,
        mesh: MeshId,
        instanced: &InstancedMesh,
        shape: &ShapeDescriptor,
        mass: f32,
    ) -> Vec<BodyHandle> {
        let index = instanced.physics_index;
        assert!(
            index < instanced.count(),
            "instance {index} out of range for {mesh} with {} instances",
            instanced.count()
        );

        if !self.targets.contains_key(&mesh) {
            self.tracked.push(mesh);
        }
        let target = self
            .targets
            .entry(mesh)
            .or_insert_with(|| RenderTarget::Instanced(InstanceBodies::default()));
        let RenderTarget::Instanced(bodies) = target else {
            panic!("{mesh} is registered as a single mesh");
        };

        if let Some(existing) = bodies.body_for(index) {
            tracing::debug!(%id, %mesh, index, "instance already has a body");
            self.by_id.insert(id, existing);
            return bodies.bodies.clone();
        }

        let t = Transform::from_matrix(instanced.instance_matrix.matrix_at(index));
        let handle = BodyHandle(world.add_body(shape, mass, t.position, t.rotation));
        bodies.bodies.push(handle);
        bodies.instances.push(index);
        bodies.used.insert(index);
        tracing::debug!(%id, %mesh, index, kind = shape.kind(), mass, "registered instance body");

        self.by_id.insert(id, handle);
        bodies.bodies.clone()
    }

    /// Body backing `instance` of `mesh`. Single meshes ignore the index.
    pub fn body_for(&self, mesh: MeshId, instance: usize) -> Option<BodyHandle> {
        match self.targets.get(&mesh)? {
            RenderTarget::Single(h) => Some(*h),
            RenderTarget::Instanced(ib) => ib.body_for(instance),
        }
    }

    /// Teleport the body behind `mesh`/`instance` to `position` with identity
    /// rotation and zero velocity. The pose is staged in `scratch`.
    ///
    /// # Panics
    /// If no body was registered for that mesh and instance.
    pub fn set_mesh_position(
        &self,
        world: &mut PhysicsWorld,
        scratch: &mut TransformScratch,
        mesh: MeshId,
        position: Vec3,
        instance: usize,
    ) {
        let Some(handle) = self.body_for(mesh, instance) else {
            panic!("no body registered for {mesh} instance {instance}");
        };
        scratch.load(position, Quat::IDENTITY);
        let moved = world.set_body_pose(handle.raw(), scratch.position, scratch.rotation);
        assert!(moved, "body for {mesh} instance {instance} is gone");
        tracing::debug!(%mesh, instance, ?position, "teleported body");
    }

    pub fn handle_for(&self, id: &str) -> Option<BodyHandle> {
        self.by_id.get(id).copied()
    }

    /// Logical ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = (&ObjectId, BodyHandle)> {
        self.by_id.iter().map(|(id, h)| (id, *h))
    }

    pub fn target(&self, mesh: MeshId) -> Option<&RenderTarget> {
        self.targets.get(&mesh)
    }

    pub fn tracked(&self) -> &[MeshId] {
        &self.tracked
    }

    /// Tracked meshes with their targets, in first-registration order.
    pub fn targets(&self) -> impl Iterator<Item = (MeshId, &RenderTarget)> {
        self.tracked.iter().map(|m| (*m, &self.targets[m]))
    }

    pub fn body_count(&self) -> usize {
        self.targets.values().map(RenderTarget::body_count).sum()
    }
}
