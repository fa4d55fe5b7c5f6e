use glam::{Quat, Vec3};
use physync_common::{MeshId, ObjectId};
use physync_scene::Scene;
use serde::Serialize;

use crate::config::PhysicsConfig;
use crate::contacts::{ContactFilter, ContactLog, ContactObserver, observe_contacts};
use crate::convert::{to_quat, to_vec3};
use crate::error::PhysicsError;
use crate::registry::{BodyRegistry, Registration};
use crate::shape::ShapeMapper;
use crate::stepper::{Clock, SimulationClock, SystemClock};
use crate::sync::{SyncStats, TransformScratch, sync_transforms};
use crate::world::PhysicsWorld;

/// Outcome of one `step()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StepReport {
    /// Seconds fed to the world; `None` on the first step.
    pub delta: Option<f32>,
    pub substeps: u32,
    pub sync: SyncStats,
    pub contacts: usize,
}

/// Snapshot of one body, for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyState {
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub dynamic: bool,
}

/// Keeps a rigid-body world and a render scene in step.
///
/// Callers register meshes with [`add_mesh`](Self::add_mesh), drive
/// [`step`](Self::step) from a fixed-rate timer, and render the scene in
/// between. Everything runs on one thread.
pub struct PhysicsBridge {
    config: PhysicsConfig,
    mapper: ShapeMapper,
    world: PhysicsWorld,
    registry: BodyRegistry,
    clock: Box<dyn Clock>,
    sim_clock: SimulationClock,
    scratch: TransformScratch,
    contacts: ContactLog,
    filter: ContactFilter,
    observer: Option<Box<dyn ContactObserver>>,
    steps: u64,
}

impl PhysicsBridge {
    /// Validate `config` and bring up an empty world on the system clock.
    pub fn init(config: PhysicsConfig) -> Result<Self, PhysicsError> {
        Self::with_clock(config, Box::new(SystemClock::new()))
    }

    pub fn with_clock(config: PhysicsConfig, clock: Box<dyn Clock>) -> Result<Self, PhysicsError> {
        config.validate()?;
        let world = PhysicsWorld::new(&config);
        tracing::info!(
            gravity = config.gravity,
            frame_rate = config.frame_rate,
            max_substeps = config.max_substeps,
            "physics initialized"
        );
        Ok(Self {
            mapper: ShapeMapper::from_config(&config),
            config,
            world,
            registry: BodyRegistry::new(),
            clock,
            sim_clock: SimulationClock::default(),
            scratch: TransformScratch::default(),
            contacts: ContactLog::default(),
            filter: ContactFilter::default(),
            observer: None,
            steps: 0,
        })
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Create a body for `mesh` under the logical `id`. Zero mass makes a
    /// static body. Returns `None` when the geometry has no collision shape.
    pub fn add_mesh(
        &mut self,
        scene: &Scene,
        id: impl Into<ObjectId>,
        mesh: MeshId,
        mass: f32,
    ) -> Option<Registration> {
        self.registry.add_mesh(
            &mut self.world,
            &self.mapper,
            scene,
            id.into(),
            mesh,
            mass,
        )
    }

    /// Teleport a mesh's body, zeroing its velocities and rotation.
    ///
    /// # Panics
    /// If no body was registered for that mesh and instance.
    pub fn set_mesh_position(&mut self, mesh: MeshId, position: Vec3, instance: usize) {
        self.registry
            .set_mesh_position(&mut self.world, &mut self.scratch, mesh, position, instance);
    }

    /// Teleport by logical id. Returns false for an unknown id.
    pub fn set_object_position(&mut self, id: &str, position: Vec3) -> bool {
        let Some(handle) = self.registry.handle_for(id) else {
            return false;
        };
        self.scratch.load(position, Quat::IDENTITY);
        self.world
            .set_body_pose(handle.raw(), self.scratch.position, self.scratch.rotation)
    }

    /// Advance by the time elapsed since the previous call, then copy body
    /// poses to the scene and observe contacts. The first call only records
    /// the time.
    pub fn step(&mut self, scene: &mut Scene) -> StepReport {
        let delta = self.sim_clock.advance(self.clock.now());
        self.advance(scene, delta)
    }

    /// Like [`step`](Self::step) with an explicit delta in seconds.
    pub fn step_by(&mut self, scene: &mut Scene, delta: f32) -> StepReport {
        self.advance(scene, Some(delta))
    }

    fn advance(&mut self, scene: &mut Scene, delta: Option<f32>) -> StepReport {
        let _span = tracing::info_span!("physics_step", step = self.steps).entered();
        let substeps = match delta {
            Some(dt) => self.world.step_simulation(dt, self.config.max_substeps),
            None => 0,
        };
        let sync = sync_transforms(&self.world, &self.registry, scene, &mut self.scratch);

        let contacts = observe_contacts(self.world.narrow_phase(), self.filter, &mut self.contacts);
        if let Some(observer) = self.observer.as_mut() {
            observer.begin_step();
            for sample in self.contacts.samples() {
                observer.observe(*sample);
            }
        }

        self.steps += 1;
        tracing::trace!(?delta, substeps, contacts, "stepped");
        StepReport {
            delta,
            substeps,
            sync,
            contacts,
        }
    }

    /// Number of `step()` calls so far, including the first.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn engine(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn engine_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    /// Contacts seen by the most recent step.
    pub fn contacts(&self) -> &ContactLog {
        &self.contacts
    }

    pub fn set_contact_filter(&mut self, filter: ContactFilter) {
        self.filter = filter;
    }

    /// Forward each step's contacts to `observer` as well as the built-in log.
    pub fn set_contact_observer(&mut self, observer: Box<dyn ContactObserver>) {
        self.observer = Some(observer);
    }

    pub fn body_state(&self, id: &str) -> Option<BodyState> {
        let handle = self.registry.handle_for(id)?;
        let body = self.world.body(handle.raw())?;
        Some(BodyState {
            position: to_vec3(&body.position().translation.vector),
            rotation: to_quat(&body.position().rotation),
            linear_velocity: to_vec3(body.linvel()),
            angular_velocity: to_vec3(body.angvel()),
            dynamic: body.is_dynamic(),
        })
    }
}
