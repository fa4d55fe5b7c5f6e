use glam::{Quat, Vec3};
use physync_common::ObjectId;
use physync_physics::{BodyState, PhysicsBridge, RenderTarget};
use serde::Serialize;

/// Read-only queries against a running bridge, for logs and dev UI.
pub struct PhysicsInspector;

impl PhysicsInspector {
    pub fn summary(bridge: &PhysicsBridge) -> PhysicsSummary {
        let registry = bridge.registry();
        let instanced_meshes = registry
            .targets()
            .filter(|(_, t)| matches!(t, RenderTarget::Instanced(_)))
            .count();
        PhysicsSummary {
            steps: bridge.steps(),
            substeps: bridge.engine().tick(),
            bodies: bridge.engine().body_count(),
            tracked_meshes: registry.tracked().len(),
            instanced_meshes,
            contacts: bridge.contacts().len(),
        }
    }

    pub fn inspect_body(bridge: &PhysicsBridge, id: &str) -> Option<BodyInfo> {
        let state = bridge.body_state(id)?;
        Some(BodyInfo::new(ObjectId::new(id), state))
    }

    /// Every registered id with its body, sorted by id.
    pub fn list_bodies(bridge: &PhysicsBridge) -> Vec<BodyInfo> {
        bridge
            .registry()
            .ids()
            .filter_map(|(id, _)| Some(BodyInfo::new(id.clone(), bridge.body_state(id.as_str())?)))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PhysicsSummary {
    pub steps: u64,
    pub substeps: u64,
    pub bodies: usize,
    pub tracked_meshes: usize,
    pub instanced_meshes: usize,
    /// Contact points seen by the last step.
    pub contacts: usize,
}

impl std::fmt::Display for PhysicsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Physics: steps={} substeps={} bodies={} meshes={} (instanced {}) contacts={}",
            self.steps,
            self.substeps,
            self.bodies,
            self.tracked_meshes,
            self.instanced_meshes,
            self.contacts
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BodyInfo {
    pub id: ObjectId,
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub dynamic: bool,
}

impl BodyInfo {
    fn new(id: ObjectId, state: BodyState) -> Self {
        Self {
            id,
            position: state.position,
            rotation: state.rotation,
            linear_velocity: state.linear_velocity,
            angular_velocity: state.angular_velocity,
            dynamic: state.dynamic,
        }
    }
}

impl std::fmt::Display for BodyInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let p = self.position;
        let v = self.linear_velocity;
        write!(
            f,
            "Body [{}] {} pos=({:.2}, {:.2}, {:.2}) vel=({:.2}, {:.2}, {:.2})",
            self.id,
            if self.dynamic { "dynamic" } else { "static" },
            p.x,
            p.y,
            p.z,
            v.x,
            v.y,
            v.z,
        )
    }
}
