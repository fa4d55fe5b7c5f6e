use glam::{Quat, Vec3};
use rapier3d::prelude::*;

use crate::config::PhysicsConfig;
use crate::convert::{to_isometry, to_vector};
use crate::shape::ShapeDescriptor;

/// The rigid-body world and its fixed-step clock.
///
/// Owns every engine-side set. Bodies are added once and never removed;
/// positions are only changed through `set_body_pose`.
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    friction: f32,
    linear_damping: f32,
    angular_damping: f32,
    /// Time not yet consumed by a fixed sub-step.
    local_time: f32,
    tick: u64,
}

impl PhysicsWorld {
    /// Create an empty world with gravity along -Y.
    pub fn new(config: &PhysicsConfig) -> Self {
        let params = IntegrationParameters {
            dt: config.fixed_time_step(),
            ..IntegrationParameters::default()
        };
        Self {
            gravity: vector![0.0, -config.gravity, 0.0],
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            friction: config.friction,
            linear_damping: config.linear_damping,
            angular_damping: config.angular_damping,
            local_time: 0.0,
            tick: 0,
        }
    }

    /// Total fixed sub-steps taken since creation.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn fixed_time_step(&self) -> f32 {
        self.params.dt
    }

    pub fn gravity(&self) -> Vec3 {
        Vec3::new(self.gravity.x, self.gravity.y, self.gravity.z)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Advance by `dt` seconds in whole fixed sub-steps.
    ///
    /// Leftover time carries into the next call. At most `max_substeps` run;
    /// time beyond that is dropped so a long stall cannot spiral. Returns the
    /// number of sub-steps taken.
    pub fn step_simulation(&mut self, dt: f32, max_substeps: u32) -> u32 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        let fixed = self.params.dt;
        self.local_time += dt;
        if self.local_time < fixed {
            return 0;
        }
        let due = (self.local_time / fixed).floor() as u32;
        self.local_time -= due as f32 * fixed;
        let substeps = due.min(max_substeps);
        if due > substeps {
            tracing::debug!(due, substeps, "dropping physics backlog");
        }
        for _ in 0..substeps {
            self.substep();
        }
        substeps
    }

    fn substep(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
        self.tick += 1;
    }

    /// Create a body with one collider. Positive mass makes it dynamic,
    /// anything else makes it fixed.
    pub fn add_body(
        &mut self,
        shape: &ShapeDescriptor,
        mass: f32,
        position: Vec3,
        rotation: Quat,
    ) -> RigidBodyHandle {
        let pose = to_isometry(position, rotation);
        let builder = if mass > 0.0 {
            let inertia = to_vector(shape.local_inertia(mass));
            RigidBodyBuilder::dynamic()
                .additional_mass_properties(MassProperties::new(Point::origin(), mass, inertia))
        } else {
            RigidBodyBuilder::fixed()
        };
        let body = builder
            .position(pose)
            .linear_damping(self.linear_damping)
            .angular_damping(self.angular_damping)
            .build();
        let handle = self.bodies.insert(body);

        let collider = ColliderBuilder::new(shape.to_shared_shape())
            .translation(to_vector(shape.collider_offset()))
            .friction(self.friction)
            .density(0.0)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        tracing::trace!(kind = shape.kind(), mass, ?position, "body added");
        handle
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    /// Teleport a body and zero its velocities. Returns false for an unknown
    /// handle.
    pub fn set_body_pose(&mut self, handle: RigidBodyHandle, position: Vec3, rotation: Quat) -> bool {
        let Some(body) = self.bodies.get_mut(handle) else {
            return false;
        };
        body.set_position(to_isometry(position, rotation), true);
        body.set_linvel(Vector::zeros(), true);
        body.set_angvel(Vector::zeros(), true);
        true
    }

    pub fn bodies(&self) -> &RigidBodySet {
        &self.bodies
    }

    pub fn colliders(&self) -> &ColliderSet {
        &self.colliders
    }

    pub fn narrow_phase(&self) -> &NarrowPhase {
        &self.narrow_phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use physync_scene::Geometry;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(&PhysicsConfig::default())
    }

    fn unit_box() -> ShapeDescriptor {
        crate::shape::shape_for(&Geometry::cuboid(1.0, 1.0, 1.0)).unwrap()
    }

    #[test]
    fn world_starts_empty() {
        let w = world();
        assert_eq!(w.tick(), 0);
        assert_eq!(w.body_count(), 0);
        assert_eq!(w.gravity(), Vec3::new(0.0, -2.0, 0.0));
    }

    #[test]
    fn non_positive_delta_takes_no_steps() {
        let mut w = world();
        assert_eq!(w.step_simulation(0.0, 10), 0);
        assert_eq!(w.step_simulation(-1.0, 10), 0);
        assert_eq!(w.step_simulation(f32::NAN, 10), 0);
        assert_eq!(w.tick(), 0);
    }

    #[test]
    fn remainder_carries_over() {
        let mut w = world();
        let half = w.fixed_time_step() / 2.0;
        assert_eq!(w.step_simulation(half, 10), 0);
        assert_eq!(w.step_simulation(half, 10), 1);
        assert_eq!(w.tick(), 1);
    }

    #[test]
    fn substeps_are_capped() {
        let mut w = world();
        assert_eq!(w.step_simulation(1.0, 10), 10);
        assert_eq!(w.tick(), 10);
        assert_eq!(w.step_simulation(1.0, 3), 3);
        assert_eq!(w.tick(), 13);
    }

    #[test]
    fn dynamic_body_falls() {
        let mut w = world();
        let h = w.add_body(&unit_box(), 1.0, Vec3::new(0.0, 10.0, 0.0), Quat::IDENTITY);
        for _ in 0..30 {
            w.step_simulation(1.0 / 60.0, 10);
        }
        let y = w.body(h).unwrap().position().translation.y;
        assert!(y < 10.0, "body did not fall: y = {y}");
    }

    #[test]
    fn resting_box_touches_its_support() {
        let mut w = world();
        let floor = crate::shape::shape_for(&Geometry::cuboid(20.0, 1.0, 20.0)).unwrap();
        w.add_body(&floor, 0.0, Vec3::ZERO, Quat::IDENTITY);
        let h = w.add_body(&unit_box(), 1.0, Vec3::new(0.0, 1.2, 0.0), Quat::IDENTITY);
        for _ in 0..300 {
            w.step_simulation(1.0 / 60.0, 10);
        }
        // the margin must not leave a visible gap above the floor top at 0.5
        let y = w.body(h).unwrap().position().translation.y;
        assert!((y - 1.0).abs() < 0.02, "box rests at {y}");
    }

    #[test]
    fn zero_mass_body_is_fixed() {
        let mut w = world();
        let h = w.add_body(&unit_box(), 0.0, Vec3::new(0.0, 3.0, 0.0), Quat::IDENTITY);
        assert!(w.body(h).unwrap().is_fixed());
        w.step_simulation(0.5, 10);
        assert_eq!(w.body(h).unwrap().position().translation.y, 3.0);
    }

    #[test]
    fn set_body_pose_zeroes_velocity() {
        let mut w = world();
        let h = w.add_body(&unit_box(), 1.0, Vec3::new(0.0, 10.0, 0.0), Quat::IDENTITY);
        w.step_simulation(0.1, 10);
        assert!(w.body(h).unwrap().linvel().y < 0.0);

        assert!(w.set_body_pose(h, Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY));
        let body = w.body(h).unwrap();
        assert_eq!(body.linvel().norm(), 0.0);
        assert_eq!(body.angvel().norm(), 0.0);
        assert_eq!(body.position().translation.x, 1.0);
    }
}
