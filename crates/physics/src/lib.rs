//! Physics bridge: derives collision shapes from scene geometry, owns the
//! rigid-body world, steps it at a fixed rate and writes body poses back into
//! the scene.
//!
//! # Invariants
//! - Every body has exactly one render target; at most one body exists per
//!   (instanced mesh, instance index).
//! - After a step, every tracked mesh shows the pose of the last completed
//!   sub-step.
//! - Nothing here blocks or spawns threads; the caller owns the loop.

pub mod bridge;
pub mod config;
pub mod contacts;
pub mod convert;
pub mod error;
pub mod registry;
pub mod shape;
pub mod stepper;
pub mod sync;
pub mod world;

pub use bridge::{BodyState, PhysicsBridge, StepReport};
pub use config::PhysicsConfig;
pub use contacts::{ContactFilter, ContactLog, ContactObserver, ContactSample};
pub use error::PhysicsError;
pub use registry::{BodyHandle, BodyRegistry, InstanceBodies, Registration, RenderTarget};
pub use shape::{HeightfieldDescriptor, ShapeDescriptor, ShapeMapper, UpAxis, shape_for};
pub use stepper::{Clock, FixedRateTimer, ManualClock, SimulationClock, SystemClock};
pub use sync::SyncStats;
pub use world::PhysicsWorld;

pub fn crate_info() -> &'static str {
    "physync-physics v0.1.0"
}
