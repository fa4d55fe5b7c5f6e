//! Shared types for the physync workspace.
//!
//! Identifiers used on both sides of the physics/render boundary live here so
//! neither side has to depend on the other's internals.

mod types;

pub use types::{MeshId, ObjectId, Transform};
