//! Scene model: the render-side collaborator the physics bridge reads from and
//! writes into.
//!
//! # Invariants
//! - Meshes are addressed by generational `MeshId`s issued by the `Scene` arena.
//! - Instance transforms are stored as flattened column-major 4x4 matrices,
//!   16 floats per instance.
//! - Nothing here knows about physics; the bridge only touches positions,
//!   quaternions and instance buffers.

mod desc;
mod geometry;
mod mesh;
mod scene;
mod terrain;

pub use desc::{SceneDesc, TerrainDesc};
pub use geometry::{Geometry, PlaneGeometry, SceneError};
pub use mesh::{INSTANCE_STRIDE, InstanceBuffer, InstancedMesh, Mesh};
pub use scene::{Scene, SceneObject};
pub use terrain::{generate_height, terrain_geometry};

pub fn crate_info() -> &'static str {
    "physync-scene v0.1.0"
}
