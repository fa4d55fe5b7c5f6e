//! Rendering adapter: renderer-agnostic interface over the scene.
//!
//! # Invariants
//! - Renderers read mesh transforms; they never move meshes.
//! - Instance buffers are uploaded only when marked dirty, and uploading
//!   clears the mark.
//!
//! The debug text renderer stands in for a GPU backend. The trait is stable;
//! a GPU implementation can replace it without changing consumers.

mod renderer;
mod upload;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use upload::{UploadStats, upload_dirty_instances};

pub fn crate_info() -> &'static str {
    "physync-render v0.1.0"
}
