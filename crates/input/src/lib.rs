//! Pointer input mapped to actions the physics bridge applies.
//!
//! # Invariants
//! - Input never touches bodies directly; it only produces [`Action`]s.
//! - While a drag is active the camera controls stay disabled.

pub mod action;
pub mod drag;

pub use action::Action;
pub use drag::{DragSession, Ray};
