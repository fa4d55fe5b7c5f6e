//! Developer tooling: physics inspector and step timing.
//!
//! # Invariants
//! - Tools only read bridge and scene state.

mod inspector;
mod timing;

pub use inspector::{BodyInfo, PhysicsInspector, PhysicsSummary};
pub use timing::{FrameTimer, TimingSummary};

pub fn crate_info() -> &'static str {
    "physync-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
