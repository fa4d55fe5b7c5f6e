use glam::Vec3;
use physync_common::MeshId;

/// A high-level action produced from raw pointer input.
///
/// The app applies actions between physics ticks.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Teleport one instance of a mesh to `position`, at rest.
    MoveObject {
        mesh: MeshId,
        instance: usize,
        position: Vec3,
    },
    /// A drag grabbed an object; camera controls should pause.
    DragStarted { mesh: MeshId, instance: usize },
    /// The drag let go; camera controls resume.
    DragEnded,
    /// No-op (input that maps to nothing).
    Noop,
}

impl Action {
    /// Whether this action moves a body.
    pub fn moves_body(&self) -> bool {
        matches!(self, Self::MoveObject { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_object_moves_a_body() {
        let a = Action::MoveObject {
            mesh: MeshId::new(0, 0),
            instance: 2,
            position: Vec3::new(0.0, 5.0, 0.0),
        };
        assert!(a.moves_body());
    }

    #[test]
    fn drag_markers_do_not_move_bodies() {
        let started = Action::DragStarted {
            mesh: MeshId::new(1, 0),
            instance: 0,
        };
        assert!(!started.moves_body());
        assert!(!Action::DragEnded.moves_body());
        assert!(!Action::Noop.moves_body());
    }
}
