use glam::{Mat4, Vec2, Vec3};
use physync_common::MeshId;

use crate::action::Action;

/// A pointer ray in world space. `direction` is unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Unproject a point in normalized device coordinates (x, y in [-1, 1])
    /// through an inverse view-projection with a 0..1 depth range.
    pub fn from_ndc(ndc: Vec2, inverse_view_projection: Mat4) -> Self {
        let near = inverse_view_projection.project_point3(ndc.extend(0.0));
        let far = inverse_view_projection.project_point3(ndc.extend(1.0));
        Self::new(near, far - near)
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Where the ray meets the plane `y = height`, if it does in front of
    /// the origin.
    pub fn hit_horizontal(&self, height: f32) -> Option<Vec3> {
        if self.direction.y.abs() < 1e-6 {
            return None;
        }
        let t = (height - self.origin.y) / self.direction.y;
        (t >= 0.0).then(|| self.at(t))
    }
}

#[derive(Debug, Clone, Copy)]
struct Grab {
    mesh: MeshId,
    instance: usize,
    height: f32,
    offset: Vec3,
}

/// Drags one object across the horizontal plane through its grab point.
#[derive(Debug, Default)]
pub struct DragSession {
    grab: Option<Grab>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.grab.is_some()
    }

    /// Grab `instance` of `mesh`, currently at `position`, with `ray`.
    pub fn begin(&mut self, mesh: MeshId, instance: usize, position: Vec3, ray: Ray) -> Action {
        let offset = ray
            .hit_horizontal(position.y)
            .map_or(Vec3::ZERO, |hit| position - hit);
        self.grab = Some(Grab {
            mesh,
            instance,
            height: position.y,
            offset,
        });
        tracing::debug!(%mesh, instance, "drag started");
        Action::DragStarted { mesh, instance }
    }

    /// Follow the pointer. Yields `MoveObject` while the ray meets the drag
    /// plane, `Noop` otherwise.
    pub fn drag(&mut self, ray: Ray) -> Action {
        let Some(grab) = self.grab else {
            return Action::Noop;
        };
        match ray.hit_horizontal(grab.height) {
            Some(hit) => Action::MoveObject {
                mesh: grab.mesh,
                instance: grab.instance,
                position: hit + grab.offset,
            },
            None => Action::Noop,
        }
    }

    pub fn end(&mut self) -> Action {
        match self.grab.take() {
            Some(grab) => {
                tracing::debug!(mesh = %grab.mesh, instance = grab.instance, "drag ended");
                Action::DragEnded
            }
            None => Action::Noop,
        }
    }
}
