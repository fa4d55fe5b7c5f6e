use glam::{Mat4, Vec3};
use physync_scene::{Scene, SceneObject};
use std::fmt::Write;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 15.0, 15.0),
            target: Vec3::ZERO,
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl RenderView {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, self.near, self.far)
    }

    /// Inverse view-projection, for turning screen points into world rays.
    pub fn inverse_view_projection(&self, aspect: f32) -> Mat4 {
        (self.projection(aspect) * self.view_matrix()).inverse()
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads the scene and a view and produces output. Physics owns
/// the transforms it reads.
pub trait Renderer {
    type Output;

    /// Render one frame.
    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Text renderer for the CLI, logs and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Scene ({} objects) ===", scene.len());
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            view.eye.x, view.eye.y, view.eye.z, view.target.x, view.target.y, view.target.z,
            view.fov_degrees
        );

        for (id, object) in scene.iter() {
            match object {
                SceneObject::Mesh(m) => {
                    let p = m.position;
                    let _ = writeln!(
                        out,
                        "  [{id}] {} pos=({:.2}, {:.2}, {:.2})",
                        m.geometry.kind(),
                        p.x,
                        p.y,
                        p.z
                    );
                }
                SceneObject::Instanced(im) => {
                    let _ = writeln!(
                        out,
                        "  [{id}] {} x{}",
                        im.geometry.kind(),
                        im.count()
                    );
                    for i in 0..im.count() {
                        let p = im.instance_matrix.matrix_at(i).w_axis;
                        let _ = writeln!(out, "    #{i} pos=({:.2}, {:.2}, {:.2})", p.x, p.y, p.z);
                    }
                }
            }
        }
        out
    }
}
