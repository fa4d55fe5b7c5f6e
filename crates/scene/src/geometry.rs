use serde::{Deserialize, Serialize};

/// Errors from building scene geometry.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("plane needs at least one segment per axis, got {width_segments}x{height_segments}")]
    InvalidSegments {
        width_segments: u32,
        height_segments: u32,
    },
    #[error("expected {expected} height samples, got {actual}")]
    HeightCount { expected: usize, actual: usize },
}

/// Renderable geometry with its named construction parameters.
///
/// Parameters that the caller left unspecified stay `None`; consumers apply
/// their own defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Box {
        width: Option<f32>,
        height: Option<f32>,
        depth: Option<f32>,
    },
    Sphere {
        radius: Option<f32>,
    },
    /// Polyhedral sphere approximation.
    Icosahedron {
        radius: Option<f32>,
    },
    Cylinder {
        radius_top: Option<f32>,
        radius_bottom: Option<f32>,
        height: Option<f32>,
    },
    Plane(PlaneGeometry),
    /// Raw triangle soup, e.g. a loaded STL model. Flattened xyz positions.
    Triangles {
        positions: Vec<f32>,
    },
}

impl Geometry {
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Self::Box {
            width: Some(width),
            height: Some(height),
            depth: Some(depth),
        }
    }

    pub fn sphere(radius: f32) -> Self {
        Self::Sphere {
            radius: Some(radius),
        }
    }

    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32) -> Self {
        Self::Cylinder {
            radius_top: Some(radius_top),
            radius_bottom: Some(radius_bottom),
            height: Some(height),
        }
    }

    /// Short type name, for logs and debug output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Sphere { .. } => "sphere",
            Self::Icosahedron { .. } => "icosahedron",
            Self::Cylinder { .. } => "cylinder",
            Self::Plane(_) => "plane",
            Self::Triangles { .. } => "triangles",
        }
    }
}

/// A subdivided plane lying in XZ with Y up.
///
/// Vertices are laid out row by row: rows advance along +Z, columns along +X,
/// `(width_segments + 1) * (height_segments + 1)` vertices in total. `height`
/// is the plane's extent along Z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneGeometry {
    pub width: f32,
    pub height: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    positions: Vec<f32>,
}

impl PlaneGeometry {
    /// Build a flat plane centered on the origin.
    pub fn new(
        width: f32,
        height: f32,
        width_segments: u32,
        height_segments: u32,
    ) -> Result<Self, SceneError> {
        if width_segments == 0 || height_segments == 0 {
            return Err(SceneError::InvalidSegments {
                width_segments,
                height_segments,
            });
        }

        let columns = width_segments as usize + 1;
        let rows = height_segments as usize + 1;
        let cell_w = width / width_segments as f32;
        let cell_d = height / height_segments as f32;

        let mut positions = Vec::with_capacity(columns * rows * 3);
        for row in 0..rows {
            let z = row as f32 * cell_d - height / 2.0;
            for col in 0..columns {
                let x = col as f32 * cell_w - width / 2.0;
                positions.extend_from_slice(&[x, 0.0, z]);
            }
        }

        Ok(Self {
            width,
            height,
            width_segments,
            height_segments,
            positions,
        })
    }

    /// Overwrite every vertex's Y with the given row-major samples.
    pub fn with_heights(mut self, heights: &[f32]) -> Result<Self, SceneError> {
        let expected = self.vertex_count();
        if heights.len() != expected {
            return Err(SceneError::HeightCount {
                expected,
                actual: heights.len(),
            });
        }
        for (vertex, h) in self.positions.chunks_exact_mut(3).zip(heights) {
            vertex[1] = *h;
        }
        Ok(self)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Flattened xyz vertex positions.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Y component of every vertex, in vertex order.
    pub fn vertex_heights(&self) -> impl Iterator<Item = f32> + '_ {
        self.positions.chunks_exact(3).map(|v| v[1])
    }
}
