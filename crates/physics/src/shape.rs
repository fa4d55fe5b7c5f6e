//! Geometry-to-shape mapping.
//!
//! # Invariants
//! - Mapping is pure: the same geometry always yields an equal descriptor.
//! - Unsupported geometry yields `None`; the object stays visual-only.

use glam::Vec3;
use physync_scene::{Geometry, PlaneGeometry};
use rapier3d::na::DMatrix;
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{COLLISION_MARGIN, HEIGHTFIELD_MAX, HEIGHTFIELD_MIN, PhysicsConfig};

const DEFAULT_HALF_EXTENT: f32 = 0.5;
const DEFAULT_RADIUS: f32 = 1.0;
const DEFAULT_HALF_HEIGHT: f32 = 0.5;
/// Segments around a tapered cylinder's convex hull.
const FRUSTUM_SEGMENTS: usize = 16;

/// Axis a heightfield's samples are measured along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpAxis {
    X,
    Y,
    Z,
}

/// Collision shape derived from renderable geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeDescriptor {
    Box {
        half_extents: Vec3,
        margin: f32,
    },
    Sphere {
        radius: f32,
        margin: f32,
    },
    /// Y-aligned cylinder; unequal radii describe a frustum.
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        half_height: f32,
        margin: f32,
    },
    Heightfield(HeightfieldDescriptor),
}

/// Dense row-major grid of true float height samples.
///
/// Rows advance along Z and columns along X. `scale` is the per-cell spacing,
/// applied as non-uniform local scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightfieldDescriptor {
    pub width_samples: usize,
    pub depth_samples: usize,
    pub heights: Vec<f32>,
    pub height_scale: f32,
    pub min_height: f32,
    pub max_height: f32,
    pub up_axis: UpAxis,
    pub scale: Vec3,
}

impl HeightfieldDescriptor {
    /// Height at column `x`, row `z`.
    pub fn sample(&self, x: usize, z: usize) -> f32 {
        self.heights[z * self.width_samples + x]
    }

    /// Offset of the collider from its body: the shape is centered on the
    /// middle of the vertical band.
    pub fn band_offset(&self) -> Vec3 {
        let mid = (self.min_height + self.max_height) / 2.0;
        match self.up_axis {
            UpAxis::X => Vec3::new(-mid, 0.0, 0.0),
            UpAxis::Y => Vec3::new(0.0, -mid, 0.0),
            UpAxis::Z => Vec3::new(0.0, 0.0, -mid),
        }
    }
}

impl ShapeDescriptor {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Sphere { .. } => "sphere",
            Self::Cylinder { .. } => "cylinder",
            Self::Heightfield(_) => "heightfield",
        }
    }

    /// Collision margin; heightfields carry none. Informational only: engine
    /// colliders match the geometry surface exactly.
    pub fn margin(&self) -> f32 {
        match self {
            Self::Box { margin, .. } | Self::Sphere { margin, .. } | Self::Cylinder { margin, .. } => {
                *margin
            }
            Self::Heightfield(_) => 0.0,
        }
    }

    /// Principal moments of inertia for a body of `mass` around its center.
    /// Non-positive mass means a static body and zero inertia.
    pub fn local_inertia(&self, mass: f32) -> Vec3 {
        if mass <= 0.0 {
            return Vec3::ZERO;
        }
        match self {
            Self::Box { half_extents, .. } => {
                let l = *half_extents * 2.0;
                let k = mass / 12.0;
                Vec3::new(
                    k * (l.y * l.y + l.z * l.z),
                    k * (l.x * l.x + l.z * l.z),
                    k * (l.x * l.x + l.y * l.y),
                )
            }
            Self::Sphere { radius, .. } => Vec3::splat(0.4 * mass * radius * radius),
            Self::Cylinder {
                radius_top,
                radius_bottom,
                half_height,
                ..
            } => {
                let r = (radius_top + radius_bottom) / 2.0;
                let h = half_height * 2.0;
                let side = mass / 12.0 * (3.0 * r * r + h * h);
                Vec3::new(side, 0.5 * mass * r * r, side)
            }
            Self::Heightfield(_) => Vec3::ZERO,
        }
    }

    /// Offset of the collider relative to its body.
    pub fn collider_offset(&self) -> Vec3 {
        match self {
            Self::Heightfield(hf) => hf.band_offset(),
            _ => Vec3::ZERO,
        }
    }

    /// Build the engine-side shape.
    pub fn to_shared_shape(&self) -> SharedShape {
        match self {
            Self::Box { half_extents, .. } => {
                SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            Self::Sphere { radius, .. } => SharedShape::ball(*radius),
            Self::Cylinder {
                radius_top,
                radius_bottom,
                half_height,
                ..
            } => cylinder_shape(*radius_top, *radius_bottom, *half_height),
            Self::Heightfield(hf) => heightfield_shape(hf),
        }
    }
}

fn cylinder_shape(radius_top: f32, radius_bottom: f32, half_height: f32) -> SharedShape {
    if (radius_top - radius_bottom).abs() <= f32::EPSILON {
        return SharedShape::cylinder(half_height, radius_top);
    }
    let mut points = Vec::with_capacity(FRUSTUM_SEGMENTS * 2);
    for i in 0..FRUSTUM_SEGMENTS {
        let a = i as f32 / FRUSTUM_SEGMENTS as f32 * std::f32::consts::TAU;
        let (s, c) = a.sin_cos();
        points.push(point![c * radius_top, half_height, s * radius_top]);
        points.push(point![c * radius_bottom, -half_height, s * radius_bottom]);
    }
    SharedShape::convex_hull(&points).unwrap_or_else(|| {
        tracing::debug!("degenerate frustum hull, using a straight cylinder");
        SharedShape::cylinder(half_height, radius_top.max(radius_bottom))
    })
}

fn heightfield_shape(hf: &HeightfieldDescriptor) -> SharedShape {
    let heights = DMatrix::from_fn(hf.depth_samples, hf.width_samples, |row, col| {
        hf.heights[row * hf.width_samples + col] * hf.height_scale
    });
    // the engine scales a unit grid by its total extents
    let extents = vector![
        hf.scale.x * (hf.width_samples - 1) as f32,
        hf.scale.y,
        hf.scale.z * (hf.depth_samples - 1) as f32
    ];
    SharedShape::heightfield(heights, extents)
}

/// Maps geometry to shapes with a fixed margin and heightfield band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeMapper {
    pub margin: f32,
    pub min_height: f32,
    pub max_height: f32,
}

impl Default for ShapeMapper {
    fn default() -> Self {
        Self {
            margin: COLLISION_MARGIN,
            min_height: HEIGHTFIELD_MIN,
            max_height: HEIGHTFIELD_MAX,
        }
    }
}

impl ShapeMapper {
    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self {
            margin: config.collision_margin,
            min_height: config.heightfield_min,
            max_height: config.heightfield_max,
        }
    }

    pub fn shape_for(&self, geometry: &Geometry) -> Option<ShapeDescriptor> {
        let margin = self.margin;
        match geometry {
            Geometry::Box {
                width,
                height,
                depth,
            } => Some(ShapeDescriptor::Box {
                half_extents: Vec3::new(
                    half_or(*width, DEFAULT_HALF_EXTENT),
                    half_or(*height, DEFAULT_HALF_EXTENT),
                    half_or(*depth, DEFAULT_HALF_EXTENT),
                ),
                margin,
            }),
            Geometry::Sphere { radius } | Geometry::Icosahedron { radius } => {
                Some(ShapeDescriptor::Sphere {
                    radius: radius.unwrap_or(DEFAULT_RADIUS),
                    margin,
                })
            }
            Geometry::Cylinder {
                radius_top,
                radius_bottom,
                height,
            } => Some(ShapeDescriptor::Cylinder {
                radius_top: radius_top.unwrap_or(DEFAULT_RADIUS),
                radius_bottom: radius_bottom.unwrap_or(DEFAULT_RADIUS),
                half_height: half_or(*height, DEFAULT_HALF_HEIGHT),
                margin,
            }),
            Geometry::Plane(plane) => Some(ShapeDescriptor::Heightfield(self.heightfield(plane))),
            Geometry::Triangles { .. } => None,
        }
    }

    fn heightfield(&self, plane: &PlaneGeometry) -> HeightfieldDescriptor {
        let width_samples = plane.width_segments as usize + 1;
        let depth_samples = plane.height_segments as usize + 1;
        let heights: Vec<f32> = plane.vertex_heights().collect();
        debug_assert_eq!(heights.len(), width_samples * depth_samples);

        HeightfieldDescriptor {
            width_samples,
            depth_samples,
            heights,
            height_scale: 1.0,
            min_height: self.min_height,
            max_height: self.max_height,
            up_axis: UpAxis::Y,
            scale: Vec3::new(
                plane.width / plane.width_segments as f32,
                1.0,
                plane.height / plane.height_segments as f32,
            ),
        }
    }
}

/// Map geometry to a shape with the default margin and band.
pub fn shape_for(geometry: &Geometry) -> Option<ShapeDescriptor> {
    ShapeMapper::default().shape_for(geometry)
}

fn half_or(dimension: Option<f32>, default: f32) -> f32 {
    dimension.map_or(default, |d| d / 2.0)
}
