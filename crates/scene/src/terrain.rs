use crate::geometry::{Geometry, PlaneGeometry, SceneError};

/// Radial sine-wave height samples, row-major `depth` rows of `width` columns.
pub fn generate_height(width: usize, depth: usize, min_height: f32, max_height: f32) -> Vec<f32> {
    let range = max_height - min_height;
    let w2 = width as f32 / 2.0;
    let d2 = depth as f32 / 2.0;
    let phase_mult = 12.0_f32;

    let mut data = Vec::with_capacity(width * depth);
    for j in 0..depth {
        for i in 0..width {
            let dx = (i as f32 - w2) / w2;
            let dz = (j as f32 - d2) / d2;
            let radius = (dx * dx + dz * dz).sqrt();
            data.push(((radius * phase_mult).sin() + 1.0) * 0.5 * range + min_height);
        }
    }
    data
}

/// A terrain plane of `width_samples x depth_samples` vertices spanning the
/// given extents, with `heights` applied as vertex Y.
pub fn terrain_geometry(
    width_extent: f32,
    depth_extent: f32,
    width_samples: usize,
    depth_samples: usize,
    heights: &[f32],
) -> Result<Geometry, SceneError> {
    let plane = PlaneGeometry::new(
        width_extent,
        depth_extent,
        width_samples.saturating_sub(1) as u32,
        depth_samples.saturating_sub(1) as u32,
    )?
    .with_heights(heights)?;
    Ok(Geometry::Plane(plane))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heights_stay_in_range() {
        let data = generate_height(16, 8, -2.0, 3.0);
        assert_eq!(data.len(), 128);
        assert!(data.iter().all(|h| (-2.0..=3.0).contains(h)));
    }

    #[test]
    fn flat_range_gives_flat_terrain() {
        let data = generate_height(4, 4, 0.0, 0.0);
        assert!(data.iter().all(|h| *h == 0.0));
    }

    #[test]
    fn terrain_geometry_uses_samples_minus_one_segments() {
        let heights = generate_height(5, 3, 0.0, 1.0);
        let geometry = terrain_geometry(10.0, 4.0, 5, 3, &heights).unwrap();
        let Geometry::Plane(plane) = geometry else {
            panic!("expected plane geometry");
        };
        assert_eq!(plane.width_segments, 4);
        assert_eq!(plane.height_segments, 2);
        assert_eq!(plane.vertex_heights().next(), Some(heights[0]));
    }

    #[test]
    fn single_sample_axis_is_rejected() {
        assert!(terrain_geometry(1.0, 1.0, 1, 4, &[0.0; 4]).is_err());
    }
}
