use glam::{Mat4, Quat, Vec3};

use crate::geometry::Geometry;

/// Floats per instance in a flattened instance buffer.
pub const INSTANCE_STRIDE: usize = 16;

/// A single renderable mesh with its own transform fields.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: Geometry,
    pub position: Vec3,
    pub quaternion: Quat,
}

impl Mesh {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            position: Vec3::ZERO,
            quaternion: Quat::IDENTITY,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, quaternion: Quat) -> Self {
        self.quaternion = quaternion;
        self
    }
}

/// Flattened per-instance transforms: `count * 16` floats, column-major.
///
/// `needs_update` tells the renderer the buffer must be re-uploaded; the
/// version counter bumps once per `mark_dirty` call.
#[derive(Debug, Clone)]
pub struct InstanceBuffer {
    array: Vec<f32>,
    needs_update: bool,
    version: u64,
}

impl InstanceBuffer {
    /// A buffer of `count` identity matrices.
    pub fn new(count: usize) -> Self {
        let identity = Mat4::IDENTITY.to_cols_array();
        let mut array = Vec::with_capacity(count * INSTANCE_STRIDE);
        for _ in 0..count {
            array.extend_from_slice(&identity);
        }
        Self {
            array,
            needs_update: false,
            version: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.array.len() / INSTANCE_STRIDE
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.array
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.array
    }

    /// The 16 floats of one instance. Panics if `index` is out of range.
    pub fn instance(&self, index: usize) -> &[f32] {
        let offset = index * INSTANCE_STRIDE;
        &self.array[offset..offset + INSTANCE_STRIDE]
    }

    pub fn matrix_at(&self, index: usize) -> Mat4 {
        Mat4::from_cols_slice(self.instance(index))
    }

    pub fn set_matrix_at(&mut self, index: usize, matrix: &Mat4) {
        let offset = index * INSTANCE_STRIDE;
        matrix.write_cols_to_slice(&mut self.array[offset..offset + INSTANCE_STRIDE]);
    }

    pub fn mark_dirty(&mut self) {
        self.needs_update = true;
        self.version += 1;
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Raw bytes for GPU upload if the buffer is dirty; clears the flag.
    pub fn take_upload(&mut self) -> Option<&[u8]> {
        if !self.needs_update {
            return None;
        }
        self.needs_update = false;
        Some(bytemuck::cast_slice(&self.array))
    }
}

/// A mesh drawn many times in one call, one transform per instance.
///
/// `physics_index` names the instance the next physics registration targets.
#[derive(Debug, Clone)]
pub struct InstancedMesh {
    pub geometry: Geometry,
    pub instance_matrix: InstanceBuffer,
    pub physics_index: usize,
}

impl InstancedMesh {
    pub fn new(geometry: Geometry, count: usize) -> Self {
        Self {
            geometry,
            instance_matrix: InstanceBuffer::new(count.max(1)),
            physics_index: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.instance_matrix.count()
    }

    /// Place one instance and mark the buffer for upload.
    pub fn set_instance_transform(&mut self, index: usize, position: Vec3, rotation: Quat) {
        let m = Mat4::from_rotation_translation(rotation, position);
        self.instance_matrix.set_matrix_at(index, &m);
        self.instance_matrix.mark_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_holds_identity_matrices() {
        let buf = InstanceBuffer::new(3);
        assert_eq!(buf.count(), 3);
        assert_eq!(buf.as_slice().len(), 48);
        for i in 0..3 {
            assert_eq!(buf.matrix_at(i), Mat4::IDENTITY);
        }
    }

    #[test]
    fn set_matrix_writes_at_stride_offset() {
        let mut buf = InstanceBuffer::new(2);
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        buf.set_matrix_at(1, &m);
        assert_eq!(buf.matrix_at(0), Mat4::IDENTITY);
        assert_eq!(&buf.as_slice()[28..31], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn upload_clears_dirty_flag() {
        let mut buf = InstanceBuffer::new(1);
        assert!(buf.take_upload().is_none());
        buf.mark_dirty();
        let bytes = buf.take_upload().map(|b| b.len());
        assert_eq!(bytes, Some(64));
        assert!(!buf.needs_update());
        assert_eq!(buf.version(), 1);
    }

    #[test]
    fn instanced_mesh_has_at_least_one_instance() {
        let mesh = InstancedMesh::new(Geometry::sphere(1.0), 0);
        assert_eq!(mesh.count(), 1);
        assert_eq!(mesh.physics_index, 0);
    }

    #[test]
    fn set_instance_transform_marks_dirty() {
        let mut mesh = InstancedMesh::new(Geometry::sphere(1.0), 2);
        mesh.set_instance_transform(1, Vec3::new(0.0, 4.0, 0.0), Quat::IDENTITY);
        assert!(mesh.instance_matrix.needs_update());
        let (_, _, t) = mesh.instance_matrix.matrix_at(1).to_scale_rotation_translation();
        assert_eq!(t, Vec3::new(0.0, 4.0, 0.0));
    }
}
