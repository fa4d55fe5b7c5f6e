use physync_common::MeshId;
use physync_scene::{Scene, SceneObject};

/// What one upload pass sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadStats {
    pub buffers: usize,
    pub bytes: usize,
}

/// Hand every dirty instance buffer to `upload` as raw bytes and clear its
/// dirty mark. Clean buffers are left alone.
pub fn upload_dirty_instances(
    scene: &mut Scene,
    mut upload: impl FnMut(MeshId, &[u8]),
) -> UploadStats {
    let mut stats = UploadStats::default();
    for (id, object) in scene.iter_mut() {
        let SceneObject::Instanced(im) = object else {
            continue;
        };
        if let Some(bytes) = im.instance_matrix.take_upload() {
            stats.buffers += 1;
            stats.bytes += bytes.len();
            upload(id, bytes);
        }
    }
    if stats.buffers > 0 {
        tracing::trace!(buffers = stats.buffers, bytes = stats.bytes, "instance upload");
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use physync_scene::{Geometry, InstancedMesh, Mesh};

    #[test]
    fn only_dirty_buffers_upload() {
        let mut scene = Scene::new();
        scene.add_mesh(Mesh::new(Geometry::sphere(1.0)));
        let clean = scene.add_instanced(InstancedMesh::new(Geometry::sphere(1.0), 2));
        let mut im = InstancedMesh::new(Geometry::cuboid(1.0, 1.0, 1.0), 3);
        im.set_instance_transform(0, Vec3::X, Quat::IDENTITY);
        let dirty = scene.add_instanced(im);

        let mut seen = Vec::new();
        let stats = upload_dirty_instances(&mut scene, |id, bytes| seen.push((id, bytes.len())));
        assert_eq!(stats, UploadStats { buffers: 1, bytes: 3 * 16 * 4 });
        assert_eq!(seen, vec![(dirty, 192)]);
        assert!(!seen.iter().any(|(id, _)| *id == clean));

        let again = upload_dirty_instances(&mut scene, |_, _| panic!("nothing is dirty"));
        assert_eq!(again, UploadStats::default());
    }
}
