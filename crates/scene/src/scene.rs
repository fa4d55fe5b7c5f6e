use physync_common::MeshId;

use crate::geometry::Geometry;
use crate::mesh::{InstancedMesh, Mesh};

/// Anything the scene can hold.
#[derive(Debug, Clone)]
pub enum SceneObject {
    Mesh(Mesh),
    Instanced(InstancedMesh),
}

impl SceneObject {
    pub fn geometry(&self) -> &Geometry {
        match self {
            Self::Mesh(m) => &m.geometry,
            Self::Instanced(m) => &m.geometry,
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    object: Option<SceneObject>,
}

/// Generational arena of scene objects.
///
/// Removing an object frees its slot and bumps the slot generation, so stale
/// `MeshId`s resolve to `None` instead of aliasing a newer object.
#[derive(Debug, Default)]
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.insert(SceneObject::Mesh(mesh))
    }

    pub fn add_instanced(&mut self, mesh: InstancedMesh) -> MeshId {
        self.insert(SceneObject::Instanced(mesh))
    }

    pub fn insert(&mut self, object: SceneObject) -> MeshId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.object = Some(object);
            return MeshId::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            object: Some(object),
        });
        MeshId::new(index, 0)
    }

    /// Remove an object. Its id, and every copy of it, becomes stale.
    pub fn remove(&mut self, id: MeshId) -> Option<SceneObject> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let object = slot.object.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        tracing::debug!(%id, "removed scene object");
        Some(object)
    }

    pub fn get(&self, id: MeshId) -> Option<&SceneObject> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.object.as_ref())
    }

    pub fn get_mut(&mut self, id: MeshId) -> Option<&mut SceneObject> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.object.as_mut())
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        match self.get(id)? {
            SceneObject::Mesh(m) => Some(m),
            SceneObject::Instanced(_) => None,
        }
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        match self.get_mut(id)? {
            SceneObject::Mesh(m) => Some(m),
            SceneObject::Instanced(_) => None,
        }
    }

    pub fn instanced(&self, id: MeshId) -> Option<&InstancedMesh> {
        match self.get(id)? {
            SceneObject::Instanced(m) => Some(m),
            SceneObject::Mesh(_) => None,
        }
    }

    pub fn instanced_mut(&mut self, id: MeshId) -> Option<&mut InstancedMesh> {
        match self.get_mut(id)? {
            SceneObject::Instanced(m) => Some(m),
            SceneObject::Mesh(_) => None,
        }
    }

    /// Live objects in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (MeshId, &SceneObject)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.object
                .as_ref()
                .map(|o| (MeshId::new(i as u32, s.generation), o))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (MeshId, &mut SceneObject)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, s)| {
            let generation = s.generation;
            s.object
                .as_mut()
                .map(|o| (MeshId::new(i as u32, generation), o))
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
