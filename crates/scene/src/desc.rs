use physync_common::ObjectId;
use serde::{Deserialize, Serialize};

/// A terrain entry in the scene description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainDesc {
    pub id: ObjectId,
    pub kind: String,
}

/// Declarative list of what the scene should contain, independent of meshes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDesc {
    terrains: Vec<TerrainDesc>,
}

impl SceneDesc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a terrain of the given kind under a freshly generated id.
    pub fn add_terrain(&mut self, kind: impl Into<String>) -> ObjectId {
        let id = ObjectId::generate();
        self.terrains.push(TerrainDesc {
            id: id.clone(),
            kind: kind.into(),
        });
        id
    }

    pub fn terrains(&self) -> &[TerrainDesc] {
        &self.terrains
    }
}
