//! In-memory scene produced by a [`SceneImporter`](crate::import::SceneImporter)
//!
//! The importer hands over an already triangulated, flat list of meshes and
//! materials. The encoder only reads it.

use wom_common::VertexLayout;

/// Name given to the material appended for meshes without one
pub const DEFAULT_MATERIAL_NAME: &str = "DefaultMaterial";

/// Imported model: meshes and materials in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

impl Scene {
    /// Material referenced by `mesh`, if the index is valid
    pub fn material_for(&self, mesh: &Mesh) -> Option<&Material> {
        self.materials.get(mesh.material_index)
    }

    /// Index of the default material, appending it on first use
    pub fn default_material_index(&mut self) -> usize {
        if let Some(index) = self
            .materials
            .iter()
            .position(|m| m.name == DEFAULT_MATERIAL_NAME)
        {
            return index;
        }
        self.materials.push(Material::default_material());
        self.materials.len() - 1
    }
}

/// A triangle mesh with per-vertex attribute arrays.
///
/// `positions`, `normals` and `uvs` are required and must match the vertex
/// count. Optional arrays are either absent or full length; presence is a
/// mesh-level property, and an empty array counts as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    /// First UV channel, in source convention (V is flipped on write)
    pub uvs: Vec<[f32; 2]>,
    /// First color channel as RGBA (alpha is dropped on write)
    pub colors: Option<Vec<[f32; 4]>>,
    pub tangents: Option<Vec<[f32; 3]>>,
    pub binormals: Option<Vec<[f32; 3]>>,
    pub triangles: Vec<[u32; 3]>,
    pub material_index: usize,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Vertex colors, if present and non-empty
    pub fn present_colors(&self) -> Option<&[[f32; 4]]> {
        non_empty(&self.colors)
    }

    /// Tangents, if present and non-empty
    pub fn present_tangents(&self) -> Option<&[[f32; 3]]> {
        non_empty(&self.tangents)
    }

    /// Binormals, if present and non-empty
    pub fn present_binormals(&self) -> Option<&[[f32; 3]]> {
        non_empty(&self.binormals)
    }

    pub fn has_tangents(&self) -> bool {
        self.present_tangents().is_some()
    }

    pub fn has_binormals(&self) -> bool {
        self.present_binormals().is_some()
    }

    pub fn has_vertex_colors(&self) -> bool {
        self.present_colors().is_some()
    }

    /// Vertex record layout selected by which optional arrays are present
    pub fn layout(&self) -> VertexLayout {
        VertexLayout::new(
            self.has_tangents(),
            self.has_binormals(),
            self.has_vertex_colors(),
        )
    }
}

/// An empty optional array counts as absent
fn non_empty<T>(values: &Option<Vec<T>>) -> Option<&[T]> {
    values.as_deref().filter(|v| !v.is_empty())
}

/// Surface properties for one material.
///
/// Colors are RGBA. Properties missing from the source keep their defaults
/// (black, zero shininess), which is what gets written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub name: String,
    /// Diffuse texture slot 0 as referenced by the source, possibly with directories
    pub diffuse_texture: String,
    pub emissive: [f32; 4],
    pub shininess: f32,
    pub specular: [f32; 4],
    pub transparency: [f32; 4],
}

impl Material {
    pub fn default_material() -> Self {
        Self {
            name: DEFAULT_MATERIAL_NAME.to_string(),
            ..Default::default()
        }
    }
}
