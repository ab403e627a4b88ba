//! Decoded WOM file contents

use super::layout::VertexLayout;

/// A fully decoded .wom file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WomFile {
    pub meshes: Vec<WomMesh>,
    /// Joint count as stored (always 0 for files written by wom-export)
    pub joint_count: i32,
    /// One skinning flag per mesh, in mesh order
    pub skinning: Vec<bool>,
}

/// One mesh record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WomMesh {
    pub name: String,
    pub layout: VertexLayout,
    pub vertices: Vec<WomVertex>,
    /// Flat index list, three entries per triangle
    pub indices: Vec<u16>,
    pub materials: Vec<WomMaterial>,
}

impl WomMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// One vertex record. Optional fields are `Some` exactly when the mesh layout
/// flag is set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WomVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// UV as stored, i.e. with V already flipped
    pub uv: [f32; 2],
    pub color: Option<[f32; 3]>,
    pub tangent: Option<[f32; 3]>,
    pub binormal: Option<[f32; 3]>,
}

/// Inline material record.
///
/// Each property keeps its presence flag so files that mark a property as
/// absent can still be inspected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WomMaterial {
    pub texture_file_name: String,
    pub name: String,
    pub enabled: bool,
    pub emissive: Option<[f32; 4]>,
    pub shininess: Option<f32>,
    pub specular: Option<[f32; 4]>,
    pub transparency: Option<[f32; 4]>,
}
