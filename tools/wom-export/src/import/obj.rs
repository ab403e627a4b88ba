//! Wavefront OBJ/MTL scene import

use std::path::Path;

use super::{warn_missing_tangents, ImportError, ImportFlags, SceneImporter};
use crate::scene::{Material, Mesh, Scene};

/// Imports .obj files (and their .mtl libraries) through `tobj`.
///
/// `triangulate` and `join_vertices` map onto tobj's `triangulate` and
/// `single_index` options. OBJ carries no tangent data.
pub struct ObjImporter;

impl SceneImporter for ObjImporter {
    fn extensions(&self) -> &'static [&'static str] {
        &["obj"]
    }

    fn import(&self, path: &Path, flags: ImportFlags) -> Result<Scene, ImportError> {
        let options = tobj::LoadOptions {
            triangulate: flags.triangulate,
            single_index: flags.join_vertices,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        };

        let (models, materials) =
            tobj::load_obj(path, &options).map_err(|source| ImportError::Obj {
                path: path.to_path_buf(),
                source,
            })?;

        let materials = materials.unwrap_or_else(|e| {
            tracing::warn!("No usable MTL for {:?} ({}), using default material", path, e);
            Vec::new()
        });

        let mut scene = Scene {
            meshes: Vec::new(),
            materials: materials.iter().enumerate().map(convert_material).collect(),
        };

        for model in models {
            let name = model.name;
            let mesh = model.mesh;

            if let Some(&arity) = mesh.face_arities.iter().find(|&&a| a != 3) {
                return Err(ImportError::NonTriangleFace { mesh: name, arity });
            }
            if mesh.normals.is_empty() {
                return Err(missing(&name, "normal"));
            }
            if mesh.texcoords.is_empty() {
                return Err(missing(&name, "texture coordinate"));
            }

            let material_index = match mesh.material_id {
                Some(id) if id < scene.materials.len() => id,
                _ => scene.default_material_index(),
            };

            let converted = if flags.join_vertices {
                single_index_mesh(name, &mesh, material_index)
            } else {
                unrolled_mesh(name, &mesh, material_index)
            };

            warn_missing_tangents(&converted.name, flags);
            scene.meshes.push(converted);
        }

        Ok(scene)
    }
}

/// Mesh loaded with `single_index`: all attribute arrays share `indices`
fn single_index_mesh(name: String, mesh: &tobj::Mesh, material_index: usize) -> Mesh {
    let colors = (!mesh.vertex_color.is_empty()).then(|| {
        mesh.vertex_color
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2], 1.0])
            .collect()
    });

    Mesh {
        name,
        positions: vec3s(&mesh.positions),
        normals: vec3s(&mesh.normals),
        uvs: mesh
            .texcoords
            .chunks_exact(2)
            .map(|c| [c[0], c[1]])
            .collect(),
        colors,
        tangents: None,
        binormals: None,
        triangles: triangles(&mesh.indices),
        material_index,
    }
}

/// Mesh loaded without `single_index`: one vertex per face corner
fn unrolled_mesh(name: String, mesh: &tobj::Mesh, material_index: usize) -> Mesh {
    let corner_count = mesh.indices.len();
    let has_colors = !mesh.vertex_color.is_empty();

    let mut out = Mesh {
        name,
        positions: Vec::with_capacity(corner_count),
        normals: Vec::with_capacity(corner_count),
        uvs: Vec::with_capacity(corner_count),
        colors: has_colors.then(|| Vec::with_capacity(corner_count)),
        tangents: None,
        binormals: None,
        triangles: Vec::with_capacity(corner_count / 3),
        material_index,
    };

    for corner in 0..corner_count {
        let p = mesh.indices[corner] as usize;
        // Missing per-attribute index lists fall back to the position index
        let n = mesh.normal_indices.get(corner).map_or(p, |&i| i as usize);
        let t = mesh.texcoord_indices.get(corner).map_or(p, |&i| i as usize);

        out.positions.push(vec3_at(&mesh.positions, p));
        out.normals.push(vec3_at(&mesh.normals, n));
        out.uvs.push([
            mesh.texcoords.get(t * 2).copied().unwrap_or(0.0),
            mesh.texcoords.get(t * 2 + 1).copied().unwrap_or(0.0),
        ]);
        if let Some(colors) = out.colors.as_mut() {
            let [r, g, b] = vec3_at(&mesh.vertex_color, p);
            colors.push([r, g, b, 1.0]);
        }
    }

    let corners: Vec<u32> = (0..corner_count as u32).collect();
    out.triangles = triangles(&corners);
    out
}

fn convert_material((index, mtl): (usize, &tobj::Material)) -> Material {
    let name = if mtl.name.is_empty() {
        format!("material_{}", index)
    } else {
        mtl.name.clone()
    };

    let rgba = |rgb: [f32; 3]| [rgb[0], rgb[1], rgb[2], 1.0];

    Material {
        name,
        diffuse_texture: mtl.diffuse_texture.clone().unwrap_or_default(),
        emissive: rgba(mtl.emissive.unwrap_or([0.0; 3])),
        shininess: mtl.shininess.unwrap_or(0.0),
        specular: rgba(mtl.specular.unwrap_or([0.0; 3])),
        // Transmission filter defaults to passing all light
        transparency: rgba(param_color(mtl, "Tf").unwrap_or([1.0; 3])),
    }
}

/// MTL color statement tobj does not model itself, from its unknown params
fn param_color(mtl: &tobj::Material, key: &str) -> Option<[f32; 3]> {
    parse_color(mtl.unknown_param.get(key)?)
}

/// Parse "r g b" or a single grey value
fn parse_color(value: &str) -> Option<[f32; 3]> {
    let values: Vec<f32> = value
        .split_whitespace()
        .map_while(|s| s.parse().ok())
        .collect();

    match values.as_slice() {
        [r, g, b, ..] => Some([*r, *g, *b]),
        [v] => Some([*v; 3]),
        _ => None,
    }
}

fn missing(mesh: &str, attribute: &'static str) -> ImportError {
    ImportError::MissingAttribute {
        mesh: mesh.to_string(),
        attribute,
    }
}

fn vec3s(flat: &[f32]) -> Vec<[f32; 3]> {
    flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
}

fn vec3_at(flat: &[f32], i: usize) -> [f32; 3] {
    match flat.get(i * 3..i * 3 + 3) {
        Some(c) => [c[0], c[1], c[2]],
        None => [0.0; 3],
    }
}

fn triangles(indices: &[u32]) -> Vec<[u32; 3]> {
    indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
}
