//! glTF/GLB scene import

use std::path::Path;

use super::{warn_missing_tangents, ImportError, ImportFlags, SceneImporter};
use crate::scene::{Material, Mesh, Scene};

/// Imports .gltf and .glb files through the `gltf` crate.
///
/// Every triangle-list primitive becomes one [`Mesh`] named after its glTF
/// mesh. Node transforms are not applied. Image data is never decoded, only
/// the texture reference is kept.
pub struct GltfImporter;

impl SceneImporter for GltfImporter {
    fn extensions(&self) -> &'static [&'static str] {
        &["gltf", "glb"]
    }

    fn import(&self, path: &Path, flags: ImportFlags) -> Result<Scene, ImportError> {
        let gltf_error = |source| ImportError::Gltf {
            path: path.to_path_buf(),
            source,
        };

        let gltf::Gltf { document, blob } = gltf::Gltf::open(path).map_err(gltf_error)?;
        let buffers = gltf::import_buffers(&document, path.parent(), blob).map_err(gltf_error)?;

        let mut scene = Scene {
            meshes: Vec::new(),
            materials: document.materials().map(convert_material).collect(),
        };

        for mesh in document.meshes() {
            let name = mesh
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("mesh_{}", mesh.index()));

            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    tracing::warn!(
                        "Skipping primitive {} of mesh '{}': mode {:?} is not a triangle list",
                        primitive.index(),
                        name,
                        primitive.mode()
                    );
                    continue;
                }

                let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

                let positions: Vec<[f32; 3]> = reader
                    .read_positions()
                    .ok_or_else(|| missing(&name, "position"))?
                    .collect();

                let normals: Vec<[f32; 3]> = reader
                    .read_normals()
                    .ok_or_else(|| missing(&name, "normal"))?
                    .collect();

                let uvs: Vec<[f32; 2]> = reader
                    .read_tex_coords(0)
                    .ok_or_else(|| missing(&name, "texture coordinate"))?
                    .into_f32()
                    .collect();

                let colors: Option<Vec<[f32; 4]>> = reader
                    .read_colors(0)
                    .map(|iter| iter.into_rgba_f32().collect());

                // Tangent w carries handedness; binormal = cross(normal, tangent) * w
                let tangents4: Option<Vec<[f32; 4]>> =
                    reader.read_tangents().map(|iter| iter.collect());
                let (tangents, binormals) = match tangents4 {
                    Some(t) if t.len() == normals.len() => {
                        let binormals = normals
                            .iter()
                            .zip(&t)
                            .map(|(n, t)| scale(cross(*n, [t[0], t[1], t[2]]), t[3]))
                            .collect();
                        let tangents = t.iter().map(|t| [t[0], t[1], t[2]]).collect();
                        (Some(tangents), Some(binormals))
                    }
                    Some(t) => {
                        tracing::warn!(
                            "Mesh '{}' has mismatched tangent count ({} vs {} vertices), ignoring tangents",
                            name,
                            t.len(),
                            normals.len()
                        );
                        (None, None)
                    }
                    None => {
                        warn_missing_tangents(&name, flags);
                        (None, None)
                    }
                };

                let triangles: Vec<[u32; 3]> = match reader.read_indices() {
                    Some(iter) => {
                        let indices: Vec<u32> = iter.into_u32().collect();
                        indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
                    }
                    None => (0..positions.len() as u32 / 3)
                        .map(|t| [t * 3, t * 3 + 1, t * 3 + 2])
                        .collect(),
                };

                let material_index = match primitive.material().index() {
                    Some(index) => index,
                    None => scene.default_material_index(),
                };

                scene.meshes.push(Mesh {
                    name: name.clone(),
                    positions,
                    normals,
                    uvs,
                    colors,
                    tangents,
                    binormals,
                    triangles,
                    material_index,
                });
            }
        }

        Ok(scene)
    }
}

fn convert_material(material: gltf::Material) -> Material {
    let pbr = material.pbr_metallic_roughness();

    let name = material
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("material_{}", material.index().unwrap_or(0)));

    let diffuse_texture = pbr
        .base_color_texture()
        .map(|info| {
            let image = info.texture().source();
            match image.source() {
                gltf::image::Source::Uri { uri, .. } => uri.to_string(),
                gltf::image::Source::View { .. } => image.name().unwrap_or_default().to_string(),
            }
        })
        .unwrap_or_default();

    let [er, eg, eb] = material.emissive_factor();

    // Absent KHR_materials_specular means factor 1 and white color
    let specular = match material.specular() {
        Some(spec) => {
            let [r, g, b] = spec.specular_color_factor();
            let f = spec.specular_factor();
            [r * f, g * f, b * f, 1.0]
        }
        None => [1.0, 1.0, 1.0, 1.0],
    };

    let gloss = 1.0 - pbr.roughness_factor();
    let shininess = gloss * gloss * 1000.0;

    let transparency = match material.alpha_mode() {
        gltf::material::AlphaMode::Blend => [1.0 - pbr.base_color_factor()[3]; 4],
        _ => [0.0; 4],
    };

    Material {
        name,
        diffuse_texture,
        emissive: [er, eg, eb, 1.0],
        shininess,
        specular,
        transparency,
    }
}

fn missing(mesh: &str, attribute: &'static str) -> ImportError {
    ImportError::MissingAttribute {
        mesh: mesh.to_string(),
        attribute,
    }
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn scale(v: [f32; 3], s: f32) -> [f32; 3] {
    [v[0] * s, v[1] * s, v[2] * s]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binormal_from_tangent_handedness() {
        let n = [0.0, 0.0, 1.0];
        let t = [1.0, 0.0, 0.0];
        assert_eq!(scale(cross(n, t), 1.0), [0.0, 1.0, 0.0]);
        assert_eq!(scale(cross(n, t), -1.0), [0.0, -1.0, 0.0]);
    }

    #[test]
    fn test_missing_file_is_gltf_error() {
        let err = GltfImporter
            .import(Path::new("does/not/exist.glb"), ImportFlags::default())
            .unwrap_err();
        assert!(matches!(err, ImportError::Gltf { .. }));
    }
}
