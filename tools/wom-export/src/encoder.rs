//! WOM encoder (Scene -> .wom)
//!
//! Straight sequential little-endian encoding. The scene is validated before
//! the first byte is written, so a rejected scene never leaves a partial file
//! behind. I/O failures midway may still leave a truncated file.

use byteorder::{LittleEndian, WriteBytesExt};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::scene::{Material, Mesh, Scene};
use wom_common::{JOINT_COUNT, MATERIALS_PER_MESH, MAX_VERTICES_PER_MESH};

/// Enabled byte and per-property presence byte; always set
const ENABLED: u8 = 1;
const PROPERTY_PRESENT: u8 = 1;
const NO_SKINNING: u8 = 0;

/// Errors produced while encoding a scene
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("I/O error while writing WOM data: {0}")]
    Io(#[from] io::Error),

    #[error(
        "Mesh '{mesh}' has {count} vertices, exceeds maximum {max} for u16 indices. \
        Split the mesh into smaller parts.",
        max = MAX_VERTICES_PER_MESH
    )]
    TooManyVertices { mesh: String, count: usize },

    #[error(
        "Mesh '{mesh}' triangle {triangle} references vertex {index}, but the mesh has only {vertex_count} vertices"
    )]
    IndexOutOfRange {
        mesh: String,
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("Mesh '{mesh}' has {actual} {attribute}, expected one per vertex ({expected})")]
    AttributeLength {
        mesh: String,
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Mesh '{mesh}' references material {index}, but the scene has {material_count}")]
    MissingMaterial {
        mesh: String,
        index: usize,
        material_count: usize,
    },

    #[error("{what} {count} does not fit in a 32-bit count field")]
    CountOverflow { what: &'static str, count: usize },
}

/// Writer for the WOM binary format
pub struct WomWriter<W: Write> {
    writer: W,
}

impl<W: Write> WomWriter<W> {
    /// Create a new WOM writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Validate and write a complete scene
    pub fn write_scene(&mut self, scene: &Scene) -> Result<(), EncodeError> {
        validate_scene(scene)?;
        self.write_validated(scene)
    }

    /// Consume the writer and return the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write a scene that already passed [`validate_scene`]
    fn write_validated(&mut self, scene: &Scene) -> Result<(), EncodeError> {
        self.write_count("mesh count", scene.meshes.len())?;

        for mesh in &scene.meshes {
            self.write_mesh(mesh)?;

            // Checked by validate_scene
            let material = scene.material_for(mesh).ok_or_else(|| EncodeError::MissingMaterial {
                mesh: mesh.name.clone(),
                index: mesh.material_index,
                material_count: scene.materials.len(),
            })?;
            self.writer.write_i32::<LittleEndian>(MATERIALS_PER_MESH)?;
            self.write_material(material)?;
        }

        // Joint section reserved for skeletal export
        self.writer.write_i32::<LittleEndian>(JOINT_COUNT)?;

        for _ in &scene.meshes {
            self.writer.write_u8(NO_SKINNING)?;
        }

        Ok(())
    }

    fn write_mesh(&mut self, mesh: &Mesh) -> Result<(), EncodeError> {
        let layout = mesh.layout();
        self.writer.write_all(&layout.to_bytes())?;

        self.write_string(&mesh.name)?;
        self.write_count("vertex count", mesh.vertex_count())?;

        for i in 0..mesh.vertex_count() {
            self.write_vec3(mesh.positions[i])?;
            self.write_vec3(mesh.normals[i])?;

            // Flip V to the renderer's texture origin
            let [u, v] = mesh.uvs[i];
            self.writer.write_f32::<LittleEndian>(u)?;
            self.writer.write_f32::<LittleEndian>(1.0 - v)?;

            if let Some(colors) = mesh.present_colors() {
                let [r, g, b, _] = colors[i];
                self.write_vec3([r, g, b])?;
            }
            if let Some(tangents) = mesh.present_tangents() {
                self.write_vec3(tangents[i])?;
            }
            if let Some(binormals) = mesh.present_binormals() {
                self.write_vec3(binormals[i])?;
            }
        }

        self.write_count("index count", mesh.triangles.len() * 3)?;
        for triangle in &mesh.triangles {
            for &index in triangle {
                // Range checked by validate_scene
                self.writer.write_u16::<LittleEndian>(index as u16)?;
            }
        }

        tracing::info!("Mesh name:\t{}", mesh.name);
        tracing::info!("Has tangents:\t{}", layout.has_tangents);
        tracing::info!("Has binormals:\t{}", layout.has_binormals);
        tracing::info!("Has colors:\t{}", layout.has_vertex_color);
        tracing::info!("Vertices:\t{}", mesh.vertex_count());
        tracing::info!("Faces:\t\t{}", mesh.triangles.len());
        tracing::info!("Indices:\t{}", mesh.triangles.len() * 3);

        Ok(())
    }

    fn write_material(&mut self, material: &Material) -> Result<(), EncodeError> {
        let texture_name = texture_file_name(&material.diffuse_texture);
        self.write_string(texture_name)?;
        self.write_string(&material.name)?;

        self.writer.write_u8(ENABLED)?;

        self.writer.write_u8(PROPERTY_PRESENT)?;
        self.write_vec4(material.emissive)?;

        self.writer.write_u8(PROPERTY_PRESENT)?;
        self.writer.write_f32::<LittleEndian>(material.shininess)?;

        self.writer.write_u8(PROPERTY_PRESENT)?;
        self.write_vec4(material.specular)?;

        self.writer.write_u8(PROPERTY_PRESENT)?;
        self.write_vec4(material.transparency)?;

        tracing::info!("Material name:\t{}", material.name);
        tracing::info!("Texture path:\t{}", texture_name);
        tracing::info!("Emissive:\t{}", format_floats(&material.emissive));
        tracing::info!("Shininess:\t{:.4}", material.shininess);
        tracing::info!("Specular:\t{}", format_floats(&material.specular));
        tracing::info!("Transparency:\t{}", format_floats(&material.transparency));

        Ok(())
    }

    /// Length-prefixed UTF-8, no terminator
    fn write_string(&mut self, s: &str) -> Result<(), EncodeError> {
        self.write_count("string length", s.len())?;
        self.writer.write_all(s.as_bytes())?;
        Ok(())
    }

    fn write_count(&mut self, what: &'static str, count: usize) -> Result<(), EncodeError> {
        let count = i32::try_from(count).map_err(|_| EncodeError::CountOverflow { what, count })?;
        self.writer.write_i32::<LittleEndian>(count)?;
        Ok(())
    }

    fn write_vec3(&mut self, v: [f32; 3]) -> io::Result<()> {
        for f in v {
            self.writer.write_f32::<LittleEndian>(f)?;
        }
        Ok(())
    }

    fn write_vec4(&mut self, v: [f32; 4]) -> io::Result<()> {
        for f in v {
            self.writer.write_f32::<LittleEndian>(f)?;
        }
        Ok(())
    }
}

/// Encode `scene` into a new file at `output`, overwriting any existing file.
///
/// The parent directory must already exist.
pub fn encode_to_file(scene: &Scene, output: &Path) -> Result<(), EncodeError> {
    // Validate first so an invalid scene does not truncate an existing file
    validate_scene(scene)?;

    let file = File::create(output)?;
    let mut writer = WomWriter::new(BufWriter::new(file));
    writer.write_validated(scene)?;
    writer.into_inner().flush()?;
    Ok(())
}

/// Encode `scene` into an in-memory buffer
pub fn encode_to_vec(scene: &Scene) -> Result<Vec<u8>, EncodeError> {
    let mut writer = WomWriter::new(Vec::new());
    writer.write_scene(scene)?;
    Ok(writer.into_inner())
}

/// Base file name of a texture reference: everything after the last path separator
pub fn texture_file_name(path: &str) -> &str {
    match path.rfind(|c: char| c == '/' || c == '\\') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Check the preconditions the byte layout relies on
pub fn validate_scene(scene: &Scene) -> Result<(), EncodeError> {
    for mesh in &scene.meshes {
        validate_mesh(mesh)?;

        if mesh.material_index >= scene.materials.len() {
            return Err(EncodeError::MissingMaterial {
                mesh: mesh.name.clone(),
                index: mesh.material_index,
                material_count: scene.materials.len(),
            });
        }
    }
    Ok(())
}

fn validate_mesh(mesh: &Mesh) -> Result<(), EncodeError> {
    let vertex_count = mesh.vertex_count();

    if vertex_count > MAX_VERTICES_PER_MESH {
        return Err(EncodeError::TooManyVertices {
            mesh: mesh.name.clone(),
            count: vertex_count,
        });
    }

    let lengths = [
        ("normals", Some(mesh.normals.len())),
        ("uvs", Some(mesh.uvs.len())),
        ("colors", mesh.present_colors().map(<[_]>::len)),
        ("tangents", mesh.present_tangents().map(<[_]>::len)),
        ("binormals", mesh.present_binormals().map(<[_]>::len)),
    ];
    for (attribute, len) in lengths {
        match len {
            Some(actual) if actual != vertex_count => {
                return Err(EncodeError::AttributeLength {
                    mesh: mesh.name.clone(),
                    attribute,
                    expected: vertex_count,
                    actual,
                });
            }
            _ => {}
        }
    }

    for (triangle, indices) in mesh.triangles.iter().enumerate() {
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(EncodeError::IndexOutOfRange {
                mesh: mesh.name.clone(),
                triangle,
                index,
                vertex_count,
            });
        }
    }

    Ok(())
}

fn format_floats(values: &[f32]) -> String {
    values
        .iter()
        .map(|v| format!("{:.4}", v))
        .collect::<Vec<_>>()
        .join("\t")
}
