//! WOM binary reader
//!
//! Decodes .wom files back into [`WomFile`]. Used for inspection and to verify
//! exporter output.

use super::layout::VertexLayout;
use super::wom::{WomFile, WomMaterial, WomMesh, WomVertex};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read};

/// Errors produced while decoding a WOM stream
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("I/O error while reading WOM data: {0}")]
    Io(#[from] io::Error),

    #[error("Negative {what} count: {count}")]
    NegativeCount { what: &'static str, count: i32 },

    #[error("Index count {0} is not a multiple of 3")]
    PartialTriangle(i32),

    #[error("String is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("{0} trailing bytes after skinning section")]
    TrailingData(usize),
}

/// Reader for the WOM binary format
pub struct WomReader<R: Read> {
    reader: R,
}

impl<R: Read> WomReader<R> {
    /// Create a new WOM reader
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read a complete WOM file from the input
    pub fn read_wom(&mut self) -> Result<WomFile, DecodeError> {
        let mesh_count = self.read_count("mesh")?;

        let mut meshes = Vec::with_capacity(mesh_count.min(1024));
        for _ in 0..mesh_count {
            meshes.push(self.read_mesh()?);
        }

        let joint_count = self.reader.read_i32::<LittleEndian>()?;

        let mut skinning = Vec::with_capacity(mesh_count.min(1024));
        for _ in 0..mesh_count {
            skinning.push(self.reader.read_u8()? != 0);
        }

        Ok(WomFile {
            meshes,
            joint_count,
            skinning,
        })
    }

    /// Consume the reader and return the inner reader
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_mesh(&mut self) -> Result<WomMesh, DecodeError> {
        let mut flags = [0u8; 3];
        self.reader.read_exact(&mut flags)?;
        let layout = VertexLayout::from_bytes(flags);

        let name = self.read_string()?;

        let vertex_count = self.read_count("vertex")?;
        let mut vertices = Vec::with_capacity(vertex_count.min(1 << 16));
        for _ in 0..vertex_count {
            vertices.push(self.read_vertex(layout)?);
        }

        let index_count = self.reader.read_i32::<LittleEndian>()?;
        if index_count < 0 {
            return Err(DecodeError::NegativeCount {
                what: "index",
                count: index_count,
            });
        }
        if index_count % 3 != 0 {
            return Err(DecodeError::PartialTriangle(index_count));
        }
        let mut indices = Vec::with_capacity((index_count as usize).min(1 << 20));
        for _ in 0..index_count {
            indices.push(self.reader.read_u16::<LittleEndian>()?);
        }

        let material_count = self.read_count("material")?;
        let mut materials = Vec::with_capacity(material_count.min(16));
        for _ in 0..material_count {
            materials.push(self.read_material()?);
        }

        Ok(WomMesh {
            name,
            layout,
            vertices,
            indices,
            materials,
        })
    }

    fn read_vertex(&mut self, layout: VertexLayout) -> Result<WomVertex, DecodeError> {
        let position = self.read_vec3()?;
        let normal = self.read_vec3()?;
        let uv = [self.read_f32()?, self.read_f32()?];

        let color = if layout.has_vertex_color {
            Some(self.read_vec3()?)
        } else {
            None
        };
        let tangent = if layout.has_tangents {
            Some(self.read_vec3()?)
        } else {
            None
        };
        let binormal = if layout.has_binormals {
            Some(self.read_vec3()?)
        } else {
            None
        };

        Ok(WomVertex {
            position,
            normal,
            uv,
            color,
            tangent,
            binormal,
        })
    }

    fn read_material(&mut self) -> Result<WomMaterial, DecodeError> {
        let texture_file_name = self.read_string()?;
        let name = self.read_string()?;
        let enabled = self.reader.read_u8()? != 0;

        // The value is always stored; the flag only says whether it is meaningful
        let emissive = self.read_property(Self::read_vec4)?;
        let shininess = self.read_property(Self::read_f32)?;
        let specular = self.read_property(Self::read_vec4)?;
        let transparency = self.read_property(Self::read_vec4)?;

        Ok(WomMaterial {
            texture_file_name,
            name,
            enabled,
            emissive,
            shininess,
            specular,
            transparency,
        })
    }

    fn read_property<T>(
        &mut self,
        read_value: fn(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<Option<T>, DecodeError> {
        let present = self.reader.read_u8()? != 0;
        let value = read_value(self)?;
        Ok(present.then_some(value))
    }

    fn read_string(&mut self) -> Result<String, DecodeError> {
        let len = self.read_count("string byte")?;
        // Grow with the data actually read, the length prefix is untrusted
        let mut bytes = Vec::new();
        self.reader.by_ref().take(len as u64).read_to_end(&mut bytes)?;
        if bytes.len() != len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("string of {} bytes truncated after {}", len, bytes.len()),
            )
            .into());
        }
        Ok(String::from_utf8(bytes)?)
    }

    fn read_count(&mut self, what: &'static str) -> Result<usize, DecodeError> {
        let count = self.reader.read_i32::<LittleEndian>()?;
        usize::try_from(count).map_err(|_| DecodeError::NegativeCount { what, count })
    }

    fn read_f32(&mut self) -> Result<f32, DecodeError> {
        Ok(self.reader.read_f32::<LittleEndian>()?)
    }

    fn read_vec3(&mut self) -> Result<[f32; 3], DecodeError> {
        Ok([self.read_f32()?, self.read_f32()?, self.read_f32()?])
    }

    fn read_vec4(&mut self) -> Result<[f32; 4], DecodeError> {
        Ok([
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ])
    }
}

impl WomFile {
    /// Decode a complete in-memory WOM file, rejecting trailing bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = WomReader::new(bytes);
        let file = reader.read_wom()?;
        let rest = reader.into_inner();
        if !rest.is_empty() {
            return Err(DecodeError::TrailingData(rest.len()));
        }
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use std::io::Write;

    fn put_string(buf: &mut Vec<u8>, s: &str) {
        buf.write_i32::<LittleEndian>(s.len() as i32).unwrap();
        buf.write_all(s.as_bytes()).unwrap();
    }

    /// Hand-assembled file: one triangle mesh with vertex colors, one material
    fn sample_file() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.write_i32::<LittleEndian>(1).unwrap();

        buf.write_all(&[0, 0, 1]).unwrap();
        put_string(&mut buf, "tri");
        buf.write_i32::<LittleEndian>(3).unwrap();
        for i in 0..3 {
            let f = i as f32;
            for v in [f, 0.0, 0.0, 0.0, 1.0, 0.0, 0.5, 0.25, 1.0, 0.5, 0.0] {
                buf.write_f32::<LittleEndian>(v).unwrap();
            }
        }
        buf.write_i32::<LittleEndian>(3).unwrap();
        for i in [0u16, 1, 2] {
            buf.write_u16::<LittleEndian>(i).unwrap();
        }

        buf.write_i32::<LittleEndian>(1).unwrap();
        put_string(&mut buf, "wood.png");
        put_string(&mut buf, "Wood");
        buf.write_u8(1).unwrap();
        buf.write_u8(1).unwrap();
        for v in [0.1, 0.2, 0.3, 1.0] {
            buf.write_f32::<LittleEndian>(v).unwrap();
        }
        buf.write_u8(1).unwrap();
        buf.write_f32::<LittleEndian>(32.0).unwrap();
        buf.write_u8(1).unwrap();
        for v in [1.0, 1.0, 1.0, 1.0] {
            buf.write_f32::<LittleEndian>(v).unwrap();
        }
        buf.write_u8(0).unwrap();
        for v in [0.0, 0.0, 0.0, 0.0] {
            buf.write_f32::<LittleEndian>(v).unwrap();
        }

        buf.write_i32::<LittleEndian>(0).unwrap();
        buf.write_u8(0).unwrap();
        buf
    }

    #[test]
    fn test_read_sample_file() {
        let file = WomFile::from_bytes(&sample_file()).unwrap();

        assert_eq!(file.meshes.len(), 1);
        assert_eq!(file.joint_count, 0);
        assert_eq!(file.skinning, vec![false]);

        let mesh = &file.meshes[0];
        assert_eq!(mesh.name, "tri");
        assert_eq!(mesh.layout, VertexLayout::new(false, false, true));
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.vertices[2].position, [2.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[0].uv, [0.5, 0.25]);
        assert_eq!(mesh.vertices[0].color, Some([1.0, 0.5, 0.0]));
        assert_eq!(mesh.vertices[0].tangent, None);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.triangle_count(), 1);

        let material = &mesh.materials[0];
        assert_eq!(material.texture_file_name, "wood.png");
        assert_eq!(material.name, "Wood");
        assert!(material.enabled);
        assert_eq!(material.emissive, Some([0.1, 0.2, 0.3, 1.0]));
        assert_eq!(material.shininess, Some(32.0));
        assert_eq!(material.specular, Some([1.0; 4]));
        assert_eq!(material.transparency, None);
    }

    #[test]
    fn test_empty_file() {
        let mut buf = Vec::new();
        buf.write_i32::<LittleEndian>(0).unwrap();
        buf.write_i32::<LittleEndian>(0).unwrap();

        let file = WomFile::from_bytes(&buf).unwrap();
        assert!(file.meshes.is_empty());
        assert!(file.skinning.is_empty());
    }

    #[test]
    fn test_truncated_file_is_io_error() {
        let data = sample_file();
        let result = WomFile::from_bytes(&data[..data.len() - 2]);
        assert!(matches!(result, Err(DecodeError::Io(_))));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut data = sample_file();
        data.push(0xFF);
        assert!(matches!(
            WomFile::from_bytes(&data),
            Err(DecodeError::TrailingData(1))
        ));
    }

    #[test]
    fn test_oversized_string_length_is_eof() {
        let mut buf = Vec::new();
        buf.write_i32::<LittleEndian>(1).unwrap();
        buf.write_all(&[0, 0, 0]).unwrap();
        buf.write_i32::<LittleEndian>(i32::MAX).unwrap();
        buf.write_all(b"tri").unwrap();

        match WomFile::from_bytes(&buf) {
            Err(DecodeError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected EOF, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_mesh_count_rejected() {
        let mut buf = Vec::new();
        buf.write_i32::<LittleEndian>(-1).unwrap();
        assert!(matches!(
            WomFile::from_bytes(&buf),
            Err(DecodeError::NegativeCount { what: "mesh", count: -1 })
        ));
    }
}
