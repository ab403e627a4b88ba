//! WOM binary model format (.wom)
//!
//! Little-endian POD format consumed by the renderer. No magic bytes and no
//! version field - the layout is fixed and identified by file extension only.
//!
//! # Layout
//! ```text
//! i32                meshCount
//! per mesh:
//!   u8 u8 u8         hasTangents, hasBinormals, hasVertexColor
//!   i32 + utf8       meshName
//!   i32              vertexCount
//!   per vertex:      see [`VertexLayout`]
//!   i32              indexCount (triangleCount * 3)
//!   u16 * indexCount triangle vertex indices
//!   i32              materialCount (always 1)
//!   per material:
//!     i32 + utf8     textureFileName
//!     i32 + utf8     materialName
//!     u8             enabled (always 1)
//!     u8 f32*4       hasEmissive, emissive RGBA
//!     u8 f32         hasShininess, shininess
//!     u8 f32*4       hasSpecular, specular RGBA
//!     u8 f32*4       hasTransparency, transparency RGBA
//! i32                jointCount (always 0)
//! per mesh: u8       hasSkinning (always 0)
//! ```
//!
//! Strings carry no terminator and no padding.

mod layout;
mod reader;
mod wom;

pub use layout::VertexLayout;
pub use reader::{DecodeError, WomReader};
pub use wom::{WomFile, WomMaterial, WomMesh, WomVertex};

/// Output file extension (without dot)
pub const WOM_EXT: &str = "wom";

/// Every mesh carries exactly one inline material record
pub const MATERIALS_PER_MESH: i32 = 1;

/// Joint section is reserved for skeletal export and always empty
pub const JOINT_COUNT: i32 = 0;

/// Maximum vertices addressable by u16 indices (65536)
pub const MAX_VERTICES_PER_MESH: usize = u16::MAX as usize + 1;
