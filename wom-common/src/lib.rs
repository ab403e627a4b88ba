//! Shared types and format definitions for WOM model files
//!
//! This crate is shared between:
//! - `wom-export` (asset pipeline, writes `.wom` files)
//! - tooling that needs to read `.wom` files back (inspection, tests)
//!
//! # Modules
//!
//! - [`formats`] - WOM binary layout, vertex layout flags and the decoder

pub mod formats;

// Re-export commonly used format items
pub use formats::{
    DecodeError, VertexLayout, WomFile, WomMaterial, WomMesh, WomReader, WomVertex,
    // Constants
    JOINT_COUNT,
    MATERIALS_PER_MESH,
    MAX_VERTICES_PER_MESH,
    WOM_EXT,
};
