//! wom-export library
//!
//! Converts model files into the WOM binary mesh format. Usable by other
//! tools; the `wom-export` binary is a thin CLI over this crate.

pub mod batch;
#[cfg(feature = "file-chooser")]
pub mod chooser;
pub mod config;
pub mod convert;
pub mod encoder;
pub mod error;
pub mod import;
pub mod scene;

// Re-export key types for conversion
pub use batch::{compile_pattern, run_batch, BatchOptions, BatchReport};
pub use config::BatchConfig;
pub use convert::{convert_file, output_path_for};
pub use encoder::{encode_to_file, encode_to_vec, texture_file_name, EncodeError, WomWriter};
pub use error::ExportError;
pub use import::{AssetImporter, GltfImporter, ImportError, ImportFlags, ObjImporter, SceneImporter};
pub use scene::{Material, Mesh, Scene};

// Re-export the WOM format definitions
pub use wom_common::{VertexLayout, WomFile, WomReader, WOM_EXT};
