//! Scene importers (model file -> [`Scene`])
//!
//! Parsing of source formats is delegated to off-the-shelf crates. Each
//! importer maps what its crate exposes onto the flat [`Scene`] model.

mod gltf;
mod obj;

pub use self::gltf::GltfImporter;
pub use self::obj::ObjImporter;

use std::path::{Path, PathBuf};

use crate::scene::Scene;

/// Post-processing requested from the importer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportFlags {
    /// Share vertices whose attributes are identical
    pub join_vertices: bool,
    /// Split polygons into triangles
    pub triangulate: bool,
    /// Ask for tangent space generation when the source has none
    pub compute_tangents: bool,
}

impl ImportFlags {
    /// Flags used for WOM export: always joined and triangulated
    pub fn for_export(compute_tangents: bool) -> Self {
        Self {
            join_vertices: true,
            triangulate: true,
            compute_tangents,
        }
    }
}

impl Default for ImportFlags {
    fn default() -> Self {
        Self::for_export(false)
    }
}

/// Errors produced while importing a model file
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Unsupported model format: {0:?}")]
    UnsupportedFormat(PathBuf),

    #[error("Failed to load glTF {path:?}: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: ::gltf::Error,
    },

    #[error("Failed to load OBJ {path:?}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("Mesh '{mesh}' has a {arity}-sided face; import with triangulation enabled")]
    NonTriangleFace { mesh: String, arity: u32 },

    #[error("Mesh '{mesh}' is missing {attribute} data")]
    MissingAttribute {
        mesh: String,
        attribute: &'static str,
    },
}

/// Loads a model file into a normalized [`Scene`]
pub trait SceneImporter {
    /// File extensions (lowercase, without dot) this importer understands
    fn extensions(&self) -> &'static [&'static str];

    /// Load and normalize the model at `path`
    fn import(&self, path: &Path, flags: ImportFlags) -> Result<Scene, ImportError>;

    /// Whether this importer handles `path`, judged by extension
    fn supports(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.extensions().contains(&ext.as_str()))
    }
}

/// Importer that dispatches to the first backend supporting the file extension
pub struct AssetImporter {
    backends: Vec<Box<dyn SceneImporter>>,
}

impl AssetImporter {
    pub fn new(backends: Vec<Box<dyn SceneImporter>>) -> Self {
        Self { backends }
    }

    /// Every extension any backend accepts
    pub fn all_extensions(&self) -> Vec<&'static str> {
        self.backends
            .iter()
            .flat_map(|b| b.extensions().iter().copied())
            .collect()
    }
}

impl Default for AssetImporter {
    fn default() -> Self {
        Self::new(vec![Box::new(GltfImporter), Box::new(ObjImporter)])
    }
}

impl SceneImporter for AssetImporter {
    fn extensions(&self) -> &'static [&'static str] {
        // Union is only known at runtime; see `supports`
        &[]
    }

    fn import(&self, path: &Path, flags: ImportFlags) -> Result<Scene, ImportError> {
        let backend = self
            .backends
            .iter()
            .find(|b| b.supports(path))
            .ok_or_else(|| ImportError::UnsupportedFormat(path.to_path_buf()))?;
        backend.import(path, flags)
    }

    fn supports(&self, path: &Path) -> bool {
        self.backends.iter().any(|b| b.supports(path))
    }
}

/// Lowercase file extension
fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
}

/// Warn once per mesh when tangents were requested but cannot be provided
fn warn_missing_tangents(mesh: &str, flags: ImportFlags) {
    if flags.compute_tangents {
        tracing::warn!(
            "Mesh '{}' has no tangent data and tangent generation is not available, exporting without tangents",
            mesh
        );
    }
}
