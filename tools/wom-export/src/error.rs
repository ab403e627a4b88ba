//! Conversion errors

use std::path::PathBuf;

use crate::encoder::EncodeError;
use crate::import::ImportError;

/// Errors raised while converting one model file
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A directory argument is missing or is not a directory
    #[error("{role} directory is not a valid directory: {path:?}")]
    InvalidDirectory { role: &'static str, path: PathBuf },

    #[error("Input file has no file name: {0:?}")]
    InvalidInput(PathBuf),

    #[error("Failed to import {path:?}")]
    Import {
        path: PathBuf,
        #[source]
        source: ImportError,
    },

    #[error("Failed to write {path:?}")]
    Encode {
        path: PathBuf,
        #[source]
        source: EncodeError,
    },
}

impl ExportError {
    pub(crate) fn input_dir(path: impl Into<PathBuf>) -> Self {
        Self::InvalidDirectory {
            role: "Input",
            path: path.into(),
        }
    }

    pub(crate) fn output_dir(path: impl Into<PathBuf>) -> Self {
        Self::InvalidDirectory {
            role: "Output",
            path: path.into(),
        }
    }
}
