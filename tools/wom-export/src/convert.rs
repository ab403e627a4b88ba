//! Single file conversion (model file -> .wom)

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::encoder::encode_to_file;
use crate::error::ExportError;
use crate::import::{ImportFlags, SceneImporter};
use wom_common::WOM_EXT;

/// Output path for `input` inside `output_dir`: the file name up to its last
/// `.`, plus the `.wom` extension
pub fn output_path_for(input: &Path, output_dir: &Path) -> Result<PathBuf, ExportError> {
    let name = input
        .file_name()
        .ok_or_else(|| ExportError::InvalidInput(input.to_path_buf()))?;
    // `file_stem` keeps a lone leading dot (".dae"), the stem there is empty
    let lone_leading_dot =
        input.extension().is_none() && name.as_encoded_bytes().starts_with(b".");
    let stem = if lone_leading_dot {
        OsStr::new("")
    } else {
        input.file_stem().unwrap_or(name)
    };
    // Pushed by hand so dotted stems ("a.b") keep their inner dots
    let mut file_name = stem.to_os_string();
    file_name.push(".");
    file_name.push(WOM_EXT);
    Ok(output_dir.join(file_name))
}

/// Import `input` and write it as `<stem>.wom` into `output_dir`.
///
/// `output_dir` must already exist. An existing output file is overwritten.
/// Returns the path of the written file.
pub fn convert_file(
    importer: &dyn SceneImporter,
    input: &Path,
    output_dir: &Path,
    flags: ImportFlags,
) -> Result<PathBuf, ExportError> {
    if !output_dir.is_dir() {
        return Err(ExportError::output_dir(output_dir));
    }

    let output = output_path_for(input, output_dir)?;

    tracing::info!("------------------------------------------------------------------------");
    tracing::info!(
        "Converting file: {}, output directory: {}",
        display_name(input),
        output_dir.display()
    );

    let scene = importer
        .import(input, flags)
        .map_err(|source| ExportError::Import {
            path: input.to_path_buf(),
            source,
        })?;

    tracing::debug!(
        "Imported {} meshes, {} materials from {:?}",
        scene.meshes.len(),
        scene.materials.len(),
        input
    );

    encode_to_file(&scene, &output).map_err(|source| ExportError::Encode {
        path: output.clone(),
        source,
    })?;

    tracing::info!(
        "File converted: {}, output directory: {}",
        display_name(input),
        output_dir.display()
    );

    Ok(output)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
