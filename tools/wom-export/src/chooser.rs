//! Developer file chooser
//!
//! Opens a native file dialog to convert a single model next to itself, for
//! quickly checking one export by hand.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::convert::convert_file;
use crate::import::{AssetImporter, ImportFlags};

/// Ask for one model file and convert it into its own directory with tangent
/// generation requested.
///
/// Returns `None` when the dialog is cancelled.
pub fn pick_and_convert(importer: &AssetImporter) -> Result<Option<PathBuf>> {
    tracing::info!("Opening file picker for model export");

    let extensions = importer.all_extensions();
    let picked = rfd::FileDialog::new()
        .add_filter("Model Files", extensions.as_slice())
        .set_title("Open Model")
        .pick_file();

    let Some(model) = picked else {
        tracing::info!("No file selected");
        return Ok(None);
    };

    let output_dir = model
        .parent()
        .map(PathBuf::from)
        .context("Selected file has no parent directory")?;

    let output = convert_file(importer, &model, &output_dir, ImportFlags::for_export(true))?;
    Ok(Some(output))
}
