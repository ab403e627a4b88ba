//! Batch conversion over a directory tree
//!
//! Files whose name fully matches the pattern are converted in directory
//! order: the files of a directory first, then each subdirectory depth-first.
//! With recursion enabled the subdirectory structure is mirrored under the
//! output root.

use regex::Regex;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::convert::convert_file;
use crate::error::ExportError;
use crate::import::{ImportFlags, SceneImporter};

/// Settings for one batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Full-match pattern applied to file names
    pub pattern: Regex,
    pub recursive: bool,
    pub flags: ImportFlags,
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Written .wom files
    pub converted: Vec<PathBuf>,
    /// Input files that failed, with the reason
    pub failed: Vec<(PathBuf, anyhow::Error)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.converted.len() + self.failed.len()
    }
}

/// Compile a file name pattern so it must match the whole name
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})$", pattern))
}

/// Convert every matching file under `options.input_dir`.
///
/// Directory arguments are checked before anything is converted. A failing
/// file is logged and recorded, and the batch moves on to the next file.
pub fn run_batch(
    importer: &dyn SceneImporter,
    options: &BatchOptions,
) -> Result<BatchReport, ExportError> {
    if !options.input_dir.is_dir() {
        return Err(ExportError::input_dir(&options.input_dir));
    }
    if !options.output_dir.is_dir() {
        return Err(ExportError::output_dir(&options.output_dir));
    }

    let mut report = BatchReport::default();

    for input in matching_files(options) {
        let result = mirrored_output_dir(options, &input).and_then(|output_dir| {
            convert_file(importer, &input, &output_dir, options.flags).map_err(anyhow::Error::from)
        });

        match result {
            Ok(output) => report.converted.push(output),
            Err(e) => {
                tracing::error!("Failed to convert {:?}: {:#}", input, e);
                report.failed.push((input, e));
            }
        }
    }

    Ok(report)
}

/// Files to convert, in conversion order
pub fn matching_files(options: &BatchOptions) -> Vec<PathBuf> {
    let max_depth = if options.recursive { usize::MAX } else { 1 };

    WalkDir::new(&options.input_dir)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by(files_before_directories)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            let matched = options.pattern.is_match(&name);
            tracing::debug!("{:?} matches pattern: {}", entry.path(), matched);
            matched
        })
        .map(DirEntry::into_path)
        .collect()
}

fn files_before_directories(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// Output directory for `input`, created when it mirrors a subdirectory
fn mirrored_output_dir(options: &BatchOptions, input: &Path) -> anyhow::Result<PathBuf> {
    let relative_parent = input
        .parent()
        .and_then(|parent| parent.strip_prefix(&options.input_dir).ok())
        .unwrap_or_else(|| Path::new(""));

    if relative_parent.as_os_str().is_empty() {
        return Ok(options.output_dir.clone());
    }

    let output_dir = options.output_dir.join(relative_parent);
    std::fs::create_dir_all(&output_dir).map_err(|e| {
        anyhow::anyhow!("Failed to create output directory {:?}: {}", output_dir, e)
    })?;
    Ok(output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::ImportError;
    use crate::scene::{Material, Mesh, Scene};
    use std::fs;

    struct StubImporter;

    impl SceneImporter for StubImporter {
        fn extensions(&self) -> &'static [&'static str] {
            &["dae", "fbx"]
        }

        fn import(&self, path: &Path, _flags: ImportFlags) -> Result<Scene, ImportError> {
            if !self.supports(path) {
                return Err(ImportError::UnsupportedFormat(path.to_path_buf()));
            }
            Ok(Scene {
                meshes: vec![Mesh {
                    name: "m".into(),
                    positions: vec![[0.0; 3]; 3],
                    normals: vec![[0.0; 3]; 3],
                    uvs: vec![[0.0; 2]; 3],
                    triangles: vec![[0, 1, 2]],
                    ..Default::default()
                }],
                materials: vec![Material::default_material()],
            })
        }
    }

    fn options(input: &Path, output: &Path, pattern: &str, recursive: bool) -> BatchOptions {
        BatchOptions {
            input_dir: input.to_path_buf(),
            output_dir: output.to_path_buf(),
            pattern: compile_pattern(pattern).unwrap(),
            recursive,
            flags: ImportFlags::default(),
        }
    }

    #[test]
    fn test_pattern_is_full_match() {
        let re = compile_pattern(r".+\.(dae|fbx)").unwrap();
        assert!(re.is_match("a.dae"));
        assert!(re.is_match("b.fbx"));
        assert!(!re.is_match("notes.txt"));
        assert!(!re.is_match("a.dae.bak"));
        assert!(!re.is_match(".dae"));
    }

    #[test]
    fn test_batch_converts_matching_files_only() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        for name in ["a.dae", "b.fbx", "notes.txt"] {
            fs::write(input.path().join(name), b"").unwrap();
        }

        let opts = options(input.path(), output.path(), r".+\.(dae|fbx)", false);
        let report = run_batch(&StubImporter, &opts).unwrap();

        assert!(report.failed.is_empty());
        assert_eq!(
            report.converted,
            vec![output.path().join("a.wom"), output.path().join("b.wom")]
        );
        let mut written: Vec<_> = fs::read_dir(output.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        written.sort();
        assert_eq!(written, vec!["a.wom", "b.wom"]);
    }

    #[test]
    fn test_non_recursive_ignores_subdirectories() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::create_dir(input.path().join("props")).unwrap();
        fs::write(input.path().join("props/chair.dae"), b"").unwrap();

        let opts = options(input.path(), output.path(), r".+\.dae", false);
        let report = run_batch(&StubImporter, &opts).unwrap();

        assert_eq!(report.total(), 0);
        assert!(!output.path().join("props").exists());
    }

    #[test]
    fn test_recursive_mirrors_directories() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::create_dir_all(input.path().join("props/small")).unwrap();
        fs::write(input.path().join("props/chair.dae"), b"").unwrap();
        fs::write(input.path().join("props/small/cup.dae"), b"").unwrap();
        fs::write(input.path().join("root.dae"), b"").unwrap();

        let opts = options(input.path(), output.path(), r".+\.dae", true);
        let report = run_batch(&StubImporter, &opts).unwrap();

        assert_eq!(
            report.converted,
            vec![
                output.path().join("root.wom"),
                output.path().join("props/chair.wom"),
                output.path().join("props/small/cup.wom"),
            ]
        );
        assert!(output.path().join("props/chair.wom").is_file());
    }

    #[test]
    fn test_failed_file_does_not_stop_batch() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        for name in ["a.dae", "b.txt", "c.dae"] {
            fs::write(input.path().join(name), b"").unwrap();
        }

        let opts = options(input.path(), output.path(), r".+", false);
        let report = run_batch(&StubImporter, &opts).unwrap();

        assert_eq!(report.converted.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, input.path().join("b.txt"));
    }

    #[test]
    fn test_invalid_directories_rejected_up_front() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let opts = options(&missing, dir.path(), r".+", false);
        assert!(matches!(
            run_batch(&StubImporter, &opts),
            Err(ExportError::InvalidDirectory { role: "Input", .. })
        ));

        let opts = options(dir.path(), &missing, r".+", false);
        assert!(matches!(
            run_batch(&StubImporter, &opts),
            Err(ExportError::InvalidDirectory { role: "Output", .. })
        ));
    }
}
