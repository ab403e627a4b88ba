//! wom-export - WOM model export tool
//!
//! Converts model files (glTF/GLB, OBJ) to the WOM binary mesh format (.wom)

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use wom_export::{convert_file, run_batch, AssetImporter, BatchConfig, ImportFlags, WomReader};

/// Long options that older scripts pass with a single dash
const LEGACY_FLAGS: &[&str] = &[
    "-generatetangents",
    "-recursive",
    "-indir",
    "-outdir",
    "-devfilechooser",
];

#[derive(Parser)]
#[command(name = "wom-export")]
#[command(about = "WOM model export tool")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    batch: BatchArgs,
}

/// Batch mode: convert every matching file in a directory
#[derive(Args)]
struct BatchArgs {
    /// Generate tangent and binormal values if they aren't present in input files
    #[arg(long = "generatetangents")]
    generate_tangents: bool,

    /// Export files in all subfolders, mirroring them under the output directory
    #[arg(long)]
    recursive: bool,

    /// Directory to look for input files in (default: current directory)
    #[arg(long, value_name = "DIR")]
    indir: Option<PathBuf>,

    /// Directory for output files (default: current directory)
    #[arg(long, value_name = "DIR")]
    outdir: Option<PathBuf>,

    /// Batch config file (wom.toml); command line values take precedence
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Skip batch mode and pick a single model to export with a file dialog
    #[arg(long = "devfilechooser")]
    dev_file_chooser: bool,

    /// Regex matched against whole file names, e.g. '.+\.dae'
    pattern: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single model file
    Convert {
        /// Input model file (glTF/GLB/OBJ)
        input: PathBuf,

        /// Output directory (default: the input file's directory)
        #[arg(short, long)]
        outdir: Option<PathBuf>,

        /// Generate tangent and binormal values if they aren't present
        #[arg(long = "generatetangents")]
        generate_tangents: bool,
    },

    /// Decode a .wom file and print its structure
    Inspect {
        /// Input .wom file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse_from(normalize_legacy_args(std::env::args_os()));

    match cli.command {
        Some(Commands::Convert {
            input,
            outdir,
            generate_tangents,
        }) => {
            let outdir = match outdir {
                Some(dir) => dir,
                None => input
                    .parent()
                    .map(|p| if p.as_os_str().is_empty() { Path::new(".") } else { p })
                    .context("Input file has no parent directory")?
                    .to_path_buf(),
            };
            let importer = AssetImporter::default();
            let output = convert_file(
                &importer,
                &input,
                &outdir,
                ImportFlags::for_export(generate_tangents),
            )?;
            tracing::info!("Wrote {:?}", output);
        }

        Some(Commands::Inspect { input }) => inspect(&input)?,

        None => run_batch_mode(cli.batch)?,
    }

    Ok(())
}

fn run_batch_mode(args: BatchArgs) -> Result<()> {
    let importer = AssetImporter::default();

    if args.dev_file_chooser {
        return run_file_chooser(&importer);
    }

    let file_config = match &args.config {
        Some(path) => BatchConfig::load(path)?,
        None => BatchConfig::default(),
    };
    let cli_config = BatchConfig {
        indir: args.indir,
        outdir: args.outdir,
        pattern: args.pattern,
        recursive: args.recursive,
        generate_tangents: args.generate_tangents,
    };
    let options = file_config.merge(cli_config).into_options()?;

    let report = run_batch(&importer, &options)?;

    tracing::info!(
        "Converted {} of {} files",
        report.converted.len(),
        report.total()
    );
    if !report.failed.is_empty() {
        for (input, err) in &report.failed {
            tracing::error!("  {:?}: {:#}", input, err);
        }
        bail!("{} file(s) failed to convert", report.failed.len());
    }

    Ok(())
}

#[cfg(feature = "file-chooser")]
fn run_file_chooser(importer: &AssetImporter) -> Result<()> {
    if let Some(output) = wom_export::chooser::pick_and_convert(importer)? {
        tracing::info!("Wrote {:?}", output);
    }
    Ok(())
}

#[cfg(not(feature = "file-chooser"))]
fn run_file_chooser(_importer: &AssetImporter) -> Result<()> {
    bail!("wom-export was built without the `file-chooser` feature")
}

fn inspect(path: &Path) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open WOM: {:?}", path))?;
    let wom = WomReader::new(BufReader::new(file))
        .read_wom()
        .with_context(|| format!("Failed to decode WOM: {:?}", path))?;

    tracing::info!("{:?}: {} meshes, {} joints", path, wom.meshes.len(), wom.joint_count);
    for (mesh, skinned) in wom.meshes.iter().zip(&wom.skinning) {
        tracing::info!(
            "Mesh '{}': {} vertices, {} triangles, stride={}, tangents={}, binormals={}, colors={}, skinned={}",
            mesh.name,
            mesh.vertices.len(),
            mesh.triangle_count(),
            mesh.layout.stride(),
            mesh.layout.has_tangents,
            mesh.layout.has_binormals,
            mesh.layout.has_vertex_color,
            skinned
        );
        for material in &mesh.materials {
            tracing::info!(
                "  Material '{}': texture='{}', shininess={:.4}",
                material.name,
                material.texture_file_name,
                material.shininess.unwrap_or_default()
            );
        }
    }

    Ok(())
}

/// Rewrite `-flag` spellings of long options to `--flag`
fn normalize_legacy_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut passthrough = false;
    args.into_iter()
        .map(|arg| {
            if passthrough {
                return arg;
            }
            if arg.to_str() == Some("--") {
                passthrough = true;
                return arg;
            }
            let legacy = arg.to_str().is_some_and(|s| LEGACY_FLAGS.contains(&s));
            if legacy {
                let mut long = OsString::from("-");
                long.push(&arg);
                long
            } else {
                arg
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_legacy_flags_rewritten() {
        let normalized = normalize_legacy_args(args(&[
            "wom-export",
            "-generatetangents",
            "-recursive",
            "-indir",
            "models",
            "-outdir",
            "out",
            ".+dae",
        ]));
        assert_eq!(
            normalized,
            args(&[
                "wom-export",
                "--generatetangents",
                "--recursive",
                "--indir",
                "models",
                "--outdir",
                "out",
                ".+dae",
            ])
        );
    }

    #[test]
    fn test_args_after_terminator_untouched() {
        let normalized = normalize_legacy_args(args(&["wom-export", "--", "-recursive"]));
        assert_eq!(normalized, args(&["wom-export", "--", "-recursive"]));
    }

    #[test]
    fn test_cli_parses_legacy_invocation() {
        let cli = Cli::parse_from(normalize_legacy_args(args(&[
            "wom-export",
            "-generatetangents",
            "-indir",
            "models",
            r".+\.dae",
        ])));
        assert!(cli.command.is_none());
        assert!(cli.batch.generate_tangents);
        assert!(!cli.batch.recursive);
        assert_eq!(cli.batch.indir, Some(PathBuf::from("models")));
        assert_eq!(cli.batch.pattern.as_deref(), Some(r".+\.dae"));
    }

    #[test]
    fn test_cli_parses_inspect() {
        let cli = Cli::parse_from(args(&["wom-export", "inspect", "model.wom"]));
        assert!(matches!(cli.command, Some(Commands::Inspect { .. })));
    }
}
