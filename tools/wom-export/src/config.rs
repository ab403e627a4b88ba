//! wom.toml batch configuration
//!
//! Every key is optional. Command line values take precedence over the file.
//!
//! ```toml
//! indir = "models"
//! outdir = "build/models"
//! pattern = '.+\.(dae|fbx|obj)'
//! recursive = true
//! generate_tangents = false
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::batch::{compile_pattern, BatchOptions};
use crate::import::ImportFlags;

/// Batch settings as read from a config file
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    /// Directory to search for input files. Default: current directory
    pub indir: Option<PathBuf>,
    /// Root directory for .wom output. Default: current directory
    pub outdir: Option<PathBuf>,
    /// File name regex, matched against the whole name
    pub pattern: Option<String>,
    /// Descend into subdirectories and mirror them under `outdir`
    #[serde(default)]
    pub recursive: bool,
    /// Request tangent/binormal generation from the importer
    #[serde(default)]
    pub generate_tangents: bool,
}

impl BatchConfig {
    /// Parse a config from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse batch config")
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config: {:?}", path))
    }

    /// Overlay values given on the command line
    pub fn merge(self, overrides: BatchConfig) -> Self {
        Self {
            indir: overrides.indir.or(self.indir),
            outdir: overrides.outdir.or(self.outdir),
            pattern: overrides.pattern.or(self.pattern),
            recursive: overrides.recursive || self.recursive,
            generate_tangents: overrides.generate_tangents || self.generate_tangents,
        }
    }

    /// Resolve into runnable options. A pattern is required.
    pub fn into_options(self) -> Result<BatchOptions> {
        let pattern = self
            .pattern
            .context("No input file pattern given (positional argument or `pattern` in config)")?;
        let pattern = compile_pattern(&pattern)
            .with_context(|| format!("Invalid input file pattern: {}", pattern))?;

        Ok(BatchOptions {
            input_dir: self.indir.unwrap_or_else(|| PathBuf::from(".")),
            output_dir: self.outdir.unwrap_or_else(|| PathBuf::from(".")),
            pattern,
            recursive: self.recursive,
            flags: ImportFlags::for_export(self.generate_tangents),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = BatchConfig::from_toml(
            r#"
            indir = "models"
            outdir = "out"
            pattern = '.+\.dae'
            recursive = true
            generate_tangents = true
            "#,
        )
        .unwrap();

        assert_eq!(config.indir, Some(PathBuf::from("models")));
        assert_eq!(config.outdir, Some(PathBuf::from("out")));
        assert_eq!(config.pattern.as_deref(), Some(r".+\.dae"));
        assert!(config.recursive);
        assert!(config.generate_tangents);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = BatchConfig::from_toml("").unwrap();
        assert_eq!(config, BatchConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(BatchConfig::from_toml("recurse = true").is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = BatchConfig {
            indir: Some("models".into()),
            outdir: Some("out".into()),
            pattern: Some(".+".into()),
            recursive: true,
            generate_tangents: false,
        };
        let cli = BatchConfig {
            outdir: Some("elsewhere".into()),
            pattern: Some(r".+\.obj".into()),
            generate_tangents: true,
            ..Default::default()
        };

        let merged = file.merge(cli);
        assert_eq!(merged.indir, Some(PathBuf::from("models")));
        assert_eq!(merged.outdir, Some(PathBuf::from("elsewhere")));
        assert_eq!(merged.pattern.as_deref(), Some(r".+\.obj"));
        assert!(merged.recursive);
        assert!(merged.generate_tangents);
    }

    #[test]
    fn test_into_options_defaults_to_current_dir() {
        let options = BatchConfig {
            pattern: Some(r".+\.dae".into()),
            ..Default::default()
        }
        .into_options()
        .unwrap();

        assert_eq!(options.input_dir, PathBuf::from("."));
        assert_eq!(options.output_dir, PathBuf::from("."));
        assert!(!options.recursive);
        assert!(options.flags.join_vertices);
        assert!(options.flags.triangulate);
        assert!(!options.flags.compute_tangents);
    }

    #[test]
    fn test_missing_or_invalid_pattern() {
        assert!(BatchConfig::default().into_options().is_err());

        let bad = BatchConfig {
            pattern: Some("(".into()),
            ..Default::default()
        };
        assert!(bad.into_options().is_err());
    }
}
