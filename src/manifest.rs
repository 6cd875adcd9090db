//! Project manifest (charex.yaml) parsing.
//!
//! The manifest holds defaults for the CLI: where artifacts go, the
//! pixels-per-unit ratio, decode parallelism, root handling, colour
//! correction and renderer tints. Every field is optional; command-line flags win.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CharexError, Result};
use crate::hierarchy::RootPolicy;
use crate::render::DEFAULT_RATIO;

/// Manifest file name looked up in the working directory.
pub const MANIFEST_FILENAME: &str = "charex.yaml";

/// Project manifest loaded from charex.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Output directory for extracted artifacts.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Pixels per container unit.
    #[serde(default = "default_ratio")]
    pub ratio: f32,

    /// Texture decode workers (0 = one per core).
    #[serde(default)]
    pub jobs: usize,

    /// What to do with containers holding several top-level units.
    #[serde(default)]
    pub root_policy: RootPolicy,

    /// Undo premultiplied alpha on cheek sprites.
    #[serde(default = "default_true")]
    pub correct_cheeks: bool,

    /// Multiply each record's renderer colour into its sprite.
    #[serde(default = "default_true")]
    pub apply_tints: bool,

    /// Integer upscale for written PNGs.
    #[serde(default)]
    pub scale: Option<u32>,
}

fn default_output() -> PathBuf {
    PathBuf::from("extracted")
}

fn default_ratio() -> f32 {
    DEFAULT_RATIO
}

fn default_true() -> bool {
    true
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            output: default_output(),
            ratio: default_ratio(),
            jobs: 0,
            root_policy: RootPolicy::default(),
            correct_cheeks: true,
            apply_tints: true,
            scale: None,
        }
    }
}

impl Manifest {
    /// Load manifest from a charex.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CharexError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read manifest: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse manifest from YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let manifest: Manifest = serde_yaml::from_str(content).map_err(|e| CharexError::Config {
            message: format!("Invalid manifest: {}", e),
            help: Some(format!("Check {} syntax", MANIFEST_FILENAME)),
        })?;

        manifest.validate()?;
        Ok(manifest)
    }

    /// Load `charex.yaml` from a directory, or fall back to defaults.
    ///
    /// Returns the manifest and whether a file was found.
    pub fn discover(dir: &Path) -> Result<(Self, bool)> {
        let path = dir.join(MANIFEST_FILENAME);
        if path.is_file() {
            log::debug!("using manifest {}", path.display());
            Ok((Self::load(&path)?, true))
        } else {
            Ok((Self::default(), false))
        }
    }

    /// Serialize back to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| CharexError::Config {
            message: format!("Failed to serialize manifest: {}", e),
            help: None,
        })
    }

    /// Get the effective scale factor.
    pub fn effective_scale(&self) -> u32 {
        self.scale.unwrap_or(1).max(1)
    }

    fn validate(&self) -> Result<()> {
        if !(self.ratio.is_finite() && self.ratio > 0.0) {
            return Err(CharexError::Config {
                message: format!("ratio must be a positive number, got {}", self.ratio),
                help: Some(format!("The source engine uses {}", DEFAULT_RATIO)),
            });
        }
        Ok(())
    }
}
