//! Configuration file loading.

use anyhow::{bail, Context, Result};
use foodshare_strip::{DecodeLimits, StripOptions, DEFAULT_JPEG_QUALITY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file names searched in the working directory, in order.
const CANDIDATES: [&str; 3] = [".fs-strip.toml", "fs-strip.toml", ".config/fs-strip.toml"];

/// Root configuration schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigSchema {
    #[serde(default)]
    pub strip: StripSection,

    #[serde(default)]
    pub limits: LimitsSection,

    #[serde(default)]
    pub output: OutputSection,
}

/// Re-encode settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripSection {
    /// JPEG quality, 1-100
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for StripSection {
    fn default() -> Self {
        Self {
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

/// Decoder limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsSection {
    #[serde(default = "default_max_dimension")]
    pub max_width: u32,

    #[serde(default = "default_max_dimension")]
    pub max_height: u32,

    #[serde(default = "default_max_alloc_mb")]
    pub max_alloc_mb: u64,
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            max_width: default_max_dimension(),
            max_height: default_max_dimension(),
            max_alloc_mb: default_max_alloc_mb(),
        }
    }
}

fn default_max_dimension() -> u32 {
    DecodeLimits::default().max_width
}

fn default_max_alloc_mb() -> u64 {
    DecodeLimits::default().max_alloc / (1024 * 1024)
}

/// Where cleaned files go
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSection {
    /// Output directory; next to each source file when unset
    #[serde(default)]
    pub out_dir: Option<PathBuf>,
}

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path, a standard location, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let schema = match config_path {
            Some(ref p) => load_config_file(p)?,
            None => ConfigSchema::default(),
        };
        schema.validate()?;

        tracing::debug!(path = ?config_path, "configuration loaded");

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Pipeline options described by this configuration
    pub fn strip_options(&self) -> StripOptions {
        let limits = &self.schema.limits;
        StripOptions {
            jpeg_quality: self.schema.strip.jpeg_quality,
            limits: DecodeLimits {
                max_width: limits.max_width,
                max_height: limits.max_height,
                max_alloc: limits.max_alloc_mb.saturating_mul(1024 * 1024),
            },
        }
    }
}

impl ConfigSchema {
    fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.strip.jpeg_quality) {
            bail!(
                "strip.jpeg_quality must be between 1 and 100, got {}",
                self.strip.jpeg_quality
            );
        }
        if self.limits.max_width == 0 || self.limits.max_height == 0 {
            bail!("limits.max_width and limits.max_height must be positive");
        }
        Ok(())
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    CANDIDATES
        .into_iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}
