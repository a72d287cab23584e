use crate::error::ConfigError;
use image::imageops::FilterType;
use serde::Deserialize;
use std::path::PathBuf;

/// Widths of the desktop application icon family.
pub const DESKTOP_WIDTHS: &[u32] = &[1024, 512, 256, 192, 128, 96, 64, 48, 40, 32, 24, 16];

/// Widths of toolbar and view icons.
pub const TOOLBAR_WIDTHS: &[u32] = &[128, 64, 32, 24, 16];

/// Default output directory when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "resized_icons";

/// Largest accepted target width.
pub const MAX_WIDTH: u32 = 8192;

/// Default thickness of the cleared border.
pub const DEFAULT_MARGIN: u32 = 1;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconMetadata {
    /// The available export targets
    pub targets: Vec<ExportTarget>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTarget {
    /// The name of the target
    pub name: String,

    /// Directory the exported icons are written to
    pub output_dir: PathBuf,

    /// Widths to export every source at
    pub widths: Widths,

    /// Interpolation used when scaling
    #[serde(default)]
    pub filter: ResizeFilter,

    /// Thickness of the cleared border
    #[serde(default = "default_margin")]
    pub margin: u32,

    /// The source images of this target
    pub sources: Vec<SourceEntry>,
}

fn default_margin() -> u32 {
    DEFAULT_MARGIN
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceEntry {
    /// Path to the source image
    pub file: PathBuf,

    /// Prefix of every output file name
    pub base_name: String,
}

/// Either a named preset or an explicit list of widths.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Widths {
    Preset(WidthPreset),
    Explicit(Vec<u32>),
}

impl Widths {
    /// Resolves the widths, rejecting empty lists and out of range widths.
    pub fn resolve(&self) -> Result<Vec<u32>, ConfigError> {
        match self {
            Self::Preset(preset) => Ok(preset.widths().to_vec()),
            Self::Explicit(widths) => validate_widths(widths.clone()),
        }
    }
}

pub fn validate_widths(widths: Vec<u32>) -> Result<Vec<u32>, ConfigError> {
    if widths.is_empty() {
        return Err(ConfigError::NoWidths);
    }

    if widths.contains(&0) {
        return Err(ConfigError::ZeroWidth);
    }

    if let Some(&width) = widths.iter().find(|&&w| w > MAX_WIDTH) {
        return Err(ConfigError::WidthTooLarge {
            width,
            max: MAX_WIDTH,
        });
    }

    Ok(widths)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum WidthPreset {
    /// Desktop application icon sizes, 1024 down to 16
    Desktop,

    /// Toolbar icon sizes, 128 down to 16
    Toolbar,
}

impl WidthPreset {
    pub fn widths(self) -> &'static [u32] {
        match self {
            Self::Desktop => DESKTOP_WIDTHS,
            Self::Toolbar => TOOLBAR_WIDTHS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,

    /// Sharpest of the available kernels
    #[default]
    Lanczos3,
}

impl ResizeFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}
