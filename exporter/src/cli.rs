use crate::error::ConfigError;
use crate::icon::job::{ExportPlan, SourceImage};
use crate::icon::meta::{
    validate_widths, ResizeFilter, WidthPreset, DEFAULT_MARGIN, DEFAULT_OUTPUT_DIR,
};
use crate::icon::render::RenderOptions;
use crate::icon::IconExporter;
use clap::Parser;
use std::path::{Path, PathBuf};

pub mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const JOBS_FAILED: u8 = 1;
    pub const CONFIG_ERROR: u8 = 2;
}

const COMMAND_LINE_TARGET: &str = "command-line";

/// Exports square PNG icons at several sizes from high resolution sources.
#[derive(Debug, Parser)]
#[command(name = "export-icons", version)]
pub struct Cli {
    /// Source image, may be repeated
    #[arg(short, long = "input", value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Output base name, paired with the inputs in order (defaults to the file stem)
    #[arg(short, long = "name", value_name = "BASE")]
    pub names: Vec<String>,

    /// Comma separated target widths in pixels
    #[arg(short, long, value_delimiter = ',', value_name = "WIDTHS", conflicts_with = "preset")]
    pub widths: Vec<u32>,

    /// Named width list used when no widths are given [default: toolbar]
    #[arg(long, value_enum)]
    pub preset: Option<WidthPreset>,

    /// Directory the icons are written to
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub out: PathBuf,

    /// Interpolation used when scaling
    #[arg(long, value_enum, default_value_t = ResizeFilter::Lanczos3)]
    pub filter: ResizeFilter,

    /// Thickness of the transparent border in pixels, 0 disables it
    #[arg(long, value_name = "PX", default_value_t = DEFAULT_MARGIN)]
    pub margin: u32,

    /// Icon metadata file describing export targets
    #[arg(
        short,
        long,
        value_name = "FILE",
        conflicts_with_all = ["inputs", "names", "widths", "preset"]
    )]
    pub config: Option<PathBuf>,

    /// Target of the metadata file to export, may be repeated (defaults to all)
    #[arg(short, long = "target", value_name = "NAME", requires = "config")]
    pub targets: Vec<String>,

    /// Maximum number of icons rendered at the same time
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Also write the log to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Turns the arguments into one plan per export target.
    pub fn plans(&self) -> Result<Vec<ExportPlan>, ConfigError> {
        match &self.config {
            Some(config) => self.metadata_plans(config),
            None => Ok(vec![self.command_line_plan()?]),
        }
    }

    pub fn max_parallel(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    fn metadata_plans(&self, config: &Path) -> Result<Vec<ExportPlan>, ConfigError> {
        let exporter = IconExporter::from_file(config)?;

        let targets = if self.targets.is_empty() {
            exporter.target_names().map(str::to_owned).collect()
        } else {
            self.targets.clone()
        };

        targets.iter().map(|t| exporter.plan(t)).collect()
    }

    fn command_line_plan(&self) -> Result<ExportPlan, ConfigError> {
        if self.inputs.is_empty() {
            return Err(ConfigError::NoInputs);
        }

        if !self.names.is_empty() && self.names.len() != self.inputs.len() {
            return Err(ConfigError::NameCountMismatch {
                inputs: self.inputs.len(),
                names: self.names.len(),
            });
        }

        let sources = self
            .inputs
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let base_name = match self.names.get(i) {
                    Some(name) => name.clone(),
                    None => file_stem(path)?,
                };

                Ok(SourceImage {
                    path: path.clone(),
                    base_name,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let widths = if self.widths.is_empty() {
            self.preset.unwrap_or(WidthPreset::Toolbar).widths().to_vec()
        } else {
            validate_widths(self.widths.clone())?
        };

        let options = RenderOptions {
            filter: self.filter,
            margin: self.margin,
        };

        Ok(ExportPlan::expand(
            COMMAND_LINE_TARGET,
            &self.out,
            &sources,
            &widths,
            options,
        ))
    }
}

fn file_stem(path: &Path) -> Result<String, ConfigError> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| ConfigError::NoBaseName(path.to_path_buf()))
}
