use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single export job.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: EncodeFailure,
    },

    #[error("the image dimensions are invalid: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("the output {} is already produced by another job", path.display())]
    DuplicatedOutput { path: PathBuf },

    #[error("the job was cancelled before it started")]
    Cancelled,

    #[error("the job task failed: {0}")]
    Panicked(String),
}

/// What went wrong while producing an output file.
#[derive(Debug, Error)]
pub enum EncodeFailure {
    #[error(transparent)]
    Png(#[from] png::EncodingError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure while turning flags or metadata into jobs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("an I/O error occurred: {0}")]
    Io(#[from] std::io::Error),

    #[error("an error occurred while parsing the icon metadata: {0}")]
    MetadataParse(serde_json::Error),

    #[error("the path specified as the metadata file has no parent directory")]
    NoParentDir,

    #[error("the target {0} was not found in the icon metadata")]
    TargetNotFound(String),

    #[error("target widths must be positive")]
    ZeroWidth,

    #[error("the target width {width} exceeds the maximum of {max}")]
    WidthTooLarge { width: u32, max: u32 },

    #[error("no target widths were given")]
    NoWidths,

    #[error("no input images were given")]
    NoInputs,

    #[error("{names} base names were given for {inputs} inputs")]
    NameCountMismatch { inputs: usize, names: usize },

    #[error("the input {} has no usable file name", .0.display())]
    NoBaseName(PathBuf),
}
