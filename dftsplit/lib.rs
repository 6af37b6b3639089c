use std::path::PathBuf;

use thiserror::Error;

pub mod channels;
pub mod dta;
pub mod io;
pub mod pipeline;
pub mod transform;
pub mod types;
pub mod util;

pub use pipeline::{DftPaths, Decomposition, ForwardOutput, Pipeline, TransformOptions};
pub use transform::{FftTransform, SpectralTransform};
pub use types::{ChannelSpectrum, Image, NormData, Sample, SampleFormat, Samples};

pub type Result<T> = std::result::Result<T, DftError>;

#[derive(Error, Debug)]
pub enum DftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Failed to encode image {path}: {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("{0}")]
    DimensionMismatch(String),

    #[error("Metadata has {found} entries but the images have {expected} channels")]
    MetadataCountMismatch { expected: usize, found: usize },

    #[error("Malformed metadata on line {line}: {reason}")]
    MalformedMetadata { line: usize, reason: String },

    #[error("Invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Expected {expected} samples, got {found}")]
    InvalidSampleCount { expected: usize, found: usize },
}
