//! Custom error types for solartile.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Image axis a dimension check applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Width => f.write_str("width"),
            Self::Height => f.write_str("height"),
        }
    }
}

/// Main error type for the solartile library.
#[derive(Error, Debug)]
pub enum Error {
    /// A tile dimension is zero or not strictly smaller than the parent dimension.
    #[error("invalid tile {axis}: tile is {tile}px, parent is {parent}px (need 0 < tile < parent)")]
    Dimension { axis: Axis, tile: u32, parent: u32 },

    /// The computed grid does not cover the padded canvas exactly.
    ///
    /// This is a defect in the partitioner, never a caller mistake.
    #[error("inconsistent tile grid: {reason}")]
    InconsistentGrid { reason: String },

    /// Failed to load an image file.
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to save an image file.
    #[error("failed to save image to {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to read or write a metadata manifest.
    #[error("failed to process manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to read or write an augmentation parameter file.
    #[error("failed to process augmentation parameters {path}: {source}")]
    AugmentationParams {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Shape mismatch between a pixel array and the metadata describing it.
    #[error("array shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },
}

/// Result type alias for solartile operations.
pub type Result<T> = std::result::Result<T, Error>;
