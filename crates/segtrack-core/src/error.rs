//! Error types for segtrack-core
//!
//! Provides the error type shared by every crate of the detector. Only
//! configuration problems are fatal: everything that can go wrong while
//! sweeping an image is recovered locally by the tracking pipeline.

use thiserror::Error;

/// Segtrack error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Tracker strategy name not recognized
    #[error("unknown tracker strategy: {0}")]
    UnknownStrategy(String),

    /// Extraction mode name not recognized
    #[error("unknown extraction mode: {0}")]
    UnknownExtractionMode(String),

    /// Traversal mode name not recognized
    #[error("unknown traversal mode: {0}")]
    UnknownTraversalMode(String),

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid image dimensions
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: usize, height: usize },

    /// Sample buffer does not match the image dimensions
    #[error("buffer size mismatch: expected {expected} samples, got {actual}")]
    BufferSize { expected: usize, actual: usize },
}

impl Error {
    /// Whether this error stems from the detector configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::UnknownStrategy(_)
                | Error::UnknownExtractionMode(_)
                | Error::UnknownTraversalMode(_)
                | Error::InvalidParameter(_)
        )
    }
}

/// Result type alias for segtrack operations
pub type Result<T> = std::result::Result<T, Error>;
