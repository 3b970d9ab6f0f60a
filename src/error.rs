//! Error types for the viewer

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading assets or rendering
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Failed to load asset {path}: {reason}")]
    AssetLoad { path: PathBuf, reason: String },

    #[error(
        "Blendshape target '{target}' does not match the base mesh topology \
         (expected {expected} vertices, found {actual})"
    )]
    TopologyMismatch {
        target: String,
        expected: usize,
        actual: usize,
    },

    #[error("Weight vector length {actual} does not match target count {expected}")]
    WeightCountMismatch { expected: usize, actual: usize },

    #[error("Failed to create window: {0}")]
    WindowCreationFailed(String),

    #[error("Failed to create surface: {0}")]
    SurfaceCreationFailed(String),

    #[error("No suitable GPU adapter found")]
    NoAdapter,

    #[error("Failed to create device: {0}")]
    DeviceCreationFailed(String),

    #[error("Failed to acquire next image: {0}")]
    AcquireImageFailed(String),

    #[error("Surface lost")]
    SurfaceLost,

    #[error("Out of memory")]
    OutOfMemory,

    #[error("Event loop failed: {0}")]
    EventLoopFailed(String),
}

/// Result type for viewer operations
pub type ViewerResult<T> = Result<T, ViewerError>;

impl ViewerError {
    /// Helper for wrapping load failures with the offending path.
    pub fn asset<P: Into<PathBuf>, E: std::fmt::Display>(path: P, err: E) -> Self {
        ViewerError::AssetLoad {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}
