use std::borrow::Cow;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SpriteError>;

/// Canonical error surface for the embedding pipeline.
#[derive(Debug, Error)]
pub enum SpriteError {
    #[error("I/O error: {source}")]
    Io {
        source: std::io::Error,
        path: Option<PathBuf>,
    },

    #[error("Failed to decode image at {path:?}: {cause}")]
    ImageDecode { path: PathBuf, cause: String },

    #[error("Invalid image: {width}x{height} has an empty dimension")]
    InvalidImage { width: u32, height: u32 },

    #[error("Vision model not found at {path:?}")]
    ModelNotFound { path: PathBuf },

    #[error("Unable to bind model tensors: {reason}")]
    ModelBinding { reason: Cow<'static, str> },

    #[error("Inference error: {cause}")]
    Inference { cause: String },

    #[error("Unexpected output shape {shape:?} (expected [1, D] or [1, T, D])")]
    UnexpectedOutputShape { shape: Vec<usize> },

    #[error("Cannot derive a key from {path:?}")]
    InvalidKey { path: PathBuf },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SpriteError {
    pub(crate) fn io_at(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: Some(path.into()),
        }
    }
}

impl From<std::io::Error> for SpriteError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { source, path: None }
    }
}
