use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForensicsError {
    #[error("Image decode error: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Recompression failed: {0}")]
    Encoding(String),

    #[error("Image dimensions differ: {left:?} vs {right:?}")]
    DimensionMismatch { left: (u32, u32), right: (u32, u32) },

    #[error("Metadata stream unreadable: {0}")]
    Parse(String),

    #[error("File not found: '{}'", .0.display())]
    NotFound(PathBuf),

    #[error("No image content in '{0}'")]
    EmptySource(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ForensicsError {
    /// Attach the path to an I/O failure, promoting `NotFound` to its own variant.
    pub fn io_with_path(err: io::Error, path: impl Into<PathBuf>) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ForensicsError::NotFound(path.into()),
            _ => ForensicsError::Io(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, ForensicsError>;
