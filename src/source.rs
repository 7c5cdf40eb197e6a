//! Where analysed image bytes come from.
//!
//! Both the ELA pipeline and the metadata extractor work on the raw encoded
//! bytes, so a file on disk and an uploaded buffer go through the same core.

use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
};

use image::DynamicImage;

use crate::error::{ForensicsError, Result};

pub trait ImageSource {
    /// Human-readable label used in reports.
    fn describe(&self) -> String;

    fn read_bytes(&self) -> Result<Cow<'_, [u8]>>;
}

/// An image file on disk.
#[derive(Debug, Clone)]
pub struct PathSource {
    path: PathBuf,
}

impl PathSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ImageSource for PathSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_bytes(&self) -> Result<Cow<'_, [u8]>> {
        let bytes = fs::read(&self.path).map_err(|e| ForensicsError::io_with_path(e, &self.path))?;
        if bytes.is_empty() {
            return Err(ForensicsError::EmptySource(self.describe()));
        }
        Ok(Cow::Owned(bytes))
    }
}

/// An in-memory upload.
#[derive(Debug, Clone)]
pub struct BufferSource {
    name: String,
    bytes: Vec<u8>,
}

impl BufferSource {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

impl ImageSource for BufferSource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn read_bytes(&self) -> Result<Cow<'_, [u8]>> {
        if self.bytes.is_empty() {
            return Err(ForensicsError::EmptySource(self.name.clone()));
        }
        Ok(Cow::Borrowed(&self.bytes))
    }
}

/// Read and decode whatever `source` points at.
pub fn decode<S: ImageSource + ?Sized>(source: &S) -> Result<DynamicImage> {
    decode_bytes(&source.read_bytes()?)
}

/// Decode encoded bytes, sniffing the container format.
pub fn decode_bytes(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(ForensicsError::Decode)
}
