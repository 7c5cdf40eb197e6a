use std::{collections::BTreeMap, path::Path};

use image::{DynamicImage, RgbImage};
use log::debug;

use crate::{
    analysis::ela::{DEFAULT_QUALITY, ElaAnalyzer},
    error::Result,
    metadata::exif::{ExifExtractor, NO_EXIF_INDICATOR},
    source::{BufferSource, ImageSource, PathSource, decode_bytes},
};

pub mod analysis;
pub mod error;
pub mod metadata;
pub mod report;
pub mod source;

#[cfg(test)]
mod test_helpers;

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub ela_quality: u8,
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ela_quality: DEFAULT_QUALITY,
            parallel: false,
        }
    }
}

/// Runs ELA and EXIF inspection over one source image.
///
/// The encoded bytes are kept alongside the decoded raster because the
/// metadata reader needs the original container, not the pixels.
pub struct Inspector {
    original: DynamicImage,
    bytes: Vec<u8>,
    label: String,
    config: AnalysisConfig,
}

impl Inspector {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_source(&PathSource::new(path))
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        Self::from_source(&BufferSource::new(name, bytes))
    }

    pub fn from_source<S: ImageSource + ?Sized>(source: &S) -> Result<Self> {
        let label = source.describe();
        let bytes = source.read_bytes()?.into_owned();
        let original = decode_bytes(&bytes)?;
        debug!("decoded '{}' ({}x{})", label, original.width(), original.height());

        Ok(Self {
            original,
            bytes,
            label,
            config: AnalysisConfig::default(),
        })
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn image(&self) -> &DynamicImage {
        &self.original
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn ela(&self, quality: u8) -> Result<ElaResult> {
        ElaAnalyzer::new(quality)
            .with_parallel(self.config.parallel)
            .analyze(&self.original)
    }

    pub fn extract_metadata(&self) -> Result<MetadataResult> {
        ExifExtractor::extract_from_bytes(&self.bytes)
    }

    pub fn full_analysis(&self) -> Result<InspectionReport> {
        let ela = self.ela(self.config.ela_quality)?;
        let metadata = self.extract_metadata()?;

        Ok(InspectionReport {
            source: self.label.clone(),
            width: self.original.width(),
            height: self.original.height(),
            ela,
            metadata,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ElaResult {
    pub image: RgbImage,
    pub quality: u8,
    /// Largest raw per-channel difference before scaling.
    pub max_difference: u8,
    pub scale: f64,
    pub mean_difference: f64,
    pub std_deviation: f64,
}

impl ElaResult {
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image.save(path).map_err(|e| match e {
            image::ImageError::IoError(io) => error::ForensicsError::Io(io),
            other => error::ForensicsError::Encoding(other.to_string()),
        })
    }

    /// True when recompression changed nothing at all.
    pub fn is_uniform(&self) -> bool {
        self.max_difference == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataResult {
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub software: Option<String>,
    pub date_time: Option<String>,
    pub gps_coordinates: Option<(f64, f64)>,
    pub all_tags: BTreeMap<String, String>,
    pub suspicious_indicators: Vec<String>,
}

impl MetadataResult {
    pub fn empty() -> Self {
        Self {
            suspicious_indicators: vec![NO_EXIF_INDICATOR.into()],
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.all_tags.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct InspectionReport {
    pub source: String,
    pub width: u32,
    pub height: u32,
    pub ela: ElaResult,
    pub metadata: MetadataResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ForensicsError,
        test_helpers::{camera_jpeg, png_bytes, textured_rgb},
    };

    #[test]
    fn test_full_analysis_from_upload() {
        let inspector = Inspector::from_bytes("upload.jpg", camera_jpeg()).unwrap();
        let report = inspector.full_analysis().unwrap();
        assert_eq!(report.source, "upload.jpg");
        assert_eq!(report.ela.image.dimensions(), (16, 16));
        assert_eq!(report.ela.quality, DEFAULT_QUALITY);
        assert_eq!(report.metadata.all_tags.len(), 3);
    }

    #[test]
    fn test_path_and_buffer_agree() {
        let bytes = camera_jpeg();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.jpg");
        std::fs::write(&path, &bytes).unwrap();

        let from_path = Inspector::open(&path).unwrap().full_analysis().unwrap();
        let from_buffer = Inspector::from_bytes("shot.jpg", bytes).unwrap().full_analysis().unwrap();

        assert_eq!(from_path.ela.image.as_raw(), from_buffer.ela.image.as_raw());
        assert_eq!(from_path.metadata, from_buffer.metadata);
    }

    #[test]
    fn test_png_without_metadata() {
        let inspector = Inspector::from_bytes("plain.png", png_bytes(&textured_rgb(24, 24))).unwrap();
        let report = inspector.full_analysis().unwrap();
        assert!(report.metadata.is_empty());
        assert_eq!(report.ela.image.dimensions(), (24, 24));
    }

    #[test]
    fn test_config_quality_is_used() {
        let inspector = Inspector::from_bytes("upload.jpg", camera_jpeg())
            .unwrap()
            .with_config(AnalysisConfig {
                ela_quality: 70,
                parallel: true,
            });
        assert_eq!(inspector.full_analysis().unwrap().ela.quality, 70);
    }

    #[test]
    fn test_missing_file() {
        let err = Inspector::open("/nowhere/at/all.jpg").err().unwrap();
        assert!(matches!(err, ForensicsError::NotFound(_)));
    }

    #[test]
    fn test_corrupted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        let mut bytes = camera_jpeg();
        bytes.truncate(40);
        std::fs::write(&path, &bytes).unwrap();

        let err = Inspector::open(&path).err().unwrap();
        assert!(matches!(err, ForensicsError::Decode(_)));
    }

    #[test]
    fn test_save_ela_image() {
        let inspector = Inspector::from_bytes("upload.jpg", camera_jpeg()).unwrap();
        let ela = inspector.ela(90).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("ela.png");
        ela.save(&out).unwrap();
        let reloaded = image::open(&out).unwrap();
        assert_eq!(reloaded.to_rgb8().as_raw(), ela.image.as_raw());
    }

    #[test]
    fn test_save_into_missing_directory_is_io_error() {
        let inspector = Inspector::from_bytes("upload.jpg", camera_jpeg()).unwrap();
        let ela = inspector.ela(90).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("no_such_dir").join("ela.png");

        let err = ela.save(&out).unwrap_err();
        assert!(matches!(err, ForensicsError::Io(_)), "got {:?}", err);
    }
}
