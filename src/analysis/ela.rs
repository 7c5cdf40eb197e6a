use image::DynamicImage;
use log::debug;

use crate::{
    ElaResult,
    analysis::{difference::DifferenceNormalizer, recompress::Recompressor},
    error::Result,
};

pub const DEFAULT_QUALITY: u8 = 90;

/// Error Level Analysis: compare an image against its own JPEG round trip and
/// stretch the residual so the strongest error is full brightness.
///
/// Holds no state between calls; each `analyze` owns its buffers.
pub struct ElaAnalyzer {
    quality: u8,
    parallel: bool,
}

impl ElaAnalyzer {
    pub fn new(quality: u8) -> Self {
        Self {
            quality,
            parallel: false,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn analyze(&self, image: &DynamicImage) -> Result<ElaResult> {
        let rgb_image = image.to_rgb8();
        debug!(
            "ELA on {}x{} image at quality {}",
            rgb_image.width(),
            rgb_image.height(),
            self.quality
        );

        let pair = Recompressor::new(self.quality).recompress(&rgb_image)?;
        let normalized = DifferenceNormalizer::new()
            .with_parallel(self.parallel)
            .normalize(pair.original, &pair.recompressed)?;

        Ok(ElaResult {
            image: normalized.image,
            quality: self.quality,
            max_difference: normalized.max_difference,
            scale: normalized.scale,
            mean_difference: normalized.mean_difference,
            std_deviation: normalized.std_deviation,
        })
    }
}

impl Default for ElaAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY)
    }
}
