use std::io::Cursor;

use image::{ImageFormat, RgbImage, codecs::jpeg::JpegEncoder};
use log::debug;

use crate::error::{ForensicsError, Result};

pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

/// An image next to its JPEG round-tripped copy. Both share dimensions.
#[derive(Debug)]
pub struct RecompressedPair<'a> {
    pub original: &'a RgbImage,
    pub recompressed: RgbImage,
}

pub struct Recompressor {
    quality: u8,
}

impl Recompressor {
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode `image` as JPEG at the configured quality and decode it back.
    ///
    /// The encoded stream lives in a buffer owned by this call and is dropped
    /// on every return path.
    pub fn recompress<'a>(&self, image: &'a RgbImage) -> Result<RecompressedPair<'a>> {
        check_quality(self.quality)?;

        let mut buffer = Cursor::new(Vec::new());
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
            encoder
                .encode_image(image)
                .map_err(|e| ForensicsError::Encoding(e.to_string()))?;
        }

        let encoded = buffer.into_inner();
        debug!(
            "recompressed {}x{} at quality {} into {} bytes",
            image.width(),
            image.height(),
            self.quality,
            encoded.len()
        );

        let recompressed = image::load_from_memory_with_format(&encoded, ImageFormat::Jpeg)
            .map_err(|e| ForensicsError::Encoding(format!("decoding recompressed stream: {}", e)))?
            .to_rgb8();

        if recompressed.dimensions() != image.dimensions() {
            return Err(ForensicsError::DimensionMismatch {
                left: image.dimensions(),
                right: recompressed.dimensions(),
            });
        }

        Ok(RecompressedPair {
            original: image,
            recompressed,
        })
    }
}

/// The JPEG encoder silently clamps quality, so out-of-range values are rejected here.
pub fn check_quality(quality: u8) -> Result<()> {
    if (MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
        Ok(())
    } else {
        Err(ForensicsError::Encoding(format!(
            "quality {} outside {}..={}",
            quality, MIN_QUALITY, MAX_QUALITY
        )))
    }
}
