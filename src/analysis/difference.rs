use image::RgbImage;
use log::debug;
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

use crate::error::{ForensicsError, Result};

/// Per-channel `|a - b|` for two same-sized images.
#[derive(Debug, Clone)]
pub struct DifferenceMap {
    pub image: RgbImage,
    pub max_difference: u8,
}

/// A difference map stretched so its largest element becomes full brightness.
#[derive(Debug, Clone)]
pub struct NormalizedDifference {
    pub image: RgbImage,
    pub max_difference: u8,
    pub scale: f64,
    pub mean_difference: f64,
    pub std_deviation: f64,
}

pub struct DifferenceNormalizer {
    parallel: bool,
}

impl DifferenceNormalizer {
    pub fn new() -> Self {
        Self { parallel: false }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn difference(&self, a: &RgbImage, b: &RgbImage) -> Result<DifferenceMap> {
        if a.dimensions() != b.dimensions() {
            return Err(ForensicsError::DimensionMismatch {
                left: a.dimensions(),
                right: b.dimensions(),
            });
        }
        let (width, height) = a.dimensions();

        let raw: Vec<u8> = if self.parallel {
            a.as_raw()
                .par_iter()
                .zip(b.as_raw().par_iter())
                .map(|(&x, &y)| x.abs_diff(y))
                .collect()
        } else {
            a.as_raw()
                .iter()
                .zip(b.as_raw())
                .map(|(&x, &y)| x.abs_diff(y))
                .collect()
        };

        let max_difference = if self.parallel {
            raw.par_iter().copied().max()
        } else {
            raw.iter().copied().max()
        }
        .unwrap_or(0);

        let image = RgbImage::from_raw(width, height, raw).ok_or_else(|| {
            ForensicsError::DimensionMismatch {
                left: (width, height),
                right: b.dimensions(),
            }
        })?;

        Ok(DifferenceMap {
            image,
            max_difference,
        })
    }

    pub fn normalize(&self, a: &RgbImage, b: &RgbImage) -> Result<NormalizedDifference> {
        let diff = self.difference(a, b)?;
        let scale = scale_factor(diff.max_difference);
        let (mean_difference, std_deviation) = mean_and_std(diff.image.as_raw());

        debug!(
            "max difference {} -> scale {:.3} (mean {:.3}, std {:.3})",
            diff.max_difference, scale, mean_difference, std_deviation
        );

        let mut image = diff.image;
        for value in image.iter_mut() {
            *value = scale_value(*value, scale);
        }

        Ok(NormalizedDifference {
            image,
            max_difference: diff.max_difference,
            scale,
            mean_difference,
            std_deviation,
        })
    }
}

impl Default for DifferenceNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// `255 / max(1, max_difference)`: identical images keep a divisor of 1.
pub fn scale_factor(max_difference: u8) -> f64 {
    255.0 / f64::from(max_difference.max(1))
}

fn scale_value(value: u8, scale: f64) -> u8 {
    (f64::from(value) * scale).round().clamp(0.0, 255.0) as u8
}

fn mean_and_std(values: &[u8]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| (f64::from(v) - mean).powi(2))
        .sum::<f64>()
        / n;

    (mean, variance.sqrt())
}
