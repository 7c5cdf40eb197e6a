use std::{collections::BTreeMap, fmt::Write};

use serde::Serialize;

use crate::{InspectionReport, MetadataResult};

pub const NO_METADATA_NOTICE: &str = "No EXIF metadata found. This can be suspicious for some images.";
pub const METADATA_HINT: &str =
    "Check for missing camera info, inconsistent timestamps, or editing software.";
pub const ELA_HINT: &str =
    "Look for unusual artifacts (high contrast regions may indicate editing).";
pub const DISCLAIMER: &str = "Note: This is a heuristic method, not 100% accurate.";

#[derive(Serialize)]
pub struct JsonReport {
    pub source: String,
    pub width: u32,
    pub height: u32,
    pub ela_analysis: ElaReportSection,
    pub metadata: MetadataReportSection,
}

#[derive(Serialize)]
pub struct ElaReportSection {
    pub quality: u8,
    pub max_difference: u8,
    pub scale: f64,
    pub mean_difference: f64,
    pub std_deviation: f64,
    pub uniform: bool,
}

#[derive(Serialize)]
pub struct MetadataReportSection {
    pub tag_count: usize,
    pub camera_info: Option<String>,
    pub software: Option<String>,
    pub gps_coordinates: Option<(f64, f64)>,
    pub suspicious_indicators: Vec<String>,
    pub tags: BTreeMap<String, String>,
}

impl From<&MetadataResult> for MetadataReportSection {
    fn from(m: &MetadataResult) -> Self {
        Self {
            tag_count: m.all_tags.len(),
            camera_info: m.camera_model.clone().or_else(|| m.camera_make.clone()),
            software: m.software.clone(),
            gps_coordinates: m.gps_coordinates,
            suspicious_indicators: m.suspicious_indicators.clone(),
            tags: m.all_tags.clone(),
        }
    }
}

impl From<&InspectionReport> for JsonReport {
    fn from(report: &InspectionReport) -> Self {
        Self {
            source: report.source.clone(),
            width: report.width,
            height: report.height,
            ela_analysis: ElaReportSection {
                quality: report.ela.quality,
                max_difference: report.ela.max_difference,
                scale: report.ela.scale,
                mean_difference: report.ela.mean_difference,
                std_deviation: report.ela.std_deviation,
                uniform: report.ela.is_uniform(),
            },
            metadata: MetadataReportSection::from(&report.metadata),
        }
    }
}

impl JsonReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// `key: value` lines in key order, or the no-metadata notice.
pub fn metadata_lines(metadata: &MetadataResult) -> Vec<String> {
    if metadata.is_empty() {
        return vec![NO_METADATA_NOTICE.to_string()];
    }
    metadata
        .all_tags
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect()
}

/// Console rendering of a finished inspection.
pub fn render_text(report: &InspectionReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Analyzing image: {} ({}x{})", report.source, report.width, report.height);
    let _ = writeln!(out);
    let _ = writeln!(out, "Error Level Analysis (quality {})", report.ela.quality);
    if report.ela.is_uniform() {
        let _ = writeln!(out, "  Recompression produced no difference.");
    } else {
        let _ = writeln!(out, "  Max difference: {}", report.ela.max_difference);
        let _ = writeln!(out, "  Scale factor: {:.2}", report.ela.scale);
        let _ = writeln!(out, "  Mean difference: {:.2}", report.ela.mean_difference);
        let _ = writeln!(out, "  Std deviation: {:.2}", report.ela.std_deviation);
    }
    let _ = writeln!(out, "  {}", ELA_HINT);
    let _ = writeln!(out);

    let _ = writeln!(out, "EXIF metadata");
    for line in metadata_lines(&report.metadata) {
        let _ = writeln!(out, "  {}", line);
    }
    if !report.metadata.is_empty() {
        for indicator in &report.metadata.suspicious_indicators {
            let _ = writeln!(out, "  ! {}", indicator);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", METADATA_HINT);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", DISCLAIMER);

    out
}
