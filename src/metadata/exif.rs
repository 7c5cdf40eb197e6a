use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufRead, BufReader, Cursor, Seek, SeekFrom},
    path::Path,
};

use exif::{Exif, Field, In, Tag, Value};
use log::{debug, warn};

use crate::{
    MetadataResult,
    error::{ForensicsError, Result},
};

pub const NO_EXIF_INDICATOR: &str = "No EXIF data found";

pub struct ExifExtractor;

impl ExifExtractor {
    pub fn extract<P: AsRef<Path>>(path: P) -> Result<MetadataResult> {
        let file = File::open(&path).map_err(|e| ForensicsError::io_with_path(e, path.as_ref()))?;
        let mut reader = BufReader::new(file);
        Self::extract_from_reader(&mut reader)
    }

    pub fn extract_from_bytes(bytes: &[u8]) -> Result<MetadataResult> {
        Self::extract_from_reader(&mut Cursor::new(bytes))
    }

    /// Parse tags from the start of `reader`, whatever its current position.
    ///
    /// Missing or malformed EXIF yields an empty result; only I/O failures
    /// are errors.
    pub fn extract_from_reader<R: BufRead + Seek>(reader: &mut R) -> Result<MetadataResult> {
        reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| ForensicsError::Parse(e.to_string()))?;

        let mut exif_reader = exif::Reader::new();
        exif_reader.continue_on_error(true);

        match exif_reader.read_from_container(reader) {
            Ok(exif_data) => Ok(Self::parse_exif(&exif_data)),
            Err(exif::Error::PartialResult(partial)) => {
                let (exif_data, errors) = partial.into_inner();
                warn!("EXIF parsed with {} recoverable error(s)", errors.len());
                Ok(Self::parse_exif(&exif_data))
            }
            Err(exif::Error::Io(e)) => Err(ForensicsError::Parse(e.to_string())),
            Err(e) => {
                warn!("no EXIF metadata: {}", e);
                Ok(MetadataResult::empty())
            }
        }
    }

    fn parse_exif(exif: &Exif) -> MetadataResult {
        let mut all_tags = BTreeMap::new();
        let mut suspicious_indicators = Vec::new();

        for field in exif.fields() {
            let tag_name = if field.ifd_num == In::THUMBNAIL {
                format!("Thumbnail {}", field.tag)
            } else {
                format!("{}", field.tag)
            };
            all_tags.insert(tag_name, field_text(field));
        }
        debug!("extracted {} EXIF tag(s)", all_tags.len());

        if all_tags.is_empty() {
            return MetadataResult::empty();
        }

        let camera_make = primary_value(exif, Tag::Make);
        let camera_model = primary_value(exif, Tag::Model);
        let software = primary_value(exif, Tag::Software);
        let date_time = primary_value(exif, Tag::DateTime);
        let gps_coordinates = Self::extract_gps(exif);

        if let Some(ref sw) = software {
            let sw_lower = sw.to_lowercase();
            if sw_lower.contains("photoshop") || sw_lower.contains("paint") || sw_lower.contains("gimp") {
                suspicious_indicators.push(format!("Edited with: {}", sw));
            }
        }

        let datetime_original = primary_value(exif, Tag::DateTimeOriginal);
        let datetime_digitized = primary_value(exif, Tag::DateTimeDigitized);

        if datetime_original.is_none() && date_time.is_some() {
            suspicious_indicators.push("Original datetime missing (may be stripped)".into());
        }

        if let (Some(orig), Some(digi)) = (&datetime_original, &datetime_digitized) {
            if orig != digi {
                suspicious_indicators.push("Inconsistent date time values".into());
            }
        }

        if camera_make.is_none() && camera_model.is_none() {
            suspicious_indicators.push("Camera make and model missing".into());
        }

        MetadataResult {
            camera_make,
            camera_model,
            software,
            date_time,
            gps_coordinates,
            all_tags,
            suspicious_indicators,
        }
    }

    fn extract_gps(exif: &Exif) -> Option<(f64, f64)> {
        let lat = exif.get_field(Tag::GPSLatitude, In::PRIMARY)?;
        let lat_ref = exif.get_field(Tag::GPSLatitudeRef, In::PRIMARY)?;
        let lon = exif.get_field(Tag::GPSLongitude, In::PRIMARY)?;
        let lon_ref = exif.get_field(Tag::GPSLongitudeRef, In::PRIMARY)?;

        let lat_val = Self::dms_to_degrees(&lat.value)?;
        let lon_val = Self::dms_to_degrees(&lon.value)?;

        let lat_sign = if lat_ref.display_value().to_string().contains('S') { -1.0 } else { 1.0 };
        let lon_sign = if lon_ref.display_value().to_string().contains('W') { -1.0 } else { 1.0 };

        Some((lat_val * lat_sign, lon_val * lon_sign))
    }

    fn dms_to_degrees(value: &Value) -> Option<f64> {
        match value {
            Value::Rational(parts) if parts.len() >= 3 => {
                Some(parts[0].to_f64() + parts[1].to_f64() / 60.0 + parts[2].to_f64() / 3600.0)
            }
            _ => None,
        }
    }
}

fn primary_value(exif: &Exif, tag: Tag) -> Option<String> {
    exif.get_field(tag, In::PRIMARY).map(field_text)
}

/// Tag content as text. ASCII values come through bare; `display_value`
/// would wrap them in quotes.
fn field_text(field: &Field) -> String {
    match &field.value {
        Value::Ascii(parts) => parts
            .iter()
            .map(|part| String::from_utf8_lossy(part).trim_end_matches('\0').to_string())
            .collect::<Vec<_>>()
            .join(", "),
        _ => field.display_value().to_string(),
    }
}
