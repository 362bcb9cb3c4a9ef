//! EXIF geotag extractor
//!
//! Pulls the camera-embedded GPS position and original capture timestamp out
//! of uploaded image bytes. Coordinates arrive as degree/minute/second
//! triples of rational numbers; conversion to decimal degrees is
//! `deg + min/60 + sec/3600` with each component `numerator/denominator`.
//! A zero or missing denominator makes that component zero rather than
//! faulting, but the final decimal value must come out finite and in range.

use super::ExtractError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use exif::{In, Reader, Tag, Value};
use std::io::Cursor;

/// Positional and temporal evidence extracted from a photo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoEvidence {
    /// Decimal degrees, signed by hemisphere
    pub latitude: f64,
    /// Decimal degrees, signed by hemisphere
    pub longitude: f64,
    /// Embedded original-capture instant (camera local time, taken as UTC)
    pub capture_time: DateTime<Utc>,
}

/// Extracts geotag evidence from raw image bytes. Pure parse, no side
/// effects.
#[derive(Debug, Default)]
pub struct ExifGeoExtractor;

impl ExifGeoExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract `{latitude, longitude, capture_time}` from image bytes
    pub fn extract(&self, bytes: &[u8]) -> Result<PhotoEvidence, ExtractError> {
        let exif = Reader::new()
            .read_from_container(&mut Cursor::new(bytes))
            .map_err(|e| {
                ExtractError::MetadataMissing(format!(
                    "no EXIF data found ({}); use an original, unmodified camera photo",
                    e
                ))
            })?;
        parse_evidence(&exif)
    }
}

fn parse_evidence(exif: &exif::Exif) -> Result<PhotoEvidence, ExtractError> {
    let lat_dms = rational_triple(exif, Tag::GPSLatitude)?;
    let lng_dms = rational_triple(exif, Tag::GPSLongitude)?;
    let capture_time = capture_timestamp(exif)?;

    let latitude = dms_to_decimal(&lat_dms) * hemisphere_sign(exif, Tag::GPSLatitudeRef, "S");
    let longitude = dms_to_decimal(&lng_dms) * hemisphere_sign(exif, Tag::GPSLongitudeRef, "W");

    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(ExtractError::MetadataUnparseable(format!(
            "derived latitude {} is not a valid coordinate",
            latitude
        )));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(ExtractError::MetadataUnparseable(format!(
            "derived longitude {} is not a valid coordinate",
            longitude
        )));
    }

    Ok(PhotoEvidence {
        latitude,
        longitude,
        capture_time,
    })
}

/// Degree/minute/second rationals for a GPS tag
fn rational_triple(exif: &exif::Exif, tag: Tag) -> Result<Vec<exif::Rational>, ExtractError> {
    let field = exif.get_field(tag, In::PRIMARY).ok_or_else(|| {
        ExtractError::MetadataMissing(format!("image is missing the {} tag", tag))
    })?;
    match &field.value {
        Value::Rational(rationals) if !rationals.is_empty() => Ok(rationals.clone()),
        _ => Err(ExtractError::MetadataUnparseable(format!(
            "{} tag is not a rational triple",
            tag
        ))),
    }
}

/// `deg + min/60 + sec/3600`; zero-denominator components collapse to zero
fn dms_to_decimal(dms: &[exif::Rational]) -> f64 {
    let component = |index: usize| -> f64 {
        match dms.get(index) {
            Some(r) if r.denom != 0 => r.num as f64 / r.denom as f64,
            _ => 0.0,
        }
    };
    component(0) + component(1) / 60.0 + component(2) / 3600.0
}

/// -1.0 when the hemisphere ref matches `negative` (S or W), else 1.0
fn hemisphere_sign(exif: &exif::Exif, tag: Tag, negative: &str) -> f64 {
    let reference = exif
        .get_field(tag, In::PRIMARY)
        .map(|f| f.display_value().to_string());
    match reference {
        Some(r) if r.trim_matches('"').eq_ignore_ascii_case(negative) => -1.0,
        _ => 1.0,
    }
}

/// Parse the DateTimeOriginal tag ("YYYY:MM:DD HH:MM:SS")
fn capture_timestamp(exif: &exif::Exif) -> Result<DateTime<Utc>, ExtractError> {
    let field = exif
        .get_field(Tag::DateTimeOriginal, In::PRIMARY)
        .ok_or_else(|| {
            ExtractError::MetadataMissing("image is missing the DateTimeOriginal tag".to_string())
        })?;

    let ascii = match &field.value {
        Value::Ascii(values) if !values.is_empty() => &values[0],
        _ => {
            return Err(ExtractError::MetadataUnparseable(
                "DateTimeOriginal tag is not an ASCII timestamp".to_string(),
            ))
        }
    };

    let parsed = exif::DateTime::from_ascii(ascii).map_err(|e| {
        ExtractError::MetadataUnparseable(format!("cannot parse DateTimeOriginal: {}", e))
    })?;

    let date = NaiveDate::from_ymd_opt(
        parsed.year as i32,
        parsed.month as u32,
        parsed.day as u32,
    )
    .and_then(|d| {
        d.and_hms_opt(
            parsed.hour as u32,
            parsed.minute as u32,
            parsed.second as u32,
        )
    })
    .ok_or_else(|| {
        ExtractError::MetadataUnparseable(format!(
            "DateTimeOriginal encodes an impossible date: {}",
            parsed
        ))
    })?;

    Ok(Utc.from_utc_datetime(&date))
}
