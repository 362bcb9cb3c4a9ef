//! Photographic evidence extractors

pub mod exif;

pub use self::exif::{ExifGeoExtractor, PhotoEvidence};

use thiserror::Error;

/// Evidence extraction errors
///
/// `MetadataMissing` is a trust signal, not merely absent data: images
/// re-encoded by messaging apps lose their tags, and such images cannot
/// serve as location evidence.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no geo/time metadata present: {0}")]
    MetadataMissing(String),

    #[error("metadata present but unusable: {0}")]
    MetadataUnparseable(String),
}
