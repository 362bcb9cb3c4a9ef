//! Error types for ecosynth-api
//!
//! Domain errors (extraction, admissibility, vote application) are converted
//! into one `ApiError` at the handler boundary so every failure reaches the
//! client as a distinct machine-readable code with a human-readable message.
//! Internal diagnostic detail stays in tracing output.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::submissions::StoreError;
use crate::extractors::ExtractError;
use crate::validators::AdmissibilityError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Required submission fields missing (400)
    #[error("Missing required fields: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Image carries no usable geo/time evidence (422)
    #[error("No usable photo metadata: {0}")]
    MetadataMissing(String),

    /// Metadata present but a decimal coordinate cannot be derived (422)
    #[error("Unparseable photo metadata: {0}")]
    MetadataUnparseable(String),

    /// Photo location too far from the submitter's live location (422)
    #[error("Location mismatch: {0}")]
    LocationMismatch(String),

    /// Photo capture time outside the recency window (422)
    #[error("Stale capture: {0}")]
    StaleCapture(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Voter already voted on this submission (409)
    #[error("Duplicate vote: {0}")]
    DuplicateVote(String),

    /// Submission already reached a terminal state (409)
    #[error("Already finalized: {0}")]
    AlreadyFinalized(String),

    /// Third-party AI/weather call failed (502)
    #[error("Upstream service unavailable: {0}")]
    Upstream(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// ecosynth-common error
    #[error("{0}")]
    Common(#[from] ecosynth_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Validation(ref fields) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!(
                    "All fields, including image and location, are required. Missing: {}",
                    fields.join(", ")
                ),
            ),
            ApiError::MetadataMissing(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "METADATA_MISSING", msg)
            }
            ApiError::MetadataUnparseable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "METADATA_UNPARSEABLE",
                msg,
            ),
            ApiError::LocationMismatch(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "LOCATION_MISMATCH", msg)
            }
            ApiError::StaleCapture(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "STALE_CAPTURE", msg)
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::DuplicateVote(msg) => (StatusCode::CONFLICT, "DUPLICATE_VOTE", msg),
            ApiError::AlreadyFinalized(msg) => {
                (StatusCode::CONFLICT, "ALREADY_FINALIZED", msg)
            }
            ApiError::Upstream(msg) => {
                tracing::warn!("Upstream failure: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_UNAVAILABLE",
                    "A third-party service is unavailable, please retry later".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
            ApiError::Io(ref err) => {
                tracing::error!("IO error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "IO_ERROR",
                    "Internal server error".to_string(),
                )
            }
            ApiError::Database(ref err) => {
                tracing::error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Internal server error".to_string(),
                )
            }
            ApiError::Common(ref err) => {
                tracing::error!("Common error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::MetadataMissing(msg) => ApiError::MetadataMissing(msg),
            ExtractError::MetadataUnparseable(msg) => ApiError::MetadataUnparseable(msg),
        }
    }
}

impl From<AdmissibilityError> for ApiError {
    fn from(err: AdmissibilityError) -> Self {
        match err {
            AdmissibilityError::LocationMismatch { .. } => {
                ApiError::LocationMismatch(err.to_string())
            }
            AdmissibilityError::StaleCapture { .. } => ApiError::StaleCapture(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => {
                ApiError::NotFound(format!("submission {} does not exist", id))
            }
            StoreError::DuplicateVote { voter_id, .. } => ApiError::DuplicateVote(format!(
                "voter {} has already voted on this submission",
                voter_id
            )),
            StoreError::AlreadyFinalized { status, .. } => ApiError::AlreadyFinalized(format!(
                "submission is already {}",
                status.as_str()
            )),
            StoreError::MissingFields(fields) => ApiError::Validation(fields),
            StoreError::InvalidCoordinate(msg) => ApiError::BadRequest(msg),
            StoreError::Database(err) => ApiError::Database(err),
            StoreError::Corrupt(msg) => ApiError::Internal(msg),
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
