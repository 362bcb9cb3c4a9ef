//! Submission intake, listing, evidence admission, and vote casting

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::models::{Submission, SubmissionDraft, Verdict};
use crate::{ApiError, ApiResult, AppState};
use ecosynth_common::geo::Coordinate;

/// POST /api/submissions
///
/// Creates a submission in `pending_validation`. 400 with the list of
/// missing fields when the draft is incomplete.
pub async fn create_submission(
    State(state): State<AppState>,
    Json(draft): Json<SubmissionDraft>,
) -> ApiResult<(StatusCode, Json<Submission>)> {
    let submission = state.submissions.create(draft).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

/// GET /api/submissions: all submissions, newest first
pub async fn list_submissions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Submission>>> {
    Ok(Json(state.submissions.list_all().await?))
}

/// GET /api/submissions/pending: submissions awaiting peer review
pub async fn list_pending(State(state): State<AppState>) -> ApiResult<Json<Vec<Submission>>> {
    Ok(Json(state.submissions.list_pending().await?))
}

/// Request payload for vote casting
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    #[serde(rename = "voterId")]
    pub voter_id: String,
    pub verdict: Verdict,
}

/// POST /api/submissions/:id/votes
///
/// Applies one peer vote; the consensus engine decides whether the tally
/// finalizes the submission. 404 unknown id, 409 duplicate voter or already
/// finalized.
pub async fn cast_vote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(vote): Json<VoteRequest>,
) -> ApiResult<Json<Submission>> {
    if vote.voter_id.trim().is_empty() {
        return Err(ApiError::BadRequest("voterId is required".to_string()));
    }

    let updated = state
        .submissions
        .apply_vote(&state.consensus, id, vote.voter_id.trim(), vote.verdict)
        .await?;
    Ok(Json(updated))
}

/// Live position attached to an evidence check
#[derive(Debug, Deserialize)]
pub struct EvidenceQuery {
    pub lat: f64,
    pub lng: f64,
}

/// Outcome of a successful evidence check: the fields a client should put
/// on the submission draft it creates next
#[derive(Debug, Serialize)]
pub struct EvidenceResponse {
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "captureTime")]
    pub capture_time: DateTime<Utc>,
}

/// POST /api/submissions/evidence?lat=&lng=
///
/// Body: raw image bytes. Extracts the embedded geotag and capture time,
/// then checks them against the caller's live position and the recency
/// window. Nothing is persisted; rejection here is terminal for the attempt.
pub async fn check_evidence(
    State(state): State<AppState>,
    Query(query): Query<EvidenceQuery>,
    body: Bytes,
) -> ApiResult<Json<EvidenceResponse>> {
    let live = Coordinate::new(query.lat, query.lng)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let evidence = state.extractor.extract(&body)?;
    state.validator.check(live, &evidence, Utc::now())?;

    info!(
        "Evidence admitted at ({:.4}, {:.4})",
        evidence.latitude, evidence.longitude
    );

    Ok(Json(EvidenceResponse {
        lat: evidence.latitude,
        lng: evidence.longitude,
        capture_time: evidence.capture_time,
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/submissions",
            get(list_submissions).post(create_submission),
        )
        .route("/api/submissions/pending", get(list_pending))
        .route("/api/submissions/evidence", post(check_evidence))
        .route("/api/submissions/:id/votes", post(cast_vote))
}
