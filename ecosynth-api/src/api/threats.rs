//! Validated threat views: map markers, eco-uploads, and the merged feed

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::models::{Submission, ThreatFeedItem, ThreatType};
use crate::services::gemini::HotspotPrediction;
use crate::services::ThreatFeedAssembler;
use crate::{ApiResult, AppState};

/// A validated submission normalized for the threat map
#[derive(Debug, Serialize)]
pub struct ThreatView {
    pub id: Uuid,
    pub lat: f64,
    pub lng: f64,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub threat_type: ThreatType,
    pub severity: &'static str,
}

impl From<&Submission> for ThreatView {
    fn from(submission: &Submission) -> Self {
        let threat_type = submission.threat_type.unwrap_or(ThreatType::Other);
        Self {
            id: submission.id,
            lat: submission.lat,
            lng: submission.lng,
            title: submission.title.clone(),
            description: submission.description.clone(),
            threat_type,
            severity: threat_type.severity(),
        }
    }
}

/// GET /api/threats: validated submissions as map markers
pub async fn get_threats(State(state): State<AppState>) -> ApiResult<Json<Vec<ThreatView>>> {
    let validated = state.submissions.list_validated().await?;
    Ok(Json(validated.iter().map(ThreatView::from).collect()))
}

/// A validated, geotagged upload for map display
#[derive(Debug, Serialize)]
pub struct EcoUploadView {
    pub id: Uuid,
    pub title: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// GET /api/eco-uploads: validated submissions that carry an image
pub async fn get_eco_uploads(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<EcoUploadView>>> {
    let validated = state.submissions.list_validated().await?;
    let uploads = validated
        .into_iter()
        .filter(|s| !s.image_url.is_empty())
        .map(|s| EcoUploadView {
            id: s.id,
            title: s.title,
            lat: s.lat,
            lng: s.lng,
            image_url: s.image_url,
            kind: "eco_upload",
        })
        .collect();
    Ok(Json(uploads))
}

/// GET /api/threat-feed
///
/// The merged map feed: validated reports, one AI hotspot prediction per
/// threat category (where a validated report exists to base it on), and
/// geotagged uploads. Prediction failures degrade the feed rather than
/// failing it.
pub async fn get_threat_feed(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ThreatFeedItem>>> {
    let validated = state.submissions.list_validated().await?;

    let (deforestation, plastic, coral) = tokio::join!(
        predict_latest(&state, ThreatType::Deforestation),
        predict_latest(&state, ThreatType::Plastic),
        predict_latest(&state, ThreatType::Coral),
    );
    let predictions: Vec<HotspotPrediction> = [deforestation, plastic, coral]
        .into_iter()
        .flatten()
        .collect();

    let feed = ThreatFeedAssembler::assemble(&validated, &predictions, &validated);
    Ok(Json(feed))
}

/// Predict a hotspot from the latest validated report of a type, if any;
/// upstream failures are logged and skipped
async fn predict_latest(state: &AppState, threat_type: ThreatType) -> Option<HotspotPrediction> {
    let latest = match state.submissions.latest_validated_of_type(threat_type).await {
        Ok(latest) => latest?,
        Err(e) => {
            warn!("Cannot load latest {} report: {}", threat_type.as_str(), e);
            return None;
        }
    };
    match state.gemini.predict_hotspot(threat_type, &latest).await {
        Ok(prediction) => Some(prediction),
        Err(e) => {
            warn!(
                "Hotspot prediction for {} unavailable: {}",
                threat_type.as_str(),
                e
            );
            None
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/threats", get(get_threats))
        .route("/api/eco-uploads", get(get_eco_uploads))
        .route("/api/threat-feed", get(get_threat_feed))
}
