//! AI hotspot prediction endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::models::ThreatType;
use crate::{ApiError, ApiResult, AppState};

/// Wire shape of a hotspot prediction (one-element array per the original
/// dashboard contract)
#[derive(Debug, Serialize)]
pub struct PredictionView {
    pub id: String,
    pub title: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "type")]
    pub threat_type: String,
    pub message: String,
}

/// GET /api/predictions/:threat_type
///
/// Derives one predicted hotspot from the most recent validated report of
/// the requested category. 404 when no validated report of that type exists.
pub async fn get_prediction(
    State(state): State<AppState>,
    Path(threat_type): Path<String>,
) -> ApiResult<Json<Vec<PredictionView>>> {
    let threat_type = match ThreatType::parse(&threat_type) {
        Some(t @ (ThreatType::Deforestation | ThreatType::Plastic | ThreatType::Coral)) => t,
        _ => {
            return Err(ApiError::BadRequest(format!(
                "unknown prediction type '{}'; expected deforestation, plastic, or coral",
                threat_type
            )))
        }
    };

    let latest = state
        .submissions
        .latest_validated_of_type(threat_type)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "No validated {} reports found to base a prediction on",
                threat_type.as_str()
            ))
        })?;

    let prediction = state.gemini.predict_hotspot(threat_type, &latest).await?;

    Ok(Json(vec![PredictionView {
        id: prediction.id,
        title: prediction.title,
        lat: prediction.lat,
        lng: prediction.lng,
        threat_type: prediction.threat_type,
        message: prediction.message,
    }]))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/predictions/:threat_type", get(get_prediction))
}
