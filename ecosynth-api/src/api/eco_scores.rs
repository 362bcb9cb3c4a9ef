//! Region eco-score overlay
//!
//! Serves the region boundaries as a GeoJSON FeatureCollection annotated
//! with an AI-derived health score plus the raw counts the score was based
//! on, ready for direct use as a choropleth layer.

use std::collections::BTreeMap;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;
use tracing::warn;

use crate::{ApiResult, AppState};

/// Score applied to a region when no AI score is available
const NEUTRAL_SCORE: u8 = 50;

/// GET /api/eco-scores
///
/// Aggregates validated reports and active projects per region, asks the
/// scoring model for 0-100 health scores, and emits one feature per loaded
/// region. Scoring failures degrade to a neutral 50 for every region rather
/// than failing the overlay.
pub async fn get_eco_scores(
    State(state): State<AppState>,
) -> ApiResult<Json<geojson::FeatureCollection>> {
    let validated = state.submissions.list_validated().await?;
    let projects = state.projects.list_active().await?;
    let stats = state.aggregator.aggregate(&validated, &projects);

    let scores: BTreeMap<String, u8> = match state.gemini.score_regions(&stats).await {
        Ok(scores) => scores,
        Err(e) => {
            warn!("Region scoring unavailable, falling back to neutral: {}", e);
            BTreeMap::new()
        }
    };

    let features = state
        .aggregator
        .regions()
        .iter()
        .map(|region| {
            let stat = stats.get(&region.name).cloned().unwrap_or_default();
            let score = scores.get(&region.name).copied().unwrap_or(NEUTRAL_SCORE);

            let mut properties = serde_json::Map::new();
            properties.insert("name".to_string(), json!(region.name));
            properties.insert("ecoScore".to_string(), json!(score));
            properties.insert("positiveActions".to_string(), json!(stat.projects));
            properties.insert("negativeReports".to_string(), json!(stat.negative_total()));

            geojson::Feature {
                bbox: None,
                geometry: Some(region.geometry().clone()),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    Ok(Json(geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/eco-scores", get(get_eco_scores))
}
