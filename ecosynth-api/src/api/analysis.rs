//! Generated environmental analysis report

use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;

use crate::{ApiResult, AppState};

/// GET /api/analysis
///
/// Returns an AI-written HTML situation report for embedding in the
/// dashboard.
pub async fn get_analysis(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let report = state.gemini.analysis_report().await?;
    Ok(Json(json!({ "analysis": report })))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/analysis", get(get_analysis))
}
