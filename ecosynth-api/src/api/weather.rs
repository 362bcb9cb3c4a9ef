//! Weather proxy endpoint

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// GET /api/weather?lat=&lon=
///
/// Relays current conditions from the upstream weather provider, keeping
/// the provider key server-side. The upstream payload is passed through
/// unchanged.
pub async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let (Some(lat), Some(lon)) = (query.lat, query.lon) else {
        return Err(ApiError::BadRequest(
            "Latitude and Longitude are required.".to_string(),
        ));
    };

    let conditions = state.weather.current(lat, lon).await?;
    Ok(Json(conditions))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/weather", get(get_weather))
}
