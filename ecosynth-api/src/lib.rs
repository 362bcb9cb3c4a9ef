//! ecosynth-api library interface
//!
//! The EcoSynth backend: geotag-verified submission intake, community vote
//! consensus, regional aggregation, and the AI/weather proxy endpoints.
//! Exposed as a library so integration tests can drive the router directly.

pub mod api;
pub mod db;
pub mod error;
pub mod extractors;
pub mod models;
pub mod services;
pub mod validators;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::projects::ProjectStore;
use crate::db::submissions::SubmissionStore;
use crate::extractors::ExifGeoExtractor;
use crate::services::{ConsensusEngine, GeminiClient, RegionAggregator, WeatherClient};
use crate::validators::ProximityValidator;
use ecosynth_common::config::Config;
use ecosynth_common::geo::RegionSet;

/// Application state shared across handlers
///
/// Constructed once at startup and injected into every handler; there are no
/// ambient module-level clients.
#[derive(Clone)]
pub struct AppState {
    pub submissions: SubmissionStore,
    pub projects: ProjectStore,
    pub consensus: ConsensusEngine,
    pub extractor: Arc<ExifGeoExtractor>,
    pub validator: Arc<ProximityValidator>,
    pub aggregator: Arc<RegionAggregator>,
    pub gemini: Arc<GeminiClient>,
    pub weather: Arc<WeatherClient>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: &Config, regions: Arc<RegionSet>) -> anyhow::Result<Self> {
        let timeout = std::time::Duration::from_secs(config.upstream.timeout_secs);

        Ok(Self {
            submissions: SubmissionStore::new(db.clone()),
            projects: ProjectStore::new(db),
            consensus: ConsensusEngine::new(config.consensus.quorum),
            extractor: Arc::new(ExifGeoExtractor::new()),
            validator: Arc::new(ProximityValidator::new(config.proximity.clone())),
            aggregator: Arc::new(RegionAggregator::new(regions)),
            gemini: Arc::new(GeminiClient::new(
                config.upstream.gemini_api_key.clone(),
                timeout,
            )?),
            weather: Arc::new(WeatherClient::new(
                config.upstream.openweather_api_key.clone(),
                timeout,
            )?),
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health::routes())
        .merge(api::submissions::routes())
        .merge(api::projects::routes())
        .merge(api::threats::routes())
        .merge(api::predictions::routes())
        .merge(api::eco_scores::routes())
        .merge(api::weather::routes())
        .merge(api::analysis::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
