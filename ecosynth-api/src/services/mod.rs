//! Domain services: consensus, aggregation, feed assembly, and clients for
//! the third-party AI and weather APIs.

pub mod consensus;
pub mod gemini;
pub mod regions;
pub mod threat_feed;
pub mod weather;

pub use consensus::ConsensusEngine;
pub use gemini::{GeminiClient, HotspotPrediction};
pub use regions::RegionAggregator;
pub use threat_feed::ThreatFeedAssembler;
pub use weather::WeatherClient;

use thiserror::Error;

/// Third-party service call failures
///
/// Every variant surfaces to the client as `UPSTREAM_UNAVAILABLE`; the
/// detail stays in logs. Malformed upstream JSON is a `Parse` error here,
/// never a raw deserialization failure propagated to the caller.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{0} API key is not configured")]
    NotConfigured(&'static str),

    #[error("network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("unusable upstream response: {0}")]
    Parse(String),
}

impl From<UpstreamError> for crate::error::ApiError {
    fn from(err: UpstreamError) -> Self {
        crate::error::ApiError::Upstream(err.to_string())
    }
}
