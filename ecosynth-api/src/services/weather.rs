//! OpenWeather proxy client
//!
//! Thin pass-through: the frontend asks us for current conditions at a
//! coordinate and we relay OpenWeather's JSON, keeping the API key
//! server-side.

use std::time::Duration;

use super::UpstreamError;

const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

pub struct WeatherClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherClient {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: OPENWEATHER_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Current weather at a coordinate, metric units, relayed verbatim
    pub async fn current(&self, lat: f64, lon: f64) -> Result<serde_json::Value, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("OpenWeather"))?;

        let url = format!(
            "{}/weather?lat={}&lon={}&units=metric&appid={}",
            self.base_url, lat, lon, api_key
        );

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Api(status.as_u16(), detail));
        }

        response
            .json()
            .await
            .map_err(|e| UpstreamError::Parse(e.to_string()))
    }
}
