//! Gemini generative-AI client
//!
//! One text-completion call per use case: hotspot prediction from the latest
//! validated report, region eco-scoring from aggregate counts, and the
//! long-form analysis report. The model is asked for bare JSON; it
//! habitually wraps it in markdown code fences anyway, so responses are
//! de-fenced before parsing, and any parse failure is an upstream error
//! rather than a raw deserialization failure leaking to the caller.

use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;

use super::UpstreamError;
use crate::models::{RegionStat, Submission, ThreatType};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GEMINI_MODEL: &str = "gemini-1.5-flash-latest";

/// An AI-predicted threat hotspot for map display
#[derive(Debug, Clone)]
pub struct HotspotPrediction {
    pub id: String,
    pub title: String,
    pub lat: f64,
    pub lng: f64,
    /// e.g. `predicted_deforestation`, used for marker styling
    pub threat_type: String,
    /// Concise public warning message
    pub message: String,
}

/// Gemini generateContent response shape (the parts we read)
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

/// Model output for a hotspot prediction request
#[derive(Debug, Deserialize)]
struct PredictionJson {
    predicted_lat: f64,
    predicted_lng: f64,
    warning_message: String,
}

pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Single text-completion round trip
    async fn generate(&self, prompt: &str) -> Result<String, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("Gemini"))?;

        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, GEMINI_MODEL, api_key
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Api(status.as_u16(), detail));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Parse(e.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| UpstreamError::Parse("empty completion".to_string()))
    }

    /// Predict the next likely hotspot near the most recent validated report
    pub async fn predict_hotspot(
        &self,
        threat_type: ThreatType,
        latest: &Submission,
    ) -> Result<HotspotPrediction, UpstreamError> {
        let prompt = prediction_prompt(threat_type, latest.lat, latest.lng);
        let text = self.generate(&prompt).await?;

        let parsed: PredictionJson = serde_json::from_str(strip_code_fences(&text))
            .map_err(|e| UpstreamError::Parse(format!("prediction JSON: {}", e)))?;

        if !parsed.predicted_lat.is_finite() || !parsed.predicted_lng.is_finite() {
            return Err(UpstreamError::Parse(
                "prediction contains non-finite coordinates".to_string(),
            ));
        }

        Ok(HotspotPrediction {
            id: format!("pred_{}", chrono::Utc::now().timestamp_millis()),
            title: format!("AI Prediction: {}", threat_type.as_str()),
            lat: parsed.predicted_lat,
            lng: parsed.predicted_lng,
            threat_type: format!("predicted_{}", threat_type.as_str()),
            message: parsed.warning_message,
        })
    }

    /// Score every region 0-100 from its aggregate counts.
    ///
    /// Returns whatever subset of regions the model scored; the caller fills
    /// gaps with the neutral midpoint.
    pub async fn score_regions(
        &self,
        stats: &BTreeMap<String, RegionStat>,
    ) -> Result<BTreeMap<String, u8>, UpstreamError> {
        let data = serde_json::to_string_pretty(stats)
            .map_err(|e| UpstreamError::Parse(e.to_string()))?;
        let text = self.generate(&eco_score_prompt(&data)).await?;

        let raw: BTreeMap<String, serde_json::Value> =
            serde_json::from_str(strip_code_fences(&text))
                .map_err(|e| UpstreamError::Parse(format!("eco-score JSON: {}", e)))?;

        let scores = raw
            .into_iter()
            .filter_map(|(name, value)| {
                value
                    .as_i64()
                    .map(|score| (name, score.clamp(0, 100) as u8))
            })
            .collect();
        Ok(scores)
    }

    /// Long-form HTML analysis report
    pub async fn analysis_report(&self) -> Result<String, UpstreamError> {
        self.generate(ANALYSIS_PROMPT).await
    }
}

/// Strip markdown code fences the model wraps JSON in
fn strip_code_fences(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

fn prediction_prompt(threat_type: ThreatType, lat: f64, lng: f64) -> String {
    let context = match threat_type {
        ThreatType::Deforestation => {
            "Consider proximity to existing forests, national parks, and access roads."
        }
        ThreatType::Plastic => "Consider proximity to rivers, coastlines, and urban centers.",
        ThreatType::Coral => {
            "Consider proximity to sensitive marine ecosystems and industrial coastlines."
        }
        ThreatType::Other => "Consider nearby population centers and land use.",
    };

    format!(
        "You are an expert geospatial and environmental analyst. Predict the next \
         likely hotspot for a specific environmental problem based on the location \
         of the most recent validated event.\n\n\
         Problem type: {}\n\
         Location (latitude, longitude): {}, {}\n\
         Context: {}\n\n\
         Predict the single most likely nearby location where this problem could \
         occur next, and write a concise, actionable warning message (max 25 words) \
         for a public dashboard.\n\n\
         Respond with only a valid JSON object, no other text or markdown:\n\
         {{\"predicted_lat\": <number>, \"predicted_lng\": <number>, \
         \"warning_message\": \"<message>\"}}",
        threat_type.as_str(),
        lat,
        lng,
        context
    )
}

fn eco_score_prompt(data: &str) -> String {
    format!(
        "You are an expert environmental data scientist. Calculate an Eco-Score for \
         each listed region on a scale of 0 (critically poor) to 100 (excellent).\n\n\
         The data represents positive and negative environmental activity per region:\n\
         - \"projects\": active environmental projects (positive factor)\n\
         - \"deforestation\": validated deforestation reports (strong negative factor)\n\
         - \"plastic\": plastic pollution reports (negative factor)\n\
         - \"coral\": coral bleaching reports (negative factor)\n\n\
         Regions with many projects and few reports score high; regions with many \
         reports, especially deforestation, score low. Score every region in the data.\n\n\
         DATA:\n{}\n\n\
         Respond with only a valid JSON object mapping each region name to its \
         integer score, no other text or markdown. \
         Example: {{\"Maharashtra\": 75, \"Kerala\": 82}}",
        data
    )
}

const ANALYSIS_PROMPT: &str =
    "You are an expert Environmental Data Analyst. Generate a comprehensive \
     analytical report on the current state of the global environment, based on \
     the most recent public reporting from the United Nations Environment \
     Programme, Global Forest Watch, and the Ocean Health Index. Connect findings \
     across sources rather than listing facts, and quantify wherever possible.\n\n\
     Output a single block of clean, well-structured HTML: an <h1> titled \
     \"Global Environmental Synthesis Report\", an <h2> per source, <h3> \
     sub-topics, <p> analysis text, <ul>/<li> for statistics, and <strong> for \
     key data points.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_stripping_handles_plain_and_fenced() {
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn prediction_json_parses_after_defencing() {
        let text = "```json\n{\"predicted_lat\": 28.7, \"predicted_lng\": 77.1, \"warning_message\": \"Logging risk near reserve\"}\n```";
        let parsed: PredictionJson = serde_json::from_str(strip_code_fences(text)).unwrap();
        assert!((parsed.predicted_lat - 28.7).abs() < 1e-9);
        assert_eq!(parsed.warning_message, "Logging risk near reserve");
    }

    #[test]
    fn prediction_prompt_names_the_threat_and_location() {
        let prompt = prediction_prompt(ThreatType::Plastic, 20.76, 88.03);
        assert!(prompt.contains("plastic"));
        assert!(prompt.contains("20.76"));
        assert!(prompt.contains("rivers"));
    }

    #[test]
    fn scores_clamp_and_skip_non_integers() {
        let raw = r#"{"Kerala": 82, "Bihar": 145, "Assam": -3, "Goa": "high"}"#;
        let parsed: BTreeMap<String, serde_json::Value> = serde_json::from_str(raw).unwrap();
        let scores: BTreeMap<String, u8> = parsed
            .into_iter()
            .filter_map(|(name, value)| {
                value
                    .as_i64()
                    .map(|score| (name, score.clamp(0, 100) as u8))
            })
            .collect();
        assert_eq!(scores["Kerala"], 82);
        assert_eq!(scores["Bihar"], 100);
        assert_eq!(scores["Assam"], 0);
        assert!(!scores.contains_key("Goa"));
    }
}
