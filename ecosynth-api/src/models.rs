//! Domain types for the EcoSynth backend
//!
//! A submission is a user-reported environmental event moving through the
//! peer-validation lifecycle: created as `pending_validation`, finalized by
//! vote quorum to `validated` or `rejected`, both terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Environmental threat category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatType {
    Deforestation,
    Plastic,
    Coral,
    Other,
}

impl ThreatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatType::Deforestation => "deforestation",
            ThreatType::Plastic => "plastic",
            ThreatType::Coral => "coral",
            ThreatType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "deforestation" => Some(ThreatType::Deforestation),
            "plastic" => Some(ThreatType::Plastic),
            "coral" => Some(ThreatType::Coral),
            "other" => Some(ThreatType::Other),
            _ => None,
        }
    }

    /// Display severity for map markers, derived from category
    pub fn severity(&self) -> &'static str {
        match self {
            ThreatType::Deforestation => "High",
            ThreatType::Coral => "Critical",
            ThreatType::Plastic => "Medium",
            ThreatType::Other => "Low",
        }
    }
}

/// Submission lifecycle state
///
/// Transitions are monotonic: once `Validated` or `Rejected`, a submission
/// never changes state again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    PendingValidation,
    Validated,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::PendingValidation => "pending_validation",
            SubmissionStatus::Validated => "validated",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_validation" => Some(SubmissionStatus::PendingValidation),
            "validated" => Some(SubmissionStatus::Validated),
            "rejected" => Some(SubmissionStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SubmissionStatus::PendingValidation)
    }
}

/// Peer verdict on a pending submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Authentic,
    Inauthentic,
}

/// A user-reported environmental event
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "submittedByUid", skip_serializing_if = "Option::is_none")]
    pub submitted_by_uid: Option<String>,
    #[serde(rename = "submittedBy")]
    pub submitted_by: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "captureTime", skip_serializing_if = "Option::is_none")]
    pub capture_time: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub threat_type: Option<ThreatType>,
    pub status: SubmissionStatus,
    /// Voter identities; a voter appears at most once
    #[serde(rename = "verifiedBy")]
    pub verified_by: Vec<String>,
    pub upvotes: u32,
    pub downvotes: u32,
}

/// Incoming payload for `POST /api/submissions`
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(rename = "submittedBy")]
    pub submitted_by: Option<String>,
    #[serde(rename = "submittedByUid")]
    pub submitted_by_uid: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(rename = "captureTime")]
    pub capture_time: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub threat_type: Option<ThreatType>,
}

/// A positive-signal environmental project (counts toward a region's score)
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub lat: f64,
    pub lng: f64,
    pub status: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Incoming payload for `POST /api/projects`
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Per-region aggregate used for eco-scoring and heatmaps
///
/// Recomputed on demand from the current validated data; never persisted.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct RegionStat {
    /// Active environmental projects (positive signal)
    pub projects: u32,
    pub deforestation: u32,
    pub plastic: u32,
    pub coral: u32,
}

impl RegionStat {
    /// Count a validated threat report against this region.
    /// `Other`-typed reports carry no category and are not counted.
    pub fn record_threat(&mut self, threat_type: ThreatType) {
        match threat_type {
            ThreatType::Deforestation => self.deforestation += 1,
            ThreatType::Plastic => self.plastic += 1,
            ThreatType::Coral => self.coral += 1,
            ThreatType::Other => {}
        }
    }

    pub fn record_project(&mut self) {
        self.projects += 1;
    }

    pub fn negative_total(&self) -> u32 {
        self.deforestation + self.plastic + self.coral
    }
}

/// A display-ready item on the threat map
///
/// The `kind` tag selects icon/style downstream and nothing else.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ThreatFeedItem {
    Report {
        id: Uuid,
        lat: f64,
        lng: f64,
        title: String,
        description: String,
        #[serde(rename = "type")]
        threat_type: ThreatType,
        severity: &'static str,
    },
    Prediction {
        id: String,
        lat: f64,
        lng: f64,
        title: String,
        #[serde(rename = "type")]
        threat_type: String,
        message: String,
    },
    Upload {
        id: Uuid,
        lat: f64,
        lng: f64,
        title: String,
        #[serde(rename = "imageUrl")]
        image_url: String,
    },
}

impl ThreatFeedItem {
    pub fn coordinates(&self) -> (f64, f64) {
        match self {
            ThreatFeedItem::Report { lat, lng, .. }
            | ThreatFeedItem::Prediction { lat, lng, .. }
            | ThreatFeedItem::Upload { lat, lng, .. } => (*lat, *lng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_db_strings() {
        for status in [
            SubmissionStatus::PendingValidation,
            SubmissionStatus::Validated,
            SubmissionStatus::Rejected,
        ] {
            assert_eq!(SubmissionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SubmissionStatus::parse("bogus"), None);
    }

    #[test]
    fn terminal_states() {
        assert!(!SubmissionStatus::PendingValidation.is_terminal());
        assert!(SubmissionStatus::Validated.is_terminal());
        assert!(SubmissionStatus::Rejected.is_terminal());
    }

    #[test]
    fn feed_item_kind_tag() {
        let item = ThreatFeedItem::Upload {
            id: Uuid::new_v4(),
            lat: 1.0,
            lng: 2.0,
            title: "t".to_string(),
            image_url: "http://example.com/x.jpg".to_string(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["kind"], "upload");
        assert_eq!(json["imageUrl"], "http://example.com/x.jpg");
    }

    #[test]
    fn other_threats_carry_no_category_count() {
        let mut stat = RegionStat::default();
        stat.record_threat(ThreatType::Other);
        assert_eq!(stat.negative_total(), 0);
        stat.record_threat(ThreatType::Deforestation);
        stat.record_threat(ThreatType::Plastic);
        assert_eq!(stat.negative_total(), 2);
    }
}
