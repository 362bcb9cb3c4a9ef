//! Threat feed assembly
//!
//! Merges validated reports, AI hotspot predictions, and geotagged uploads
//! into one display-ready collection. Anything without a placeable
//! coordinate is dropped; a marker that cannot be positioned is worse than
//! no marker.

use crate::models::{Submission, ThreatFeedItem, ThreatType};
use crate::services::gemini::HotspotPrediction;

pub struct ThreatFeedAssembler;

impl ThreatFeedAssembler {
    /// Order-irrelevant merge of the three sources, each tagged with its
    /// `kind` discriminator for icon selection downstream.
    pub fn assemble(
        reports: &[Submission],
        predictions: &[HotspotPrediction],
        uploads: &[Submission],
    ) -> Vec<ThreatFeedItem> {
        let mut feed = Vec::with_capacity(reports.len() + predictions.len() + uploads.len());

        for report in reports {
            feed.push(ThreatFeedItem::Report {
                id: report.id,
                lat: report.lat,
                lng: report.lng,
                title: report.title.clone(),
                description: report.description.clone(),
                threat_type: report.threat_type.unwrap_or(ThreatType::Other),
                severity: report.threat_type.unwrap_or(ThreatType::Other).severity(),
            });
        }

        for prediction in predictions {
            feed.push(ThreatFeedItem::Prediction {
                id: prediction.id.clone(),
                lat: prediction.lat,
                lng: prediction.lng,
                title: prediction.title.clone(),
                threat_type: prediction.threat_type.clone(),
                message: prediction.message.clone(),
            });
        }

        for upload in uploads {
            if upload.image_url.is_empty() {
                continue;
            }
            feed.push(ThreatFeedItem::Upload {
                id: upload.id,
                lat: upload.lat,
                lng: upload.lng,
                title: upload.title.clone(),
                image_url: upload.image_url.clone(),
            });
        }

        feed.retain(|item| {
            let (lat, lng) = item.coordinates();
            lat.is_finite() && lng.is_finite()
        });
        feed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubmissionStatus;
    use chrono::Utc;
    use uuid::Uuid;

    fn submission(lat: f64, lng: f64, image_url: &str) -> Submission {
        Submission {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: "d".to_string(),
            image_url: image_url.to_string(),
            submitted_by_uid: None,
            submitted_by: "Anonymous".to_string(),
            lat,
            lng,
            capture_time: None,
            created_at: Utc::now(),
            threat_type: Some(ThreatType::Plastic),
            status: SubmissionStatus::Validated,
            verified_by: vec![],
            upvotes: 3,
            downvotes: 0,
        }
    }

    fn prediction(lat: f64, lng: f64) -> HotspotPrediction {
        HotspotPrediction {
            id: "pred_1".to_string(),
            title: "AI Prediction: plastic".to_string(),
            lat,
            lng,
            threat_type: "predicted_plastic".to_string(),
            message: "Watch the river mouth".to_string(),
        }
    }

    #[test]
    fn merges_all_three_sources_with_kind_tags() {
        let reports = vec![submission(1.0, 2.0, "http://img/a.jpg")];
        let predictions = vec![prediction(3.0, 4.0)];
        let uploads = vec![submission(5.0, 6.0, "http://img/b.jpg")];

        let feed = ThreatFeedAssembler::assemble(&reports, &predictions, &uploads);
        assert_eq!(feed.len(), 3);

        let kinds: Vec<&str> = feed
            .iter()
            .map(|item| match item {
                ThreatFeedItem::Report { .. } => "report",
                ThreatFeedItem::Prediction { .. } => "prediction",
                ThreatFeedItem::Upload { .. } => "upload",
            })
            .collect();
        assert_eq!(kinds, vec!["report", "prediction", "upload"]);
    }

    #[test]
    fn unplaceable_items_are_dropped() {
        let predictions = vec![prediction(f64::NAN, 4.0), prediction(3.0, 4.0)];
        let feed = ThreatFeedAssembler::assemble(&[], &predictions, &[]);
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn imageless_uploads_are_dropped() {
        let uploads = vec![submission(5.0, 6.0, "")];
        let feed = ThreatFeedAssembler::assemble(&[], &[], &uploads);
        assert!(feed.is_empty());
    }
}
