//! Region aggregation
//!
//! Buckets validated events into administrative regions by point-in-polygon
//! membership and produces per-region counts for scoring and heatmaps. A
//! linear scan over the loaded boundaries is deliberate: the reference
//! dataset is tens of regions, not thousands.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::{Project, RegionStat, Submission};
use ecosynth_common::geo::{Coordinate, RegionSet};

pub struct RegionAggregator {
    regions: Arc<RegionSet>,
}

impl RegionAggregator {
    pub fn new(regions: Arc<RegionSet>) -> Self {
        Self { regions }
    }

    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }

    /// Region containing a point, or `None` when the point falls outside
    /// every boundary (including coordinates outside the covered country).
    /// Out-of-range coordinates locate nowhere rather than erroring.
    pub fn locate(&self, lat: f64, lng: f64) -> Option<&str> {
        let coord = Coordinate::new(lat, lng).ok()?;
        self.regions.locate(coord)
    }

    /// Pure reduction of current validated data to per-region counts.
    ///
    /// Every known region appears in the result (zeroed when quiet) so
    /// downstream scoring covers the whole map. Unlocatable items are
    /// silently excluded; only validated submissions are counted.
    pub fn aggregate(
        &self,
        submissions: &[Submission],
        projects: &[Project],
    ) -> BTreeMap<String, RegionStat> {
        let mut stats: BTreeMap<String, RegionStat> = self
            .regions
            .iter()
            .map(|region| (region.name.clone(), RegionStat::default()))
            .collect();

        for submission in submissions {
            if !matches!(
                submission.status,
                crate::models::SubmissionStatus::Validated
            ) {
                continue;
            }
            let Some(threat_type) = submission.threat_type else {
                continue;
            };
            if let Some(region) = self.locate(submission.lat, submission.lng) {
                if let Some(stat) = stats.get_mut(region) {
                    stat.record_threat(threat_type);
                }
            }
        }

        for project in projects {
            if let Some(region) = self.locate(project.lat, project.lng) {
                if let Some(stat) = stats.get_mut(region) {
                    stat.record_project();
                }
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SubmissionStatus, ThreatType};
    use chrono::Utc;
    use uuid::Uuid;

    const TWO_SQUARES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"name": "West"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"name": "East"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[20.0, 0.0], [30.0, 0.0], [30.0, 10.0], [20.0, 10.0], [20.0, 0.0]]]
                }
            }
        ]
    }"#;

    fn aggregator() -> RegionAggregator {
        RegionAggregator::new(Arc::new(RegionSet::from_geojson_str(TWO_SQUARES).unwrap()))
    }

    fn validated(lat: f64, lng: f64, threat_type: Option<ThreatType>) -> Submission {
        Submission {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: "d".to_string(),
            image_url: "u".to_string(),
            submitted_by_uid: None,
            submitted_by: "Anonymous".to_string(),
            lat,
            lng,
            capture_time: None,
            created_at: Utc::now(),
            threat_type,
            status: SubmissionStatus::Validated,
            verified_by: vec![],
            upvotes: 3,
            downvotes: 0,
        }
    }

    fn project(lat: f64, lng: f64) -> Project {
        Project {
            id: Uuid::new_v4(),
            title: "p".to_string(),
            description: "d".to_string(),
            lat,
            lng,
            status: "active".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn inside_point_increments_exactly_one_region() {
        let agg = aggregator();
        let subs = vec![validated(5.0, 5.0, Some(ThreatType::Deforestation))];
        let stats = agg.aggregate(&subs, &[]);
        assert_eq!(stats["West"].deforestation, 1);
        assert_eq!(stats["West"].negative_total(), 1);
        assert_eq!(stats["East"], RegionStat::default());
    }

    #[test]
    fn outside_point_increments_nothing() {
        let agg = aggregator();
        // Between the two squares
        let subs = vec![validated(5.0, 15.0, Some(ThreatType::Plastic))];
        let stats = agg.aggregate(&subs, &[]);
        assert!(stats.values().all(|s| s.negative_total() == 0));
    }

    #[test]
    fn pending_and_untyped_submissions_are_excluded() {
        let agg = aggregator();
        let mut pending = validated(5.0, 5.0, Some(ThreatType::Coral));
        pending.status = SubmissionStatus::PendingValidation;
        let untyped = validated(5.0, 5.0, None);
        let stats = agg.aggregate(&[pending, untyped], &[]);
        assert_eq!(stats["West"], RegionStat::default());
    }

    #[test]
    fn projects_count_positive() {
        let agg = aggregator();
        let stats = agg.aggregate(&[], &[project(5.0, 25.0), project(5.0, 25.0)]);
        assert_eq!(stats["East"].projects, 2);
        assert_eq!(stats["West"].projects, 0);
    }

    #[test]
    fn all_regions_present_even_when_quiet() {
        let agg = aggregator();
        let stats = agg.aggregate(&[], &[]);
        assert_eq!(stats.len(), 2);
        assert!(stats.contains_key("West") && stats.contains_key("East"));
    }
}
