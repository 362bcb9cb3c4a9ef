//! Proximity and recency validation
//!
//! Decides whether photographic evidence is admissible: the submitter must
//! actually be near the place the photo was taken, and the photo must be
//! recent. Prevents submitting photos taken elsewhere or reusing old ones.
//! Both checks are deployment policy and independently toggleable.

use chrono::{DateTime, Duration, Utc};
use ecosynth_common::config::ProximityConfig;
use ecosynth_common::geo::{distance_meters, Coordinate};
use thiserror::Error;

use crate::extractors::PhotoEvidence;

/// Admissibility rejections, each naming the violated threshold
#[derive(Debug, Error, PartialEq)]
pub enum AdmissibilityError {
    #[error(
        "photo was taken {distance_m:.0} m from your current location, further than the allowed {max_m:.0} m"
    )]
    LocationMismatch { distance_m: f64, max_m: f64 },

    #[error("photo is {age_hours} hours old, older than the allowed {max_hours} hours")]
    StaleCapture { age_hours: i64, max_hours: i64 },
}

/// Checks live device location and time against embedded photo evidence
#[derive(Debug, Clone)]
pub struct ProximityValidator {
    policy: ProximityConfig,
}

impl ProximityValidator {
    pub fn new(policy: ProximityConfig) -> Self {
        Self { policy }
    }

    /// Accept or reject evidence against the configured policy.
    ///
    /// No side effects; rejection carries the specific reason and the
    /// threshold that was violated.
    pub fn check(
        &self,
        live: Coordinate,
        evidence: &PhotoEvidence,
        now: DateTime<Utc>,
    ) -> Result<(), AdmissibilityError> {
        if self.policy.enforce_distance {
            let embedded = Coordinate {
                lat: evidence.latitude,
                lng: evidence.longitude,
            };
            let distance_m = distance_meters(live, embedded);
            if distance_m > self.policy.max_distance_meters {
                return Err(AdmissibilityError::LocationMismatch {
                    distance_m,
                    max_m: self.policy.max_distance_meters,
                });
            }
        }

        if self.policy.enforce_recency {
            let age = now.signed_duration_since(evidence.capture_time);
            let max = Duration::hours(self.policy.max_capture_age_hours);
            if age > max {
                return Err(AdmissibilityError::StaleCapture {
                    age_hours: age.num_hours(),
                    max_hours: self.policy.max_capture_age_hours,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(lat: f64, lng: f64, captured: DateTime<Utc>) -> PhotoEvidence {
        PhotoEvidence {
            latitude: lat,
            longitude: lng,
            capture_time: captured,
        }
    }

    fn validator() -> ProximityValidator {
        ProximityValidator::new(ProximityConfig::default())
    }

    #[test]
    fn nearby_recent_photo_is_admissible() {
        let now = Utc::now();
        let live = Coordinate::new(28.6139, 77.2090).unwrap();
        // ~80 m away, 1 hour old: inside the 1000 m / 24 h defaults
        let ev = evidence(28.6145, 77.2095, now - Duration::hours(1));
        assert_eq!(validator().check(live, &ev, now), Ok(()));
    }

    #[test]
    fn distant_photo_is_location_mismatch() {
        let now = Utc::now();
        let live = Coordinate::new(28.6139, 77.2090).unwrap();
        // >50 km away
        let ev = evidence(29.0, 78.0, now);
        match validator().check(live, &ev, now) {
            Err(AdmissibilityError::LocationMismatch { distance_m, max_m }) => {
                assert!(distance_m > 50_000.0);
                assert_eq!(max_m, 1000.0);
            }
            other => panic!("expected LocationMismatch, got {:?}", other),
        }
    }

    #[test]
    fn old_photo_is_stale_capture() {
        let now = Utc::now();
        let live = Coordinate::new(28.6139, 77.2090).unwrap();
        let ev = evidence(28.6139, 77.2090, now - Duration::hours(25));
        match validator().check(live, &ev, now) {
            Err(AdmissibilityError::StaleCapture {
                age_hours,
                max_hours,
            }) => {
                assert_eq!(age_hours, 25);
                assert_eq!(max_hours, 24);
            }
            other => panic!("expected StaleCapture, got {:?}", other),
        }
    }

    #[test]
    fn one_hour_old_photo_is_fresh() {
        let now = Utc::now();
        let live = Coordinate::new(28.6139, 77.2090).unwrap();
        let ev = evidence(28.6139, 77.2090, now - Duration::hours(1));
        assert_eq!(validator().check(live, &ev, now), Ok(()));
    }

    #[test]
    fn disabled_checks_admit_anything() {
        let policy = ProximityConfig {
            enforce_distance: false,
            enforce_recency: false,
            ..ProximityConfig::default()
        };
        let validator = ProximityValidator::new(policy);
        let now = Utc::now();
        let live = Coordinate::new(0.0, 0.0).unwrap();
        // Opposite side of the planet, a year old
        let ev = evidence(-33.8, 151.2, now - Duration::days(365));
        assert_eq!(validator.check(live, &ev, now), Ok(()));
    }

    #[test]
    fn checks_toggle_independently() {
        let policy = ProximityConfig {
            enforce_distance: false,
            ..ProximityConfig::default()
        };
        let validator = ProximityValidator::new(policy);
        let now = Utc::now();
        let live = Coordinate::new(0.0, 0.0).unwrap();
        // Far away but fresh: distance disabled, recency still enforced
        let ev = evidence(-33.8, 151.2, now - Duration::hours(2));
        assert_eq!(validator.check(live, &ev, now), Ok(()));
        let stale = evidence(-33.8, 151.2, now - Duration::hours(30));
        assert!(matches!(
            validator.check(live, &stale, now),
            Err(AdmissibilityError::StaleCapture { .. })
        ));
    }
}
