//! Geospatial primitives
//!
//! Coordinates, great-circle distance, and the administrative region
//! reference set used to bucket events for aggregate scoring. Regions are
//! loaded once at startup from a GeoJSON FeatureCollection and are immutable
//! at runtime.

use crate::{Error, Result};
use geo::{Contains, Distance, Haversine, Point};
use std::path::Path;
use tracing::{info, warn};

/// A WGS84 coordinate pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting out-of-range or non-finite values
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidInput(format!(
                "latitude {} out of range [-90, 90]",
                lat
            )));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(Error::InvalidInput(format!(
                "longitude {} out of range [-180, 180]",
                lng
            )));
        }
        Ok(Self { lat, lng })
    }
}

/// Great-circle distance in meters between two coordinates
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    Haversine::distance(Point::new(a.lng, a.lat), Point::new(b.lng, b.lat))
}

/// A single administrative boundary
pub struct Region {
    /// Unique region name (e.g., a state name)
    pub name: String,
    /// Containment geometry (polygon or multipolygon)
    boundary: geo::Geometry<f64>,
    /// Original GeoJSON geometry, kept for re-emission in map overlays
    geometry: geojson::Geometry,
}

impl Region {
    pub fn contains(&self, coord: Coordinate) -> bool {
        self.boundary.contains(&Point::new(coord.lng, coord.lat))
    }

    pub fn geometry(&self) -> &geojson::Geometry {
        &self.geometry
    }
}

/// The loaded reference dataset of administrative boundaries
///
/// Iteration order is the load order of the source file; `locate` returns
/// the first containing region.
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    /// Load regions from a GeoJSON FeatureCollection file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read region dataset {}: {}", path.display(), e))
        })?;
        let set = Self::from_geojson_str(&content)?;
        info!(
            "Loaded {} region boundaries from {}",
            set.len(),
            path.display()
        );
        Ok(set)
    }

    /// Parse regions from GeoJSON FeatureCollection text
    ///
    /// Individual malformed features (missing name, unsupported or degenerate
    /// geometry) are skipped with a warning rather than aborting the load;
    /// the reference dataset may be partially corrupt.
    pub fn from_geojson_str(content: &str) -> Result<Self> {
        let geojson: geojson::GeoJson = content
            .parse()
            .map_err(|e| Error::Config(format!("invalid region GeoJSON: {}", e)))?;

        let collection = match geojson {
            geojson::GeoJson::FeatureCollection(fc) => fc,
            _ => {
                return Err(Error::Config(
                    "region dataset must be a GeoJSON FeatureCollection".to_string(),
                ))
            }
        };

        let mut regions = Vec::new();
        for (index, feature) in collection.features.into_iter().enumerate() {
            let name = feature
                .properties
                .as_ref()
                .and_then(|p| p.get("name").or_else(|| p.get("ST_NM")))
                .and_then(|v| v.as_str())
                .map(str::to_string);
            let Some(name) = name else {
                warn!("Skipping region feature {}: no name property", index);
                continue;
            };

            let Some(geometry) = feature.geometry else {
                warn!("Skipping region '{}': no geometry", name);
                continue;
            };

            let boundary = match geo::Geometry::<f64>::try_from(geometry.value.clone()) {
                Ok(boundary @ geo::Geometry::Polygon(_))
                | Ok(boundary @ geo::Geometry::MultiPolygon(_)) => boundary,
                Ok(_) => {
                    warn!("Skipping region '{}': geometry is not a polygon", name);
                    continue;
                }
                Err(e) => {
                    warn!("Skipping region '{}': malformed geometry: {}", name, e);
                    continue;
                }
            };

            regions.push(Region {
                name,
                boundary,
                geometry,
            });
        }

        Ok(Self { regions })
    }

    /// Find the region containing a point; first match in load order wins.
    /// A point inside no boundary belongs to no region.
    pub fn locate(&self, coord: Coordinate) -> Option<&str> {
        self.regions
            .iter()
            .find(|region| region.contains(coord))
            .map(|region| region.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SQUARES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"name": "West Square"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"name": "East Square"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[20.0, 0.0], [30.0, 0.0], [30.0, 10.0], [20.0, 10.0], [20.0, 0.0]]]
                }
            }
        ]
    }"#;

    #[test]
    fn coordinate_range_enforced() {
        assert!(Coordinate::new(28.6139, 77.2090).is_ok());
        assert!(Coordinate::new(90.0001, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn haversine_delhi_short_hop() {
        // Connaught Place area, ~80 m apart
        let a = Coordinate::new(28.6139, 77.2090).unwrap();
        let b = Coordinate::new(28.6145, 77.2095).unwrap();
        let d = distance_meters(a, b);
        assert!(d > 50.0 && d < 120.0, "expected ~80m, got {}", d);
    }

    #[test]
    fn haversine_long_hop_exceeds_50km() {
        let a = Coordinate::new(28.6139, 77.2090).unwrap();
        let b = Coordinate::new(29.0, 78.0).unwrap();
        assert!(distance_meters(a, b) > 50_000.0);
    }

    #[test]
    fn locate_picks_containing_region_only() {
        let set = RegionSet::from_geojson_str(TWO_SQUARES).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.locate(Coordinate::new(5.0, 5.0).unwrap()),
            Some("West Square")
        );
        assert_eq!(
            set.locate(Coordinate::new(5.0, 25.0).unwrap()),
            Some("East Square")
        );
        assert_eq!(set.locate(Coordinate::new(5.0, 15.0).unwrap()), None);
    }

    #[test]
    fn malformed_features_are_skipped_not_fatal() {
        let mixed = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": null},
                {
                    "type": "Feature",
                    "properties": {"name": "Point Not Polygon"},
                    "geometry": {"type": "Point", "coordinates": [1.0, 1.0]}
                },
                {
                    "type": "Feature",
                    "properties": {"name": "Good"},
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
                    }
                }
            ]
        }"#;
        let set = RegionSet::from_geojson_str(mixed).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.locate(Coordinate::new(0.5, 0.5).unwrap()),
            Some("Good")
        );
    }

    #[test]
    fn st_nm_property_accepted() {
        let data = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"ST_NM": "Kerala"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[74.9, 8.2], [77.5, 8.2], [77.5, 12.8], [74.9, 12.8], [74.9, 8.2]]]
                }
            }]
        }"#;
        let set = RegionSet::from_geojson_str(data).unwrap();
        assert_eq!(
            set.locate(Coordinate::new(10.0, 76.2).unwrap()),
            Some("Kerala")
        );
    }
}
