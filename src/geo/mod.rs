//! Geographic coordinates and great-circle math
//!
//! The coordination core only needs one geospatial predicate: the distance
//! from a gun to a target, checked against the gun's range bracket. Bearing
//! rides along because mission notifications quote it.

use geo::{HaversineBearing, HaversineDistance};
use geo_types::Point;
use serde::{Deserialize, Serialize};

/// A WGS84 coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Distance and initial bearing between two coordinates
#[derive(Debug, Clone, Copy)]
pub struct DistanceBearing {
    /// Great-circle distance in meters
    pub distance: f64,
    /// Initial bearing in degrees, normalized to [0, 360)
    pub bearing: f64,
}

/// Compute haversine distance (meters) and initial bearing (degrees) from
/// `from` to `to`
pub fn distance_and_bearing(from: GeoPoint, to: GeoPoint) -> DistanceBearing {
    let a = Point::new(from.lon, from.lat);
    let b = Point::new(to.lon, to.lat);
    let distance = a.haversine_distance(&b);
    let bearing = (a.haversine_bearing(b) + 360.0) % 360.0;
    DistanceBearing { distance, bearing }
}

/// Format a coordinate as degrees/minutes/seconds for ledger text
pub fn format_dms(point: GeoPoint) -> String {
    fn axis(value: f64, positive: char, negative: char) -> String {
        let hemisphere = if value >= 0.0 { positive } else { negative };
        let abs = value.abs();
        let degrees = abs.floor();
        let minutes_full = (abs - degrees) * 60.0;
        let minutes = minutes_full.floor();
        let seconds = (minutes_full - minutes) * 60.0;
        format!("{}°{:02}'{:04.1}\"{}", degrees as u32, minutes as u32, seconds, hemisphere)
    }

    format!("{} {}", axis(point.lat, 'N', 'S'), axis(point.lon, 'E', 'W'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let p = GeoPoint::new(4.6, -74.08);
        let result = distance_and_bearing(p, p);
        assert!(result.distance < 0.001);
    }

    #[test]
    fn test_one_degree_longitude_at_equator() {
        // One degree of longitude at the equator is about 111.2 km
        let result = distance_and_bearing(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));
        assert!((result.distance - 111_195.0).abs() < 500.0, "got {}", result.distance);
        assert!((result.bearing - 90.0).abs() < 0.1);
    }

    #[test]
    fn test_bearing_normalized() {
        // Due west should come back as 270, not -90
        let result = distance_and_bearing(GeoPoint::new(0.0, 1.0), GeoPoint::new(0.0, 0.0));
        assert!((result.bearing - 270.0).abs() < 0.1);
    }

    #[test]
    fn test_dms_formatting() {
        let text = format_dms(GeoPoint::new(4.5, -74.25));
        assert!(text.starts_with("4°30'"), "got {}", text);
        assert!(text.contains('N'));
        assert!(text.contains('W'));
    }
}
