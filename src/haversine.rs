//! Straight-line travel estimate (fallback when the distance service fails).
//!
//! Great-circle distance scaled by a road correction factor, with time from
//! an assumed average driving speed. Always available and deterministic, but
//! an approximation: it ignores the road network entirely.

use crate::error::ServiceError;
use crate::models::{is_valid_coordinate, Coordinates};
use crate::traits::{DistanceService, Leg};

/// Average driving speed assumption for time estimation (~30 mph).
pub const DEFAULT_SPEED_KMH: f64 = 48.0;

/// Ratio of typical road distance to great-circle distance.
pub const DEFAULT_ROAD_FACTOR: f64 = 1.3;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometers.
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

#[derive(Debug, Clone)]
pub struct HaversineEstimator {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
    /// Multiplier applied to the straight-line distance.
    pub road_factor: f64,
}

impl Default for HaversineEstimator {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
            road_factor: DEFAULT_ROAD_FACTOR,
        }
    }
}

impl HaversineEstimator {
    pub fn new(speed_kmh: f64, road_factor: f64) -> Self {
        Self {
            speed_kmh,
            road_factor,
        }
    }

    /// Estimated road distance in km.
    pub fn road_km(&self, from: Coordinates, to: Coordinates) -> f64 {
        haversine_km(from, to) * self.road_factor
    }

    /// Convert distance in km to travel time in seconds.
    pub fn km_to_seconds(&self, km: f64) -> f64 {
        km / self.speed_kmh * 3600.0
    }
}

impl DistanceService for HaversineEstimator {
    fn leg(&self, from: Coordinates, to: Coordinates) -> Result<Leg, ServiceError> {
        if !is_valid_coordinate(from) || !is_valid_coordinate(to) {
            return Err(ServiceError::InvalidCoordinate);
        }

        let distance_km = self.road_km(from, to);
        Ok(Leg {
            distance_km,
            duration_secs: self.km_to_seconds(distance_km),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point() {
        let dist = haversine_km((43.01, -88.23), (43.01, -88.23));
        assert!(dist < 0.001, "Same point should have ~0 distance");
    }

    #[test]
    fn test_haversine_known_distance() {
        // Milwaukee (43.04, -87.91) to Madison (43.07, -89.40), ~121 km
        let dist = haversine_km((43.0389, -87.9065), (43.0731, -89.4012));
        assert!(dist > 115.0 && dist < 127.0, "MKE to MSN should be ~121km, got {}", dist);
    }

    #[test]
    fn test_meridian_degree() {
        // One degree of latitude is ~111.19 km on a 6371 km sphere.
        let dist = haversine_km((43.0, -88.0), (44.0, -88.0));
        assert!((dist - 111.195).abs() < 0.01, "got {}", dist);
    }

    #[test]
    fn test_symmetric() {
        let a = (43.0117, -88.2315);
        let b = (42.5847, -87.8212);
        assert_eq!(haversine_km(a, b), haversine_km(b, a));
    }

    #[test]
    fn test_leg_applies_road_factor_and_speed() {
        let estimator = HaversineEstimator::new(40.0, 1.5);
        let from = (43.0, -88.0);
        let to = (43.1, -88.0);
        let leg = estimator.leg(from, to).unwrap();

        let expected = haversine_km(from, to) * 1.5;
        assert!((leg.distance_km - expected).abs() < 1e-9);
        assert!((leg.duration_secs - expected / 40.0 * 3600.0).abs() < 1e-6);
    }

    #[test]
    fn test_reasonable_travel_time() {
        let estimator = HaversineEstimator::new(40.0, 1.0);
        // 10 km at 40 km/h = 0.25 hours = 900 seconds
        assert!((estimator.km_to_seconds(10.0) - 900.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_invalid_coordinates() {
        let estimator = HaversineEstimator::default();
        let result = estimator.leg((f64::NAN, 0.0), (43.0, -88.0));
        assert!(matches!(result, Err(ServiceError::InvalidCoordinate)));
    }
}
