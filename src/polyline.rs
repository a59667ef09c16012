//! Route geometry handed to the map view.
//!
//! Points are stored decoded. Any compact encoding belongs to whoever renders
//! the map, not to the planner.

use serde::{Deserialize, Serialize};

use crate::haversine::haversine_km;
use crate::models::Coordinates;

/// Ordered (latitude, longitude) points of a day's route, origin first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline {
    points: Vec<Coordinates>,
}

impl Polyline {
    pub fn new(points: Vec<Coordinates>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Coordinates] {
        &self.points
    }

    /// Straight-line length, without any road correction.
    pub fn straight_line_km(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| haversine_km(pair[0], pair[1]))
            .sum()
    }

    /// South-west and north-east corners, for fitting a map viewport.
    pub fn bounds(&self) -> Option<(Coordinates, Coordinates)> {
        let (first, rest) = self.points.split_first()?;
        let mut south_west = *first;
        let mut north_east = *first;
        for &(lat, lng) in rest {
            south_west = (south_west.0.min(lat), south_west.1.min(lng));
            north_east = (north_east.0.max(lat), north_east.1.max(lng));
        }
        Some((south_west, north_east))
    }
}
