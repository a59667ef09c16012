//! OSRM HTTP adapter for pairwise road distance.

use serde::Deserialize;

use crate::error::ServiceError;
use crate::models::{is_valid_coordinate, Coordinates};
use crate::traits::{DistanceService, Leg};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn route_url(&self, from: Coordinates, to: Coordinates) -> String {
        // OSRM takes lng,lat.
        format!(
            "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}?overview=false",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            from.1,
            from.0,
            to.1,
            to.0
        )
    }
}

impl DistanceService for OsrmClient {
    fn leg(&self, from: Coordinates, to: Coordinates) -> Result<Leg, ServiceError> {
        if !is_valid_coordinate(from) || !is_valid_coordinate(to) {
            return Err(ServiceError::InvalidCoordinate);
        }

        let body = self
            .client
            .get(self.route_url(from, to))
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmRouteResponse>())?;

        parse_route(body)
    }
}

fn parse_route(body: OsrmRouteResponse) -> Result<Leg, ServiceError> {
    if body.code != "Ok" {
        return Err(ServiceError::Status(body.code));
    }

    let route = body
        .routes
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or(ServiceError::NoRoute)?;

    Ok(Leg {
        distance_km: route.distance / 1000.0,
        duration_secs: route.duration,
    })
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    routes: Option<Vec<OsrmRoute>>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Meters.
    distance: f64,
    /// Seconds.
    duration: f64,
}
