//! Geocoding adapter and the pass that resolves missing company coordinates.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ServiceError;
use crate::models::{Company, Coordinates};
use crate::traits::Geocoder;

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com/maps/api".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

/// Client for a Google-style geocoding endpoint (`/geocode/json`).
#[derive(Debug, Clone)]
pub struct MapsGeocoder {
    config: GeocoderConfig,
    client: reqwest::blocking::Client,
}

impl MapsGeocoder {
    pub fn new(config: GeocoderConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl Geocoder for MapsGeocoder {
    fn geocode(&self, address: &str) -> Result<Coordinates, ServiceError> {
        let url = format!("{}/geocode/json", self.config.base_url.trim_end_matches('/'));
        let body = self
            .client
            .get(url)
            .query(&[("address", address), ("key", self.config.api_key.as_str())])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<GeocodeResponse>())?;

        parse_geocode(body)
    }
}

fn parse_geocode(body: GeocodeResponse) -> Result<Coordinates, ServiceError> {
    if body.status != "OK" {
        return Err(ServiceError::Status(body.status));
    }

    body.results
        .into_iter()
        .next()
        .map(|result| (result.geometry.location.lat, result.geometry.location.lng))
        .ok_or_else(|| ServiceError::Status("ZERO_RESULTS".to_string()))
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Fill in coordinates for companies that have an address but no location.
///
/// Failures leave the company without coordinates; it then ends up
/// unroutable or unscheduled downstream. Returns the number of failures.
pub fn geocode_missing<G: Geocoder + ?Sized>(companies: &mut [Company], geocoder: &G) -> usize {
    let mut failures = 0;

    for company in companies.iter_mut() {
        if company.coordinates().is_some() {
            continue;
        }
        let Some(address) = company.one_line_address() else {
            continue;
        };

        match geocoder.geocode(&address) {
            Ok(point) => {
                debug!(company = %company.id, lat = point.0, lng = point.1, "geocoded");
                company.location = Some(point);
            }
            Err(err) => {
                warn!(company = %company.id, %address, error = %err, "geocoding failed");
                failures += 1;
            }
        }
    }

    failures
}
