//! Test fixtures for outreach-planner.
//!
//! Provides:
//! - Real southeastern Wisconsin locations
//! - A company builder and scripted distance services

#![allow(dead_code)]

pub mod wisconsin_locations;

use std::sync::atomic::{AtomicUsize, Ordering};

use outreach_planner::error::ServiceError;
use outreach_planner::models::{Address, Company, Coordinates};
use outreach_planner::traits::{DistanceService, Leg};

pub use wisconsin_locations::*;

/// Builder for test companies with sensible defaults.
#[derive(Clone, Debug)]
pub struct TestCompany {
    company: Company,
}

impl TestCompany {
    pub fn new(id: &str) -> Self {
        Self {
            company: Company::new(id, format!("Company {id}")),
        }
    }

    pub fn in_city(mut self, street: &str, city: &str) -> Self {
        self.company.address = Some(Address {
            street: street.to_string(),
            city: city.to_string(),
            state: "WI".to_string(),
            zip: String::new(),
            country: "USA".to_string(),
        });
        self
    }

    pub fn at(mut self, location: &Location) -> Self {
        self.company.location = Some(location.coords());
        self
    }

    pub fn build(self) -> Company {
        self.company
    }
}

/// Always fails, as a quota-exhausted provider would.
pub struct FailingService;

impl DistanceService for FailingService {
    fn leg(&self, _from: Coordinates, _to: Coordinates) -> Result<Leg, ServiceError> {
        Err(ServiceError::Status("OVER_QUERY_LIMIT".to_string()))
    }
}

/// Deterministic "road" distances: Manhattan distance in degrees x 100 km,
/// one minute per km. Counts calls.
#[derive(Default)]
pub struct GridService {
    pub calls: AtomicUsize,
}

impl GridService {
    pub fn km(from: Coordinates, to: Coordinates) -> f64 {
        ((from.0 - to.0).abs() + (from.1 - to.1).abs()) * 100.0
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DistanceService for GridService {
    fn leg(&self, from: Coordinates, to: Coordinates) -> Result<Leg, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let distance_km = Self::km(from, to);
        Ok(Leg {
            distance_km,
            duration_secs: distance_km * 60.0,
        })
    }
}
