//! Capability interfaces for the external collaborators.
//!
//! The planner only sees these traits. Concrete HTTP adapters live in
//! [`crate::osrm`] and [`crate::geocode`]; the straight-line estimate in
//! [`crate::haversine`] implements [`DistanceService`] too so it can stand in
//! anywhere a live service is expected.

use crate::error::{ServiceError, StoreError};
use crate::models::{Company, CompanyId, Coordinates};

/// Resolves a free-text address to coordinates.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> Result<Coordinates, ServiceError>;
}

/// Road distance and duration for one pair of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    pub distance_km: f64,
    pub duration_secs: f64,
}

/// Provides a travel estimate between two coordinates.
///
/// Implementations must be safe to call from several threads at once; the
/// estimator issues lookups in parallel.
pub trait DistanceService: Send + Sync {
    fn leg(&self, from: Coordinates, to: Coordinates) -> Result<Leg, ServiceError>;
}

/// Criteria for [`CompanyStore::find`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct CompanyFilter {
    /// Case-insensitive substring of the primary industry.
    pub industry: Option<String>,
    /// Case-insensitive substring of the one-line address.
    pub location: Option<String>,
    pub min_employees: Option<u32>,
    pub owner_operated: Option<bool>,
}

impl CompanyFilter {
    pub fn matches(&self, company: &Company) -> bool {
        if let Some(industry) = &self.industry {
            let needle = industry.to_lowercase();
            let found = company
                .industry
                .as_ref()
                .is_some_and(|value| value.primary.to_lowercase().contains(&needle));
            if !found {
                return false;
            }
        }

        if let Some(location) = &self.location {
            let needle = location.to_lowercase();
            let found = company
                .one_line_address()
                .is_some_and(|line| line.to_lowercase().contains(&needle));
            if !found {
                return false;
            }
        }

        if let Some(min) = self.min_employees {
            if company.employee_count.is_none_or(|count| count < min) {
                return false;
            }
        }

        if let Some(owner_operated) = self.owner_operated {
            if company.owner_operated != owner_operated {
                return false;
            }
        }

        true
    }
}

/// Read access to company records.
pub trait CompanyStore {
    fn get(&self, id: &CompanyId) -> Result<Option<Company>, StoreError>;

    fn find(&self, filter: &CompanyFilter) -> Result<Vec<Company>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, Industry};

    fn manufacturer() -> Company {
        let mut company = Company::new("c1", "Badger Tool & Die").with_address(Address {
            street: "12 Main St".to_string(),
            city: "Waukesha".to_string(),
            state: "WI".to_string(),
            zip: "53186".to_string(),
            country: "USA".to_string(),
        });
        company.industry = Some(Industry {
            primary: "Manufacturing".to_string(),
            naics_code: Some("332".to_string()),
            sic_code: None,
        });
        company.employee_count = Some(40);
        company.owner_operated = true;
        company
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(CompanyFilter::default().matches(&manufacturer()));
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let filter = CompanyFilter {
            industry: Some("manufact".to_string()),
            location: Some("WAUKESHA".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&manufacturer()));
    }

    #[test]
    fn test_employee_threshold() {
        let filter = CompanyFilter {
            min_employees: Some(50),
            ..Default::default()
        };
        assert!(!filter.matches(&manufacturer()));

        let mut unknown = manufacturer();
        unknown.employee_count = None;
        assert!(!filter.matches(&unknown));
    }

    #[test]
    fn test_owner_operated_flag() {
        let filter = CompanyFilter {
            owner_operated: Some(false),
            ..Default::default()
        };
        assert!(!filter.matches(&manufacturer()));
    }
}
