//! Data model shared by the logistics components.
//!
//! Companies are read-only inputs owned by the broader system. Everything
//! derived from them here (assignments, clusters, routes, plans) is recomputed
//! for every optimization request.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::polyline::Polyline;

/// Latitude/longitude pair in degrees.
pub type Coordinates = (f64, f64);

/// Stable company identifier. Also the secondary key for route tie-breaks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(pub String);

impl CompanyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CompanyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "USA".to_string()
}

impl Address {
    /// Single-line form used for geocoding and keyword matching.
    pub fn one_line(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        for part in [&self.street, &self.city] {
            if !part.trim().is_empty() {
                parts.push(part.trim().to_string());
            }
        }
        let state_zip = format!("{} {}", self.state.trim(), self.zip.trim());
        if !state_zip.trim().is_empty() {
            parts.push(state_zip.trim().to_string());
        }
        parts.join(", ")
    }

    /// True when there is any text a keyword could match against.
    pub fn is_usable(&self) -> bool {
        !self.city.trim().is_empty() || !self.street.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Industry {
    pub primary: String,
    #[serde(default)]
    pub naics_code: Option<String>,
    #[serde(default)]
    pub sic_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    #[serde(default)]
    pub address: Option<Address>,
    /// Resolved coordinates; `None` until geocoded.
    #[serde(default)]
    pub location: Option<Coordinates>,
    #[serde(default)]
    pub industry: Option<Industry>,
    #[serde(default)]
    pub employee_count: Option<u32>,
    #[serde(default)]
    pub owner_operated: bool,
}

impl Company {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: CompanyId::new(id),
            name: name.into(),
            address: None,
            location: None,
            industry: None,
            employee_count: None,
            owner_operated: false,
        }
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_location(mut self, lat: f64, lng: f64) -> Self {
        self.location = Some((lat, lng));
        self
    }

    /// Coordinates only when both components are finite and in range.
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.location.filter(|point| is_valid_coordinate(*point))
    }

    pub fn one_line_address(&self) -> Option<String> {
        self.address
            .as_ref()
            .filter(|address| address.is_usable())
            .map(Address::one_line)
    }
}

pub fn is_valid_coordinate((lat, lng): Coordinates) -> bool {
    lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    #[serde(alias = "Monday")]
    Monday,
    #[serde(alias = "Tuesday")]
    Tuesday,
    #[serde(alias = "Wednesday")]
    Wednesday,
    #[serde(alias = "Thursday")]
    Thursday,
    #[serde(alias = "Friday")]
    Friday,
    #[serde(alias = "Saturday")]
    Saturday,
    #[serde(alias = "Sunday")]
    Sunday,
}

impl Weekday {
    pub const WORKING_DAYS: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of region classification for one company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "weekday")]
pub enum RegionAssignment {
    Scheduled(Weekday),
    Unscheduled,
}

impl RegionAssignment {
    pub fn weekday(self) -> Option<Weekday> {
        match self {
            RegionAssignment::Scheduled(day) => Some(day),
            RegionAssignment::Unscheduled => None,
        }
    }
}

/// Companies assigned to one weekday. Order is discovery order until the
/// route optimizer has run, route order afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DayCluster {
    pub weekday: Weekday,
    pub companies: Vec<Company>,
}

/// Where a distance value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Returned by the live distance service.
    Service,
    /// Straight-line approximation; see [`crate::haversine::HaversineEstimator`].
    Fallback,
}

/// Distance and time for a single pair of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TravelEstimate {
    pub distance_km: f64,
    pub duration_secs: f64,
    pub provenance: Provenance,
}

/// Optimized visiting order for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub weekday: Weekday,
    /// Indices into the day's input company list, in visiting order.
    /// Routable stops first, then unroutable ones in input order.
    pub order: Vec<usize>,
    pub total_distance_km: f64,
    pub total_duration_secs: f64,
    /// Companies without usable coordinates, appended to the end of `order`.
    pub unroutable: Vec<CompanyId>,
    /// Legs that used the fallback estimate.
    pub fallback_legs: usize,
    /// Legs with no estimate at all; they contribute nothing to the totals.
    pub unreachable_legs: usize,
    /// Origin (when known) followed by routable stops in order.
    pub path: Polyline,
}

/// Reference to a company inside a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRef {
    pub company_id: CompanyId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl From<&Company> for CompanyRef {
    fn from(company: &Company) -> Self {
        Self {
            company_id: company.id.clone(),
            name: company.name.clone(),
            address: company.one_line_address(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub weekday: Weekday,
    pub companies: Vec<CompanyRef>,
    pub total_distance_km: f64,
    pub total_duration_secs: f64,
    pub unroutable: Vec<CompanyId>,
    /// True when any leg of the day fell back to the straight-line estimate.
    pub approximate: bool,
    /// Great-circle length of `path`, for comparison with the road total.
    pub straight_line_km: f64,
    /// South-west and north-east corners of `path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_bounds: Option<(Coordinates, Coordinates)>,
    pub path: Polyline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPlan {
    /// Days with at least one company, in weekday order.
    pub days: Vec<DayPlan>,
    pub unscheduled: Vec<CompanyRef>,
}

impl WeeklyPlan {
    pub fn day(&self, weekday: Weekday) -> Option<&DayPlan> {
        self.days.iter().find(|day| day.weekday == weekday)
    }

    pub fn total_distance_km(&self) -> f64 {
        self.days.iter().map(|day| day.total_distance_km).sum()
    }
}
