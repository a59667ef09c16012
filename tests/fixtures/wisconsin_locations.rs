//! Southeastern Wisconsin locations for realistic fixtures.
//!
//! Coordinates are approximate street-level points in each city.

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

// ============================================================================
// Route origins (match the stock schedule)
// ============================================================================

pub const WAUKESHA_OFFICE: Location = Location::new("Waukesha office", 43.0117, -88.2315);
pub const KENOSHA_OFFICE: Location = Location::new("Kenosha office", 42.5847, -87.8212);
pub const MILWAUKEE_OFFICE: Location = Location::new("Milwaukee office", 43.0389, -87.9065);

// ============================================================================
// Waukesha (Monday)
// ============================================================================

pub const WAUKESHA: &[Location] = &[
    Location::new("Downtown Waukesha", 43.0125, -88.2280),
    Location::new("Waukesha industrial park", 43.0340, -88.1850),
    Location::new("Sunset Dr", 42.9930, -88.2460),
];

// ============================================================================
// Kenosha / Racine (Tuesday)
// ============================================================================

pub const KENOSHA: &[Location] = &[
    Location::new("Kenosha harbor", 42.5900, -87.8150),
    Location::new("Kenosha west side", 42.5780, -87.8900),
];

pub const RACINE: &[Location] = &[
    Location::new("Downtown Racine", 42.7261, -87.7829),
    Location::new("Racine airport", 42.7610, -87.8140),
];

// ============================================================================
// Elsewhere
// ============================================================================

pub const MADISON: Location = Location::new("Capitol Square", 43.0747, -89.3841);
pub const GREEN_BAY: Location = Location::new("Green Bay", 44.5133, -88.0133);
