//! Error types for planning, configuration and external services.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::{CompanyId, Weekday};

/// Failures reported to the caller of [`crate::schedule::WeeklyPlanner`].
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("no companies selected")]
    EmptySelection,
    #[error("unknown company id: {0}")]
    UnknownCompany(CompanyId),
    #[error("optimization cancelled")]
    Cancelled,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Invalid or unreadable location schedule. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse schedule: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("schedule has no entry for {0}")]
    MissingWeekday(Weekday),
    #[error("schedule has more than one entry for {0}")]
    DuplicateWeekday(Weekday),
    #[error("{0} is not a follow-up day and lists no regions")]
    EmptyRegions(Weekday),
    #[error("region {region:?} is assigned to both {first} and {second}")]
    OverlappingRegion {
        region: String,
        first: Weekday,
        second: Weekday,
    },
    #[error("fallback day {0} is not marked as a follow-up day")]
    InvalidFallbackDay(Weekday),
    #[error("invalid coordinate in schedule for {0}")]
    InvalidCoordinate(Weekday),
}

/// Failure of a geocoding or distance call. Never fatal to a plan.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service returned status {0}")]
    Status(String),
    #[error("no route between points")]
    NoRoute,
    #[error("invalid coordinate")]
    InvalidCoordinate,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode companies: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("duplicate company id: {0}")]
    DuplicateId(CompanyId),
}
