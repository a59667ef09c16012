//! Weekly location schedule: loading, validation and hot reload.
//!
//! The schedule is immutable once built. Components receive an
//! `Arc<LocationSchedule>` at construction; [`ScheduleSource`] swaps in a new
//! one when the backing file changes. A long-running caller builds one
//! planner per request from the snapshot in effect:
//!
//! ```no_run
//! # use outreach_planner::config::ScheduleSource;
//! # use outreach_planner::estimator::DistanceEstimator;
//! # use outreach_planner::haversine::HaversineEstimator;
//! # use outreach_planner::schedule::{PlannerOptions, WeeklyPlanner};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = ScheduleSource::open("schedule.toml")?;
//!
//! // per request
//! source.refresh()?;
//! let planner = WeeklyPlanner::new(
//!     source.current(),
//!     DistanceEstimator::fallback_only(HaversineEstimator::default()),
//!     PlannerOptions::default(),
//! );
//! # let _ = planner;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::models::{is_valid_coordinate, Coordinates, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub lat: f64,
    pub lng: f64,
}

impl Origin {
    pub fn coordinates(self) -> Coordinates {
        (self.lat, self.lng)
    }
}

/// Approximate rectangle for a named region, used when keyword matching
/// finds nothing but the company has coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionBounds {
    pub region: String,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl RegionBounds {
    pub fn contains(&self, (lat, lng): Coordinates) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lng..=self.max_lng).contains(&lng)
    }

    fn is_valid(&self) -> bool {
        is_valid_coordinate((self.min_lat, self.min_lng))
            && is_valid_coordinate((self.max_lat, self.max_lng))
            && self.min_lat <= self.max_lat
            && self.min_lng <= self.max_lng
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub weekday: Weekday,
    #[serde(default)]
    pub region_names: Vec<String>,
    #[serde(default)]
    pub is_followup: bool,
    /// Start point for the day's route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bounds: Vec<RegionBounds>,
}

impl ScheduleEntry {
    pub fn new(weekday: Weekday, regions: &[&str]) -> Self {
        Self {
            weekday,
            region_names: regions.iter().map(|region| region.to_string()).collect(),
            is_followup: false,
            origin: None,
            bounds: Vec::new(),
        }
    }

    pub fn followup(weekday: Weekday) -> Self {
        Self {
            is_followup: true,
            ..Self::new(weekday, &[])
        }
    }

    pub fn with_origin(mut self, lat: f64, lng: f64) -> Self {
        self.origin = Some(Origin { lat, lng });
        self
    }

    pub fn with_bounds(mut self, bounds: RegionBounds) -> Self {
        self.bounds.push(bounds);
        self
    }

    /// Lowercased match keywords. Region names split on `/` and `,`, so
    /// "Kenosha/Racine" yields `kenosha` and `racine`.
    pub fn keywords(&self) -> Vec<String> {
        let mut keywords: Vec<String> = self
            .region_names
            .iter()
            .flat_map(|name| name.split(['/', ',']))
            .map(|keyword| keyword.trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .collect();
        keywords.dedup();
        keywords
    }
}

#[derive(Debug, Deserialize)]
struct RawSchedule {
    #[serde(default)]
    fallback_day: Option<Weekday>,
    days: Vec<ScheduleEntry>,
}

/// Validated weekly schedule. Entries iterate Monday first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSchedule {
    fallback_day: Option<Weekday>,
    days: Vec<ScheduleEntry>,
}

impl LocationSchedule {
    pub fn new(
        mut days: Vec<ScheduleEntry>,
        fallback_day: Option<Weekday>,
    ) -> Result<Self, ConfigError> {
        days.sort_by_key(|entry| entry.weekday);

        for pair in days.windows(2) {
            if pair[0].weekday == pair[1].weekday {
                return Err(ConfigError::DuplicateWeekday(pair[0].weekday));
            }
        }

        for weekday in Weekday::WORKING_DAYS {
            if !days.iter().any(|entry| entry.weekday == weekday) {
                return Err(ConfigError::MissingWeekday(weekday));
            }
        }

        let mut owners: HashMap<String, Weekday> = HashMap::new();
        for entry in &days {
            if entry.origin.is_some_and(|origin| !is_valid_coordinate(origin.coordinates()))
                || entry.bounds.iter().any(|bounds| !bounds.is_valid())
            {
                return Err(ConfigError::InvalidCoordinate(entry.weekday));
            }
            if entry.is_followup {
                continue;
            }
            let keywords = entry.keywords();
            if keywords.is_empty() {
                return Err(ConfigError::EmptyRegions(entry.weekday));
            }
            for keyword in keywords {
                match owners.get(&keyword) {
                    Some(first) if *first != entry.weekday => {
                        return Err(ConfigError::OverlappingRegion {
                            region: keyword,
                            first: *first,
                            second: entry.weekday,
                        });
                    }
                    Some(_) => {}
                    None => {
                        owners.insert(keyword, entry.weekday);
                    }
                }
            }
        }

        if let Some(fallback) = fallback_day {
            let is_followup = days
                .iter()
                .find(|entry| entry.weekday == fallback)
                .is_some_and(|entry| entry.is_followup);
            if !is_followup {
                return Err(ConfigError::InvalidFallbackDay(fallback));
            }
        }

        Ok(Self { fallback_day, days })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawSchedule = toml::from_str(text)?;
        Self::new(raw.days, raw.fallback_day)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Stock southeastern Wisconsin schedule.
    pub fn wisconsin_default() -> Self {
        let days = vec![
            ScheduleEntry::new(
                Weekday::Monday,
                &["Waukesha", "West Milwaukee", "Jackson", "West Bend"],
            )
            .with_origin(43.0117, -88.2315),
            ScheduleEntry::new(Weekday::Tuesday, &["Kenosha", "Racine"])
                .with_origin(42.5847, -87.8212),
            ScheduleEntry::new(Weekday::Wednesday, &["West Waukesha", "Madison"])
                .with_origin(43.0731, -89.4012),
            ScheduleEntry::followup(Weekday::Thursday).with_origin(43.0389, -87.9065),
            ScheduleEntry::followup(Weekday::Friday).with_origin(43.0389, -87.9065),
        ];

        Self {
            fallback_day: Some(Weekday::Thursday),
            days,
        }
    }

    pub fn days(&self) -> &[ScheduleEntry] {
        &self.days
    }

    pub fn entry(&self, weekday: Weekday) -> Option<&ScheduleEntry> {
        self.days.iter().find(|entry| entry.weekday == weekday)
    }

    pub fn fallback_day(&self) -> Option<Weekday> {
        self.fallback_day
    }
}

/// File-backed schedule that can be reloaded without restarting.
#[derive(Debug)]
pub struct ScheduleSource {
    path: PathBuf,
    state: RwLock<SourceState>,
}

#[derive(Debug)]
struct SourceState {
    schedule: Arc<LocationSchedule>,
    stamp: Option<(SystemTime, u64)>,
}

impl ScheduleSource {
    /// Load the schedule; an invalid file is a startup error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let schedule = LocationSchedule::load(&path)?;
        let stamp = file_stamp(&path);
        info!(path = %path.display(), days = schedule.days().len(), "location schedule loaded");

        Ok(Self {
            path,
            state: RwLock::new(SourceState {
                schedule: Arc::new(schedule),
                stamp,
            }),
        })
    }

    /// Snapshot of the schedule in effect.
    pub fn current(&self) -> Arc<LocationSchedule> {
        let state = self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&state.schedule)
    }

    /// Reload if the file changed since the last load. Returns whether a new
    /// schedule was installed. On error the previous schedule stays active.
    pub fn refresh(&self) -> Result<bool, ConfigError> {
        let stamp = file_stamp(&self.path);
        {
            let state = self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner());
            if stamp.is_some() && stamp == state.stamp {
                return Ok(false);
            }
        }
        self.reload().map(|_| true)
    }

    /// Unconditionally re-read the file.
    pub fn reload(&self) -> Result<Arc<LocationSchedule>, ConfigError> {
        let stamp = file_stamp(&self.path);
        let schedule = match LocationSchedule::load(&self.path) {
            Ok(schedule) => Arc::new(schedule),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "schedule reload rejected");
                return Err(err);
            }
        };

        let mut state = self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.schedule = Arc::clone(&schedule);
        state.stamp = stamp;
        info!(path = %self.path.display(), "location schedule reloaded");
        Ok(schedule)
    }
}

fn file_stamp(path: &Path) -> Option<(SystemTime, u64)> {
    let meta = fs::metadata(path).ok()?;
    Some((meta.modified().ok()?, meta.len()))
}
