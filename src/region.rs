//! Region classification against the weekly location schedule.
//!
//! Matching is keyword based: each configured region name is split on `/`
//! and `,` into keywords that are compared case-insensitively with the
//! company's city and address. Configured bounding boxes give a geometric
//! fallback for companies with coordinates. The first matching weekday in
//! schedule order wins.

use std::sync::Arc;

use tracing::debug;

use crate::config::{LocationSchedule, ScheduleEntry};
use crate::models::{Company, RegionAssignment};

#[derive(Debug, Clone)]
pub struct RegionClassifier {
    schedule: Arc<LocationSchedule>,
    /// Lowercased keywords per schedule entry, same order as the schedule.
    keywords: Vec<Vec<String>>,
}

impl RegionClassifier {
    pub fn new(schedule: Arc<LocationSchedule>) -> Self {
        let keywords = schedule.days().iter().map(ScheduleEntry::keywords).collect();
        Self { schedule, keywords }
    }

    pub fn schedule(&self) -> &Arc<LocationSchedule> {
        &self.schedule
    }

    pub fn classify(&self, company: &Company) -> RegionAssignment {
        let city = company
            .address
            .as_ref()
            .map(|address| address.city.trim().to_lowercase())
            .filter(|city| !city.is_empty());
        let line = company.one_line_address().map(|line| line.to_lowercase());
        let point = company.coordinates();

        if line.is_none() && point.is_none() {
            debug!(company = %company.id, "no address or coordinates");
            return RegionAssignment::Unscheduled;
        }

        for (entry, keywords) in self.schedule.days().iter().zip(&self.keywords) {
            let by_keyword = keywords
                .iter()
                .any(|keyword| keyword_matches(keyword, city.as_deref(), line.as_deref()));
            if by_keyword {
                return RegionAssignment::Scheduled(entry.weekday);
            }
        }

        if let Some(point) = point {
            for entry in self.schedule.days() {
                if entry.bounds.iter().any(|bounds| bounds.contains(point)) {
                    return RegionAssignment::Scheduled(entry.weekday);
                }
            }
        }

        match self.schedule.fallback_day() {
            Some(day) => RegionAssignment::Scheduled(day),
            None => RegionAssignment::Unscheduled,
        }
    }

    pub fn classify_all(&self, companies: &[Company]) -> Vec<RegionAssignment> {
        companies.iter().map(|company| self.classify(company)).collect()
    }
}

fn keyword_matches(keyword: &str, city: Option<&str>, line: Option<&str>) -> bool {
    if let Some(city) = city {
        if city.contains(keyword) || keyword.contains(city) {
            return true;
        }
    }
    line.is_some_and(|line| line.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RegionBounds, ScheduleEntry};
    use crate::models::{Address, Weekday};

    fn schedule(fallback: Option<Weekday>) -> Arc<LocationSchedule> {
        let days = vec![
            ScheduleEntry::new(Weekday::Monday, &["Waukesha", "West Bend"]),
            ScheduleEntry::new(Weekday::Tuesday, &["Kenosha/Racine"]),
            ScheduleEntry::new(Weekday::Wednesday, &["Madison"]).with_bounds(RegionBounds {
                region: "Madison".to_string(),
                min_lat: 42.95,
                max_lat: 43.20,
                min_lng: -89.60,
                max_lng: -89.20,
            }),
            ScheduleEntry::followup(Weekday::Thursday),
            ScheduleEntry::followup(Weekday::Friday),
        ];
        Arc::new(LocationSchedule::new(days, fallback).unwrap())
    }

    fn at(city: &str, street: &str) -> Company {
        Company::new(city, city).with_address(Address {
            street: street.to_string(),
            city: city.to_string(),
            state: "WI".to_string(),
            zip: String::new(),
            country: "USA".to_string(),
        })
    }

    #[test]
    fn test_city_keyword_is_case_insensitive() {
        let classifier = RegionClassifier::new(schedule(None));
        assert_eq!(
            classifier.classify(&at("WAUKESHA", "1 Main St")),
            RegionAssignment::Scheduled(Weekday::Monday)
        );
    }

    #[test]
    fn test_slash_separated_region_matches_each_part() {
        let classifier = RegionClassifier::new(schedule(None));
        assert_eq!(
            classifier.classify(&at("Racine", "")),
            RegionAssignment::Scheduled(Weekday::Tuesday)
        );
        assert_eq!(
            classifier.classify(&at("Kenosha", "")),
            RegionAssignment::Scheduled(Weekday::Tuesday)
        );
    }

    #[test]
    fn test_earliest_weekday_wins_ties() {
        let classifier = RegionClassifier::new(schedule(None));
        // City names Tuesday's region, street names Monday's.
        let company = at("Racine", "400 Waukesha Rd");
        assert_eq!(classifier.classify(&company), RegionAssignment::Scheduled(Weekday::Monday));
    }

    #[test]
    fn test_bounds_fallback_for_coordinates() {
        let classifier = RegionClassifier::new(schedule(None));
        let company = at("Fitchburg", "").with_location(43.02, -89.42);
        assert_eq!(
            classifier.classify(&company),
            RegionAssignment::Scheduled(Weekday::Wednesday)
        );
    }

    #[test]
    fn test_no_match_without_fallback_day_is_unscheduled() {
        let classifier = RegionClassifier::new(schedule(None));
        assert_eq!(classifier.classify(&at("Green Bay", "")), RegionAssignment::Unscheduled);
    }

    #[test]
    fn test_no_match_goes_to_fallback_day() {
        let classifier = RegionClassifier::new(schedule(Some(Weekday::Thursday)));
        assert_eq!(
            classifier.classify(&at("Green Bay", "")),
            RegionAssignment::Scheduled(Weekday::Thursday)
        );
    }

    #[test]
    fn test_nothing_to_match_is_unscheduled_even_with_fallback() {
        let classifier = RegionClassifier::new(schedule(Some(Weekday::Thursday)));
        assert_eq!(
            classifier.classify(&Company::new("x", "Ghost LLC")),
            RegionAssignment::Unscheduled
        );
        assert_eq!(classifier.classify(&at("", "")), RegionAssignment::Unscheduled);
    }

    #[test]
    fn test_followup_day_regions_match_in_order() {
        let mut friday = ScheduleEntry::followup(Weekday::Friday);
        friday.region_names.push("Oconomowoc".to_string());
        let days = vec![
            ScheduleEntry::new(Weekday::Monday, &["Waukesha"]),
            ScheduleEntry::new(Weekday::Tuesday, &["Racine"]),
            ScheduleEntry::new(Weekday::Wednesday, &["Madison"]),
            ScheduleEntry::followup(Weekday::Thursday),
            friday,
        ];
        let schedule = Arc::new(LocationSchedule::new(days, Some(Weekday::Thursday)).unwrap());
        let classifier = RegionClassifier::new(schedule);
        assert_eq!(
            classifier.classify(&at("Oconomowoc", "")),
            RegionAssignment::Scheduled(Weekday::Friday)
        );
    }
}
