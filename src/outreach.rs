//! Relative priority of weekdays for outreach.

use std::collections::BTreeMap;

use crate::models::Weekday;

/// Stock response-rate priorities per working day.
pub const DEFAULT_DAY_PRIORITIES: [(Weekday, f64); 5] = [
    (Weekday::Monday, 0.7),
    (Weekday::Tuesday, 0.9),
    (Weekday::Wednesday, 0.8),
    (Weekday::Thursday, 0.7),
    (Weekday::Friday, 0.5),
];

/// Historical response rates when available, the stock priorities otherwise.
pub fn suggest_outreach_days(
    historical: Option<&BTreeMap<Weekday, f64>>,
) -> BTreeMap<Weekday, f64> {
    match historical {
        Some(rates) if !rates.is_empty() => rates.clone(),
        _ => DEFAULT_DAY_PRIORITIES.into_iter().collect(),
    }
}

/// Weekdays ordered from highest to lowest priority; ties keep weekday order.
pub fn ranked_days(priorities: &BTreeMap<Weekday, f64>) -> Vec<Weekday> {
    let mut days: Vec<(Weekday, f64)> =
        priorities.iter().map(|(day, rate)| (*day, *rate)).collect();
    days.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    days.into_iter().map(|(day, _)| day).collect()
}
