//! Grouping of companies into per-weekday clusters, and density-based
//! proximity clusters for spotting dense pockets independent of the schedule.

use std::collections::{BTreeMap, VecDeque};

use tracing::{info, warn};

use crate::models::{Company, Coordinates, DayCluster, RegionAssignment, Weekday};

/// Neighborhood radius in degrees of latitude/longitude.
pub const DEFAULT_PROXIMITY_EPS_DEG: f64 = 0.05;
/// Companies (including itself) a company needs within the radius to seed a
/// cluster.
pub const DEFAULT_MIN_POINTS: usize = 2;

/// Result of [`cluster_by_day`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clustering {
    /// One cluster per weekday with at least one company, Monday first.
    pub days: Vec<DayCluster>,
    pub unscheduled: Vec<Company>,
}

/// Partition companies by their assignment. No cluster size limit is applied.
///
/// `assignments` must be parallel to `companies`.
pub fn cluster_by_day(companies: &[Company], assignments: &[RegionAssignment]) -> Clustering {
    debug_assert_eq!(companies.len(), assignments.len());

    let mut by_day: BTreeMap<Weekday, Vec<Company>> = BTreeMap::new();
    let mut unscheduled = Vec::new();

    for (company, assignment) in companies.iter().zip(assignments) {
        match assignment {
            RegionAssignment::Scheduled(day) => {
                by_day.entry(*day).or_default().push(company.clone())
            }
            RegionAssignment::Unscheduled => unscheduled.push(company.clone()),
        }
    }

    let days = by_day
        .into_iter()
        .map(|(weekday, companies)| DayCluster { weekday, companies })
        .collect();

    Clustering { days, unscheduled }
}

/// Result of [`cluster_by_proximity`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProximityClustering {
    /// Dense groups in discovery order. Members keep input order.
    pub clusters: Vec<Vec<Company>>,
    /// Located companies with no dense neighborhood.
    pub noise: Vec<Company>,
    /// Companies without usable coordinates.
    pub unlocated: Vec<Company>,
}

impl ProximityClustering {
    /// Display label of each bucket: `Cluster_0`, `Cluster_1`, ... then
    /// `Other` for noise when present.
    pub fn labelled(&self) -> Vec<(String, &[Company])> {
        let mut buckets: Vec<(String, &[Company])> = self
            .clusters
            .iter()
            .enumerate()
            .map(|(label, members)| (format!("Cluster_{label}"), members.as_slice()))
            .collect();
        if !self.noise.is_empty() {
            buckets.push(("Other".to_string(), self.noise.as_slice()));
        }
        buckets
    }
}

/// DBSCAN over raw latitude/longitude.
///
/// Two companies are neighbors when their Euclidean distance in degrees is at
/// most `eps_deg`. A company with at least `min_points` neighbors (itself
/// included) is a core point; clusters grow from core points and absorb the
/// border points they reach. Scanning follows input order, so the result is
/// deterministic.
pub fn cluster_by_proximity(
    companies: &[Company],
    eps_deg: f64,
    min_points: usize,
) -> ProximityClustering {
    let mut located: Vec<(usize, Coordinates)> = Vec::new();
    let mut unlocated = Vec::new();
    for (index, company) in companies.iter().enumerate() {
        match company.coordinates() {
            Some(point) => located.push((index, point)),
            None => unlocated.push(company.clone()),
        }
    }

    if located.is_empty() {
        if !companies.is_empty() {
            warn!(companies = companies.len(), "no located companies to cluster");
        }
        return ProximityClustering {
            unlocated,
            ..Default::default()
        };
    }

    let points: Vec<Coordinates> = located.iter().map(|(_, point)| *point).collect();
    let labels = dbscan(&points, eps_deg, min_points);

    let cluster_count = labels.iter().flatten().max().map_or(0, |max| max + 1);
    let mut clusters: Vec<Vec<Company>> = vec![Vec::new(); cluster_count];
    let mut noise = Vec::new();
    for ((index, _), label) in located.iter().zip(&labels) {
        let company = companies[*index].clone();
        match label {
            Some(label) => clusters[*label].push(company),
            None => noise.push(company),
        }
    }

    info!(
        located = points.len(),
        clusters = clusters.len(),
        noise = noise.len(),
        unlocated = unlocated.len(),
        "proximity clustering done"
    );

    ProximityClustering {
        clusters,
        noise,
        unlocated,
    }
}

/// Cluster label per point, `None` for noise.
fn dbscan(points: &[Coordinates], eps_deg: f64, min_points: usize) -> Vec<Option<usize>> {
    let neighbors = |i: usize| -> Vec<usize> {
        let (lat, lng) = points[i];
        points
            .iter()
            .enumerate()
            .filter(|(_, (other_lat, other_lng))| {
                (lat - other_lat).hypot(lng - other_lng) <= eps_deg
            })
            .map(|(j, _)| j)
            .collect()
    };

    let mut labels: Vec<Option<usize>> = vec![None; points.len()];
    let mut visited = vec![false; points.len()];
    let mut next_label = 0;

    for start in 0..points.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;

        let seeds = neighbors(start);
        if seeds.len() < min_points {
            continue;
        }

        let label = next_label;
        next_label += 1;
        labels[start] = Some(label);

        let mut queue: VecDeque<usize> = seeds.into_iter().collect();
        while let Some(point) = queue.pop_front() {
            if labels[point].is_none() {
                labels[point] = Some(label);
            }
            if visited[point] {
                continue;
            }
            visited[point] = true;

            let reach = neighbors(point);
            if reach.len() >= min_points {
                queue.extend(reach.into_iter().filter(|&other| !visited[other]));
            }
        }
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partitions_and_keeps_unscheduled() {
        let companies = vec![
            Company::new("a", "A"),
            Company::new("b", "B"),
            Company::new("c", "C"),
            Company::new("d", "D"),
        ];
        let assignments = vec![
            RegionAssignment::Scheduled(Weekday::Tuesday),
            RegionAssignment::Unscheduled,
            RegionAssignment::Scheduled(Weekday::Monday),
            RegionAssignment::Scheduled(Weekday::Tuesday),
        ];

        let clustering = cluster_by_day(&companies, &assignments);

        let days: Vec<Weekday> = clustering.days.iter().map(|cluster| cluster.weekday).collect();
        assert_eq!(days, vec![Weekday::Monday, Weekday::Tuesday]);

        let tuesday: Vec<&str> =
            clustering.days[1].companies.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(tuesday, vec!["a", "d"]);

        assert_eq!(clustering.unscheduled.len(), 1);
        assert_eq!(clustering.unscheduled[0].id.as_str(), "b");
    }

    fn at(id: &str, lat: f64, lng: f64) -> Company {
        Company::new(id, id).with_location(lat, lng)
    }

    fn member_ids(companies: &[Company]) -> Vec<&str> {
        companies.iter().map(|company| company.id.as_str()).collect()
    }

    #[test]
    fn test_nearby_companies_form_clusters() {
        let companies = vec![
            at("waukesha-1", 43.011, -88.231),
            at("kenosha-1", 42.584, -87.821),
            at("waukesha-2", 43.020, -88.240),
            at("green-bay", 44.513, -88.013),
            at("kenosha-2", 42.590, -87.830),
            Company::new("nowhere", "Nowhere"),
        ];

        let result =
            cluster_by_proximity(&companies, DEFAULT_PROXIMITY_EPS_DEG, DEFAULT_MIN_POINTS);

        assert_eq!(result.clusters.len(), 2);
        assert_eq!(member_ids(&result.clusters[0]), vec!["waukesha-1", "waukesha-2"]);
        assert_eq!(member_ids(&result.clusters[1]), vec!["kenosha-1", "kenosha-2"]);
        assert_eq!(member_ids(&result.noise), vec!["green-bay"]);
        assert_eq!(member_ids(&result.unlocated), vec!["nowhere"]);

        let labels: Vec<String> = result.labelled().into_iter().map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["Cluster_0", "Cluster_1", "Other"]);
    }

    #[test]
    fn test_chain_of_neighbors_joins_one_cluster() {
        // Ends are 0.08 apart; each hop is 0.04.
        let companies = vec![
            at("a", 43.00, -88.0),
            at("c", 43.08, -88.0),
            at("b", 43.04, -88.0),
        ];

        let result =
            cluster_by_proximity(&companies, DEFAULT_PROXIMITY_EPS_DEG, DEFAULT_MIN_POINTS);

        assert_eq!(result.clusters.len(), 1);
        assert_eq!(member_ids(&result.clusters[0]), vec!["a", "c", "b"]);
        assert!(result.noise.is_empty());
    }

    #[test]
    fn test_border_points_join_but_do_not_expand() {
        // Only "mid" has four neighbors. "edge" is reached from it but is
        // not dense itself, so "far" beyond it stays noise.
        let companies = vec![
            at("up", 43.03, -88.040),
            at("mid", 43.00, -88.040),
            at("down", 42.97, -88.040),
            at("edge", 43.00, -88.085),
            at("far", 43.00, -88.125),
        ];

        let result = cluster_by_proximity(&companies, DEFAULT_PROXIMITY_EPS_DEG, 4);

        assert_eq!(result.clusters.len(), 1);
        assert_eq!(member_ids(&result.clusters[0]), vec!["up", "mid", "down", "edge"]);
        assert_eq!(member_ids(&result.noise), vec!["far"]);
    }

    #[test]
    fn test_single_point_clusters_when_min_points_is_one() {
        let companies = vec![at("solo", 43.0, -88.0)];
        let result = cluster_by_proximity(&companies, DEFAULT_PROXIMITY_EPS_DEG, 1);
        assert_eq!(result.clusters.len(), 1);
        assert!(result.noise.is_empty());
    }

    #[test]
    fn test_without_locations_everything_is_unlocated() {
        let companies = vec![Company::new("a", "A"), Company::new("b", "B")];
        let result =
            cluster_by_proximity(&companies, DEFAULT_PROXIMITY_EPS_DEG, DEFAULT_MIN_POINTS);
        assert!(result.clusters.is_empty());
        assert!(result.noise.is_empty());
        assert_eq!(result.unlocated.len(), 2);
        assert!(result.labelled().is_empty());
    }

    #[test]
    fn test_empty_input() {
        let clustering = cluster_by_day(&[], &[]);
        assert!(clustering.days.is_empty());
        assert!(clustering.unscheduled.is_empty());
    }
}
