//! Visiting order for a single day's cluster.
//!
//! Nearest-neighbor construction from the day's origin, with an optional
//! 2-opt pass. Ties in distance are broken by company id so identical input
//! always yields the identical order. Unreachable pairs count as infinitely
//! far; the heuristic still terminates and visits every routable company.

use tracing::{debug, info};

use crate::error::PlannerError;
use crate::estimator::{CancelToken, DistanceEstimator, DistanceMatrix};
use crate::models::{
    is_valid_coordinate, Company, CompanyId, Coordinates, Provenance, Route, Weekday,
};
use crate::polyline::Polyline;

#[derive(Debug, Clone)]
pub struct RouteOptions {
    /// Close the tour with a leg back to the starting point.
    pub return_to_origin: bool,
    /// Run 2-opt after nearest-neighbor construction.
    pub two_opt: bool,
    /// Maximum 2-opt passes.
    pub local_search_iterations: usize,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            return_to_origin: false,
            two_opt: false,
            local_search_iterations: 100,
        }
    }
}

/// Order `companies` for one day.
///
/// Starts at `origin` when given, otherwise at the first company with
/// coordinates. Companies without coordinates are appended to the end of
/// the order, in input order, and listed as unroutable.
pub fn optimize_route(
    weekday: Weekday,
    companies: &[Company],
    origin: Option<Coordinates>,
    estimator: &DistanceEstimator,
    options: &RouteOptions,
    cancel: &CancelToken,
) -> Result<Route, PlannerError> {
    let mut routable: Vec<usize> = Vec::new();
    let mut unroutable: Vec<usize> = Vec::new();
    let origin = origin.filter(|point| is_valid_coordinate(*point));

    let mut points: Vec<Coordinates> = origin.into_iter().collect();
    let offset = points.len();
    for (index, company) in companies.iter().enumerate() {
        match company.coordinates() {
            Some(point) => {
                routable.push(index);
                points.push(point);
            }
            None => unroutable.push(index),
        }
    }

    let unroutable_ids = unroutable.iter().map(|&i| companies[i].id.clone()).collect();

    if routable.is_empty() {
        debug!(%weekday, unroutable = unroutable.len(), "no routable companies");
        return Ok(Route {
            weekday,
            order: unroutable,
            total_distance_km: 0.0,
            total_duration_secs: 0.0,
            unroutable: unroutable_ids,
            fallback_legs: 0,
            unreachable_legs: 0,
            path: Polyline::new(points),
        });
    }

    let matrix = estimator.matrix(&points, cancel)?;
    let keys: Vec<&CompanyId> = routable.iter().map(|&i| &companies[i].id).collect();

    let origin_node = origin.map(|_| 0);
    let mut stops = nearest_neighbor(&matrix, origin_node, offset, &keys);

    let return_node = if options.return_to_origin {
        Some(origin_node.unwrap_or(stops[0]))
    } else {
        None
    };

    if options.two_opt {
        two_opt(&mut stops, origin_node, return_node, &matrix, options.local_search_iterations);
    }

    let mut full: Vec<usize> = origin_node.into_iter().collect();
    full.extend(&stops);
    full.extend(return_node);

    let totals = tally_legs(&full, &matrix);

    let mut order: Vec<usize> = stops.iter().map(|&node| routable[node - offset]).collect();
    order.extend(unroutable);

    info!(
        %weekday,
        stops = stops.len(),
        distance_km = totals.distance_km,
        fallback_legs = totals.fallback_legs,
        unreachable_legs = totals.unreachable_legs,
        "route optimized"
    );

    Ok(Route {
        weekday,
        order,
        total_distance_km: totals.distance_km,
        total_duration_secs: totals.duration_secs,
        unroutable: unroutable_ids,
        fallback_legs: totals.fallback_legs,
        unreachable_legs: totals.unreachable_legs,
        path: Polyline::new(full.iter().map(|&node| points[node]).collect()),
    })
}

#[derive(Debug, Default, PartialEq)]
struct LegTotals {
    distance_km: f64,
    duration_secs: f64,
    fallback_legs: usize,
    unreachable_legs: usize,
}

/// Sum the legs along `path`. Unreachable legs add nothing to the totals.
fn tally_legs(path: &[usize], matrix: &DistanceMatrix) -> LegTotals {
    let mut totals = LegTotals::default();
    for pair in path.windows(2) {
        match matrix.get(pair[0], pair[1]) {
            Some(estimate) => {
                totals.distance_km += estimate.distance_km;
                totals.duration_secs += estimate.duration_secs;
                if estimate.provenance == Provenance::Fallback {
                    totals.fallback_legs += 1;
                }
            }
            None => totals.unreachable_legs += 1,
        }
    }
    totals
}

/// Greedy construction. Returns company nodes in visiting order.
///
/// Without an origin the first company node is the fixed start. `keys`
/// holds the tie-break key of each company node, starting at `first_company`.
fn nearest_neighbor(
    matrix: &DistanceMatrix,
    origin: Option<usize>,
    first_company: usize,
    keys: &[&CompanyId],
) -> Vec<usize> {
    let key = |node: usize| keys[node - first_company];

    let mut remaining: Vec<usize> = (first_company..matrix.len()).collect();
    let mut stops = Vec::with_capacity(remaining.len());

    let mut current = match origin {
        Some(node) => node,
        None => {
            let start = remaining.remove(0);
            stops.push(start);
            start
        }
    };

    while !remaining.is_empty() {
        let next = remaining
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                matrix
                    .distance_km(current, **a)
                    .total_cmp(&matrix.distance_km(current, **b))
                    .then_with(|| key(**a).cmp(key(**b)))
                    .then_with(|| a.cmp(b))
            })
            .map(|(position, _)| position);

        let Some(position) = next else {
            break;
        };
        current = remaining.remove(position);
        stops.push(current);
    }

    stops
}

fn path_cost(
    stops: &[usize],
    origin: Option<usize>,
    return_to: Option<usize>,
    matrix: &DistanceMatrix,
) -> f64 {
    let mut cost = 0.0;
    let mut previous = origin;
    for &node in stops.iter().chain(return_to.iter()) {
        if let Some(from) = previous {
            cost += matrix.distance_km(from, node);
        }
        previous = Some(node);
    }
    cost
}

/// 2-opt: reverse segments while that shortens the path.
fn two_opt(
    stops: &mut [usize],
    origin: Option<usize>,
    return_to: Option<usize>,
    matrix: &DistanceMatrix,
    iterations: usize,
) {
    // Without an origin the first stop is the start and stays put.
    let first_movable = if origin.is_none() { 1 } else { 0 };
    let n = stops.len();
    if n < first_movable + 2 {
        return;
    }

    for _ in 0..iterations {
        let current = path_cost(stops, origin, return_to, matrix);
        let mut improved = false;

        'search: for i in first_movable..n - 1 {
            for j in i + 1..n {
                let mut candidate = stops.to_vec();
                candidate[i..=j].reverse();
                if path_cost(&candidate, origin, return_to, matrix) < current - 1e-9 {
                    stops[i..=j].reverse();
                    improved = true;
                    break 'search;
                }
            }
        }

        if !improved {
            break;
        }
    }
}
