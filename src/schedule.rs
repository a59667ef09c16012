//! Weekly plan assembly.
//!
//! [`WeeklyPlanner`] runs the whole pipeline for one request: classify each
//! company against the schedule, cluster by weekday, order every day's
//! cluster, then assemble the plan. Nothing is cached between runs.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use crate::cluster::{cluster_by_day, Clustering};
use crate::config::LocationSchedule;
use crate::error::PlannerError;
use crate::estimator::{CancelToken, DistanceEstimator};
use crate::models::{
    Company, CompanyId, CompanyRef, Coordinates, DayCluster, DayPlan, Route, WeeklyPlan,
};
use crate::region::RegionClassifier;
use crate::route::{optimize_route, RouteOptions};
use crate::traits::CompanyStore;

#[derive(Debug, Clone, Default)]
pub struct PlannerOptions {
    /// Start point for days whose schedule entry has no origin of its own.
    /// Without either, a day starts at its first company.
    pub origin: Option<Coordinates>,
    pub route: RouteOptions,
}

#[derive(Debug, Clone)]
pub struct WeeklyPlanner {
    classifier: RegionClassifier,
    estimator: DistanceEstimator,
    options: PlannerOptions,
}

impl WeeklyPlanner {
    pub fn new(
        schedule: Arc<LocationSchedule>,
        estimator: DistanceEstimator,
        options: PlannerOptions,
    ) -> Self {
        Self {
            classifier: RegionClassifier::new(schedule),
            estimator,
            options,
        }
    }

    pub fn classifier(&self) -> &RegionClassifier {
        &self.classifier
    }

    /// Plan for a set of company ids looked up in `store`.
    ///
    /// Ids are treated as a set; duplicates collapse and input order does
    /// not affect the result.
    pub fn optimize<S>(
        &self,
        store: &S,
        company_ids: &[CompanyId],
        cancel: &CancelToken,
    ) -> Result<WeeklyPlan, PlannerError>
    where
        S: CompanyStore + ?Sized,
    {
        let ids: BTreeSet<&CompanyId> = company_ids.iter().collect();
        if ids.is_empty() {
            return Err(PlannerError::EmptySelection);
        }

        let mut companies = Vec::with_capacity(ids.len());
        for id in ids {
            let company = store.get(id)?.ok_or_else(|| PlannerError::UnknownCompany(id.clone()))?;
            companies.push(company);
        }

        self.plan(&companies, cancel)
    }

    /// Plan for companies already in hand. Cluster discovery order follows
    /// the slice order.
    pub fn plan(
        &self,
        companies: &[Company],
        cancel: &CancelToken,
    ) -> Result<WeeklyPlan, PlannerError> {
        if companies.is_empty() {
            return Err(PlannerError::EmptySelection);
        }

        let assignments = self.classifier.classify_all(companies);
        let Clustering { days, unscheduled } = cluster_by_day(companies, &assignments);

        info!(
            companies = companies.len(),
            days = days.len(),
            unscheduled = unscheduled.len(),
            "companies classified"
        );

        let mut optimized = Vec::with_capacity(days.len());
        for cluster in days {
            if cancel.is_cancelled() {
                return Err(PlannerError::Cancelled);
            }
            let origin = self.origin_for(&cluster);
            let route = optimize_route(
                cluster.weekday,
                &cluster.companies,
                origin,
                &self.estimator,
                &self.options.route,
                cancel,
            )?;
            optimized.push((apply_order(cluster, &route), route));
        }

        Ok(assemble(optimized, &unscheduled))
    }

    fn origin_for(&self, cluster: &DayCluster) -> Option<Coordinates> {
        self.classifier
            .schedule()
            .entry(cluster.weekday)
            .and_then(|entry| entry.origin)
            .map(|origin| origin.coordinates())
            .or(self.options.origin)
    }
}

/// Reorder a cluster's companies to match its route.
pub fn apply_order(cluster: DayCluster, route: &Route) -> DayCluster {
    let DayCluster { weekday, companies } = cluster;
    let mut slots: Vec<Option<Company>> = companies.into_iter().map(Some).collect();
    let companies = route
        .order
        .iter()
        .filter_map(|&index| slots.get_mut(index).and_then(Option::take))
        .collect();
    DayCluster { weekday, companies }
}

/// Combine optimized clusters and the unscheduled bucket into a plan.
pub fn assemble(days: Vec<(DayCluster, Route)>, unscheduled: &[Company]) -> WeeklyPlan {
    let mut days: Vec<DayPlan> = days
        .into_iter()
        .map(|(cluster, route)| DayPlan {
            weekday: cluster.weekday,
            companies: cluster.companies.iter().map(CompanyRef::from).collect(),
            total_distance_km: route.total_distance_km,
            total_duration_secs: route.total_duration_secs,
            unroutable: route.unroutable,
            approximate: route.fallback_legs > 0,
            straight_line_km: route.path.straight_line_km(),
            map_bounds: route.path.bounds(),
            path: route.path,
        })
        .collect();
    days.sort_by_key(|day| day.weekday);

    WeeklyPlan {
        days,
        unscheduled: unscheduled.iter().map(CompanyRef::from).collect(),
    }
}
