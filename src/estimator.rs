//! Distance estimation with a live service and a straight-line fallback.
//!
//! Every lookup first goes to the configured [`DistanceService`]. Any failure
//! (network, quota, no route) is logged and answered by the
//! [`HaversineEstimator`] instead; the result's [`Provenance`] tells the two
//! apart. A pair with no usable coordinates gets no estimate at all and is
//! treated as unreachable by callers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::PlannerError;
use crate::haversine::HaversineEstimator;
use crate::models::{Coordinates, Provenance, TravelEstimate};
use crate::traits::DistanceService;

/// Default cap on concurrent lookups against the live service.
pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 4;

/// Shared flag for abandoning an optimization run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub struct DistanceEstimator {
    service: Option<Arc<dyn DistanceService>>,
    fallback: HaversineEstimator,
    max_concurrent_lookups: usize,
}

impl std::fmt::Debug for DistanceEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistanceEstimator")
            .field("service", &self.service.is_some())
            .field("fallback", &self.fallback)
            .field("max_concurrent_lookups", &self.max_concurrent_lookups)
            .finish()
    }
}

impl DistanceEstimator {
    /// Estimator that only uses the straight-line approximation.
    pub fn fallback_only(fallback: HaversineEstimator) -> Self {
        Self {
            service: None,
            fallback,
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
        }
    }

    pub fn with_service(service: Arc<dyn DistanceService>, fallback: HaversineEstimator) -> Self {
        Self {
            service: Some(service),
            fallback,
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
        }
    }

    pub fn max_concurrent_lookups(mut self, cap: usize) -> Self {
        self.max_concurrent_lookups = cap.max(1);
        self
    }

    /// Estimate one leg. `None` means unreachable.
    pub fn estimate(
        &self,
        from: Option<Coordinates>,
        to: Option<Coordinates>,
    ) -> Option<TravelEstimate> {
        let (from, to) = (from?, to?);

        if let Some(service) = &self.service {
            match service.leg(from, to) {
                Ok(leg) => {
                    return Some(TravelEstimate {
                        distance_km: leg.distance_km,
                        duration_secs: leg.duration_secs,
                        provenance: Provenance::Service,
                    });
                }
                Err(err) => {
                    warn!(
                        ?from,
                        ?to,
                        error = %err,
                        "distance service failed, using straight-line estimate"
                    );
                }
            }
        }

        match self.fallback.leg(from, to) {
            Ok(leg) => Some(TravelEstimate {
                distance_km: leg.distance_km,
                duration_secs: leg.duration_secs,
                provenance: Provenance::Fallback,
            }),
            Err(err) => {
                debug!(?from, ?to, error = %err, "no estimate for pair");
                None
            }
        }
    }

    /// All ordered pairwise estimates for `points`.
    ///
    /// Lookups run on a pool of at most `max_concurrent_lookups` threads.
    /// Returns [`PlannerError::Cancelled`] if `cancel` fires before the
    /// matrix is complete.
    pub fn matrix(
        &self,
        points: &[Coordinates],
        cancel: &CancelToken,
    ) -> Result<DistanceMatrix, PlannerError> {
        let n = points.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (0..n).filter(move |j| *j != i).map(move |j| (i, j)))
            .collect();

        let lookup = |&(i, j): &(usize, usize)| -> Option<TravelEstimate> {
            if cancel.is_cancelled() {
                return None;
            }
            self.estimate(Some(points[i]), Some(points[j]))
        };

        let results: Vec<Option<TravelEstimate>> = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_concurrent_lookups)
            .build()
        {
            Ok(pool) => pool.install(|| pairs.par_iter().map(lookup).collect()),
            Err(err) => {
                warn!(error = %err, "lookup pool unavailable, running sequentially");
                pairs.iter().map(lookup).collect()
            }
        };

        if cancel.is_cancelled() {
            return Err(PlannerError::Cancelled);
        }

        let mut cells = vec![None; n * n];
        for i in 0..n {
            cells[i * n + i] = Some(TravelEstimate {
                distance_km: 0.0,
                duration_secs: 0.0,
                provenance: Provenance::Fallback,
            });
        }
        for ((i, j), estimate) in pairs.into_iter().zip(results) {
            cells[i * n + j] = estimate;
        }

        Ok(DistanceMatrix { size: n, cells })
    }
}

/// Dense pairwise estimates indexed by point order.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    cells: Vec<Option<TravelEstimate>>,
}

impl DistanceMatrix {
    /// Row-major cells; `cells.len()` must be `size * size`.
    #[cfg(test)]
    pub(crate) fn from_cells(size: usize, cells: Vec<Option<TravelEstimate>>) -> Self {
        assert_eq!(cells.len(), size * size, "matrix cells must be square");
        Self { size, cells }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get(&self, from: usize, to: usize) -> Option<TravelEstimate> {
        self.cells.get(from * self.size + to).copied().flatten()
    }

    /// Distance in km, infinite when unreachable.
    pub fn distance_km(&self, from: usize, to: usize) -> f64 {
        self.get(from, to).map_or(f64::INFINITY, |estimate| estimate.distance_km)
    }
}
