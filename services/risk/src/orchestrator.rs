//! Risk-Weighted Path Orchestrator
//!
//! origin/destination -> weighted searches (deduplicated) -> trip service
//! realization -> risk profiles -> merged routes.

use shared::logger::redact_coordinate;
use shared::types::{Coordinate, MergedRoute, RealizedRoute, RouteProfile, RouteRequest, WeightedCandidate};
use std::sync::Arc;

use crate::collaborators::{RouteRealizer, TripServiceClient};
use crate::config::{Config, TripEndpoint};
use crate::dedup::WeightedPathSearch;
use crate::error::RiskError;
use crate::profiler::RouteRiskProfiler;

/// Combine index-aligned candidates, realized routes and profiles.
///
/// Callers guarantee the three slices have equal length.
pub fn merge_routes(
    candidates: &[WeightedCandidate],
    realized: Vec<RealizedRoute>,
    profiles: Vec<RouteProfile>,
) -> Vec<MergedRoute> {
    candidates
        .iter()
        .zip(realized)
        .zip(profiles)
        .map(|((candidate, realized), profile)| MergedRoute {
            profile,
            risk_weight: candidate.candidate.risk_weight,
            search_weights: candidate.search_weights.clone(),
            route: realized.route,
            path: realized.path,
        })
        .collect()
}

pub struct PathOrchestrator {
    search: WeightedPathSearch,
    profiler: RouteRiskProfiler,
    realizer: Option<Arc<dyn RouteRealizer>>,
}

impl PathOrchestrator {
    /// Without a realizer every path request fails with the configuration
    /// fault.
    pub fn new(
        search: WeightedPathSearch,
        profiler: RouteRiskProfiler,
        realizer: Option<Arc<dyn RouteRealizer>>,
    ) -> Self {
        Self {
            search,
            profiler,
            realizer,
        }
    }

    /// Wire the trip service client from configuration.
    pub fn from_config(search: WeightedPathSearch, profiler: RouteRiskProfiler, config: &Config) -> Self {
        let realizer = match &config.trip_endpoint {
            TripEndpoint::Configured(url) => Some(Arc::new(TripServiceClient::new(
                url.clone(),
                config.trip_timeout,
            )) as Arc<dyn RouteRealizer>),
            TripEndpoint::Unconfigured => None,
        };

        Self::new(search, profiler, realizer)
    }

    pub fn is_configured(&self) -> bool {
        self.realizer.is_some()
    }

    fn realizer(&self) -> Result<&Arc<dyn RouteRealizer>, RiskError> {
        self.realizer.as_ref().ok_or(RiskError::MissingTripServiceUrl)
    }

    /// Fails fast when no trip service is configured.
    pub fn ensure_configured(&self) -> Result<(), RiskError> {
        self.realizer().map(|_| ())
    }

    pub async fn find_path(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Vec<MergedRoute>, RiskError> {
        let realizer = self.realizer()?;

        let candidates = self.search.search(origin, destination).await?;
        tracing::debug!(
            origin = %redact_coordinate(&origin),
            destination = %redact_coordinate(&destination),
            candidates = candidates.len(),
            "weighted search finished"
        );

        let requests: Vec<RouteRequest> = candidates
            .iter()
            .map(|c| RouteRequest::from(&c.candidate))
            .collect();

        let realized = realizer.realize(&requests).await?;
        if realized.len() != requests.len() {
            tracing::warn!(
                expected = requests.len(),
                actual = realized.len(),
                "trip service broke positional alignment"
            );
            return Err(RiskError::RealizationMismatch {
                expected: requests.len(),
                actual: realized.len(),
            });
        }

        let paths: Vec<_> = realized.iter().map(|r| r.path.clone()).collect();
        let profiles = self.profiler.profile_paths(&paths).await?;

        Ok(merge_routes(&candidates, realized, profiles))
    }
}
