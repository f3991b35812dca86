//! Route Risk Profiler Adapter

use serde::Deserialize;
use serde_json::Value;
use shared::fanout::join_all_ordered;
use shared::types::{Coordinate, CoordinateError, Path, RouteProfile};
use std::sync::Arc;

use crate::collaborators::{RiskScorer, RouteProfiler};
use crate::error::RiskError;

/// Extract the `path` of every route descriptor.
///
/// The input must be an array of objects, each with a non-empty `path` array
/// of `[lng, lat]` positions. A trailing altitude is ignored, and so is any
/// other field on a descriptor.
pub fn parse_routes(input: &Value) -> Result<Vec<Path>, RiskError> {
    let Value::Array(routes) = input else {
        return Err(RiskError::InvalidRouteInput);
    };

    routes
        .iter()
        .map(|route| {
            let raw = route
                .as_object()
                .and_then(|fields| fields.get("path"))
                .ok_or(RiskError::InvalidRouteInput)?;
            let positions =
                Vec::<Vec<f64>>::deserialize(raw).map_err(|_| RiskError::InvalidRouteInput)?;
            if positions.is_empty() {
                return Err(RiskError::InvalidRouteInput);
            }

            let points = positions
                .iter()
                .map(|p| match Coordinate::from_position(p) {
                    Err(CoordinateError::ShortPosition(_)) => Err(RiskError::InvalidRouteInput),
                    other => other.map_err(RiskError::from),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Path::new(points))
        })
        .collect()
}

#[derive(Clone)]
pub struct RouteRiskProfiler {
    scorer: Arc<dyn RiskScorer>,
    profiler: Arc<dyn RouteProfiler>,
}

impl RouteRiskProfiler {
    pub fn new(scorer: Arc<dyn RiskScorer>, profiler: Arc<dyn RouteProfiler>) -> Self {
        Self { scorer, profiler }
    }

    /// One profile per path, in input order.
    ///
    /// All risk arrays are requested concurrently and reduced only once every
    /// one of them has resolved. The first scoring failure fails the batch.
    pub async fn profile_paths(&self, paths: &[Path]) -> Result<Vec<RouteProfile>, RiskError> {
        let risk_arrays =
            join_all_ordered(paths.iter().map(|path| self.scorer.score_coordinates(path.points()))).await?;

        Ok(risk_arrays
            .iter()
            .map(|risks| self.profiler.profile(risks))
            .collect())
    }

    pub async fn profile_routes_json(&self, input: &Value) -> Result<Vec<RouteProfile>, RiskError> {
        let paths = parse_routes(input)?;
        self.profile_paths(&paths).await
    }
}
