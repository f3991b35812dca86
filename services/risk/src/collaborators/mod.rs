//! Seams to the systems the risk pipeline delegates to.
//!
//! The pipeline only combines what these return; how a score is computed or a
//! path is searched lives behind the traits. One reference implementation of
//! each ships with the service so the binary runs on its own.

pub mod grid;
pub mod hotspot;
pub mod summary;
pub mod trip;

use async_trait::async_trait;
use shared::fanout::join_all_ordered;
use shared::types::{
    CandidatePath, Coordinate, GeoFeature, RealizedRoute, RiskScore, RiskWeight, RouteProfile,
    RouteRequest,
};

use crate::error::RiskError;

pub use grid::GridPathfinder;
pub use hotspot::{Hotspot, HotspotRiskScorer};
pub use summary::SummaryProfiler;
pub use trip::TripServiceClient;

#[async_trait]
pub trait RiskScorer: Send + Sync {
    async fn score_coordinate(&self, coordinate: Coordinate) -> Result<RiskScore, RiskError>;

    /// One score per coordinate, in input order.
    async fn score_coordinates(&self, coordinates: &[Coordinate]) -> Result<Vec<RiskScore>, RiskError> {
        join_all_ordered(coordinates.iter().map(|c| self.score_coordinate(*c))).await
    }

    async fn decorate_feature(&self, feature: GeoFeature) -> Result<GeoFeature, RiskError> {
        let risk = self.score_coordinate(feature.coordinate()).await?;
        Ok(feature.with_risk(risk))
    }
}

#[async_trait]
pub trait Pathfinder: Send + Sync {
    async fn search(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        weight: RiskWeight,
    ) -> Result<CandidatePath, RiskError>;
}

/// Reduces a route's per-coordinate risk array to route-level statistics.
pub trait RouteProfiler: Send + Sync {
    fn profile(&self, risks: &[RiskScore]) -> RouteProfile;
}

/// Turns abstract paths into concrete routable ones.
///
/// Must return exactly one route per request, positionally aligned.
#[async_trait]
pub trait RouteRealizer: Send + Sync {
    async fn realize(&self, requests: &[RouteRequest]) -> Result<Vec<RealizedRoute>, RiskError>;
}
