//! Weighted Path Deduplicator
//!
//! Runs one path search per risk weight and folds results with identical
//! geometry into a single candidate that remembers every weight behind it.

use shared::fanout::join_all_ordered;
use shared::types::{CandidatePath, Coordinate, RiskWeight, WeightedCandidate};
use std::sync::Arc;

use crate::collaborators::Pathfinder;
use crate::error::RiskError;

/// Collapse candidates whose paths are structurally equal.
///
/// Only geometry is compared. The first candidate of each geometry survives
/// with its own `risk_weight`; a later duplicate only adds its search weight
/// to `search_weights`, and its `risk_weight` is dropped even when it differs.
/// Input order is kept.
pub fn dedupe_candidates<I>(results: I) -> Vec<WeightedCandidate>
where
    I: IntoIterator<Item = (RiskWeight, CandidatePath)>,
{
    let mut kept: Vec<WeightedCandidate> = Vec::new();

    for (weight, candidate) in results {
        match kept
            .iter_mut()
            .find(|k| k.candidate.path.same_geometry(&candidate.path))
        {
            Some(existing) => {
                if existing.candidate.risk_weight != candidate.risk_weight {
                    tracing::debug!(
                        kept = existing.candidate.risk_weight,
                        dropped = candidate.risk_weight,
                        weight = %weight,
                        "collapsed candidates disagree on attributed risk"
                    );
                }
                existing.search_weights.push(weight);
            }
            None => kept.push(WeightedCandidate {
                candidate,
                search_weights: vec![weight],
            }),
        }
    }

    kept
}

#[derive(Clone)]
pub struct WeightedPathSearch {
    pathfinder: Arc<dyn Pathfinder>,
    low: RiskWeight,
    high: RiskWeight,
}

impl WeightedPathSearch {
    pub fn new(pathfinder: Arc<dyn Pathfinder>) -> Self {
        Self::with_weights(pathfinder, RiskWeight::LOW, RiskWeight::HIGH)
    }

    pub fn with_weights(pathfinder: Arc<dyn Pathfinder>, low: RiskWeight, high: RiskWeight) -> Self {
        Self { pathfinder, low, high }
    }

    pub fn weights(&self) -> [RiskWeight; 2] {
        [self.low, self.high]
    }

    /// Search under both weights concurrently: one candidate when the paths
    /// match, otherwise two with the low-weight one first.
    pub async fn search(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Vec<WeightedCandidate>, RiskError> {
        let weights = self.weights();
        let candidates = join_all_ordered(
            weights
                .iter()
                .map(|w| self.pathfinder.search(origin, destination, *w)),
        )
        .await?;

        Ok(dedupe_candidates(weights.into_iter().zip(candidates)))
    }
}
