use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::types::{Coordinate, RiskScore};

use super::RiskScorer;
use crate::error::RiskError;

/// A circular area of elevated risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub lng: f64,
    pub lat: f64,
    pub radius_meters: f64,
    pub intensity: f64,
}

#[derive(Debug, Clone, Copy)]
struct Area {
    center: Coordinate,
    radius_m: f64,
    intensity: f64,
}

/// Risk as a sum of Gaussian falloffs around known hotspots:
/// `intensity * exp(-(d / radius)^2)` per hotspot, `d` in meters.
#[derive(Debug, Clone, Default)]
pub struct HotspotRiskScorer {
    areas: Vec<Area>,
}

impl HotspotRiskScorer {
    pub fn new(hotspots: Vec<Hotspot>) -> Result<Self, RiskError> {
        let mut areas = Vec::with_capacity(hotspots.len());

        for hotspot in hotspots {
            let center = Coordinate::new(hotspot.lng, hotspot.lat)?;
            if !(hotspot.radius_meters.is_finite() && hotspot.radius_meters > 0.0) {
                return Err(RiskError::Scoring(format!(
                    "hotspot at {} has invalid radius {}",
                    center, hotspot.radius_meters
                )));
            }
            if !hotspot.intensity.is_finite() {
                return Err(RiskError::Scoring(format!(
                    "hotspot at {} has invalid intensity",
                    center
                )));
            }

            areas.push(Area {
                center,
                radius_m: hotspot.radius_meters,
                intensity: hotspot.intensity,
            });
        }

        Ok(Self { areas })
    }

    /// Load hotspots from a JSON array file.
    pub fn from_json_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading hotspots from {}", path.display()))?;
        let hotspots: Vec<Hotspot> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing hotspots in {}", path.display()))?;

        Ok(Self::new(hotspots)?)
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn risk_at(&self, coordinate: &Coordinate) -> RiskScore {
        self.areas
            .iter()
            .map(|area| {
                let ratio = coordinate.haversine_m(&area.center) / area.radius_m;
                area.intensity * (-ratio * ratio).exp()
            })
            .sum()
    }
}

#[async_trait]
impl RiskScorer for HotspotRiskScorer {
    async fn score_coordinate(&self, coordinate: Coordinate) -> Result<RiskScore, RiskError> {
        Ok(self.risk_at(&coordinate))
    }

    async fn score_coordinates(&self, coordinates: &[Coordinate]) -> Result<Vec<RiskScore>, RiskError> {
        Ok(coordinates.iter().map(|c| self.risk_at(c)).collect())
    }
}
