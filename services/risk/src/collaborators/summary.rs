use shared::types::{RiskScore, RouteProfile};

use super::RouteProfiler;

/// Count, total, mean and peak of a risk array.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryProfiler;

impl RouteProfiler for SummaryProfiler {
    fn profile(&self, risks: &[RiskScore]) -> RouteProfile {
        let total: RiskScore = risks.iter().sum();

        // first occurrence wins on ties
        let peak = risks
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best: Option<(usize, RiskScore)>, (i, r)| match best {
                Some((_, b)) if b >= r => best,
                _ => Some((i, r)),
            });

        RouteProfile {
            samples: risks.len(),
            total_risk: total,
            mean_risk: if risks.is_empty() { 0.0 } else { total / risks.len() as f64 },
            peak_risk: peak.map(|(_, r)| r).unwrap_or(0.0),
            peak_index: peak.map(|(i, _)| i),
        }
    }
}
