use async_trait::async_trait;
use shared::types::{CandidatePath, Coordinate, Path, RiskScore, RiskWeight};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;

use super::{Pathfinder, RiskScorer};
use crate::error::RiskError;

/// Smallest lattice extent in degrees, so near-identical endpoints still get
/// room to detour.
const MIN_SPAN_DEG: f64 = 0.002;

/// Edge costs are kept as integer millimeters in the priority queue.
const COST_SCALE: f64 = 1000.0;

/// Dijkstra over a square lattice spanning the origin/destination box.
///
/// Every lattice node is scored once per search. Moving between neighbours
/// costs `distance * (1 + weight * mean_risk)`, so heavier weights trade
/// distance for lower exposure.
pub struct GridPathfinder {
    scorer: Arc<dyn RiskScorer>,
    resolution: usize,
    padding: f64,
}

impl GridPathfinder {
    pub fn new(scorer: Arc<dyn RiskScorer>, resolution: usize) -> Self {
        Self {
            scorer,
            resolution: resolution.max(2),
            padding: 0.25,
        }
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding.max(0.0);
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct Lattice {
    min_lng: f64,
    min_lat: f64,
    step_lng: f64,
    step_lat: f64,
    size: usize,
}

impl Lattice {
    fn around(a: Coordinate, b: Coordinate, size: usize, padding: f64) -> Self {
        let (lng_lo, lng_hi) = expand(a.lng().min(b.lng()), a.lng().max(b.lng()), padding, 180.0);
        let (lat_lo, lat_hi) = expand(a.lat().min(b.lat()), a.lat().max(b.lat()), padding, 90.0);

        Self {
            min_lng: lng_lo,
            min_lat: lat_lo,
            step_lng: (lng_hi - lng_lo) / (size - 1) as f64,
            step_lat: (lat_hi - lat_lo) / (size - 1) as f64,
            size,
        }
    }

    fn index(&self, col: usize, row: usize) -> usize {
        row * self.size + col
    }

    fn position(&self, index: usize) -> (usize, usize) {
        (index % self.size, index / self.size)
    }

    fn nodes(&self) -> Result<Vec<Coordinate>, RiskError> {
        let mut nodes = Vec::with_capacity(self.size * self.size);
        for row in 0..self.size {
            for col in 0..self.size {
                let lng = self.min_lng + col as f64 * self.step_lng;
                let lat = self.min_lat + row as f64 * self.step_lat;
                nodes.push(Coordinate::new(lng.clamp(-180.0, 180.0), lat.clamp(-90.0, 90.0))?);
            }
        }
        Ok(nodes)
    }

    fn nearest(&self, c: Coordinate) -> usize {
        let snap = |value: f64, min: f64, step: f64| -> usize {
            if step <= 0.0 {
                return 0;
            }
            ((value - min) / step).round().clamp(0.0, (self.size - 1) as f64) as usize
        };
        self.index(
            snap(c.lng(), self.min_lng, self.step_lng),
            snap(c.lat(), self.min_lat, self.step_lat),
        )
    }

    fn neighbours(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let (col, row) = self.position(index);
        let size = self.size as isize;

        (-1isize..=1)
            .flat_map(|dr| (-1isize..=1).map(move |dc| (dc, dr)))
            .filter(|&(dc, dr)| dc != 0 || dr != 0)
            .filter_map(move |(dc, dr)| {
                let c = col as isize + dc;
                let r = row as isize + dr;
                if c < 0 || r < 0 || c >= size || r >= size {
                    None
                } else {
                    Some(self.index(c as usize, r as usize))
                }
            })
    }
}

fn expand(lo: f64, hi: f64, padding: f64, limit: f64) -> (f64, f64) {
    let span = (hi - lo).max(MIN_SPAN_DEG);
    let center = (lo + hi) / 2.0;
    let half = span / 2.0 + span * padding;
    ((center - half).max(-limit), (center + half).min(limit))
}

/// Lowest-cost lattice route from `start` to `goal`, as node indices.
fn shortest_route(
    lattice: &Lattice,
    nodes: &[Coordinate],
    risks: &[RiskScore],
    weight: RiskWeight,
    start: usize,
    goal: usize,
) -> Option<Vec<usize>> {
    let mut dist = vec![u64::MAX; nodes.len()];
    let mut prev: Vec<Option<usize>> = vec![None; nodes.len()];
    let mut pq: BinaryHeap<Reverse<(u64, usize)>> = BinaryHeap::new();

    dist[start] = 0;
    pq.push(Reverse((0, start)));

    while let Some(Reverse((d, u))) = pq.pop() {
        if u == goal {
            break;
        }
        if d > dist[u] {
            continue; // stale entry
        }

        for v in lattice.neighbours(u) {
            let exposure = (risks[u].max(0.0) + risks[v].max(0.0)) / 2.0;
            let cost = nodes[u].haversine_m(&nodes[v]) * (1.0 + weight.value() * exposure);
            let next = d.saturating_add((cost * COST_SCALE).round() as u64);

            if next < dist[v] {
                dist[v] = next;
                prev[v] = Some(u);
                pq.push(Reverse((next, v)));
            }
        }
    }

    if dist[goal] == u64::MAX {
        return None;
    }

    let mut route = vec![goal];
    let mut cursor = goal;
    while let Some(p) = prev[cursor] {
        route.push(p);
        cursor = p;
    }
    route.reverse();
    Some(route)
}

#[async_trait]
impl Pathfinder for GridPathfinder {
    async fn search(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        weight: RiskWeight,
    ) -> Result<CandidatePath, RiskError> {
        if origin == destination {
            let risk = self.scorer.score_coordinate(origin).await?;
            return Ok(CandidatePath {
                path: Path::new(vec![origin]),
                risk_weight: risk,
            });
        }

        let lattice = Lattice::around(origin, destination, self.resolution, self.padding);
        let nodes = lattice.nodes()?;
        let risks = self.scorer.score_coordinates(&nodes).await?;
        if risks.len() != nodes.len() {
            return Err(RiskError::Scoring(format!(
                "scorer returned {} scores for {} coordinates",
                risks.len(),
                nodes.len()
            )));
        }

        let start = lattice.nearest(origin);
        let goal = lattice.nearest(destination);
        let route = shortest_route(&lattice, &nodes, &risks, weight, start, goal).ok_or_else(|| {
            RiskError::Pathfinding(format!("no lattice route between {} and {}", origin, destination))
        })?;

        let mut points = Vec::with_capacity(route.len() + 2);
        points.push(origin);
        for &i in &route {
            if points.last() != Some(&nodes[i]) {
                points.push(nodes[i]);
            }
        }
        if points.last() != Some(&destination) {
            points.push(destination);
        }

        let exposure: RiskScore = route.iter().map(|&i| risks[i]).sum();

        tracing::debug!(weight = %weight, nodes = route.len(), exposure, "lattice search finished");

        Ok(CandidatePath {
            path: Path::new(points),
            risk_weight: exposure,
        })
    }
}
