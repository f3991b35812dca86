use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Risk value for a single location. No bounds are assumed.
pub type RiskScore = f64;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinateError {
    #[error("Coordinate values must be finite numbers")]
    NotFinite,
    #[error("Longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("Latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("Feature has no point coordinates")]
    MissingPoint,
    #[error("A position needs at least 2 numbers, got {0}")]
    ShortPosition(usize),
}

/// A WGS84 position. Serialized as `[lng, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    lng: f64,
    lat: f64,
}

impl Coordinate {
    pub fn new(lng: f64, lat: f64) -> Result<Self, CoordinateError> {
        if !lng.is_finite() || !lat.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateError::LongitudeOutOfRange(lng));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        Ok(Self { lng, lat })
    }

    /// From a GeoJSON position `[lng, lat, ...]`. Altitude and any further
    /// elements are ignored.
    pub fn from_position(values: &[f64]) -> Result<Self, CoordinateError> {
        match values {
            [lng, lat, ..] => Coordinate::new(*lng, *lat),
            _ => Err(CoordinateError::ShortPosition(values.len())),
        }
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Great-circle distance in meters.
    pub fn haversine_m(&self, other: &Coordinate) -> f64 {
        const EARTH_RADIUS_M: f64 = 6_371_008.8;

        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlng = (other.lng - self.lng).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

impl TryFrom<[f64; 2]> for Coordinate {
    type Error = CoordinateError;

    fn try_from(value: [f64; 2]) -> Result<Self, Self::Error> {
        Coordinate::new(value[0], value[1])
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(value: Coordinate) -> Self {
        [value.lng, value.lat]
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lng, self.lat)
    }
}

/// Ordered sequence of coordinates, start to end.
///
/// Reads GeoJSON positions, so `[lng, lat, alt]` is accepted; always written
/// back as `[lng, lat]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Coordinate>")]
pub struct Path(Vec<Coordinate>);

impl Path {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Structural equality used for candidate deduplication: same length and
    /// the same coordinates in the same order.
    pub fn same_geometry(&self, other: &Path) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(other.0.iter())
                .all(|(a, b)| a.lng == b.lng && a.lat == b.lat)
    }
}

impl From<Vec<Coordinate>> for Path {
    fn from(points: Vec<Coordinate>) -> Self {
        Self(points)
    }
}

impl From<Path> for Vec<Coordinate> {
    fn from(path: Path) -> Self {
        path.0
    }
}

impl TryFrom<Vec<Vec<f64>>> for Path {
    type Error = CoordinateError;

    fn try_from(positions: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        positions
            .iter()
            .map(|p| Coordinate::from_position(p))
            .collect::<Result<Vec<_>, _>>()
            .map(Path)
    }
}

/// A GeoJSON `Feature` with a `Point` geometry, or a bare `Point` geometry.
///
/// Unknown fields are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct GeoFeature {
    fields: Map<String, Value>,
    point: Coordinate,
}

impl GeoFeature {
    pub fn from_map(fields: Map<String, Value>) -> Result<Self, CoordinateError> {
        let coordinates = match fields.get("geometry") {
            Some(Value::Object(geometry)) => geometry.get("coordinates"),
            _ => fields.get("coordinates"),
        }
        .ok_or(CoordinateError::MissingPoint)?;

        let position: Vec<f64> =
            serde_json::from_value(coordinates.clone()).map_err(|_| CoordinateError::MissingPoint)?;
        let point = Coordinate::from_position(&position).map_err(|e| match e {
            CoordinateError::ShortPosition(_) => CoordinateError::MissingPoint,
            other => other,
        })?;

        Ok(Self { fields, point })
    }

    pub fn coordinate(&self) -> Coordinate {
        self.point
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn is_feature(&self) -> bool {
        matches!(self.fields.get("geometry"), Some(Value::Object(_)))
    }

    /// Attach a risk score. Features get `properties.risk`, bare geometries a
    /// top-level `risk`. Existing fields are kept.
    pub fn with_risk(mut self, risk: RiskScore) -> Self {
        let risk_value = Value::from(risk);

        if self.is_feature() {
            match self.fields.get_mut("properties") {
                Some(Value::Object(properties)) => {
                    properties.insert("risk".to_string(), risk_value);
                    return self;
                }
                Some(Value::Null) | None => {
                    let mut properties = Map::new();
                    properties.insert("risk".to_string(), risk_value);
                    self.fields.insert("properties".to_string(), Value::Object(properties));
                    return self;
                }
                // properties of an unexpected type are left alone
                Some(_) => {}
            }
        }

        self.fields.insert("risk".to_string(), risk_value);
        self
    }
}

impl TryFrom<Map<String, Value>> for GeoFeature {
    type Error = CoordinateError;

    fn try_from(value: Map<String, Value>) -> Result<Self, Self::Error> {
        GeoFeature::from_map(value)
    }
}

impl From<GeoFeature> for Map<String, Value> {
    fn from(value: GeoFeature) -> Self {
        value.fields
    }
}

/// Sensitivity of a path search to risk. Higher avoids risk harder.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskWeight(pub f64);

impl RiskWeight {
    pub const LOW: RiskWeight = RiskWeight(2.0);
    pub const HIGH: RiskWeight = RiskWeight(10.0);

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for RiskWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Output of one weighted search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePath {
    pub path: Path,
    /// Cumulative risk the search attributed to the path.
    pub risk_weight: f64,
}

/// A candidate along with every search weight that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedCandidate {
    pub candidate: CandidatePath,
    pub search_weights: Vec<RiskWeight>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub path: Path,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_weight: Option<f64>,
}

impl From<&CandidatePath> for RouteRequest {
    fn from(candidate: &CandidatePath) -> Self {
        Self {
            path: candidate.path.clone(),
            risk_weight: Some(candidate.risk_weight),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealizedRoute {
    pub path: Path,
    #[serde(default)]
    pub route: Value,
}

/// Aggregate risk statistics over one route's per-coordinate scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteProfile {
    pub samples: usize,
    pub total_risk: RiskScore,
    pub mean_risk: RiskScore,
    pub peak_risk: RiskScore,
    pub peak_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedRoute {
    #[serde(flatten)]
    pub profile: RouteProfile,
    pub risk_weight: f64,
    pub search_weights: Vec<RiskWeight>,
    pub route: Value,
    pub path: Path,
}
