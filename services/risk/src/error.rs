use shared::http::HttpError;
use shared::types::CoordinateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Unexpected input format.")]
    UnexpectedInputFormat,
    #[error("Input must be an array of objects with key path.")]
    InvalidRouteInput,
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("No URL for the Trip Service set in TRIP_SERVICE_URL")]
    MissingTripServiceUrl,
    #[error(transparent)]
    InvalidCoordinate(#[from] CoordinateError),
    #[error("Risk scoring failed: {0}")]
    Scoring(String),
    #[error("Path search failed: {0}")]
    Pathfinding(String),
    #[error(transparent)]
    Realization(#[from] HttpError),
    #[error("Trip service returned {actual} routes for {expected} requests")]
    RealizationMismatch { expected: usize, actual: usize },
}

impl RiskError {
    /// The service is misconfigured, as opposed to a bad request or a failing
    /// collaborator.
    pub fn is_configuration(&self) -> bool {
        matches!(self, RiskError::MissingTripServiceUrl)
    }
}
