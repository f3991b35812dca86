use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::types::{Coordinate, MergedRoute, RouteProfile};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::collaborators::{GridPathfinder, HotspotRiskScorer, RiskScorer, SummaryProfiler};
use crate::config::Config;
use crate::dedup::WeightedPathSearch;
use crate::error::RiskError;
use crate::gateway::RiskGateway;
use crate::middleware::request_logging;
use crate::orchestrator::PathOrchestrator;
use crate::profiler::RouteRiskProfiler;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<RiskGateway>,
    pub profiler: Arc<RouteRiskProfiler>,
    pub orchestrator: Arc<PathOrchestrator>,
}

impl AppState {
    pub fn new(gateway: RiskGateway, profiler: RouteRiskProfiler, orchestrator: PathOrchestrator) -> Self {
        Self {
            gateway: Arc::new(gateway),
            profiler: Arc::new(profiler),
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// Wire the reference collaborators from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let scorer: Arc<dyn RiskScorer> = match &config.hotspots_file {
            Some(path) => {
                let scorer = HotspotRiskScorer::from_json_file(path)?;
                tracing::info!(hotspots = scorer.len(), file = %path.display(), "Loaded risk hotspots");
                Arc::new(scorer)
            }
            None => {
                tracing::warn!("RISK_HOTSPOTS_FILE not set, every location scores 0");
                Arc::new(HotspotRiskScorer::default())
            }
        };

        let profiler = RouteRiskProfiler::new(scorer.clone(), Arc::new(SummaryProfiler));
        let pathfinder = Arc::new(GridPathfinder::new(scorer.clone(), config.grid_resolution));
        let search = WeightedPathSearch::with_weights(pathfinder, config.low_weight, config.high_weight);
        let orchestrator = PathOrchestrator::from_config(search, profiler.clone(), config);

        if !orchestrator.is_configured() {
            tracing::warn!("TRIP_SERVICE_URL not set, path finding is disabled");
        }

        Ok(Self::new(RiskGateway::new(scorer), profiler, orchestrator))
    }
}

/// Uniform `{ error: { message } }` failure body.
#[derive(Debug)]
pub struct ApiError(pub RiskError);

impl From<RiskError> for ApiError {
    fn from(err: RiskError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_configuration() {
            tracing::error!(error = %self.0, "Service misconfigured");
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            tracing::warn!(error = %self.0, "Request failed");
            StatusCode::BAD_REQUEST
        };

        (
            status,
            Json(json!({
                "error": {
                    "message": self.0.to_string()
                }
            })),
        )
            .into_response()
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/risk", post(get_risk))
        .route("/risk/path", post(get_risk_path))
        .route("/path", get(find_path))
        .with_state(state)
        .layer(cors)
        .layer(axum::middleware::from_fn(request_logging))
}

async fn health_check() -> &'static str {
    "OK"
}

async fn get_risk(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body.map_err(|_| RiskError::UnexpectedInputFormat)?;
    let point = body.get("point").unwrap_or(&Value::Null);

    let risk = state.gateway.assess_json(point).await?;
    Ok(Json(json!({ "risk": risk })))
}

async fn get_risk_path(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Vec<RouteProfile>>, ApiError> {
    let Json(body) = body.map_err(|_| RiskError::InvalidRouteInput)?;

    let profiles = state.profiler.profile_routes_json(&body).await?;
    Ok(Json(profiles))
}

/// Read `{prefix}[lng]` and `{prefix}[lat]` from the query string.
fn query_coordinate(params: &HashMap<String, String>, prefix: &str) -> Result<Coordinate, RiskError> {
    let number = |field: &str| -> Result<f64, RiskError> {
        let key = format!("{}[{}]", prefix, field);
        let raw = params
            .get(&key)
            .ok_or_else(|| RiskError::InvalidQuery(format!("{} is required", key)))?;
        raw.trim()
            .parse::<f64>()
            .map_err(|_| RiskError::InvalidQuery(format!("{} must be a number", key)))
    };

    Ok(Coordinate::new(number("lng")?, number("lat")?)?)
}

async fn find_path(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<MergedRoute>>, ApiError> {
    state.orchestrator.ensure_configured()?;

    let origin = query_coordinate(&params, "origin")?;
    let destination = query_coordinate(&params, "destination")?;

    let routes = state.orchestrator.find_path(origin, destination).await?;
    Ok(Json(routes))
}
