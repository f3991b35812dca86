pub mod collaborators;
pub mod config;
pub mod dedup;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod orchestrator;
pub mod profiler;
pub mod router;


pub use config::{Config, TripEndpoint};
pub use dedup::WeightedPathSearch;
pub use error::RiskError;
pub use gateway::{RiskGateway, RiskInput, RiskOutput};
pub use orchestrator::PathOrchestrator;
pub use profiler::RouteRiskProfiler;
pub use router::{create_router, AppState};
