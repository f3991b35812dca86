//! Logging utilities

use crate::types::Coordinate;
use tracing_subscriber::EnvFilter;

/// Initialize the logger
///
/// JSON lines on stdout, filtered by `RUST_LOG` (defaults to `info`).
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();
}

/// Coarsen a coordinate to three decimals (~100 m) before it reaches a log.
pub fn redact_coordinate(coordinate: &Coordinate) -> String {
    format!("[{:.3}, {:.3}]", coordinate.lng(), coordinate.lat())
}
