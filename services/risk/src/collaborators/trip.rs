use async_trait::async_trait;
use shared::http::HttpClient;
use shared::types::{RealizedRoute, RouteRequest};
use std::time::Duration;

use super::RouteRealizer;
use crate::error::RiskError;

/// Client for the trip service's batch realization endpoint,
/// `POST {base}/routes`.
#[derive(Clone, Debug)]
pub struct TripServiceClient {
    http: HttpClient,
}

impl TripServiceClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            http: HttpClient::with_timeout(base_url, timeout),
        }
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

#[async_trait]
impl RouteRealizer for TripServiceClient {
    async fn realize(&self, requests: &[RouteRequest]) -> Result<Vec<RealizedRoute>, RiskError> {
        let routes: Vec<RealizedRoute> = self.http.post_json("/routes", requests).await?;
        Ok(routes)
    }
}
