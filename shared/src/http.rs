//! HTTP client utilities
//!
//! Requests are issued once. Retry policy belongs to whoever owns the remote
//! service, so failures surface immediately.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("Timeout")]
    Timeout,
    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpError::Timeout
        } else if err.is_decode() {
            HttpError::Decode(err.to_string())
        } else {
            HttpError::RequestFailed(err.to_string())
        }
    }
}

/// JSON-over-HTTP client bound to one base URL
#[derive(Clone, Debug)]
pub struct HttpClient {
    base_url: String,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Option<Duration>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            timeout,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST `body` as JSON to `path` and decode the JSON response.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, HttpError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path);

        let mut request = self.client.post(&url).json(body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "POST failed");
            HttpError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "POST returned error status");
            return Err(HttpError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response.json::<R>().await.map_err(HttpError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = HttpClient::new("http://trips.local/");
        assert_eq!(client.base_url(), "http://trips.local");
        assert_eq!(client.url("/routes"), "http://trips.local/routes");
    }

    #[tokio::test]
    async fn test_connection_refused_is_an_error() {
        // Port 9 (discard) is not expected to accept HTTP connections.
        let client = HttpClient::with_timeout("http://127.0.0.1:9", Some(Duration::from_secs(2)));
        let result: Result<Vec<serde_json::Value>, HttpError> =
            client.post_json("/routes", &Vec::<u8>::new()).await;

        assert!(matches!(
            result,
            Err(HttpError::RequestFailed(_)) | Err(HttpError::Timeout)
        ));
    }
}
