// GitHub API HTTP client.
// Handles headers, rate limit tracking, and response status mapping.

use std::sync::{Mutex, PoisonError};

use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};

use crate::config::Config;
use crate::error::{FolioError, Result};

use super::types::RateLimit;

const GITHUB_API_VERSION: &str = "2022-11-28";

/// GitHub REST client with rate limit tracking.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    rate_limit: Mutex<RateLimit>,
}

impl GitHubClient {
    /// Create a client for the API base and credentials in `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| FolioError::Other(e.to_string()))?,
            );
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| FolioError::Other(e.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(FolioError::Api)?;

        Ok(Self {
            client,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// Snapshot of the most recent rate limit headers.
    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Full URL for an API path.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        params: &T,
    ) -> Result<Response> {
        let url = self.url(endpoint);
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(FolioError::Api)?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, response: &Response) {
        let header = |name: &str| header_u64(response, name);

        let mut rate_limit = self
            .rate_limit
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(limit) = header("x-ratelimit-limit") {
            rate_limit.limit = limit;
        }
        if let Some(remaining) = header("x-ratelimit-remaining") {
            rate_limit.remaining = remaining;
        }
        if let Some(reset) = header("x-ratelimit-reset") {
            rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED => Err(FolioError::Unauthorized),
            StatusCode::NOT_FOUND => {
                let url = response.url().to_string();
                Err(FolioError::NotFound(url))
            }
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
                if header_u64(&response, "x-ratelimit-remaining") == Some(0) =>
            {
                let reset_at = chrono::DateTime::from_timestamp(self.rate_limit().reset as i64, 0)
                    .map(|dt| dt.format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                Err(FolioError::RateLimited { reset_at })
            }
            status => Err(FolioError::Other(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            ))),
        }
    }
}

/// Numeric response header, `None` when absent or unparsable.
fn header_u64(response: &Response, name: &str) -> Option<u64> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}
