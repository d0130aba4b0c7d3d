//! WordPress.org stable-check API implementation
//!
//! The endpoint returns every known core release mapped to its status:
//!
//! ```json
//! { "6.3.2": "outdated", "6.4.1": "insecure", "6.4.2": "latest" }
//! ```

use std::time::Duration;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::config::{FETCH_TIMEOUT_MS, USER_AGENT};
use crate::version::error::FetchError;
use crate::version::source::LatestVersionSource;

/// Default base URL for the WordPress.org API
pub const DEFAULT_BASE_URL: &str = "https://api.wordpress.org";

/// Path of the stable-check endpoint
const STABLE_CHECK_PATH: &str = "/core/stable-check/1.0/";

/// Status tag of the current release
const LATEST_TAG: &str = "latest";

/// Latest version source backed by api.wordpress.org
pub struct WordPressVersionSource {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl WordPressVersionSource {
    /// Creates a new WordPressVersionSource with a custom base URL and request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Creates a source pointed at api.wordpress.org with the default timeout
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(DEFAULT_BASE_URL, Duration::from_millis(FETCH_TIMEOUT_MS))
    }

    fn map_request_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Network(e)
        }
    }
}

/// Pick the first version whose status tag is "latest"
fn find_latest(releases: &IndexMap<String, Value>) -> Option<&str> {
    releases
        .iter()
        .find(|(_, status)| status.as_str() == Some(LATEST_TAG))
        .map(|(version, _)| version.as_str())
}

#[async_trait::async_trait]
impl LatestVersionSource for WordPressVersionSource {
    async fn fetch_latest(&self) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, STABLE_CHECK_PATH);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();

        if !status.is_success() {
            debug!("WordPress API returned status {}: {}", status, url);
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let releases: IndexMap<String, Value> = serde_json::from_str(&body).map_err(|e| {
            debug!("Failed to parse WordPress stable-check response: {}", e);
            FetchError::InvalidResponse(e.to_string())
        })?;

        debug!("WordPress stable-check listed {} releases", releases.len());

        find_latest(&releases)
            .map(str::to_string)
            .ok_or(FetchError::LatestNotFound)
    }
}
