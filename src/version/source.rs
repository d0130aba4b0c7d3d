//! Trait for fetching the latest released version from a remote source

#[cfg(test)]
use mockall::automock;

use crate::version::error::FetchError;

/// Source of truth for the latest released version
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait LatestVersionSource: Send + Sync {
    /// Fetches the version currently marked as latest
    ///
    /// # Returns
    /// * `Ok(String)` - The latest version, e.g. "6.4.2"
    /// * `Err(FetchError)` - If the source is unreachable or the response is unusable
    async fn fetch_latest(&self) -> Result<String, FetchError>;
}
