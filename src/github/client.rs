//! GitHub REST API implementation of [`IssueTracker`]

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::USER_AGENT;
use crate::github::error::GitHubError;
use crate::github::tracker::IssueTracker;
use crate::github::types::{Issue, NewIssue, RepositoryRef};

/// Default base URL for GitHub API
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";

/// Response from the repository contents API
#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

/// GitHub API client
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl GitHubClient {
    /// Creates a new GitHubClient with a custom base URL
    ///
    /// `token` is sent as a bearer token when present.
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(API_VERSION),
        );

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            timeout,
        })
    }

    fn repo_url(&self, owner: &str, repo: &str, rest: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.base_url, owner, repo, rest)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn map_request_error(&self, e: reqwest::Error) -> GitHubError {
        if e.is_timeout() {
            GitHubError::Timeout(self.timeout)
        } else {
            GitHubError::Network(e)
        }
    }

    /// Sends the request and maps non-success statuses to errors
    async fn send(&self, builder: RequestBuilder, target: &str) -> Result<Response, GitHubError> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(GitHubError::NotFound(target.to_string()));
        }

        if is_rate_limited(&response) {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(GitHubError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            debug!("GitHub API returned status {}: {}", status, target);
            return Err(GitHubError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        Ok(response)
    }

    async fn parse_json<T: DeserializeOwned>(
        &self,
        response: Response,
        target: &str,
    ) -> Result<T, GitHubError> {
        let body = response
            .text()
            .await
            .map_err(|e| self.map_request_error(e))?;

        serde_json::from_str(&body).map_err(|e| {
            debug!("Failed to parse GitHub response for {}: {}", target, e);
            GitHubError::InvalidResponse(e.to_string())
        })
    }
}

fn is_rate_limited(response: &Response) -> bool {
    match response.status() {
        StatusCode::TOO_MANY_REQUESTS => true,
        StatusCode::FORBIDDEN => response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            == Some("0"),
        _ => false,
    }
}

/// Decode the contents API payload; GitHub wraps base64 at 60 columns
fn decode_content(content: &str) -> Result<String, GitHubError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();

    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| GitHubError::Decode(e.to_string()))?;

    String::from_utf8(bytes).map_err(|e| GitHubError::Decode(e.to_string()))
}

#[async_trait::async_trait]
impl IssueTracker for GitHubClient {
    async fn read_file(&self, repository: &RepositoryRef) -> Result<String, GitHubError> {
        let url = self.repo_url(
            &repository.owner,
            &repository.repo,
            &format!("contents/{}", repository.path.trim_start_matches('/')),
        );
        let target = format!("{}:{}", repository, repository.path);

        let response = self.send(self.client.get(&url), &target).await?;
        let contents: ContentResponse = self.parse_json(response, &target).await?;

        match contents.encoding.as_deref() {
            None | Some("base64") => decode_content(&contents.content),
            Some(other) => Err(GitHubError::Decode(format!(
                "unsupported encoding: {}",
                other
            ))),
        }
    }

    async fn list_issues_by_creator(
        &self,
        owner: &str,
        repo: &str,
        creator: &str,
    ) -> Result<Vec<Issue>, GitHubError> {
        let url = Url::parse_with_params(
            &self.repo_url(owner, repo, "issues"),
            &[("creator", creator), ("state", "all"), ("per_page", "100")],
        )
        .map_err(|e| GitHubError::InvalidUrl(e.to_string()))?;
        let target = format!("{}/{} issues", owner, repo);

        let response = self.send(self.client.get(url), &target).await?;
        let issues: Vec<Issue> = self.parse_json(response, &target).await?;

        debug!(
            "Found {} issues by {} in {}/{}",
            issues.len(),
            creator,
            owner,
            repo
        );

        Ok(issues)
    }

    async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        issue: &NewIssue,
    ) -> Result<Issue, GitHubError> {
        let url = self.repo_url(owner, repo, "issues");
        let target = format!("{}/{} issues", owner, repo);

        let response = self
            .send(self.client.post(&url).json(issue), &target)
            .await?;

        self.parse_json(response, &target).await
    }
}
