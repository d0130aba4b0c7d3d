//! Trait for the code-hosting operations a sweep needs

#[cfg(test)]
use mockall::automock;

use crate::github::error::GitHubError;
use crate::github::types::{Issue, NewIssue, RepositoryRef};

/// Read access to repository files plus issue listing and creation
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetches the decoded text of the readme the repository reference points at
    async fn read_file(&self, repository: &RepositoryRef) -> Result<String, GitHubError>;

    /// Lists issues in any state that were opened by `creator`
    async fn list_issues_by_creator(
        &self,
        owner: &str,
        repo: &str,
        creator: &str,
    ) -> Result<Vec<Issue>, GitHubError>;

    /// Opens a new issue
    async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        issue: &NewIssue,
    ) -> Result<Issue, GitHubError>;
}
