//! In-memory GitHub and WordPress fakes

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use wordpress_version_checker::github::{
    GitHubError, Issue, IssueTracker, IssueUser, NewIssue, RepositoryRef,
};
use wordpress_version_checker::version::{FetchError, LatestVersionSource};

/// Latest version source with a fixed answer
pub struct FixedSource {
    latest: Result<String, u16>,
}

impl FixedSource {
    pub fn latest(version: &str) -> Self {
        Self {
            latest: Ok(version.to_string()),
        }
    }

    /// Source that fails as if the server replied with `status`
    pub fn failing(status: u16) -> Self {
        Self { latest: Err(status) }
    }
}

#[async_trait]
impl LatestVersionSource for FixedSource {
    async fn fetch_latest(&self) -> Result<String, FetchError> {
        self.latest.clone().map_err(FetchError::Status)
    }
}

/// Recorded issue creation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedIssue {
    pub owner: String,
    pub repo: String,
    pub issue: NewIssue,
}

/// GitHub fake holding readmes and issues in memory
#[derive(Default)]
pub struct FakeGitHub {
    files: HashMap<(String, String, String), String>,
    issues: Mutex<HashMap<(String, String), Vec<Issue>>>,
    created: Mutex<Vec<CreatedIssue>>,
    read_calls: Mutex<usize>,
    failing_listings: Vec<(String, String)>,
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, repository: &RepositoryRef, content: &str) -> Self {
        self.files.insert(
            (
                repository.owner.clone(),
                repository.repo.clone(),
                repository.path.clone(),
            ),
            content.to_string(),
        );
        self
    }

    /// Pre-existing issue authored by `creator`
    pub fn with_issue(self, repository: &RepositoryRef, number: u64, creator: &str) -> Self {
        self.issues
            .lock()
            .unwrap()
            .entry((repository.owner.clone(), repository.repo.clone()))
            .or_default()
            .push(Issue {
                number,
                title: "existing".to_string(),
                state: "closed".to_string(),
                user: Some(IssueUser {
                    login: creator.to_string(),
                }),
            });
        self
    }

    pub fn with_failing_listing(mut self, repository: &RepositoryRef) -> Self {
        self.failing_listings
            .push((repository.owner.clone(), repository.repo.clone()));
        self
    }

    pub fn created(&self) -> Vec<CreatedIssue> {
        self.created.lock().unwrap().clone()
    }

    pub fn read_calls(&self) -> usize {
        *self.read_calls.lock().unwrap()
    }
}

#[async_trait]
impl IssueTracker for FakeGitHub {
    async fn read_file(&self, repository: &RepositoryRef) -> Result<String, GitHubError> {
        *self.read_calls.lock().unwrap() += 1;
        self.files
            .get(&(
                repository.owner.clone(),
                repository.repo.clone(),
                repository.path.clone(),
            ))
            .cloned()
            .ok_or_else(|| GitHubError::NotFound(repository.path.clone()))
    }

    async fn list_issues_by_creator(
        &self,
        owner: &str,
        repo: &str,
        creator: &str,
    ) -> Result<Vec<Issue>, GitHubError> {
        if self
            .failing_listings
            .contains(&(owner.to_string(), repo.to_string()))
        {
            return Err(GitHubError::InvalidResponse(
                "Unexpected status: 500 Internal Server Error".to_string(),
            ));
        }

        Ok(self
            .issues
            .lock()
            .unwrap()
            .get(&(owner.to_string(), repo.to_string()))
            .map(|issues| {
                issues
                    .iter()
                    .filter(|i| i.user.as_ref().is_some_and(|u| u.login == creator))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        issue: &NewIssue,
    ) -> Result<Issue, GitHubError> {
        let mut issues = self.issues.lock().unwrap();
        let entry = issues
            .entry((owner.to_string(), repo.to_string()))
            .or_default();
        let created = Issue {
            number: entry.len() as u64 + 1,
            title: issue.title.clone(),
            state: "open".to_string(),
            user: Some(IssueUser {
                login: wordpress_version_checker::config::DEFAULT_BOT_LOGIN.to_string(),
            }),
        };
        entry.push(created.clone());

        self.created.lock().unwrap().push(CreatedIssue {
            owner: owner.to_string(),
            repo: repo.to_string(),
            issue: issue.clone(),
        });

        Ok(created)
    }
}

/// Minimal plugin readme declaring `tested`
pub fn readme_with(tested: &str) -> String {
    format!(
        "=== Example Plugin ===\n\
         Contributors: example\n\
         Requires at least: 5.0\n\
         Tested up to: {}\n\
         Stable tag: 1.0.0\n\
         License: GPLv2 or later\n\
         \n\
         == Description ==\n\
         An example plugin.\n",
        tested
    )
}
