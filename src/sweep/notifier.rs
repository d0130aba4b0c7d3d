//! Deduplicated issue filing for stale repositories
//!
//! Any issue authored by the bot, open or closed, counts as a prior
//! notification. The listing and the creation are two separate calls, so two
//! processes sweeping at once can still both file an issue.

use std::sync::Arc;

use tracing::info;

use crate::github::tracker::IssueTracker;
use crate::github::types::{NewIssue, RepositoryRef};
use crate::sweep::error::CheckError;

pub const ISSUE_TITLE: &str = "The plugin hasn't been tested with the latest version of WordPress";

/// Result of a notification attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The bot already filed `existing` issues in the repository
    AlreadyNotified { existing: usize },
    /// A new issue was created
    Notified { issue_number: u64 },
}

/// Render the notification issue for a stale repository
pub fn render_issue(tested_version: &str, latest_version: &str) -> NewIssue {
    let body = format!(
        "There is a new WordPress version that the plugin hasn't been tested with. \
         Please test it and then change the \"Tested up to\" field in the plugin readme.\n\
         \n\
         **Tested up to:** {}\n\
         **Latest version:** {}\n\
         \n\
         You may then close this issue as it won't be done automatically.",
        tested_version, latest_version
    );

    NewIssue {
        title: ISSUE_TITLE.to_string(),
        body,
    }
}

/// Files at most one issue per repository under the bot identity
pub struct Notifier {
    tracker: Arc<dyn IssueTracker>,
    bot_login: String,
}

impl Notifier {
    pub fn new(tracker: Arc<dyn IssueTracker>, bot_login: &str) -> Self {
        Self {
            tracker,
            bot_login: bot_login.to_string(),
        }
    }

    /// Create the notification issue unless the bot has filed one before.
    ///
    /// A failed listing returns an error without attempting creation.
    pub async fn notify_if_needed(
        &self,
        repository: &RepositoryRef,
        tested_version: &str,
        latest_version: &str,
    ) -> Result<NotifyOutcome, CheckError> {
        let existing = self
            .tracker
            .list_issues_by_creator(&repository.owner, &repository.repo, &self.bot_login)
            .await
            .map_err(|source| CheckError::NotificationQueryFailure {
                repository: repository.clone(),
                source,
            })?;

        if !existing.is_empty() {
            info!(
                "Repository {} already has {} issue(s) by {}, not filing another",
                repository,
                existing.len(),
                self.bot_login
            );
            return Ok(NotifyOutcome::AlreadyNotified {
                existing: existing.len(),
            });
        }

        let issue = render_issue(tested_version, latest_version);
        let created = self
            .tracker
            .create_issue(&repository.owner, &repository.repo, &issue)
            .await
            .map_err(|source| CheckError::NotificationCreateFailure {
                repository: repository.clone(),
                source,
            })?;

        info!(
            "Created issue #{} in {} (tested up to {}, latest {})",
            created.number, repository, tested_version, latest_version
        );

        Ok(NotifyOutcome::Notified {
            issue_number: created.number,
        })
    }
}
