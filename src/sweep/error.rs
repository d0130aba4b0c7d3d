use thiserror::Error;

use crate::github::error::GitHubError;
use crate::github::types::RepositoryRef;
use crate::parser::error::ParseError;
use crate::version::error::FetchError;

/// Failure that aborts a whole sweep
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Failed to fetch latest WordPress version: {0}")]
    FetchFailure(#[from] FetchError),
}

/// Failure confined to a single repository
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Couldn't get the readme of repository {repository} at path {}: {source}", .repository.path)]
    DescriptorRead {
        repository: RepositoryRef,
        source: GitHubError,
    },

    #[error("Repository {repository} doesn't have a valid readme at path {}: {source}", .repository.path)]
    MalformedDescriptor {
        repository: RepositoryRef,
        source: ParseError,
    },

    #[error("Couldn't list repository issues for repository {repository}: {source}")]
    NotificationQueryFailure {
        repository: RepositoryRef,
        source: GitHubError,
    },

    #[error("Couldn't create an issue in repository {repository}: {source}")]
    NotificationCreateFailure {
        repository: RepositoryRef,
        source: GitHubError,
    },
}

impl CheckError {
    /// Short name of the failure kind for summaries
    pub fn kind(&self) -> &'static str {
        match self {
            CheckError::DescriptorRead { .. } => "descriptor_read",
            CheckError::MalformedDescriptor { .. } => "malformed_descriptor",
            CheckError::NotificationQueryFailure { .. } => "notification_query",
            CheckError::NotificationCreateFailure { .. } => "notification_create",
        }
    }
}
