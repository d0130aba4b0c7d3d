//! GitHub API access
//!
//! # Modules
//!
//! - [`tracker`]: `IssueTracker` trait used by the sweep (read file, list and create issues)
//! - [`client`]: reqwest-based implementation against the GitHub REST API
//! - [`types`]: Repository references and issue payloads
//! - [`error`]: Error type for GitHub API operations

pub mod client;
pub mod error;
pub mod tracker;
pub mod types;

pub use client::GitHubClient;
pub use error::GitHubError;
pub use tracker::IssueTracker;
pub use types::{Issue, IssueUser, NewIssue, RepositoryRef};
