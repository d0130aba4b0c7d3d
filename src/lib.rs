//! Checks WordPress plugin repositories for a stale "Tested up to" version
//! and files a tracking issue when the latest WordPress release is newer.
//!
//! # Modules
//!
//! - [`config`]: Configuration file, defaults and data paths
//! - [`github`]: GitHub API client for readme contents and issues
//! - [`logging`]: Tracing subscriber setup
//! - [`parser`]: Extracts the declared version from a plugin readme
//! - [`scheduler`]: Periodic sweep trigger
//! - [`sweep`]: Per-sweep orchestration and notification
//! - [`version`]: Latest WordPress version lookup and staleness check

pub mod config;
pub mod github;
pub mod logging;
pub mod parser;
pub mod scheduler;
pub mod sweep;
pub mod version;
