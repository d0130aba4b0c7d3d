//! One pass over every configured repository
//!
//! The latest WordPress version is fetched once and shared by all
//! repositories. Repository checks then run concurrently with staggered
//! start times; a failing repository is logged and never stops the rest.
//! Only a failed latest-version fetch aborts the sweep.
//!
//! # Modules
//!
//! - [`notifier`]: Deduplicated issue filing
//! - [`error`]: Sweep and per-repository error types

pub mod error;
pub mod notifier;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::{DEFAULT_BOT_LOGIN, FETCH_STAGGER_DELAY_MS, FETCH_TIMEOUT_MS};
use crate::github::tracker::IssueTracker;
use crate::github::types::RepositoryRef;
use crate::parser::ReadmeParser;
use crate::version::error::FetchError;
use crate::version::source::LatestVersionSource;
use crate::version::staleness::{Staleness, evaluate};

pub use error::{CheckError, SweepError};
pub use notifier::{ISSUE_TITLE, Notifier, NotifyOutcome, render_issue};

/// What happened to one repository during a sweep
#[derive(Debug)]
pub enum RepositoryOutcome {
    /// Declared version covers the latest version
    Current { declared: String },
    /// Stale, but an issue was filed before or by an earlier entry for the same repository
    AlreadyNotified { declared: String },
    /// Stale and a new issue was created
    Notified { declared: String, issue_number: u64 },
    /// The check failed; retried on the next sweep
    Failed(CheckError),
}

impl RepositoryOutcome {
    pub fn is_stale(&self) -> bool {
        matches!(
            self,
            RepositoryOutcome::AlreadyNotified { .. } | RepositoryOutcome::Notified { .. }
        )
    }

    /// Declared version, when the readme could be parsed
    pub fn declared(&self) -> Option<&str> {
        match self {
            RepositoryOutcome::Current { declared }
            | RepositoryOutcome::AlreadyNotified { declared }
            | RepositoryOutcome::Notified { declared, .. } => Some(declared),
            RepositoryOutcome::Failed(_) => None,
        }
    }
}

/// Outcomes of one sweep, in configuration order
#[derive(Debug)]
pub struct SweepReport {
    pub latest: String,
    pub results: Vec<(RepositoryRef, RepositoryOutcome)>,
}

impl SweepReport {
    fn count(&self, predicate: impl Fn(&RepositoryOutcome) -> bool) -> usize {
        self.results.iter().filter(|(_, o)| predicate(o)).count()
    }

    pub fn current_count(&self) -> usize {
        self.count(|o| matches!(o, RepositoryOutcome::Current { .. }))
    }

    pub fn already_notified_count(&self) -> usize {
        self.count(|o| matches!(o, RepositoryOutcome::AlreadyNotified { .. }))
    }

    pub fn notified_count(&self) -> usize {
        self.count(|o| matches!(o, RepositoryOutcome::Notified { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, RepositoryOutcome::Failed(_)))
    }
}

/// Runs sweeps over a fixed repository list
pub struct Sweeper {
    source: Arc<dyn LatestVersionSource>,
    tracker: Arc<dyn IssueTracker>,
    notifier: Notifier,
    parser: ReadmeParser,
    repositories: Vec<RepositoryRef>,
    fetch_timeout: Duration,
    stagger_delay: Duration,
}

impl Sweeper {
    pub fn new(
        source: Arc<dyn LatestVersionSource>,
        tracker: Arc<dyn IssueTracker>,
        repositories: Vec<RepositoryRef>,
    ) -> Self {
        Self {
            source,
            notifier: Notifier::new(tracker.clone(), DEFAULT_BOT_LOGIN),
            tracker,
            parser: ReadmeParser::new(),
            repositories,
            fetch_timeout: Duration::from_millis(FETCH_TIMEOUT_MS),
            stagger_delay: Duration::from_millis(FETCH_STAGGER_DELAY_MS),
        }
    }

    /// Identity whose issues count as prior notifications
    pub fn with_bot_login(mut self, bot_login: &str) -> Self {
        self.notifier = Notifier::new(self.tracker.clone(), bot_login);
        self
    }

    /// Upper bound for the latest-version fetch
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn with_stagger_delay(mut self, stagger_delay: Duration) -> Self {
        self.stagger_delay = stagger_delay;
        self
    }

    /// Run one sweep.
    ///
    /// Returns `Err` only when the latest version could not be fetched, in
    /// which case no repository is touched.
    pub async fn run(&self) -> Result<SweepReport, SweepError> {
        info!("Starting sweep of {} repositories", self.repositories.len());

        let latest = tokio::time::timeout(self.fetch_timeout, self.source.fetch_latest())
            .await
            .unwrap_or_else(|_| Err(FetchError::Timeout(self.fetch_timeout)))
            .inspect_err(|e| error!("Failed to fetch latest WordPress version. {}", e))?;

        info!("Latest WordPress version is {}", latest);

        let locks = NotificationLocks::default();

        let futures = self.repositories.iter().enumerate().map(|(i, repository)| {
            let delay = self.stagger_delay * i as u32;
            let latest = latest.as_str();
            let locks = &locks;
            async move {
                sleep(delay).await;
                let outcome = self.check_repository(repository, latest, locks).await;
                (repository.clone(), outcome)
            }
        });

        let results = join_all(futures).await;
        let report = SweepReport { latest, results };

        info!(
            "Sweep finished against {}: {} current, {} notified, {} already notified, {} failed",
            report.latest,
            report.current_count(),
            report.notified_count(),
            report.already_notified_count(),
            report.failed_count()
        );

        Ok(report)
    }

    async fn check_repository(
        &self,
        repository: &RepositoryRef,
        latest: &str,
        locks: &NotificationLocks,
    ) -> RepositoryOutcome {
        match self.try_check_repository(repository, latest, locks).await {
            Ok(outcome) => outcome,
            Err(e) => {
                match &e {
                    CheckError::MalformedDescriptor { .. } => warn!(kind = e.kind(), "{}", e),
                    _ => error!(kind = e.kind(), "{}", e),
                }
                RepositoryOutcome::Failed(e)
            }
        }
    }

    async fn try_check_repository(
        &self,
        repository: &RepositoryRef,
        latest: &str,
        locks: &NotificationLocks,
    ) -> Result<RepositoryOutcome, CheckError> {
        let readme = self.tracker.read_file(repository).await.map_err(|source| {
            CheckError::DescriptorRead {
                repository: repository.clone(),
                source,
            }
        })?;

        let declared = self
            .parser
            .parse(&readme)
            .map_err(|source| CheckError::MalformedDescriptor {
                repository: repository.clone(),
                source,
            })?;

        if evaluate(&declared, latest) == Staleness::Current {
            debug!(
                "Repository {} is tested up to {}, latest is {}",
                repository, declared, latest
            );
            return Ok(RepositoryOutcome::Current { declared });
        }

        info!(
            "Repository {} is tested up to {} but latest is {}",
            repository, declared, latest
        );

        // Entries for the same repository deduplicate one after another
        let lock = locks.for_repository(repository);
        let mut handled = lock.lock().await;

        if *handled {
            info!(
                "Repository {} was already handled in this sweep, skipping {}",
                repository, repository.path
            );
            return Ok(RepositoryOutcome::AlreadyNotified { declared });
        }

        let outcome = self
            .notifier
            .notify_if_needed(repository, &declared, latest)
            .await?;
        *handled = true;

        match outcome {
            NotifyOutcome::AlreadyNotified { .. } => {
                Ok(RepositoryOutcome::AlreadyNotified { declared })
            }
            NotifyOutcome::Notified { issue_number } => Ok(RepositoryOutcome::Notified {
                declared,
                issue_number,
            }),
        }
    }
}

/// Per-sweep lock for each repository, set once a notification check succeeds
#[derive(Default)]
struct NotificationLocks(Mutex<HashMap<String, Arc<AsyncMutex<bool>>>>);

impl NotificationLocks {
    fn for_repository(&self, repository: &RepositoryRef) -> Arc<AsyncMutex<bool>> {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(repository.full_name())
            .or_default()
            .clone()
    }
}
