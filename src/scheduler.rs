//! Periodic sweep trigger
//!
//! Each tick spawns a sweep. A tick that fires while the previous sweep is
//! still running is skipped, so a process never runs two sweeps at once.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info};

use crate::sweep::Sweeper;

/// Result of a single trigger
#[derive(Debug)]
pub enum TriggerOutcome {
    /// A sweep was spawned
    Started(JoinHandle<()>),
    /// A sweep was already in flight
    Skipped,
}

/// Clears the in-flight flag when the sweep task ends, even by panic
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Scheduler {
    sweeper: Arc<Sweeper>,
    interval: Duration,
    run_on_start: bool,
    in_flight: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new(sweeper: Arc<Sweeper>, interval: Duration, run_on_start: bool) -> Self {
        Self {
            sweeper,
            interval,
            run_on_start,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_sweep_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Spawn a sweep unless one is already running
    pub fn trigger(&self) -> TriggerOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!("Previous sweep is still running, skipping this tick");
            return TriggerOutcome::Skipped;
        }

        let guard = InFlightGuard(self.in_flight.clone());
        let sweeper = self.sweeper.clone();

        TriggerOutcome::Started(tokio::spawn(async move {
            let _guard = guard;
            // Failures are logged by the sweep itself
            if sweeper.run().await.is_err() {
                debug!("Sweep aborted, next attempt on the next tick");
            }
        }))
    }

    /// Trigger sweeps on the interval until `shutdown` resolves, then wait
    /// for the in-flight sweep to finish.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let start = if self.run_on_start {
            Instant::now()
        } else {
            Instant::now() + self.interval
        };
        let mut ticker = interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Scheduler started: sweeping every {:?}{}",
            self.interval,
            if self.run_on_start {
                ", first sweep now"
            } else {
                ""
            }
        );

        tokio::pin!(shutdown);
        let mut current: Option<JoinHandle<()>> = None;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping scheduler");
                    break;
                }
                _ = ticker.tick() => {
                    if let TriggerOutcome::Started(handle) = self.trigger() {
                        current = Some(handle);
                    }
                }
            }
        }

        if let Some(handle) = current {
            if !handle.is_finished() {
                info!("Waiting for the running sweep to finish");
            }
            let _ = handle.await;
        }
    }
}

/// Resolves once `signal` fires. A listener that fails to register is
/// logged and also resolves, so the scheduler stops with a reason.
pub async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!("Failed to listen for shutdown signal, stopping scheduler: {}", e);
    }
}
