//! Ownership of the long-lived background tasks.
//!
//! The supervisor holds the store, the orchestrator and one stop signal
//! shared by every task it spawns. Each kind of periodic task runs at most
//! once, however often it is requested.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::data::DashboardView;
use crate::orchestrator::Orchestrator;
use crate::poller::{PollReport, Poller};
use crate::source::{Snapshot, SnapshotFetcher};
use crate::store::{FreshnessPolicy, SnapshotStore};

/// Period of the dashboard clock.
pub const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
struct Tasks {
    poller: Option<JoinHandle<()>>,
    clock: Option<JoinHandle<()>>,
}

impl Tasks {
    fn count(&self) -> usize {
        self.poller
            .iter()
            .chain(self.clock.iter())
            .filter(|handle| !handle.is_finished())
            .count()
    }
}

fn is_live(slot: &Option<JoinHandle<()>>) -> bool {
    slot.as_ref().is_some_and(|handle| !handle.is_finished())
}

/// Owner of the store, the orchestrator and the periodic tasks.
#[derive(Debug)]
pub struct Supervisor {
    store: Arc<SnapshotStore>,
    orchestrator: Arc<Orchestrator>,
    stop_tx: watch::Sender<bool>,
    clock_tx: watch::Sender<DateTime<Utc>>,
    reports_tx: watch::Sender<Option<PollReport>>,
    tasks: Mutex<Tasks>,
}

impl Supervisor {
    pub fn new(policy: FreshnessPolicy) -> Self {
        let (stop_tx, _) = watch::channel(false);
        let (clock_tx, _) = watch::channel(Utc::now());
        let (reports_tx, _) = watch::channel(None);
        Self {
            store: Arc::new(SnapshotStore::new(policy)),
            orchestrator: Arc::new(Orchestrator::new()),
            stop_tx,
            clock_tx,
            reports_tx,
            tasks: Mutex::new(Tasks::default()),
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn views(&self) -> watch::Receiver<Option<Arc<DashboardView>>> {
        self.orchestrator.subscribe()
    }

    pub fn clock(&self) -> watch::Receiver<DateTime<Utc>> {
        self.clock_tx.subscribe()
    }

    /// Reports of the poll cycles, forwarded from the running poller.
    pub fn reports(&self) -> watch::Receiver<Option<PollReport>> {
        self.reports_tx.subscribe()
    }

    /// Offer the startup payload. Returns `true` when it was adopted.
    pub fn bootstrap(&self, snapshot: Snapshot) -> bool {
        let adopted = self.orchestrator.offer(&self.store, snapshot);
        if adopted {
            info!("Bootstrap snapshot adopted");
        } else {
            warn!("Bootstrap snapshot not adopted");
        }
        adopted
    }

    fn is_stopped(&self) -> bool {
        *self.stop_tx.borrow()
    }

    /// Spawn the poller unless one is already running or the supervisor
    /// has been shut down.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_poller(&self, fetcher: Arc<dyn SnapshotFetcher>) -> bool {
        if self.is_stopped() {
            debug!("Supervisor stopped; poller not started");
            return false;
        }
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if is_live(&tasks.poller) {
            debug!("Poller already running");
            return false;
        }

        let poller = Poller::new(fetcher, Arc::clone(&self.store), Arc::clone(&self.orchestrator));
        let mut poller_reports = poller.reports();
        let reports_tx = self.reports_tx.clone();
        let stop_rx = self.stop_tx.subscribe();

        tasks.poller = Some(tokio::spawn(async move {
            let forward = async {
                while poller_reports.changed().await.is_ok() {
                    let report = poller_reports.borrow_and_update().clone();
                    reports_tx.send_replace(report);
                }
            };
            tokio::select! {
                _ = poller.run(stop_rx) => {}
                _ = forward => {}
            }
        }));
        true
    }

    /// Spawn the one-second clock unless one is already running or the
    /// supervisor has been shut down.
    pub fn start_clock(&self) -> bool {
        if self.is_stopped() {
            debug!("Supervisor stopped; clock not started");
            return false;
        }
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if is_live(&tasks.clock) {
            debug!("Clock already running");
            return false;
        }

        let clock_tx = self.clock_tx.clone();
        let mut stop_rx = self.stop_tx.subscribe();
        tasks.clock = Some(tokio::spawn(async move {
            if *stop_rx.borrow() {
                return;
            }
            let mut ticker = interval(CLOCK_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        clock_tx.send_replace(Utc::now());
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        }));
        true
    }

    /// Number of periodic tasks that are still running.
    pub fn running_tasks(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .count()
    }

    /// Signal every task to stop and wait for them to finish.
    pub async fn shutdown(&self) {
        self.stop_tx.send_replace(true);
        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));
        for handle in tasks.poller.into_iter().chain(tasks.clock) {
            if let Err(e) = handle.await {
                warn!(error = %e, "Background task ended abnormally");
            }
        }
        info!("Supervisor shut down");
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new(FreshnessPolicy::default())
    }
}
