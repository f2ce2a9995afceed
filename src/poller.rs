//! Periodic snapshot polling.
//!
//! Each tick moves the poller `Idle -> Fetching -> {Applied, Stale, Failed}
//! -> Idle`. Failures are logged and reported; the last good view stays
//! published and the next tick simply tries again.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::orchestrator::Orchestrator;
use crate::source::SnapshotFetcher;
use crate::store::SnapshotStore;

/// Fixed refresh period.
pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Longest a single cycle may wait on its fetch.
pub const CYCLE_DEADLINE: Duration = POLL_INTERVAL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Fetching,
}

/// Result of one poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The candidate was adopted and a new view published.
    Applied,
    /// The candidate was not fresh and was discarded.
    Stale,
    /// Transport, status or decode failure.
    Failed(String),
}

impl PollOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            PollOutcome::Applied => "updated",
            PollOutcome::Stale => "no change",
            PollOutcome::Failed(_) => "failed",
        }
    }
}

/// What the last poll cycle did, for the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    pub outcome: PollOutcome,
    pub at: DateTime<Utc>,
    /// Token of the fetched candidate, when one was decoded.
    pub generated_at: Option<String>,
}

/// Fetches a candidate each tick and offers it to the store.
#[derive(Debug)]
pub struct Poller {
    fetcher: Arc<dyn SnapshotFetcher>,
    store: Arc<SnapshotStore>,
    orchestrator: Arc<Orchestrator>,
    state: watch::Sender<PollState>,
    reports: watch::Sender<Option<PollReport>>,
}

impl Poller {
    pub fn new(
        fetcher: Arc<dyn SnapshotFetcher>,
        store: Arc<SnapshotStore>,
        orchestrator: Arc<Orchestrator>,
    ) -> Self {
        let (state, _) = watch::channel(PollState::Idle);
        let (reports, _) = watch::channel(None);
        Self {
            fetcher,
            store,
            orchestrator,
            state,
            reports,
        }
    }

    pub fn state(&self) -> PollState {
        *self.state.borrow()
    }

    /// Receiver for the report of each completed cycle.
    pub fn reports(&self) -> watch::Receiver<Option<PollReport>> {
        self.reports.subscribe()
    }

    /// Run one complete poll cycle.
    ///
    /// A fetch still pending after [`CYCLE_DEADLINE`] is abandoned and the
    /// cycle fails with [`SourceError::Timeout`].
    pub async fn poll_once(&self) -> PollReport {
        self.state.send_replace(PollState::Fetching);
        debug!(source = self.fetcher.description(), "Polling snapshot");

        let fetched = timeout(CYCLE_DEADLINE, self.fetcher.fetch())
            .await
            .unwrap_or(Err(SourceError::Timeout));

        let (outcome, generated_at) = match fetched {
            Ok(candidate) => {
                let token = candidate.meta.freshness_token().map(str::to_string);
                if self.orchestrator.offer(&self.store, candidate) {
                    info!(generated_at = token.as_deref().unwrap_or("-"), "Snapshot applied");
                    (PollOutcome::Applied, token)
                } else {
                    debug!(generated_at = token.as_deref().unwrap_or("-"), "Snapshot unchanged");
                    (PollOutcome::Stale, token)
                }
            }
            Err(e) => {
                warn!(source = self.fetcher.description(), error = %e, "Poll failed");
                (PollOutcome::Failed(e.to_string()), None)
            }
        };

        self.state.send_replace(PollState::Idle);
        let report = PollReport {
            outcome,
            at: Utc::now(),
            generated_at,
        };
        self.reports.send_replace(Some(report.clone()));
        report
    }

    /// Poll every [`POLL_INTERVAL`] until `stop` turns true or its sender
    /// is dropped.
    ///
    /// The first tick fires one period after the call. Cycles never
    /// overlap: a slow fetch delays the next tick by at most
    /// [`CYCLE_DEADLINE`], and missed ticks are skipped.
    pub async fn run(&self, mut stop: watch::Receiver<bool>) {
        if *stop.borrow() {
            return;
        }

        let mut ticker = interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(source = self.fetcher.description(), "Poller started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Poller stopped");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::source::Snapshot;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Fetcher that replays scripted results, then repeats the fallback.
    #[derive(Debug)]
    pub(crate) struct ScriptedFetcher {
        results: Mutex<VecDeque<Result<Snapshot, SourceError>>>,
        fallback: Option<String>,
        pub(crate) calls: AtomicUsize,
    }

    impl ScriptedFetcher {
        pub(crate) fn new(results: Vec<Result<Snapshot, SourceError>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                fallback: None,
                calls: AtomicUsize::new(0),
            }
        }

        /// Always serve a snapshot with the given token.
        pub(crate) fn constant(generated_at: &str) -> Self {
            Self {
                results: Mutex::new(VecDeque::new()),
                fallback: Some(generated_at.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SnapshotFetcher for ScriptedFetcher {
        async fn fetch(&self) -> Result<Snapshot, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.results.lock().unwrap().pop_front();
            match (next, &self.fallback) {
                (Some(result), _) => result,
                (None, Some(token)) => Ok(snapshot(token)),
                (None, None) => Err(SourceError::Connection("script exhausted".to_string())),
            }
        }

        fn description(&self) -> &str {
            "scripted"
        }
    }

    /// Fetcher whose first call never completes; later calls succeed.
    #[derive(Debug, Default)]
    struct StallsFirst {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SnapshotFetcher for StallsFirst {
        async fn fetch(&self) -> Result<Snapshot, SourceError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                std::future::pending::<()>().await;
            }
            Ok(snapshot("a"))
        }

        fn description(&self) -> &str {
            "stalls-first"
        }
    }

    pub(crate) fn snapshot(generated_at: &str) -> Snapshot {
        let mut snapshot = Snapshot::default();
        snapshot.meta.generated_at = Some(generated_at.to_string());
        snapshot
    }

    fn poller(fetcher: ScriptedFetcher) -> Poller {
        Poller::new(
            Arc::new(fetcher),
            Arc::new(SnapshotStore::default()),
            Arc::new(Orchestrator::new()),
        )
    }

    #[tokio::test]
    async fn test_poll_cycle_outcomes() {
        let poller = poller(ScriptedFetcher::new(vec![
            Ok(snapshot("a")),
            Ok(snapshot("a")),
            Err(SourceError::Status(503)),
            Err(SourceError::Parse("expected value".to_string())),
            Ok(snapshot("b")),
        ]));

        assert_eq!(poller.poll_once().await.outcome, PollOutcome::Applied);
        assert_eq!(poller.poll_once().await.outcome, PollOutcome::Stale);

        let failed = poller.poll_once().await;
        assert!(matches!(failed.outcome, PollOutcome::Failed(ref msg) if msg.contains("503")));
        assert!(failed.generated_at.is_none());

        assert!(matches!(poller.poll_once().await.outcome, PollOutcome::Failed(_)));

        let applied = poller.poll_once().await;
        assert_eq!(applied.outcome, PollOutcome::Applied);
        assert_eq!(applied.generated_at.as_deref(), Some("b"));
        assert_eq!(poller.state(), PollState::Idle);
    }

    #[tokio::test]
    async fn test_failure_keeps_last_view() {
        let poller = poller(ScriptedFetcher::new(vec![
            Ok(snapshot("a")),
            Err(SourceError::Timeout),
        ]));

        poller.poll_once().await;
        let before = poller.orchestrator.current().unwrap();
        poller.poll_once().await;
        assert!(Arc::ptr_eq(&before, &poller.orchestrator.current().unwrap()));
    }

    #[tokio::test]
    async fn test_reports_are_published() {
        let poller = poller(ScriptedFetcher::new(vec![Ok(snapshot("a"))]));
        let mut reports = poller.reports();
        assert!(reports.borrow().is_none());

        poller.poll_once().await;
        assert!(reports.has_changed().unwrap());
        let report = reports.borrow_and_update().clone().unwrap();
        assert_eq!(report.outcome, PollOutcome::Applied);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_first_tick_after_one_period() {
        let fetcher = Arc::new(ScriptedFetcher::constant("a"));
        let poller = Arc::new(Poller::new(
            fetcher.clone(),
            Arc::new(SnapshotStore::default()),
            Arc::new(Orchestrator::new()),
        ));
        let (stop_tx, stop_rx) = watch::channel(false);

        let task = tokio::spawn({
            let poller = Arc::clone(&poller);
            async move { poller.run(stop_rx).await }
        });

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(fetcher.calls(), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fetcher.calls(), 1);

        tokio::time::sleep(POLL_INTERVAL).await;
        assert_eq!(fetcher.calls(), 2);

        stop_tx.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_fetch_times_out() {
        let poller = Poller::new(
            Arc::new(StallsFirst::default()),
            Arc::new(SnapshotStore::default()),
            Arc::new(Orchestrator::new()),
        );

        let report = poller.poll_once().await;
        assert!(matches!(report.outcome, PollOutcome::Failed(ref msg) if msg.contains("timed out")));
        assert_eq!(poller.state(), PollState::Idle);

        assert_eq!(poller.poll_once().await.outcome, PollOutcome::Applied);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_recovers_after_hung_fetch() {
        let fetcher = Arc::new(StallsFirst::default());
        let poller = Arc::new(Poller::new(
            fetcher.clone(),
            Arc::new(SnapshotStore::default()),
            Arc::new(Orchestrator::new()),
        ));
        let (stop_tx, stop_rx) = watch::channel(false);

        let task = tokio::spawn({
            let poller = Arc::clone(&poller);
            async move { poller.run(stop_rx).await }
        });

        tokio::time::sleep(POLL_INTERVAL * 4 + Duration::from_secs(1)).await;
        assert!(fetcher.calls.load(Ordering::SeqCst) >= 2);
        assert!(poller.orchestrator.current().is_some());

        stop_tx.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_returns_immediately_when_stopped() {
        let fetcher = Arc::new(ScriptedFetcher::constant("a"));
        let poller = Poller::new(
            fetcher.clone(),
            Arc::new(SnapshotStore::default()),
            Arc::new(Orchestrator::new()),
        );
        let (_stop_tx, stop_rx) = watch::channel(true);

        poller.run(stop_rx).await;
        assert_eq!(fetcher.calls(), 0);
    }
}
