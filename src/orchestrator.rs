//! Publication of derived dashboard views.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::data::DashboardView;
use crate::source::Snapshot;
use crate::store::SnapshotStore;

/// Recomputes the [`DashboardView`] after each adoption and publishes it.
#[derive(Debug)]
pub struct Orchestrator {
    views: watch::Sender<Option<Arc<DashboardView>>>,
}

impl Orchestrator {
    pub fn new() -> Self {
        let (views, _) = watch::channel(None);
        Self { views }
    }

    /// Derive and publish the view for a newly adopted snapshot.
    pub fn adopt(&self, snapshot: &Snapshot) -> Arc<DashboardView> {
        let view = Arc::new(DashboardView::derive(snapshot));
        info!(
            generated_at = view.generated_at.as_deref().unwrap_or("-"),
            index = %view.metrics.index_text,
            events = view.events.len(),
            "Published dashboard view"
        );
        self.views.send_replace(Some(Arc::clone(&view)));
        view
    }

    /// Offer a candidate to the store; publish a new view if it is adopted.
    pub fn offer(&self, store: &SnapshotStore, candidate: Snapshot) -> bool {
        if !store.try_replace(candidate) {
            return false;
        }
        if let Some(current) = store.current() {
            self.adopt(&current);
        }
        true
    }

    /// The most recently published view.
    pub fn current(&self) -> Option<Arc<DashboardView>> {
        self.views.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<DashboardView>>> {
        self.views.subscribe()
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}
