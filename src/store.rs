//! Holder of the current snapshot.
//!
//! The store is the only owner of "the current snapshot". Adoption is a
//! single check-and-swap on a watch channel, so readers never observe a
//! half-replaced value and every subscriber sees each adoption as one change.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::source::Snapshot;

/// Rule deciding whether a candidate's `generated_at` counts as fresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreshnessPolicy {
    /// Fresh whenever the token differs from the current one.
    #[default]
    Distinct,
    /// Fresh only when the token sorts strictly after the current one.
    Monotonic,
}

impl FreshnessPolicy {
    /// Compare a candidate token against the held one, if any.
    pub fn is_fresh(&self, candidate: &str, current: Option<&str>) -> bool {
        match (self, current) {
            (_, None) => true,
            (FreshnessPolicy::Distinct, Some(current)) => candidate != current,
            (FreshnessPolicy::Monotonic, Some(current)) => candidate > current,
        }
    }
}

/// Current-snapshot holder with subscribe/notify semantics.
#[derive(Debug)]
pub struct SnapshotStore {
    sender: watch::Sender<Option<Arc<Snapshot>>>,
    policy: FreshnessPolicy,
}

impl SnapshotStore {
    pub fn new(policy: FreshnessPolicy) -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender, policy }
    }

    pub fn policy(&self) -> FreshnessPolicy {
        self.policy
    }

    /// The adopted snapshot, or `None` before the first adoption.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.sender.borrow().clone()
    }

    /// Adopt `candidate` if it carries a fresh `generated_at` token.
    ///
    /// Returns `true` when the candidate replaced the current snapshot.
    /// A candidate without a token is never adopted.
    pub fn try_replace(&self, candidate: Snapshot) -> bool {
        let Some(token) = candidate.meta.freshness_token().map(str::to_string) else {
            debug!("Rejecting snapshot without generated_at");
            return false;
        };

        let mut candidate = Some(candidate);
        let policy = self.policy;
        self.sender.send_if_modified(|current| {
            let held = current.as_ref().and_then(|s| s.meta.freshness_token());
            if !policy.is_fresh(&token, held) {
                return false;
            }
            match candidate.take() {
                Some(snapshot) => {
                    *current = Some(Arc::new(snapshot));
                    true
                }
                None => false,
            }
        })
    }

    /// Receiver that is marked changed on each adoption.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.sender.subscribe()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(FreshnessPolicy::default())
    }
}
