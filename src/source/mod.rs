//! Snapshot sources.
//!
//! A [`SnapshotFetcher`] produces one candidate snapshot per call. The
//! poller calls it once per tick; whether the candidate is adopted is the
//! store's decision, not the fetcher's.

mod file;
mod http;
pub mod loose;
mod snapshot;

pub use file::FileFetcher;
pub use http::{HttpFetcher, HttpFetcherBuilder};
pub use snapshot::{CountryRecord, EventRecord, Meta, Methodology, RawPoint, Snapshot};

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::SourceError;

/// Trait for fetching candidate snapshots from various backends.
///
/// # Example
///
/// ```no_run
/// use threatwatch::{FileFetcher, SnapshotFetcher};
///
/// # tokio_test::block_on(async {
/// let fetcher = FileFetcher::new("bnti_data.json");
/// match fetcher.fetch().await {
///     Ok(snapshot) => println!("{} countries", snapshot.countries.len()),
///     Err(e) => eprintln!("{}: {}", fetcher.description(), e),
/// }
/// # });
/// ```
#[async_trait]
pub trait SnapshotFetcher: Send + Sync + Debug {
    /// Fetch and decode one candidate snapshot.
    async fn fetch(&self) -> Result<Snapshot, SourceError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the status bar and in log lines.
    fn description(&self) -> &str;
}
