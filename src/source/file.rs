//! File-based snapshot source.
//!
//! Reads the snapshot JSON (or its `window.NAME = ...;` script form) from a
//! local file. Useful when the scraper writes next to the dashboard.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{Snapshot, SnapshotFetcher};
use crate::error::SourceError;

/// A fetcher that re-reads a snapshot file on every call.
///
/// Unlike a modification-time watcher this always returns what is on disk;
/// the store decides whether it is fresh.
#[derive(Debug)]
pub struct FileFetcher {
    path: PathBuf,
    description: String,
}

impl FileFetcher {
    /// Create a new file fetcher for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self { path, description }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotFetcher for FileFetcher {
    async fn fetch(&self) -> Result<Snapshot, SourceError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        Snapshot::from_payload(&content)
    }

    fn description(&self) -> &str {
        &self.description
    }
}
