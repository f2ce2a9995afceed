//! HTTP snapshot source.
//!
//! Fetches the snapshot document over HTTP(S). Every request carries a
//! unique `t` query parameter so intermediate caches never answer with a
//! stale copy.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Url};
use tracing::debug;

use super::{Snapshot, SnapshotFetcher};
use crate::error::SourceError;

/// Query parameter used to defeat caches.
const CACHE_BUSTER: &str = "t";

/// A fetcher that downloads the snapshot JSON from a URL.
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
    url: Url,
    description: String,
    sequence: AtomicU64,
}

impl HttpFetcher {
    /// Create a new builder for configuring the fetcher.
    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder::default()
    }

    /// The base resource URL, without the cache-busting parameter.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The URL for the next request, with a fresh cache-busting token.
    pub fn cache_busted_url(&self) -> Url {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let token = format!("{}-{}", Utc::now().timestamp_millis(), sequence);
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair(CACHE_BUSTER, &token);
        url
    }
}

#[async_trait]
impl SnapshotFetcher for HttpFetcher {
    async fn fetch(&self) -> Result<Snapshot, SourceError> {
        let url = self.cache_busted_url();
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        Snapshot::from_slice(&body)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`HttpFetcher`].
#[derive(Debug, Default)]
pub struct HttpFetcherBuilder {
    url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpFetcherBuilder {
    /// Set the snapshot URL (e.g., "https://example.org/bnti_data.json").
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set an explicit request timeout. Without one the transport defaults apply.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the fetcher.
    pub fn build(self) -> Result<HttpFetcher, SourceError> {
        let raw = self
            .url
            .ok_or_else(|| SourceError::InvalidUrl("no URL configured".to_string()))?;
        let url = Url::parse(&raw).map_err(|e| SourceError::InvalidUrl(format!("{}: {}", raw, e)))?;

        let mut client = Client::builder();
        if let Some(timeout) = self.timeout {
            client = client.timeout(timeout);
        }
        let client = client.build()?;

        Ok(HttpFetcher {
            client,
            description: format!("http: {}", url),
            url,
            sequence: AtomicU64::new(0),
        })
    }
}
