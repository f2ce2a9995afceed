// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # threatwatch
//!
//! A live terminal dashboard for a regional threat index.
//!
//! The dashboard polls a JSON snapshot of the index once a minute, adopts
//! it only when its `generated_at` token is fresh, and derives everything it
//! displays (headline tier and trend, country ranking, top events, the
//! history/forecast chart) from the adopted snapshot alone.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────── Supervisor ────────────────────────────┐
//! │                                                                    │
//! │  Poller ──▶ SnapshotStore::try_replace ──▶ Orchestrator::adopt     │
//! │    │                                            │                  │
//! │    ▼                                            ▼                  │
//! │  HttpFetcher | FileFetcher          watch<Arc<DashboardView>>      │
//! │                                                 │                  │
//! └─────────────────────────────────────────────────┼──────────────────┘
//!                                                   ▼
//!                                    app (state) ──▶ ui (ratatui)
//! ```
//!
//! - **[`source`]**: Snapshot model with lenient decoding, and the
//!   [`SnapshotFetcher`] trait with HTTP and file implementations
//! - **[`data`]**: Pure derivation: normalization, tiers, rankings, chart
//!   series and the complete [`DashboardView`]
//! - **[`store`]**: The current snapshot and its freshness rule
//! - **[`orchestrator`]**: Publishes a new view after each adoption
//! - **[`poller`]**: The fixed 60-second poll cycle
//! - **[`supervisor`]**: Owns the periodic tasks and their stop signal
//! - **[`app`]**, **[`events`]**, **[`ui`]**: The terminal dashboard
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Poll a published snapshot
//! threatwatch --url https://example.org/bnti_data.json
//!
//! # Watch a local file, seeded from the static script form
//! threatwatch --file bnti_data.json --bootstrap bnti_data.js
//!
//! # Derive the view once and write it as JSON
//! threatwatch --file bnti_data.json --export view.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use threatwatch::{DashboardView, Snapshot};
//!
//! let snapshot = Snapshot::from_json(
//!     r#"{ "meta": { "generated_at": "2026-02-10T12:00:00", "main_index": 7.2 } }"#,
//! ).unwrap();
//! let view = DashboardView::derive(&snapshot);
//! assert_eq!(view.metrics.index_text, "7.20");
//! ```
//!
//! ### Running the poller
//!
//! ```no_run
//! use std::sync::Arc;
//! use threatwatch::{FreshnessPolicy, HttpFetcher, Supervisor};
//!
//! # tokio_test::block_on(async {
//! let fetcher = HttpFetcher::builder()
//!     .url("https://example.org/bnti_data.json")
//!     .build()
//!     .unwrap();
//!
//! let supervisor = Supervisor::new(FreshnessPolicy::Monotonic);
//! supervisor.start_poller(Arc::new(fetcher));
//! supervisor.start_clock();
//!
//! let mut views = supervisor.views();
//! views.changed().await.unwrap();
//! supervisor.shutdown().await;
//! # });
//! ```

pub mod app;
pub mod data;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod poller;
pub mod settings;
pub mod source;
pub mod store;
pub mod supervisor;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use data::{CountryScore, DashboardView, EventView, SeriesView, Tier, Trend};
pub use error::SourceError;
pub use orchestrator::Orchestrator;
pub use poller::{PollOutcome, PollReport, Poller, POLL_INTERVAL};
pub use settings::Settings;
pub use source::{FileFetcher, HttpFetcher, Snapshot, SnapshotFetcher};
pub use store::{FreshnessPolicy, SnapshotStore};
pub use supervisor::Supervisor;
