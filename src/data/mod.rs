//! Derivation of display data from index snapshots.
//!
//! Every function in this module is pure: the same [`Snapshot`](crate::Snapshot)
//! always yields the same view.
//!
//! ## Submodules
//!
//! - [`coerce`]: Lenient number coercion for loosely typed JSON values
//! - [`time`]: Timestamp parsing and UTC display formatting
//! - [`normalize`]: Index readings and ordered time-series points
//! - [`tier`]: Severity tiers for statuses, scores and event weights
//! - [`rank`]: Country and event rankings
//! - [`series`]: History/forecast alignment for the chart
//! - [`dashboard`]: The complete [`DashboardView`]
//!
//! ## Data Flow
//!
//! ```text
//! Snapshot (lenient JSON)
//!        │
//!        ▼
//! DashboardView::derive()
//!        │
//!        ├──▶ normalize_points() ──▶ build_series()
//!        │
//!        ├──▶ rank_countries() / rank_events()
//!        │
//!        └──▶ header, metrics, weights
//! ```

pub mod coerce;
pub mod dashboard;
pub mod normalize;
pub mod rank;
pub mod series;
pub mod tier;
pub mod time;

pub use dashboard::{
    DashboardView, Direction, HeaderView, MethodologyView, MetricsView, Polarity, Trend,
    WeightView,
};
pub use normalize::{index_value, normalize_points, IndexReading, NormalizedPoint};
pub use rank::{rank_countries, rank_events, CountryScore, EventView, EVENT_DISPLAY_LIMIT};
pub use series::{build_series, ChartSeries, SeriesView, INDEX_MAX, INDEX_MIN};
pub use tier::Tier;
