//! Derivation of the complete dashboard view from one snapshot.
//!
//! Everything here is a pure function of the [`Snapshot`]; nothing survives
//! from one adoption to the next.

use serde::Serialize;
use serde_json::Value;

use super::coerce;
use super::normalize::{index_value, normalize_points, NormalizedPoint};
use super::rank::{rank_countries, rank_events, CountryScore, EventView};
use super::series::{build_series, SeriesView};
use super::tier::Tier;
use super::time::date_time_label;
use crate::source::Snapshot;

/// Status shown when the snapshot carries none.
pub const DEFAULT_STATUS: &str = "STABLE";

/// Header: status pill and update timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderView {
    pub status_label: String,
    pub status_tier: Tier,
    pub generated_at: String,
    pub next_update: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Direction of the latest index move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Up => "▲",
            Direction::Down => "▼",
            Direction::Flat => "━",
        }
    }
}

/// Change between the last two history points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trend {
    /// Fewer than two history points.
    NoTrend,
    Change { delta: f64, direction: Direction },
}

impl Trend {
    pub fn from_points(history: &[NormalizedPoint]) -> Self {
        let [.., previous, latest] = history else {
            return Trend::NoTrend;
        };
        let delta = latest.value - previous.value;
        let direction = if delta > 0.0 {
            Direction::Up
        } else if delta < 0.0 {
            Direction::Down
        } else {
            Direction::Flat
        };
        Trend::Change { delta, direction }
    }

    /// Signed delta with two decimals ("+2.00", "-2.00", "0.00").
    pub fn delta_text(&self) -> Option<String> {
        match self {
            Trend::NoTrend => None,
            Trend::Change {
                direction: Direction::Flat,
                ..
            } => Some("0.00".to_string()),
            Trend::Change {
                delta,
                direction: Direction::Up,
            } => Some(format!("+{:.2}", delta)),
            Trend::Change { delta, .. } => Some(format!("{:.2}", delta)),
        }
    }

    /// Display label, e.g. "▲ +2.00", or "Trend: --" without enough points.
    pub fn label(&self) -> String {
        match (self, self.delta_text()) {
            (Trend::Change { direction, .. }, Some(text)) => format!("{} {}", direction.arrow(), text),
            _ => "Trend: --".to_string(),
        }
    }
}

/// Headline metric block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsView {
    pub index: f64,
    pub index_text: String,
    pub tier: Tier,
    pub trend: Trend,
    pub trend_label: String,
    pub signal_count: usize,
}

/// Whether a methodology weight pushes the index up or down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

/// One category weight of the scoring methodology.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightView {
    pub key: String,
    pub label: String,
    pub value: f64,
    pub value_text: String,
    pub polarity: Polarity,
}

impl WeightView {
    fn new(key: &str, raw: &Value) -> Self {
        let value = coerce::finite(Some(raw)).unwrap_or(0.0);
        let sign = if value > 0.0 { "+" } else { "" };
        WeightView {
            key: key.to_string(),
            label: key.replace('_', " ").to_uppercase(),
            value,
            value_text: format!("{}{:.1}", sign, value),
            polarity: if value >= 0.0 {
                Polarity::Positive
            } else {
                Polarity::Negative
            },
        }
    }
}

/// Methodology text passed through for the explainer overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodologyView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

/// The complete set of view-models for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    pub history: Vec<NormalizedPoint>,
    pub forecast: Vec<NormalizedPoint>,
    pub header: HeaderView,
    pub metrics: MetricsView,
    pub weights: Vec<WeightView>,
    pub methodology: MethodologyView,
    pub countries: Vec<CountryScore>,
    pub events: Vec<EventView>,
    pub series: SeriesView,
}

impl DashboardView {
    /// Recompute every view-model from a snapshot, in dependency order.
    pub fn derive(snapshot: &Snapshot) -> Self {
        let history = normalize_points(&snapshot.history);
        let forecast = normalize_points(&snapshot.forecast);

        let header = derive_header(snapshot);
        let metrics = derive_metrics(snapshot, &history);
        let weights = derive_weights(snapshot);
        let methodology = MethodologyView {
            name: snapshot.methodology.name.clone(),
            description: snapshot.methodology.description.clone(),
            formula: snapshot.methodology.formula.clone(),
        };
        let countries = rank_countries(&snapshot.countries);
        let events = rank_events(&snapshot.countries);
        let series = build_series(&history, &forecast);

        DashboardView {
            generated_at: snapshot.meta.freshness_token().map(str::to_string),
            history,
            forecast,
            header,
            metrics,
            weights,
            methodology,
            countries,
            events,
            series,
        }
    }
}

fn derive_header(snapshot: &Snapshot) -> HeaderView {
    let meta = &snapshot.meta;
    let status_label = meta
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_STATUS)
        .to_uppercase();

    HeaderView {
        status_tier: Tier::from_status(&status_label),
        status_label,
        generated_at: date_time_label(meta.generated_at.as_deref()),
        next_update: date_time_label(meta.next_update.as_deref()),
        version: meta.version.clone(),
    }
}

fn derive_metrics(snapshot: &Snapshot, history: &[NormalizedPoint]) -> MetricsView {
    let index = index_value(Some(&snapshot.meta));
    let trend = Trend::from_points(history);

    MetricsView {
        index,
        index_text: format!("{:.2}", index),
        tier: Tier::from_score(index),
        trend_label: trend.label(),
        trend,
        signal_count: snapshot.signal_count(),
    }
}

fn derive_weights(snapshot: &Snapshot) -> Vec<WeightView> {
    let mut weights: Vec<WeightView> = snapshot
        .methodology
        .weights
        .iter()
        .map(|(key, raw)| WeightView::new(key, raw))
        .collect();
    weights.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.label.cmp(&b.label)));
    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn history(values: &[f64]) -> Vec<NormalizedPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| NormalizedPoint {
                ts: Utc.with_ymd_and_hms(2026, 2, 10, i as u32, 0, 0).unwrap(),
                value: *v,
                kind: "historical".to_string(),
                confidence: None,
            })
            .collect()
    }

    fn snapshot(value: serde_json::Value) -> Snapshot {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_trend_up_down_flat() {
        let up = Trend::from_points(&history(&[5.0, 7.0]));
        assert_eq!(up.delta_text().as_deref(), Some("+2.00"));
        assert_eq!(up.label(), "▲ +2.00");

        let down = Trend::from_points(&history(&[7.0, 5.0]));
        assert_eq!(down.delta_text().as_deref(), Some("-2.00"));
        assert_eq!(down.label(), "▼ -2.00");

        let flat = Trend::from_points(&history(&[5.0, 5.0]));
        assert_eq!(flat.delta_text().as_deref(), Some("0.00"));
        assert!(matches!(flat, Trend::Change { direction: Direction::Flat, .. }));
    }

    #[test]
    fn test_trend_needs_two_points() {
        assert_eq!(Trend::from_points(&history(&[5.0])), Trend::NoTrend);
        assert_eq!(Trend::from_points(&[]), Trend::NoTrend);
        assert_eq!(Trend::NoTrend.label(), "Trend: --");
        assert!(Trend::NoTrend.delta_text().is_none());
    }

    #[test]
    fn test_trend_uses_last_two_points_only() {
        let trend = Trend::from_points(&history(&[1.0, 9.0, 4.0, 4.5]));
        assert_eq!(trend.delta_text().as_deref(), Some("+0.50"));
    }

    #[test]
    fn test_derive_full_snapshot() {
        let view = DashboardView::derive(&snapshot(json!({
            "meta": {
                "generated_at": "2026-02-10T12:00:00",
                "next_update": "2026-02-10T13:00:00",
                "main_index": 7.25,
                "status": "critical"
            },
            "history": [
                { "timestamp": "2026-02-10T11:00:00", "main_index": 6.5 },
                { "timestamp": "bad" },
                { "timestamp": "2026-02-10T10:00:00", "main_index": 6.0 },
                { "timestamp": "2026-02-10T12:00:00", "main_index": 7.25 }
            ],
            "forecast": [
                { "timestamp": "2026-02-10T13:00:00", "main_index": 7.4, "confidence": 0.9, "type": "forecast" }
            ],
            "countries": {
                "Syria": { "index": 8.1, "events": [{ "title": "a", "weight": 10, "confidence": 0.9 }, { "title": "b" }] },
                "Greece": { "index": 2.0, "events": [{ "title": "c", "weight": -2 }] }
            },
            "methodology": {
                "name": "Modified Goldstein Scale",
                "weights": { "peaceful_diplomacy": -2.0, "neutral news": 0.0, "military conflict": 10.0 }
            }
        })));

        assert_eq!(view.generated_at.as_deref(), Some("2026-02-10T12:00:00"));
        assert_eq!(view.history.len(), 3);
        assert_eq!(view.forecast.len(), 1);

        assert_eq!(view.header.status_label, "CRITICAL");
        assert_eq!(view.header.status_tier, Tier::Critical);
        assert_eq!(view.header.generated_at, "Feb 10, 2026 12:00");

        assert_eq!(view.metrics.index_text, "7.25");
        assert_eq!(view.metrics.tier, Tier::Critical);
        assert_eq!(view.metrics.trend_label, "▲ +0.75");
        assert_eq!(view.metrics.signal_count, 3);

        let weights: Vec<(&str, &str)> = view
            .weights
            .iter()
            .map(|w| (w.label.as_str(), w.value_text.as_str()))
            .collect();
        assert_eq!(
            weights,
            vec![("MILITARY CONFLICT", "+10.0"), ("NEUTRAL NEWS", "0.0"), ("PEACEFUL DIPLOMACY", "-2.0")]
        );
        assert_eq!(view.weights[1].polarity, Polarity::Positive);
        assert_eq!(view.weights[2].polarity, Polarity::Negative);

        assert_eq!(view.countries[0].name, "Syria");
        assert_eq!(view.events[0].title, "a");
        assert_eq!(view.events.len(), 3);
        assert_eq!(view.methodology.name.as_deref(), Some("Modified Goldstein Scale"));

        let chart = view.series.chart().unwrap();
        assert_eq!(chart.point_count(), 4);
        assert_eq!(chart.forecast, vec![None, None, Some(7.25), Some(7.4)]);
    }

    #[test]
    fn test_derive_empty_snapshot() {
        let view = DashboardView::derive(&Snapshot::default());

        assert!(view.generated_at.is_none());
        assert_eq!(view.header.status_label, DEFAULT_STATUS);
        assert_eq!(view.header.status_tier, Tier::Stable);
        assert_eq!(view.header.next_update, "--");
        assert_eq!(view.metrics.index_text, "0.00");
        assert_eq!(view.metrics.trend, Trend::NoTrend);
        assert_eq!(view.metrics.signal_count, 0);
        assert!(view.countries.is_empty());
        assert!(view.events.is_empty());
        assert!(view.series.is_empty());
    }

    #[test]
    fn test_view_serializes() {
        let view = DashboardView::derive(&Snapshot::default());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["series"]["state"], "empty");
        assert_eq!(json["metrics"]["trend"]["kind"], "no_trend");
        assert_eq!(json["header"]["status_tier"], "stable");
    }
}
