//! Chart series alignment.
//!
//! History and forecast share one label axis. The forecast line starts at a
//! junction point equal to the last history value so the two lines join.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::normalize::NormalizedPoint;
use super::time::format_time;

/// Lower bound of the index domain; the chart axis is fixed to it.
pub const INDEX_MIN: f64 = 1.0;
/// Upper bound of the index domain.
pub const INDEX_MAX: f64 = 10.0;

/// Chart input, or an explicit signal that there is nothing to plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SeriesView {
    Empty,
    Chart(ChartSeries),
}

impl SeriesView {
    pub fn is_empty(&self) -> bool {
        matches!(self, SeriesView::Empty)
    }

    pub fn chart(&self) -> Option<&ChartSeries> {
        match self {
            SeriesView::Chart(series) => Some(series),
            SeriesView::Empty => None,
        }
    }
}

/// Two value arrays aligned on one label axis.
///
/// `history` and `forecast` have the same length as `labels`; `None` marks a
/// position where the line has no value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub timestamps: Vec<DateTime<Utc>>,
    pub history: Vec<Option<f64>>,
    pub forecast: Vec<Option<f64>>,
    /// Position shared by both lines.
    pub junction: usize,
    pub y_min: f64,
    pub y_max: f64,
}

impl ChartSeries {
    /// Positions on the label axis; at least one.
    pub fn point_count(&self) -> usize {
        self.labels.len()
    }

    /// `(position, value)` pairs of the history line.
    pub fn history_points(&self) -> Vec<(f64, f64)> {
        present_points(&self.history)
    }

    /// `(position, value)` pairs of the forecast line, junction included.
    pub fn forecast_points(&self) -> Vec<(f64, f64)> {
        present_points(&self.forecast)
    }
}

fn present_points(values: &[Option<f64>]) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
        .collect()
}

/// Align history and forecast onto one axis.
///
/// Returns [`SeriesView::Empty`] when there is no history. Values outside
/// `[INDEX_MIN, INDEX_MAX]` are passed through unclipped.
pub fn build_series(history: &[NormalizedPoint], forecast: &[NormalizedPoint]) -> SeriesView {
    let Some(last) = history.last() else {
        return SeriesView::Empty;
    };

    let timestamps: Vec<DateTime<Utc>> = history.iter().chain(forecast).map(|p| p.ts).collect();
    let labels = timestamps.iter().map(format_time).collect();
    let total = timestamps.len();

    let mut history_values: Vec<Option<f64>> = history.iter().map(|p| Some(p.value)).collect();
    history_values.resize(total, None);

    let junction = history.len().saturating_sub(1);
    let mut forecast_values: Vec<Option<f64>> = vec![None; junction];
    forecast_values.push(Some(last.value));
    forecast_values.extend(forecast.iter().map(|p| Some(p.value)));

    SeriesView::Chart(ChartSeries {
        labels,
        timestamps,
        history: history_values,
        forecast: forecast_values,
        junction,
        y_min: INDEX_MIN,
        y_max: INDEX_MAX,
    })
}
