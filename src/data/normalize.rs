//! Point normalization.
//!
//! Turns loosely typed history/forecast arrays into ordered, typed points.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::coerce;
use super::time::parse_instant;
use crate::source::{CountryRecord, Meta, RawPoint};

/// Point kind used when a raw point carries no `type`.
pub const DEFAULT_POINT_KIND: &str = "historical";

/// Records that carry an index reading under `main_index` or `index`.
pub trait IndexReading {
    fn main_index(&self) -> Option<&Value>;
    fn index(&self) -> Option<&Value>;
}

impl IndexReading for Meta {
    fn main_index(&self) -> Option<&Value> {
        self.main_index.as_ref()
    }

    fn index(&self) -> Option<&Value> {
        self.index.as_ref()
    }
}

impl IndexReading for CountryRecord {
    fn main_index(&self) -> Option<&Value> {
        self.main_index.as_ref()
    }

    fn index(&self) -> Option<&Value> {
        self.index.as_ref()
    }
}

impl IndexReading for RawPoint {
    fn main_index(&self) -> Option<&Value> {
        self.main_index.as_ref()
    }

    fn index(&self) -> Option<&Value> {
        self.index.as_ref()
    }
}

/// The record's index reading: `main_index` if present, else `index`.
///
/// Returns 0 when the record is absent or the value is not a finite number.
/// A present but non-numeric `main_index` does not fall through to `index`.
pub fn index_value<R: IndexReading + ?Sized>(record: Option<&R>) -> f64 {
    let Some(record) = record else {
        return 0.0;
    };
    let value = coerce::number(record.main_index().or(record.index()).unwrap_or(&Value::Null));
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// A validated time-series point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPoint {
    pub ts: DateTime<Utc>,
    pub value: f64,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Normalize a raw point array.
///
/// Non-arrays yield nothing. Items whose timestamp is missing or
/// unparseable are dropped. The result is sorted ascending by timestamp;
/// the order among equal timestamps is not part of the contract.
pub fn normalize_points(raw: &Value) -> Vec<NormalizedPoint> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };

    let mut points: Vec<NormalizedPoint> = items
        .iter()
        .filter_map(|item| {
            let point: RawPoint = serde_json::from_value(item.clone()).unwrap_or_default();
            let ts = point.timestamp.as_ref().and_then(parse_instant)?;
            Some(NormalizedPoint {
                ts,
                value: index_value(Some(&point)),
                kind: point
                    .kind
                    .filter(|kind| !kind.is_empty())
                    .unwrap_or_else(|| DEFAULT_POINT_KIND.to_string()),
                confidence: coerce::finite(point.confidence.as_ref()),
            })
        })
        .collect();

    points.sort_by_key(|p| p.ts);
    points
}
