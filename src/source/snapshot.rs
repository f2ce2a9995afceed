//! Snapshot document types.
//!
//! These types match the JSON written by the threat-index scraper
//! (`bnti_data.json`). Deserialization is lenient: see [`super::loose`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::loose;
use crate::error::SourceError;

/// One ingested payload describing the index at a point in time.
///
/// Once adopted by the store a snapshot is shared as `Arc<Snapshot>` and
/// never mutated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, deserialize_with = "loose::record")]
    pub meta: Meta,
    /// Raw history points. Kept as raw JSON: a non-array normalizes to nothing.
    #[serde(default)]
    pub history: Value,
    /// Raw forecast points.
    #[serde(default)]
    pub forecast: Value,
    #[serde(default, deserialize_with = "loose::map")]
    pub countries: BTreeMap<String, CountryRecord>,
    #[serde(default, deserialize_with = "loose::record")]
    pub methodology: Methodology,
}

/// Header block of a snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, deserialize_with = "loose::string", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_index: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<Value>,
    /// Freshness token; the sole basis for adoption decisions.
    #[serde(default, deserialize_with = "loose::string", skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    #[serde(default, deserialize_with = "loose::string", skip_serializing_if = "Option::is_none")]
    pub next_update: Option<String>,
    #[serde(default, deserialize_with = "loose::string", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Meta {
    /// The `generated_at` token, if present and non-empty.
    pub fn freshness_token(&self) -> Option<&str> {
        self.generated_at.as_deref().filter(|token| !token.is_empty())
    }
}

/// A raw history or forecast point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_index: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Value>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "loose::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
}

/// Per-country score and the news events behind it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountryRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_index: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<Value>,
    #[serde(default, deserialize_with = "loose::seq")]
    pub events: Vec<EventRecord>,
}

/// A classified news item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default, deserialize_with = "loose::string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "loose::string", skip_serializing_if = "Option::is_none")]
    pub translated_title: Option<String>,
    #[serde(default, deserialize_with = "loose::string", skip_serializing_if = "Option::is_none")]
    pub detected_lang: Option<String>,
    #[serde(default, deserialize_with = "loose::string", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Value>,
    /// Percentage string such as `"85.0%"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_confidence_score: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Value>,
    #[serde(default, deserialize_with = "loose::string", skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Scoring methodology block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Methodology {
    #[serde(default, deserialize_with = "loose::string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "loose::string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "loose::string", skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default, deserialize_with = "loose::map")]
    pub weights: BTreeMap<String, Value>,
}

impl Snapshot {
    /// Parse a snapshot from a JSON document.
    ///
    /// The top level must be a JSON object; everything below it is lenient.
    pub fn from_json(content: &str) -> Result<Self, SourceError> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    /// Parse a snapshot from raw bytes (an HTTP body).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SourceError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    /// Parse either plain JSON or the `window.NAME = {...};` script the
    /// scraper writes next to it for static pages.
    pub fn from_payload(content: &str) -> Result<Self, SourceError> {
        Self::from_json(unwrap_script(content))
    }

    /// Load a snapshot from a file on disk.
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let content = fs::read_to_string(path)?;
        Self::from_payload(&content)
    }

    fn from_value(value: Value) -> Result<Self, SourceError> {
        if !value.is_object() {
            return Err(SourceError::Parse("snapshot must be a JSON object".to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Total number of events across all countries.
    pub fn signal_count(&self) -> usize {
        self.countries.values().map(|c| c.events.len()).sum()
    }
}

/// Strip a `window.NAME = ... ;` assignment down to its JSON payload.
fn unwrap_script(content: &str) -> &str {
    let trimmed = content.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }
    match trimmed.split_once('=') {
        Some((_, payload)) => payload.trim().trim_end_matches(';').trim_end(),
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "meta": {
                "generated_at": "2026-02-10T12:00:00",
                "main_index": 5.42,
                "status": "ELEVATED",
                "next_update": "2026-02-10T13:00:00",
                "version": "2.0.0"
            },
            "countries": {
                "Syria": {
                    "index": 7.1,
                    "events": [
                        { "title": "Clashes reported", "category": "military conflict", "weight": 8.5, "confidence": 0.9 }
                    ]
                },
                "Greece": { "index": 2.0, "events": [] }
            },
            "history": [
                { "timestamp": "2026-02-10T11:00:00", "main_index": 5.1, "type": "historical" }
            ],
            "forecast": [],
            "methodology": { "name": "Modified Goldstein Scale", "weights": { "military conflict": 10.0 } }
        }"#
    }

    #[test]
    fn test_deserialize_snapshot() {
        let snapshot = Snapshot::from_json(sample_json()).unwrap();

        assert_eq!(snapshot.meta.freshness_token(), Some("2026-02-10T12:00:00"));
        assert_eq!(snapshot.meta.status.as_deref(), Some("ELEVATED"));
        assert_eq!(snapshot.countries.len(), 2);
        assert_eq!(snapshot.signal_count(), 1);

        let syria = snapshot.countries.get("Syria").unwrap();
        assert_eq!(syria.events[0].title.as_deref(), Some("Clashes reported"));
        assert_eq!(snapshot.methodology.weights.len(), 1);
        assert!(snapshot.history.is_array());
    }

    #[test]
    fn test_wrong_types_are_tolerated() {
        let snapshot = Snapshot::from_json(
            r#"{ "meta": { "generated_at": 42, "status": ["x"] }, "countries": "none", "methodology": 3 }"#,
        )
        .unwrap();

        assert_eq!(snapshot.meta.freshness_token(), Some("42"));
        assert!(snapshot.meta.status.is_none());
        assert!(snapshot.countries.is_empty());
        assert!(snapshot.methodology.weights.is_empty());
        assert!(snapshot.history.is_null());
    }

    #[test]
    fn test_rejects_non_object_documents() {
        assert!(matches!(Snapshot::from_json("[1, 2]"), Err(SourceError::Parse(_))));
        assert!(matches!(Snapshot::from_json("not valid json"), Err(SourceError::Parse(_))));
    }

    #[test]
    fn test_empty_freshness_token_is_absent() {
        let snapshot = Snapshot::from_json(r#"{ "meta": { "generated_at": "" } }"#).unwrap();
        assert!(snapshot.meta.freshness_token().is_none());
    }

    #[test]
    fn test_from_payload_unwraps_script_assignment() {
        let script = format!("window.BNTI_DATA = {};\n", sample_json());
        let snapshot = Snapshot::from_payload(&script).unwrap();
        assert_eq!(snapshot.meta.freshness_token(), Some("2026-02-10T12:00:00"));

        let plain = Snapshot::from_payload(sample_json()).unwrap();
        assert_eq!(plain.countries.len(), 2);
    }
}
