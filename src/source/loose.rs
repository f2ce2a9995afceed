//! Lenient field deserializers.
//!
//! Snapshots are produced by a separate scraper and any field may be missing
//! or carry the wrong JSON type. These helpers turn such fields into their
//! "absent" form instead of rejecting the whole document.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Any scalar becomes its string form; null, arrays and objects become `None`.
pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

/// A nested record that fails to decode becomes its default.
pub fn record<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// A non-array becomes an empty list. Elements that fail to decode become
/// defaults so the list keeps its original length.
pub fn seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

/// A non-object becomes an empty map; undecodable entries become defaults.
pub fn map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(entries) => entries
            .into_iter()
            .map(|(key, item)| (key, serde_json::from_value(item).unwrap_or_default()))
            .collect(),
        _ => BTreeMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "string")]
        label: Option<String>,
        #[serde(default, deserialize_with = "seq")]
        items: Vec<Item>,
        #[serde(default, deserialize_with = "map")]
        named: BTreeMap<String, Item>,
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Item {
        id: u32,
    }

    #[test]
    fn test_string_accepts_scalars() {
        let probe: Probe = serde_json::from_value(json!({ "label": 12 })).unwrap();
        assert_eq!(probe.label.as_deref(), Some("12"));

        let probe: Probe = serde_json::from_value(json!({ "label": ["x"] })).unwrap();
        assert!(probe.label.is_none());

        let probe: Probe = serde_json::from_value(json!({ "label": null })).unwrap();
        assert!(probe.label.is_none());
    }

    #[test]
    fn test_seq_keeps_length_and_ignores_non_arrays() {
        let probe: Probe =
            serde_json::from_value(json!({ "items": [{ "id": 1 }, "junk", { "id": 3 }] }))
                .unwrap();
        assert_eq!(probe.items, vec![Item { id: 1 }, Item { id: 0 }, Item { id: 3 }]);

        let probe: Probe = serde_json::from_value(json!({ "items": "nope" })).unwrap();
        assert!(probe.items.is_empty());
    }

    #[test]
    fn test_map_ignores_non_objects() {
        let probe: Probe = serde_json::from_value(json!({ "named": [1, 2] })).unwrap();
        assert!(probe.named.is_empty());

        let probe: Probe =
            serde_json::from_value(json!({ "named": { "a": { "id": 7 }, "b": 5 } })).unwrap();
        assert_eq!(probe.named.get("a"), Some(&Item { id: 7 }));
        assert_eq!(probe.named.get("b"), Some(&Item { id: 0 }));
    }
}
