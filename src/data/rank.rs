//! Country and event ranking.
//!
//! Every ordering here carries an explicit tie-break so the output is fully
//! determined by the snapshot.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use reqwest::Url;
use serde::Serialize;

use super::coerce;
use super::normalize::index_value;
use super::tier::Tier;
use super::time::{format_time, parse_instant, NO_TIME};
use crate::source::{CountryRecord, EventRecord};

/// Number of events kept for display. Not configurable.
pub const EVENT_DISPLAY_LIMIT: usize = 30;

/// Confidence assumed for ranking when an event carries none.
pub const DEFAULT_RANKING_CONFIDENCE: f64 = 0.5;

/// Language code treated as English.
const ENGLISH: &str = "en";

/// Base URL of the translation-assist service.
const TRANSLATE_URL: &str = "https://translate.google.com/translate";

/// A country with its score, for the ranking table and map tooltips.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryScore {
    pub name: String,
    pub score: f64,
    pub score_text: String,
    pub tier: Tier,
    pub tooltip: String,
    pub signal_count: usize,
}

/// Rank countries by score, highest first; ties by name.
pub fn rank_countries(countries: &BTreeMap<String, CountryRecord>) -> Vec<CountryScore> {
    let mut ranked: Vec<CountryScore> = countries
        .iter()
        .map(|(name, record)| {
            let score = index_value(Some(record));
            let tier = Tier::from_score(score);
            CountryScore {
                name: name.clone(),
                score,
                score_text: format!("{:.2}", score),
                tier,
                tooltip: format!("{}: {:.2} ({})", name, score, tier.label()),
                signal_count: record.events.len(),
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
    ranked
}

/// An event tagged with the country it was reported for.
#[derive(Debug, Clone, Copy)]
pub struct TaggedEvent<'a> {
    pub country: &'a str,
    pub event: &'a EventRecord,
}

/// Flatten every country's events into one sequence.
pub fn collect_events(countries: &BTreeMap<String, CountryRecord>) -> Vec<TaggedEvent<'_>> {
    countries
        .iter()
        .flat_map(|(name, record)| {
            record.events.iter().map(move |event| TaggedEvent {
                country: name.as_str(),
                event,
            })
        })
        .collect()
}

/// Raw category weight; 0 when absent or not a finite number.
pub fn event_weight(event: &EventRecord) -> f64 {
    coerce::finite(event.weight.as_ref()).unwrap_or(0.0)
}

/// Confidence used for ranking only; [`DEFAULT_RANKING_CONFIDENCE`] when
/// absent or not a finite number.
pub fn ranking_confidence(event: &EventRecord) -> f64 {
    coerce::finite(event.confidence.as_ref()).unwrap_or(DEFAULT_RANKING_CONFIDENCE)
}

/// Ranking priority: weight × confidence. Never displayed.
pub fn score_event(event: &EventRecord) -> f64 {
    event_weight(event) * ranking_confidence(event)
}

/// Confidence shown to the user, as a fraction.
///
/// Uses `confidence` if finite, else the `ai_confidence_score` percentage,
/// else 0. Deliberately distinct from [`ranking_confidence`].
pub fn display_confidence(event: &EventRecord) -> f64 {
    coerce::finite(event.confidence.as_ref())
        .or_else(|| coerce::percentage(event.ai_confidence_score.as_ref()))
        .unwrap_or(0.0)
}

/// A ranked event, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventView {
    pub country: String,
    pub country_label: String,
    pub category_label: String,
    pub badge: Tier,
    pub time_label: String,
    pub title: String,
    /// Untranslated title, shown as hover text when `title` is a translation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    pub confidence_percent: u32,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate_link: Option<String>,
}

impl EventView {
    fn from_tagged(tagged: &TaggedEvent<'_>) -> Self {
        let event = tagged.event;
        let title = event.title.clone().unwrap_or_default();

        let translated = event
            .translated_title
            .as_deref()
            .filter(|t| !t.is_empty() && *t != title);
        let (display_title, original_title) = match translated {
            Some(t) => (t.to_string(), Some(title).filter(|t| !t.is_empty())),
            None => (title, None),
        };

        let is_english = event.detected_lang.as_deref() == Some(ENGLISH);
        let language = if is_english {
            "EN".to_string()
        } else {
            event
                .detected_lang
                .as_deref()
                .filter(|lang| !lang.is_empty())
                .unwrap_or("LOCAL")
                .to_uppercase()
        };

        let link = event.link.clone().filter(|l| !l.is_empty());
        let translate_link = if is_english {
            None
        } else {
            link.as_deref().and_then(translate_link)
        };

        let time_label = event
            .date
            .as_ref()
            .and_then(parse_instant)
            .map(|ts| format_time(&ts))
            .unwrap_or_else(|| NO_TIME.to_string());

        let confidence = display_confidence(event);
        let confidence_percent = if confidence > 0.0 {
            (confidence * 100.0).round() as u32
        } else {
            0
        };

        EventView {
            country: tagged.country.to_string(),
            country_label: tagged.country.to_uppercase(),
            category_label: event.category.as_deref().unwrap_or_default().to_uppercase().replace('_', " "),
            badge: Tier::from_weight(event_weight(event)),
            time_label,
            title: display_title,
            original_title,
            confidence_percent,
            language,
            link,
            translate_link,
        }
    }
}

/// Build the translation-assist URL for a source link.
fn translate_link(link: &str) -> Option<String> {
    Url::parse_with_params(TRANSLATE_URL, &[("sl", "auto"), ("tl", "en"), ("u", link)])
        .ok()
        .map(String::from)
}

fn compare_priority(a: &(f64, TaggedEvent<'_>), b: &(f64, TaggedEvent<'_>)) -> Ordering {
    b.0.total_cmp(&a.0)
        .then_with(|| a.1.country.cmp(b.1.country))
        .then_with(|| a.1.event.title.cmp(&b.1.event.title))
}

/// Rank all events by priority and keep the top [`EVENT_DISPLAY_LIMIT`].
///
/// Ties are broken by country name, then by title.
pub fn rank_events(countries: &BTreeMap<String, CountryRecord>) -> Vec<EventView> {
    let mut scored: Vec<(f64, TaggedEvent<'_>)> = collect_events(countries)
        .into_iter()
        .map(|tagged| (score_event(tagged.event), tagged))
        .collect();

    scored.sort_by(compare_priority);

    scored
        .iter()
        .take(EVENT_DISPLAY_LIMIT)
        .map(|(_, tagged)| EventView::from_tagged(tagged))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn countries(value: serde_json::Value) -> BTreeMap<String, CountryRecord> {
        serde_json::from_value(value).unwrap()
    }

    fn event(value: serde_json::Value) -> EventRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_rank_countries_descending_with_name_tiebreak() {
        let ranked = rank_countries(&countries(json!({
            "Greece": { "index": 2.1 },
            "Syria": { "main_index": 7.4, "events": [{}, {}] },
            "Iraq": { "index": 7.4 },
            "Armenia": {}
        })));

        let names: Vec<&str> = ranked.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Iraq", "Syria", "Greece", "Armenia"]);
        assert_eq!(ranked[0].tier, Tier::Critical);
        assert_eq!(ranked[1].signal_count, 2);
        assert_eq!(ranked[1].tooltip, "Syria: 7.40 (CRITICAL)");
        assert_eq!(ranked[3].score, 0.0);
        assert_eq!(ranked[3].tier, Tier::Stable);
    }

    #[test]
    fn test_collect_events_tags_country() {
        let map = countries(json!({
            "Iran": { "events": [{ "title": "a" }, { "title": "b" }] },
            "Iraq": { "events": [{ "title": "c" }] },
            "Greece": { "events": "none" }
        }));
        let events = collect_events(&map);
        assert_eq!(events.len(), 3);
        assert!(events.iter().any(|e| e.country == "Iraq" && e.event.title.as_deref() == Some("c")));
    }

    #[test]
    fn test_priority_is_weight_times_confidence() {
        let strong = event(json!({ "weight": 6, "confidence": 1.0 }));
        let weak = event(json!({ "weight": 10, "confidence": 0.1 }));
        assert_eq!(score_event(&strong), 6.0);
        assert!((score_event(&weak) - 1.0).abs() < 1e-9);

        let ranked = rank_events(&countries(json!({
            "Iran": { "events": [{ "title": "weak", "weight": 10, "confidence": 0.1 }] },
            "Syria": { "events": [{ "title": "strong", "weight": 6, "confidence": 1.0 }] }
        })));
        assert_eq!(ranked[0].title, "strong");
        assert_eq!(ranked[1].title, "weak");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let bare = event(json!({ "weight": "x" }));
        assert_eq!(event_weight(&bare), 0.0);
        assert_eq!(ranking_confidence(&bare), DEFAULT_RANKING_CONFIDENCE);
        assert_eq!(score_event(&event(json!({ "weight": 4 }))), 2.0);
    }

    #[test]
    fn test_display_confidence() {
        let from_score = event(json!({ "ai_confidence_score": "85%" }));
        assert!((display_confidence(&from_score) - 0.85).abs() < 1e-9);

        let neither = event(json!({ "weight": 8 }));
        assert_eq!(display_confidence(&neither), 0.0);
        // Ranking still uses the 0.5 default.
        assert_eq!(score_event(&neither), 4.0);

        let ranked = rank_events(&countries(json!({
            "Iran": { "events": [
                { "title": "a", "weight": 9, "ai_confidence_score": "85%" },
                { "title": "b", "weight": 1 }
            ] }
        })));
        assert_eq!(ranked[0].confidence_percent, 85);
        assert_eq!(ranked[1].confidence_percent, 0);
    }

    #[test]
    fn test_rank_events_truncates_to_limit() {
        let events: Vec<serde_json::Value> = (0..45)
            .map(|i| json!({ "title": format!("event {:02}", i), "weight": i }))
            .collect();
        let ranked = rank_events(&countries(json!({ "Syria": { "events": events } })));

        assert_eq!(ranked.len(), EVENT_DISPLAY_LIMIT);
        assert_eq!(ranked[0].title, "event 44");
        assert_eq!(ranked[29].title, "event 15");
    }

    #[test]
    fn test_rank_events_tiebreak_is_country_then_title() {
        let ranked = rank_events(&countries(json!({
            "Syria": { "events": [{ "title": "b", "weight": 5 }, { "title": "a", "weight": 5 }] },
            "Iran": { "events": [{ "title": "z", "weight": 5 }] }
        })));
        let order: Vec<(&str, &str)> =
            ranked.iter().map(|e| (e.country.as_str(), e.title.as_str())).collect();
        assert_eq!(order, vec![("Iran", "z"), ("Syria", "a"), ("Syria", "b")]);
    }

    #[test]
    fn test_event_view_translation_and_language() {
        let ranked = rank_events(&countries(json!({
            "Greece": { "events": [{
                "title": "Σεισμός στην Κρήτη",
                "translated_title": "Earthquake in Crete",
                "detected_lang": "el",
                "category": "humanitarian_crisis",
                "weight": 3,
                "date": "2026-02-10T08:15:00",
                "link": "https://example.gr/a?id=1"
            }] }
        })));
        let view = &ranked[0];

        assert_eq!(view.title, "Earthquake in Crete");
        assert_eq!(view.original_title.as_deref(), Some("Σεισμός στην Κρήτη"));
        assert_eq!(view.language, "EL");
        assert_eq!(view.country_label, "GREECE");
        assert_eq!(view.category_label, "HUMANITARIAN CRISIS");
        assert_eq!(view.badge, Tier::Elevated);
        assert_eq!(view.time_label, "08:15");

        let translate = view.translate_link.as_deref().unwrap();
        assert!(translate.starts_with("https://translate.google.com/translate?sl=auto&tl=en&u="));
        assert!(translate.contains("https%3A%2F%2Fexample.gr%2Fa%3Fid%3D1"));
    }

    #[test]
    fn test_event_view_english_and_untranslated() {
        let ranked = rank_events(&countries(json!({
            "Iraq": { "events": [
                { "title": "Talks resume", "translated_title": "Talks resume", "detected_lang": "en", "link": "https://example.com", "weight": 7 },
                { "title": "Χωρίς μετάφραση", "weight": 1 }
            ] }
        })));

        let english = &ranked[0];
        assert_eq!(english.language, "EN");
        assert!(english.original_title.is_none());
        assert!(english.translate_link.is_none());
        assert_eq!(english.link.as_deref(), Some("https://example.com"));
        assert_eq!(english.badge, Tier::Critical);

        let local = &ranked[1];
        assert_eq!(local.language, "LOCAL");
        assert!(local.link.is_none());
        assert!(local.translate_link.is_none());
        assert_eq!(local.time_label, NO_TIME);
    }

    #[test]
    fn test_translated_event_without_title_has_no_original() {
        let ranked = rank_events(&countries(json!({
            "Turkey": { "events": [{ "translated_title": "Border closed", "detected_lang": "tr" }] }
        })));

        assert_eq!(ranked[0].title, "Border closed");
        assert!(ranked[0].original_title.is_none());
    }
}
