//! Severity tiers.
//!
//! A [`Tier`] is always derived, never stored. Scores and event weights use
//! different thresholds because they share no common scale.

use serde::Serialize;

/// Index score at or above which a country or the headline is critical.
pub const SCORE_CRITICAL: f64 = 7.0;
/// Index score at or above which a country or the headline is elevated.
pub const SCORE_ELEVATED: f64 = 4.0;
/// Event weight at or above which an event badge is critical.
pub const WEIGHT_CRITICAL: f64 = 6.0;
/// Event weight at or above which an event badge is elevated.
pub const WEIGHT_ELEVATED: f64 = 3.0;

/// Severity tier, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Stable,
    Elevated,
    Critical,
}

impl Tier {
    /// Classify a free-form status string such as "SCANNING: SYRIA" or
    /// "Elevated Risk". "CRITICAL" wins over "ELEVATED".
    pub fn from_status(raw: &str) -> Self {
        let status = raw.to_uppercase();
        if status.contains("CRITICAL") {
            Tier::Critical
        } else if status.contains("ELEVATED") {
            Tier::Elevated
        } else {
            Tier::Stable
        }
    }

    /// Classify an index score on the 1-10 scale.
    pub fn from_score(score: f64) -> Self {
        if score >= SCORE_CRITICAL {
            Tier::Critical
        } else if score >= SCORE_ELEVATED {
            Tier::Elevated
        } else {
            Tier::Stable
        }
    }

    /// Classify an event by its raw category weight.
    pub fn from_weight(weight: f64) -> Self {
        if weight >= WEIGHT_CRITICAL {
            Tier::Critical
        } else if weight >= WEIGHT_ELEVATED {
            Tier::Elevated
        } else {
            Tier::Stable
        }
    }

    /// Upper-case label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Stable => "STABLE",
            Tier::Elevated => "ELEVATED",
            Tier::Critical => "CRITICAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(Tier::from_status("critical alert"), Tier::Critical);
        assert_eq!(Tier::from_status("Elevated Risk"), Tier::Elevated);
        assert_eq!(Tier::from_status(""), Tier::Stable);
        assert_eq!(Tier::from_status("critical and elevated"), Tier::Critical);
        assert_eq!(Tier::from_status("SCANNING: SYRIA"), Tier::Stable);
    }

    #[test]
    fn test_from_score_boundaries() {
        assert_eq!(Tier::from_score(7.0), Tier::Critical);
        assert_eq!(Tier::from_score(6.99), Tier::Elevated);
        assert_eq!(Tier::from_score(4.0), Tier::Elevated);
        assert_eq!(Tier::from_score(3.99), Tier::Stable);
        assert_eq!(Tier::from_score(0.0), Tier::Stable);
    }

    #[test]
    fn test_from_weight_boundaries() {
        assert_eq!(Tier::from_weight(6.0), Tier::Critical);
        assert_eq!(Tier::from_weight(5.9), Tier::Elevated);
        assert_eq!(Tier::from_weight(3.0), Tier::Elevated);
        assert_eq!(Tier::from_weight(-2.0), Tier::Stable);
    }

    #[test]
    fn test_ordering() {
        assert!(Tier::Critical > Tier::Elevated);
        assert!(Tier::Elevated > Tier::Stable);
        assert_eq!(Tier::Critical.label(), "CRITICAL");
    }
}
