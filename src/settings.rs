//! Runtime configuration.
//!
//! Layers, lowest first: built-in defaults, an optional config file, then
//! `THREATWATCH__SECTION__KEY` environment variables. Command-line flags are
//! applied on top by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::store::FreshnessPolicy;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "THREATWATCH";

/// Snapshot file read when neither a URL nor a file is configured.
pub const DEFAULT_SNAPSHOT_FILE: &str = "bnti_data.json";

/// Log file used while the terminal UI is active.
pub const DEFAULT_LOG_FILE: &str = "threatwatch.log";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub store: StoreSettings,
    pub log: LogSettings,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// HTTP(S) location of the snapshot. Takes precedence over `file`.
    pub url: Option<String>,
    pub file: Option<PathBuf>,
    /// Payload offered once at startup, before the first poll.
    pub bootstrap: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub freshness: FreshnessPolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub file: PathBuf,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub theme: ThemeChoice,
}

/// Colour scheme selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    /// Detect from the terminal background.
    #[default]
    Auto,
    Dark,
    Light,
}

/// Where the poller reads candidates from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Http(String),
    File(PathBuf),
}

impl Settings {
    /// Load settings from an optional config file and the environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// The configured source; a URL wins over a file.
    pub fn source_location(&self) -> SourceLocation {
        match (&self.source.url, &self.source.file) {
            (Some(url), _) if !url.is_empty() => SourceLocation::Http(url.clone()),
            (_, Some(file)) => SourceLocation::File(file.clone()),
            _ => SourceLocation::File(PathBuf::from(DEFAULT_SNAPSHOT_FILE)),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.source
            .request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.store.freshness, FreshnessPolicy::Distinct);
        assert_eq!(settings.log.file, PathBuf::from(DEFAULT_LOG_FILE));
        assert_eq!(
            settings.source_location(),
            SourceLocation::File(PathBuf::from(DEFAULT_SNAPSHOT_FILE))
        );
        assert!(settings.request_timeout().is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[source]
url = "https://example.org/bnti_data.json"
file = "ignored.json"
request_timeout_secs = 15

[store]
freshness = "monotonic"

[log]
file = "/tmp/tw.log"
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(
            settings.source_location(),
            SourceLocation::Http("https://example.org/bnti_data.json".to_string())
        );
        assert_eq!(settings.store.freshness, FreshnessPolicy::Monotonic);
        assert_eq!(settings.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(settings.log.file, PathBuf::from("/tmp/tw.log"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/threatwatch.toml"))).is_err());
    }

    #[test]
    fn test_invalid_policy_is_an_error() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[store]\nfreshness = \"sometimes\"").unwrap();
        assert!(Settings::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_file_source_without_url() {
        let mut settings = Settings::default();
        settings.source.file = Some(PathBuf::from("data/bnti.json"));
        assert_eq!(
            settings.source_location(),
            SourceLocation::File(PathBuf::from("data/bnti.json"))
        );
    }
}
