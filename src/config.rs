use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::paths;

/// Application configuration, loaded from config.toml.
///
/// Every section uses `#[serde(default)]`, so a missing file or a missing
/// key falls back to the Default implementation instead of failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub timer: TimerConfig,
    pub refresh: RefreshConfig,
    pub display: DisplayConfig,
}

/// The `[timer]` section, as written by the user.
///
/// Values are kept raw here. `timer::schedule::TimerBuilder` validates them
/// and reports what it had to ignore.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Minutes of the knot 1 -> 2 ramp.
    pub delay_1: Option<i64>,
    /// Minutes of the knot 2 -> 3 ramp.
    pub delay_2: Option<i64>,
    /// Minutes of post state before the next round takes over.
    pub delay_3: Option<i64>,
    /// Knot colors keyed "1", "2", "3".
    pub colors: BTreeMap<String, String>,
    pub hours: Vec<HourConfig>,
}

/// One `[[timer.hours]]` entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HourConfig {
    pub id: Option<String>,
    /// `YYYY-MM-DD hh:mm`, or `hh:mm` to reuse the previous hour's day.
    pub date: Option<String>,
    pub text_before: Option<String>,
    pub text_after: Option<String>,
    /// Anything else, reported as unknown options.
    #[serde(flatten)]
    pub extra: BTreeMap<String, toml::Value>,
}

/// The `[refresh]` section: server "last update" polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Endpoint answering with a unix timestamp. Polling is off when unset.
    pub url: Option<String>,
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Shown in the border of the terminal display.
    pub title: String,
    pub tick_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            url: None,
            interval_secs: 10,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: "Chronomètre".into(),
            tick_ms: 1000,
        }
    }
}

/// Load the config from `path`, or from the default location when None.
/// A missing default file yields defaults; a missing explicit file is an error.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let default_path = paths::config_file();
    let path = match path {
        Some(p) => p,
        None if !default_path.exists() => return Ok(AppConfig::default()),
        None => default_path.as_path(),
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.refresh.interval_secs, 10);
        assert!(cfg.refresh.url.is_none());
        assert_eq!(cfg.display.tick_ms, 1000);
        assert!(cfg.timer.hours.is_empty());
    }

    #[test]
    fn parse_partial_toml() {
        // Only some fields given, the rest should use defaults
        let toml_str = r#"
[refresh]
url = "http://localhost:8080/last-update"

[[timer.hours]]
date = "2026-10-19 14:00"
"#;
        let cfg: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.refresh.url.as_deref(), Some("http://localhost:8080/last-update"));
        assert_eq!(cfg.refresh.interval_secs, 10);
        assert_eq!(cfg.timer.hours.len(), 1);
        assert!(cfg.timer.hours[0].extra.is_empty());
        assert_eq!(cfg.display.title, "Chronomètre");
    }

    #[test]
    fn unknown_hour_keys_are_collected() {
        let toml_str = r#"
[[timer.hours]]
date = "2026-10-19 14:00"
room = 4
"#;
        let cfg: AppConfig = toml::from_str(toml_str).unwrap();
        assert!(cfg.timer.hours[0].extra.contains_key("room"));
    }

    #[test]
    fn load_explicit_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[display]\ntitle = \"Salle 2\"\n").unwrap();
        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg.display.title, "Salle 2");
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let tmp = TempDir::new().unwrap();
        let err = load_config(Some(&tmp.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn load_malformed_file_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[timer\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn roundtrip_toml() {
        let mut cfg = AppConfig::default();
        cfg.timer.colors.insert("1".into(), "#00FF00".into());
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let loaded: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(loaded.timer.colors["1"], "#00FF00");
        assert_eq!(loaded.refresh.interval_secs, cfg.refresh.interval_secs);
    }
}
