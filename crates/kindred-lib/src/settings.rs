use std::fmt;
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_TOOL_PATH: &str = "rg";

/// Where a freshly rendered link block goes when the note has none yet.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    Top,
    #[default]
    Bottom,
}

impl FromStr for InsertPosition {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            _ => Err(SettingsError::InvalidValue {
                key: "insert_position".to_string(),
                value: s.to_string(),
                expected: "top or bottom",
            }),
        }
    }
}

impl fmt::Display for InsertPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Top => f.write_str("top"),
            Self::Bottom => f.write_str("bottom"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{key} must be between {min} and {max}, got {value}")]
    OutOfRange {
        key: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("Unknown setting: {0}")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {value:?} (expected {expected})")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// Configuration for one "find similar notes" invocation.
///
/// Loaded once, validated, and passed by reference through the pipeline.
/// Changes go through [`Settings::with_value`], which returns a new value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_tool_path")]
    pub tool_path: String,
    #[serde(default = "default_max_links")]
    pub max_links: usize,
    /// Minimum raw hit count for a path to enter the candidate pool.
    #[serde(default = "default_min_score")]
    pub min_score: usize,
    #[serde(default)]
    pub insert_position: InsertPosition,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub whole_word: bool,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub ignore_folders: Vec<String>,
    #[serde(default = "default_min_keyword_overlap")]
    pub min_keyword_overlap: usize,
    #[serde(default = "default_title_weight")]
    pub title_weight: u32,
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tool_path: default_tool_path(),
            max_links: default_max_links(),
            min_score: default_min_score(),
            insert_position: InsertPosition::default(),
            case_sensitive: false,
            whole_word: false,
            ignore_patterns: Vec::new(),
            ignore_folders: Vec::new(),
            min_keyword_overlap: default_min_keyword_overlap(),
            title_weight: default_title_weight(),
            search_timeout_secs: default_search_timeout_secs(),
        }
    }
}

/// Setting keys accepted by [`Settings::with_value`].
pub const SETTING_KEYS: &[&str] = &[
    "tool_path",
    "max_links",
    "min_score",
    "insert_position",
    "case_sensitive",
    "whole_word",
    "ignore_patterns",
    "ignore_folders",
    "min_keyword_overlap",
    "title_weight",
    "search_timeout_secs",
];

impl Settings {
    /// Check every bounded field against its allowed range.
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_range("max_links", self.max_links as u64, 1, 50)?;
        check_range("min_score", self.min_score as u64, 1, 10)?;
        check_range("min_keyword_overlap", self.min_keyword_overlap as u64, 1, 10)?;
        check_range("title_weight", u64::from(self.title_weight), 1, 10)?;
        check_range("search_timeout_secs", self.search_timeout_secs, 1, 600)?;
        if self.tool_path.trim().is_empty() {
            return Err(SettingsError::InvalidValue {
                key: "tool_path".to_string(),
                value: self.tool_path.clone(),
                expected: "a non-empty executable name or path",
            });
        }
        Ok(())
    }

    /// Return a copy with `key` set from its textual form, validated.
    ///
    /// List settings take comma- or newline-separated entries.
    pub fn with_value(&self, key: &str, raw: &str) -> Result<Self, SettingsError> {
        let mut next = self.clone();
        match key {
            "tool_path" => next.tool_path = raw.trim().to_string(),
            "max_links" => next.max_links = parse_number(key, raw)?,
            "min_score" => next.min_score = parse_number(key, raw)?,
            "insert_position" => next.insert_position = raw.parse()?,
            "case_sensitive" => next.case_sensitive = parse_bool(key, raw)?,
            "whole_word" => next.whole_word = parse_bool(key, raw)?,
            "ignore_patterns" => next.ignore_patterns = parse_list(raw),
            "ignore_folders" => next.ignore_folders = parse_list(raw),
            "min_keyword_overlap" => next.min_keyword_overlap = parse_number(key, raw)?,
            "title_weight" => next.title_weight = parse_number(key, raw)?,
            "search_timeout_secs" => next.search_timeout_secs = parse_number(key, raw)?,
            other => return Err(SettingsError::UnknownKey(other.to_string())),
        }
        next.validate()?;
        Ok(next)
    }
}

/// Load settings from `path`, falling back to defaults when the file does
/// not exist.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("read settings file: {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("parse settings file: {}", path.display()))?;
    settings
        .validate()
        .with_context(|| format!("invalid settings file: {}", path.display()))?;
    Ok(settings)
}

/// Persist settings as pretty JSON, replacing the file atomically.
pub fn save_settings(path: &Path, settings: &Settings) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)
        .with_context(|| format!("create config dir: {}", parent.display()))?;

    let json = serde_json::to_string_pretty(settings)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("create temp file in {}", parent.display()))?;
    tmp.write_all(json.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.persist(path)
        .with_context(|| format!("write settings file: {}", path.display()))?;
    Ok(())
}

/// Split comma- or newline-separated input into trimmed, non-empty entries.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn check_range(key: &'static str, value: u64, min: u64, max: u64) -> Result<(), SettingsError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SettingsError::OutOfRange {
            key,
            value,
            min,
            max,
        })
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T, SettingsError> {
    raw.trim().parse().map_err(|_| SettingsError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        expected: "a whole number",
    })
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, SettingsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(SettingsError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            expected: "true or false",
        }),
    }
}

fn default_tool_path() -> String {
    DEFAULT_TOOL_PATH.to_string()
}

const fn default_max_links() -> usize {
    10
}

const fn default_min_score() -> usize {
    1
}

const fn default_min_keyword_overlap() -> usize {
    2
}

const fn default_title_weight() -> u32 {
    3
}

const fn default_search_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.tool_path, "rg");
        assert_eq!(settings.title_weight, 3);
        assert_eq!(settings.insert_position, InsertPosition::Bottom);
    }

    #[test]
    fn load_defaults_when_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = load_settings(&tmp.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, r#"{"max_links": 4, "insert_position": "top"}"#).unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.max_links, 4);
        assert_eq!(settings.insert_position, InsertPosition::Top);
        assert_eq!(settings.min_keyword_overlap, 2);
    }

    #[test]
    fn load_rejects_out_of_range_values() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, r#"{"max_links": 99}"#).unwrap();

        let err = load_settings(&path).unwrap_err();
        assert!(format!("{err:#}").contains("max_links must be between 1 and 50, got 99"));
    }

    #[test]
    fn save_then_load_preserves_updates() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("settings.json");
        let settings = Settings::default()
            .with_value("ignore_folders", "Archive, templates/daily\nInbox")
            .unwrap();

        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path).unwrap(), settings);
    }

    #[test]
    fn with_value_parses_each_kind() {
        let base = Settings::default();
        assert_eq!(base.with_value("max_links", " 7 ").unwrap().max_links, 7);
        assert!(base.with_value("whole_word", "yes").unwrap().whole_word);
        assert_eq!(
            base.with_value("insert_position", "TOP").unwrap().insert_position,
            InsertPosition::Top
        );
        assert_eq!(
            base.with_value("ignore_patterns", "*.canvas,, drafts ").unwrap().ignore_patterns,
            vec!["*.canvas", "drafts"]
        );
    }

    #[test]
    fn with_value_rejects_bad_input() {
        let base = Settings::default();
        assert_eq!(
            base.with_value("title_weight", "11"),
            Err(SettingsError::OutOfRange {
                key: "title_weight",
                value: 11,
                min: 1,
                max: 10,
            })
        );
        assert_eq!(
            base.with_value("colour", "blue"),
            Err(SettingsError::UnknownKey("colour".to_string()))
        );
        assert!(matches!(
            base.with_value("max_links", "many"),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert!(base.with_value("tool_path", "  ").is_err());
    }

    #[test]
    fn with_value_leaves_original_untouched() {
        let base = Settings::default();
        let _ = base.with_value("max_links", "3").unwrap();
        assert_eq!(base.max_links, 10);
    }

    #[test]
    fn every_listed_key_is_settable() {
        let base = Settings::default();
        for key in SETTING_KEYS {
            let err = base.with_value(key, "");
            assert!(
                !matches!(err, Err(SettingsError::UnknownKey(_))),
                "{key} should be a known setting"
            );
        }
    }
}
