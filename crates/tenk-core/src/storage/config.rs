//! TOML-based application configuration.
//!
//! Stores:
//! - The journey figures (start date, target, baseline hours and cutoff)
//! - The legacy milestone table
//! - Calendar import settings
//! - Momentum chart scaling and forecast menu
//! - Scheduler jitter bounds
//!
//! Configuration is stored at `~/.config/tenk/config.toml`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::journey::JourneyConfig;
use crate::ledger::Baseline;
use crate::milestones::LegacyMilestone;

/// Journey figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneySettings {
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
    #[serde(default = "default_target_hours")]
    pub target_hours: f64,
    #[serde(default = "default_baseline_hours")]
    pub baseline_hours: u32,
    #[serde(default = "default_baseline_minutes")]
    pub baseline_minutes: u32,
    /// Sessions on or before midnight (UTC) of this date are already
    /// folded into the baseline figure.
    #[serde(default = "default_baseline_cutoff")]
    pub baseline_cutoff: NaiveDate,
}

/// One row of the legacy milestone table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyMilestoneEntry {
    pub hours: u32,
    pub date: NaiveDate,
    /// Average pace when the milestone was reached, e.g. "1h 24m".
    #[serde(default)]
    pub avg: String,
}

/// Calendar import configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

/// Momentum chart scaling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumConfig {
    #[serde(default = "default_min_visible_range")]
    pub min_visible_range_secs: f64,
    #[serde(default = "default_padding_ratio")]
    pub padding_ratio: f64,
    #[serde(default = "default_tick_step")]
    pub tick_step_secs: f64,
}

/// Marginal-effort forecast menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    #[serde(default = "default_effort_steps")]
    pub effort_steps_secs: Vec<u32>,
}

/// Scheduler jitter bounds, `[jitter_min, jitter_max)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_jitter_min")]
    pub jitter_min: f64,
    #[serde(default = "default_jitter_max")]
    pub jitter_max: f64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/tenk/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub journey: JourneySettings,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub momentum: MomentumConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default = "default_legacy_milestones")]
    pub legacy_milestones: Vec<LegacyMilestoneEntry>,
}

// Default functions
fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}
fn default_start_date() -> NaiveDate {
    date(2024, 2, 1)
}
fn default_target_hours() -> f64 {
    10_000.0
}
fn default_baseline_hours() -> u32 {
    1015
}
fn default_baseline_minutes() -> u32 {
    46
}
fn default_baseline_cutoff() -> NaiveDate {
    date(2026, 1, 17)
}
fn default_calendar_name() -> String {
    "ATracker".into()
}
fn default_api_base() -> String {
    "https://www.googleapis.com/calendar/v3/".into()
}
fn default_min_visible_range() -> f64 {
    20.0
}
fn default_padding_ratio() -> f64 {
    0.2
}
fn default_tick_step() -> f64 {
    10.0
}
fn default_effort_steps() -> Vec<u32> {
    vec![1, 3, 5, 10, 20]
}
fn default_jitter_min() -> f64 {
    0.5
}
fn default_jitter_max() -> f64 {
    1.5
}
fn default_legacy_milestones() -> Vec<LegacyMilestoneEntry> {
    [
        (900, date(2025, 11, 8), "1h 24m"),
        (800, date(2025, 8, 18), "1h 25m"),
        (700, date(2025, 6, 30), "1h 22m"),
        (600, date(2025, 4, 30), "1h 20m"),
        (500, date(2024, 12, 31), "1h 29m"),
        (400, date(2024, 11, 13), "1h 24m"),
    ]
    .into_iter()
    .map(|(hours, date, avg)| LegacyMilestoneEntry {
        hours,
        date,
        avg: avg.to_string(),
    })
    .collect()
}

impl Default for JourneySettings {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            target_hours: default_target_hours(),
            baseline_hours: default_baseline_hours(),
            baseline_minutes: default_baseline_minutes(),
            baseline_cutoff: default_baseline_cutoff(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            calendar_name: default_calendar_name(),
            api_base: default_api_base(),
        }
    }
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            min_visible_range_secs: 20.0,
            padding_ratio: 0.2,
            tick_step_secs: 10.0,
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            effort_steps_secs: default_effort_steps(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            jitter_min: 0.5,
            jitter_max: 1.5,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            journey: JourneySettings::default(),
            import: ImportConfig::default(),
            momentum: MomentumConfig::default(),
            forecast: ForecastConfig::default(),
            scheduler: SchedulerConfig::default(),
            legacy_milestones: default_legacy_milestones(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults when no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without persisting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field's type.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate().map_err(|message| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        })?;
        *self = updated;
        Ok(())
    }

    /// Reject values the engine cannot work with.
    fn validate(&self) -> Result<(), String> {
        let j = &self.journey;
        if !(j.target_hours.is_finite() && j.target_hours > 0.0) {
            return Err("target hours must be positive".into());
        }
        if j.baseline_minutes >= 60 {
            return Err("baseline minutes must be below 60".into());
        }
        let m = &self.momentum;
        if !(m.min_visible_range_secs.is_finite() && m.min_visible_range_secs > 0.0) {
            return Err("minimum visible range must be positive".into());
        }
        if !(m.tick_step_secs.is_finite() && m.tick_step_secs > 0.0) {
            return Err("tick step must be positive".into());
        }
        if !(m.padding_ratio.is_finite() && m.padding_ratio >= 0.0) {
            return Err("padding ratio must not be negative".into());
        }
        let s = &self.scheduler;
        if !(s.jitter_min > 0.0 && s.jitter_min <= s.jitter_max && s.jitter_max.is_finite()) {
            return Err("jitter bounds must satisfy 0 < min <= max".into());
        }
        if self.forecast.effort_steps_secs.is_empty() {
            return Err("effort steps must not be empty".into());
        }
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// The immutable journey configuration the engine is built from.
    pub fn journey(&self) -> JourneyConfig {
        let j = &self.journey;
        JourneyConfig {
            start_date: j.start_date,
            target_hours: j.target_hours,
            baseline: Baseline::new(j.baseline_hours, j.baseline_minutes, j.baseline_cutoff),
            legacy_milestones: self
                .legacy_milestones
                .iter()
                .map(|m| LegacyMilestone {
                    hours: m.hours,
                    achieved_on: m.date,
                    pace: m.avg.clone(),
                })
                .collect(),
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.journey.baseline_hours, 1015);
        assert_eq!(parsed.legacy_milestones.len(), 6);
        assert_eq!(parsed.import.calendar_name, "ATracker");
    }

    #[test]
    fn empty_file_uses_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.journey.target_hours, 10_000.0);
        assert_eq!(parsed.scheduler.jitter_min, 0.5);
        assert_eq!(parsed.forecast.effort_steps_secs, vec![1, 3, 5, 10, 20]);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("journey.start_date").as_deref(), Some("2024-02-01"));
        assert_eq!(cfg.get("journey.baseline_minutes").as_deref(), Some("46"));
        assert!(cfg.get("journey.missing_key").is_none());
    }

    #[test]
    fn apply_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.apply("journey.target_hours", "5000").unwrap();
        assert_eq!(cfg.journey.target_hours, 5000.0);
    }

    #[test]
    fn apply_updates_date_and_validates_it() {
        let mut cfg = Config::default();
        cfg.apply("journey.baseline_cutoff", "2026-02-01").unwrap();
        assert_eq!(cfg.journey.baseline_cutoff, date(2026, 2, 1));

        let err = cfg.apply("journey.baseline_cutoff", "not-a-date");
        assert!(matches!(err, Err(ConfigError::InvalidValue { .. })));
        assert_eq!(cfg.journey.baseline_cutoff, date(2026, 2, 1));
    }

    #[test]
    fn apply_updates_array_from_json() {
        let mut cfg = Config::default();
        cfg.apply("forecast.effort_steps_secs", "[2, 4]").unwrap();
        assert_eq!(cfg.forecast.effort_steps_secs, vec![2, 4]);
    }

    #[test]
    fn apply_rejects_zero_visible_range() {
        let mut cfg = Config::default();
        let err = cfg.apply("momentum.min_visible_range_secs", "0");
        assert!(matches!(err, Err(ConfigError::InvalidValue { .. })));
        assert_eq!(cfg.momentum.min_visible_range_secs, 20.0);

        assert!(cfg.apply("momentum.tick_step_secs", "-5").is_err());
        assert!(cfg.apply("scheduler.jitter_min", "2.0").is_err());
        assert!(cfg.apply("journey.baseline_minutes", "60").is_err());
        cfg.apply("momentum.min_visible_range_secs", "0.5").unwrap();
        assert_eq!(cfg.momentum.min_visible_range_secs, 0.5);
    }

    #[test]
    fn set_json_value_by_path_rejects_unknown_key() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "journey.nonexistent", "value");
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_json_value_by_path_rejects_invalid_number() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "momentum.padding_ratio", "wide");
        assert!(result.is_err());
    }

    #[test]
    fn journey_maps_baseline_and_legacy_table() {
        let journey = Config::default().journey();
        assert!((journey.baseline.total_hours() - (1015.0 + 46.0 / 60.0)).abs() < 1e-9);
        assert_eq!(journey.legacy_milestones[0].hours, 900);
        assert_eq!(journey.legacy_milestones[0].pace, "1h 24m");
    }
}
