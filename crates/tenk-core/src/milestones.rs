//! Milestone registry.
//!
//! Three kinds of milestones share one merged view, always sorted by hours
//! threshold descending:
//! - **Legacy**: fixed historical facts from configuration. Read-only, but
//!   each can carry a free-text note stored separately, keyed by its id.
//! - **Interval**: user-created "every 100 hours" markers, auto-titled
//!   `"{hours} Hours"`.
//! - **Custom**: user-created with their own title.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// First threshold proposed for interval milestones.
pub const FIRST_INTERVAL_HOURS: u32 = 1000;
/// Spacing of interval milestones.
pub const INTERVAL_STEP_HOURS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    Legacy,
    Interval,
    Custom,
}

impl MilestoneKind {
    fn prefix(self) -> &'static str {
        match self {
            MilestoneKind::Legacy => "legacy",
            MilestoneKind::Interval => "interval",
            MilestoneKind::Custom => "custom",
        }
    }
}

/// A historical milestone from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyMilestone {
    pub hours: u32,
    pub achieved_on: NaiveDate,
    pub pace: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalMilestone {
    pub id: String,
    pub hours: u32,
    pub achieved_on: NaiveDate,
    pub pace: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomMilestone {
    pub id: String,
    pub hours: u32,
    pub achieved_on: NaiveDate,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Entry of the merged milestone view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Namespaced id: `legacy-900`, `interval-<id>`, `custom-<id>`.
    pub id: String,
    pub hours_threshold: u32,
    pub achieved_on: NaiveDate,
    pub kind: MilestoneKind,
    pub pace_at_achievement: Option<String>,
    pub title: String,
    pub description: String,
}

impl Milestone {
    pub fn days_ago(&self, now: DateTime<Utc>) -> i64 {
        days_ago(self.achieved_on, now)
    }
}

/// `floor(|now - date| / 1 day)`.
pub fn days_ago(date: NaiveDate, now: DateTime<Utc>) -> i64 {
    (now - date.and_time(NaiveTime::MIN).and_utc()).num_days().abs()
}

/// Fields that may be changed on an existing milestone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestonePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub hours: Option<u32>,
    pub achieved_on: Option<NaiveDate>,
    pub pace: Option<String>,
}

impl MilestonePatch {
    pub fn description(text: impl Into<String>) -> Self {
        Self {
            description: Some(text.into()),
            ..Self::default()
        }
    }
}

fn interval_title(hours: u32) -> String {
    format!("{hours} Hours")
}

/// Normalize a typed pace into `"{h}h {m}m[ {s}s]"`.
///
/// Accepts `H:MM:SS`, `H:MM`, `HHMMSS` (5-6 digits), `HMM` (3-4 digits) or
/// text already containing `h` and `m`. Anything else is returned as is.
pub fn parse_pace(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if raw.contains('h') && raw.contains('m') {
        return raw.to_string();
    }

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let num = |s: &str| s.parse::<u64>().unwrap_or(0);

    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() > 1 && parts.iter().all(|p| all_digits(p)) {
        match parts.as_slice() {
            [h, m, s] => return format!("{}h {}m {}s", num(h), num(m), num(s)),
            [h, m] => return format!("{}h {}m", num(h), num(m)),
            _ => return raw.to_string(),
        }
    }

    if all_digits(raw) {
        let len = raw.len();
        if (5..=6).contains(&len) {
            let (h, rest) = raw.split_at(len - 4);
            let (m, s) = rest.split_at(2);
            return format!("{}h {}m {}s", num(h), num(m), num(s));
        }
        if (3..=4).contains(&len) {
            let (h, m) = raw.split_at(len - 2);
            return format!("{}h {}m", num(h), num(m));
        }
    }
    raw.to_string()
}

/// Merge all three kinds into one view sorted by threshold descending.
pub fn merge(
    legacy: &[LegacyMilestone],
    interval: &[IntervalMilestone],
    custom: &[CustomMilestone],
    legacy_notes: &BTreeMap<String, String>,
) -> Vec<Milestone> {
    let legacy = legacy.iter().map(|m| {
        let id = format!("legacy-{}", m.hours);
        Milestone {
            description: legacy_notes.get(&id).cloned().unwrap_or_default(),
            id,
            hours_threshold: m.hours,
            achieved_on: m.achieved_on,
            kind: MilestoneKind::Legacy,
            pace_at_achievement: Some(m.pace.clone()).filter(|p| !p.is_empty()),
            title: interval_title(m.hours),
        }
    });
    let interval = interval.iter().map(|m| Milestone {
        id: format!("interval-{}", m.id),
        hours_threshold: m.hours,
        achieved_on: m.achieved_on,
        kind: MilestoneKind::Interval,
        pace_at_achievement: Some(parse_pace(&m.pace)).filter(|p| !p.is_empty()),
        title: interval_title(m.hours),
        description: m.description.clone(),
    });
    let custom = custom.iter().map(|m| Milestone {
        id: format!("custom-{}", m.id),
        hours_threshold: m.hours,
        achieved_on: m.achieved_on,
        kind: MilestoneKind::Custom,
        pace_at_achievement: None,
        title: m.title.clone(),
        description: m.description.clone(),
    });

    let mut all: Vec<Milestone> = legacy.chain(interval).chain(custom).collect();
    all.sort_by(|a, b| b.hours_threshold.cmp(&a.hours_threshold));
    all
}

/// Owner of user-created milestones and legacy annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MilestoneRegistry {
    legacy: Vec<LegacyMilestone>,
    interval: Vec<IntervalMilestone>,
    custom: Vec<CustomMilestone>,
    legacy_notes: BTreeMap<String, String>,
}

impl MilestoneRegistry {
    pub fn new(legacy: Vec<LegacyMilestone>) -> Self {
        Self {
            legacy,
            ..Self::default()
        }
    }

    pub fn from_parts(
        legacy: Vec<LegacyMilestone>,
        interval: Vec<IntervalMilestone>,
        custom: Vec<CustomMilestone>,
        legacy_notes: BTreeMap<String, String>,
    ) -> Self {
        Self {
            legacy,
            interval,
            custom,
            legacy_notes,
        }
    }

    pub fn interval(&self) -> &[IntervalMilestone] {
        &self.interval
    }

    pub fn custom(&self) -> &[CustomMilestone] {
        &self.custom
    }

    pub fn legacy_notes(&self) -> &BTreeMap<String, String> {
        &self.legacy_notes
    }

    /// Merged view, threshold descending.
    pub fn merged(&self) -> Vec<Milestone> {
        merge(&self.legacy, &self.interval, &self.custom, &self.legacy_notes)
    }

    /// Next unused multiple of 100 starting at 1000, skipping legacy and
    /// interval thresholds.
    pub fn next_interval_hours(&self) -> u32 {
        let taken: BTreeSet<u32> = self
            .legacy
            .iter()
            .map(|m| m.hours)
            .chain(self.interval.iter().map(|m| m.hours))
            .collect();
        let mut hours = FIRST_INTERVAL_HOURS;
        while taken.contains(&hours) {
            hours += INTERVAL_STEP_HOURS;
        }
        hours
    }

    /// Record an interval milestone. Returns its namespaced id.
    pub fn add_interval(
        &mut self,
        hours: u32,
        achieved_on: NaiveDate,
        pace: &str,
        description: &str,
    ) -> Result<String, ValidationError> {
        if hours == 0 {
            return Err(ValidationError::MissingField("hours"));
        }
        if pace.trim().is_empty() {
            return Err(ValidationError::MissingField("pace"));
        }
        let id = Uuid::new_v4().to_string();
        self.interval.push(IntervalMilestone {
            id: id.clone(),
            hours,
            achieved_on,
            pace: pace.trim().to_string(),
            description: description.to_string(),
        });
        Ok(format!("interval-{id}"))
    }

    /// Record a custom milestone. Returns its namespaced id.
    pub fn add_custom(
        &mut self,
        hours: u32,
        achieved_on: NaiveDate,
        title: &str,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<String, ValidationError> {
        if hours == 0 {
            return Err(ValidationError::MissingField("hours"));
        }
        if title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        let id = Uuid::new_v4().to_string();
        self.custom.push(CustomMilestone {
            id: id.clone(),
            hours,
            achieved_on,
            title: title.trim().to_string(),
            description: description.to_string(),
            created_at: now,
        });
        Ok(format!("custom-{id}"))
    }

    fn split_id(id: &str) -> Result<(MilestoneKind, &str), ValidationError> {
        [MilestoneKind::Legacy, MilestoneKind::Interval, MilestoneKind::Custom]
            .into_iter()
            .find_map(|kind| {
                id.strip_prefix(kind.prefix())
                    .and_then(|rest| rest.strip_prefix('-'))
                    .map(|raw| (kind, raw))
            })
            .ok_or_else(|| not_found(id))
    }

    /// Apply a patch to the milestone with the given namespaced id.
    ///
    /// Legacy milestones only accept a description; other fields in the
    /// patch are ignored for them.
    pub fn edit(&mut self, id: &str, patch: MilestonePatch) -> Result<(), ValidationError> {
        let (kind, raw) = Self::split_id(id)?;
        match kind {
            MilestoneKind::Legacy => {
                let known = self.legacy.iter().any(|m| m.hours.to_string() == raw);
                if !known {
                    return Err(not_found(id));
                }
                if let Some(text) = patch.description {
                    self.legacy_notes.insert(id.to_string(), text);
                }
            }
            MilestoneKind::Interval => {
                let m = self
                    .interval
                    .iter_mut()
                    .find(|m| m.id == raw)
                    .ok_or_else(|| not_found(id))?;
                if let Some(text) = patch.description {
                    m.description = text;
                }
                if let Some(hours) = patch.hours {
                    m.hours = hours;
                }
                if let Some(date) = patch.achieved_on {
                    m.achieved_on = date;
                }
                if let Some(pace) = patch.pace {
                    m.pace = pace;
                }
            }
            MilestoneKind::Custom => {
                let m = self
                    .custom
                    .iter_mut()
                    .find(|m| m.id == raw)
                    .ok_or_else(|| not_found(id))?;
                if let Some(text) = patch.description {
                    m.description = text;
                }
                if let Some(title) = patch.title.filter(|t| !t.trim().is_empty()) {
                    m.title = title;
                }
                if let Some(hours) = patch.hours {
                    m.hours = hours;
                }
                if let Some(date) = patch.achieved_on {
                    m.achieved_on = date;
                }
            }
        }
        Ok(())
    }

    /// Delete an interval or custom milestone.
    ///
    /// Legacy milestones cannot be deleted; use [`Self::clear_note`] to drop
    /// their annotation.
    pub fn delete(&mut self, id: &str) -> Result<(), ValidationError> {
        let (kind, raw) = Self::split_id(id)?;
        let removed = match kind {
            MilestoneKind::Legacy => return Err(ValidationError::LegacyReadOnly(id.to_string())),
            MilestoneKind::Interval => {
                let before = self.interval.len();
                self.interval.retain(|m| m.id != raw);
                self.interval.len() < before
            }
            MilestoneKind::Custom => {
                let before = self.custom.len();
                self.custom.retain(|m| m.id != raw);
                self.custom.len() < before
            }
        };
        if !removed {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// Remove the annotation of a legacy milestone.
    pub fn clear_note(&mut self, id: &str) -> bool {
        self.legacy_notes.remove(id).is_some()
    }
}

fn not_found(id: &str) -> ValidationError {
    ValidationError::NotFound {
        kind: "milestone",
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn legacy() -> Vec<LegacyMilestone> {
        vec![
            LegacyMilestone { hours: 900, achieved_on: day(2025, 11, 8), pace: "1h 24m".into() },
            LegacyMilestone { hours: 800, achieved_on: day(2025, 8, 18), pace: "1h 25m".into() },
        ]
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn merged_view_sorts_descending_across_kinds() {
        let mut reg = MilestoneRegistry::new(legacy());
        reg.add_custom(850, day(2025, 10, 1), "First recital", "", now()).unwrap();
        reg.add_interval(1000, day(2026, 1, 10), "1:25:10", "").unwrap();

        let merged = reg.merged();
        let hours: Vec<u32> = merged.iter().map(|m| m.hours_threshold).collect();
        assert_eq!(hours, vec![1000, 900, 850, 800]);
        assert_eq!(merged[0].title, "1000 Hours");
        assert_eq!(merged[0].pace_at_achievement.as_deref(), Some("1h 25m 10s"));
        assert_eq!(merged[1].id, "legacy-900");
    }

    #[test]
    fn next_interval_skips_taken_thresholds() {
        let mut reg = MilestoneRegistry::new(legacy());
        assert_eq!(reg.next_interval_hours(), 1000);
        reg.add_interval(1000, day(2026, 1, 10), "1h 25m", "").unwrap();
        reg.add_interval(1100, day(2026, 3, 10), "1h 26m", "").unwrap();
        assert_eq!(reg.next_interval_hours(), 1200);
    }

    #[test]
    fn legacy_is_annotatable_but_not_deletable() {
        let mut reg = MilestoneRegistry::new(legacy());
        reg.edit("legacy-900", MilestonePatch::description("Chopin nocturne"))
            .unwrap();
        assert_eq!(reg.merged()[0].description, "Chopin nocturne");
        assert_eq!(reg.legacy_notes().len(), 1);

        let err = reg.delete("legacy-900").unwrap_err();
        assert_eq!(err, ValidationError::LegacyReadOnly("legacy-900".into()));
        assert_eq!(reg.merged().len(), 2);

        assert!(reg.clear_note("legacy-900"));
        assert_eq!(reg.merged()[0].description, "");
    }

    #[test]
    fn edit_and_delete_user_milestones() {
        let mut reg = MilestoneRegistry::new(Vec::new());
        let id = reg.add_custom(50, day(2024, 3, 1), "Fifty", "", now()).unwrap();
        reg.edit(
            &id,
            MilestonePatch {
                title: Some("Half century".into()),
                hours: Some(55),
                ..MilestonePatch::default()
            },
        )
        .unwrap();
        let merged = reg.merged();
        assert_eq!(merged[0].title, "Half century");
        assert_eq!(merged[0].hours_threshold, 55);

        reg.delete(&id).unwrap();
        assert!(reg.merged().is_empty());
        assert!(matches!(reg.delete(&id), Err(ValidationError::NotFound { .. })));
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut reg = MilestoneRegistry::new(legacy());
        assert!(reg.edit("legacy-123", MilestonePatch::default()).is_err());
        assert!(reg.edit("bogus", MilestonePatch::default()).is_err());
    }

    #[test]
    fn creation_requires_fields() {
        let mut reg = MilestoneRegistry::default();
        assert_eq!(
            reg.add_interval(1000, day(2026, 1, 1), " ", ""),
            Err(ValidationError::MissingField("pace"))
        );
        assert_eq!(
            reg.add_custom(10, day(2026, 1, 1), "", "", now()),
            Err(ValidationError::MissingField("title"))
        );
    }

    #[test]
    fn pace_parsing_formats() {
        assert_eq!(parse_pace("1:24:05"), "1h 24m 5s");
        assert_eq!(parse_pace("1:24"), "1h 24m");
        assert_eq!(parse_pace("12405"), "1h 24m 5s");
        assert_eq!(parse_pace("124"), "1h 24m");
        assert_eq!(parse_pace("1h 24m"), "1h 24m");
        assert_eq!(parse_pace("fast"), "fast");
        assert_eq!(parse_pace(""), "");
    }

    #[test]
    fn days_ago_is_absolute() {
        assert_eq!(days_ago(day(2026, 1, 10), now()), 10);
        assert_eq!(days_ago(day(2026, 1, 25), now()), 4);
    }
}
