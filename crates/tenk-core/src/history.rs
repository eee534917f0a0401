//! Play history and the same-day play counter.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// One recorded play of a piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub piece_id: String,
    pub title: String,
    pub occurred_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(piece_id: impl Into<String>, title: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            piece_id: piece_id.into(),
            title: title.into(),
            occurred_at,
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.occurred_at.date_naive()
    }
}

/// Play log, newest entry first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PracticeHistory {
    entries: Vec<HistoryEntry>,
}

impl PracticeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Self { entries }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        let at = self
            .entries
            .iter()
            .position(|e| e.occurred_at <= entry.occurred_at)
            .unwrap_or(self.entries.len());
        self.entries.insert(at, entry);
    }

    pub fn remove(&mut self, id: &str) -> Result<HistoryEntry, ValidationError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| ValidationError::NotFound {
                kind: "history entry",
                id: id.to_string(),
            })?;
        Ok(self.entries.remove(index))
    }

    /// Entries recorded on `day`.
    pub fn on_day(&self, day: NaiveDate) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().filter(move |e| e.day() == day)
    }
}

/// Number of plays recorded today. Rolls over to zero on a new day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCounter {
    pub date: Option<NaiveDate>,
    pub count: u32,
}

impl DayCounter {
    /// Count for `today`; a counter from an earlier day reads as zero.
    pub fn count_on(&self, today: NaiveDate) -> u32 {
        if self.date == Some(today) {
            self.count
        } else {
            0
        }
    }

    pub fn increment(&mut self, today: NaiveDate) {
        self.count = self.count_on(today) + 1;
        self.date = Some(today);
    }

    /// Undo one play recorded on `day`. Plays from other days leave the
    /// counter alone.
    pub fn decrement(&mut self, day: NaiveDate, today: NaiveDate) {
        if day == today && self.date == Some(today) {
            self.count = self.count.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, d, h, 0, 0).unwrap()
    }

    #[test]
    fn push_keeps_newest_first() {
        let mut history = PracticeHistory::new();
        history.push(HistoryEntry::new("a", "A", at(2, 9)));
        history.push(HistoryEntry::new("b", "B", at(3, 9)));
        history.push(HistoryEntry::new("c", "C", at(1, 9)));
        let order: Vec<&str> = history.entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "C"]);
        assert_eq!(history.on_day(at(2, 0).date_naive()).count(), 1);
    }

    #[test]
    fn remove_unknown_entry_fails() {
        let mut history = PracticeHistory::new();
        assert!(history.remove("nope").is_err());
    }

    #[test]
    fn counter_rolls_over_and_only_undoes_today() {
        let today = at(5, 0).date_naive();
        let yesterday = at(4, 0).date_naive();

        let mut counter = DayCounter::default();
        counter.increment(yesterday);
        counter.increment(yesterday);
        assert_eq!(counter.count_on(today), 0);

        counter.increment(today);
        assert_eq!(counter.count_on(today), 1);

        counter.decrement(yesterday, today);
        assert_eq!(counter.count_on(today), 1);
        counter.decrement(today, today);
        counter.decrement(today, today);
        assert_eq!(counter.count_on(today), 0);
    }
}
