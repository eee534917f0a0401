//! Practice session ledger.
//!
//! The ledger is the single source of truth for practiced time. It combines
//! one synthetic baseline record (a manually entered figure valid up to a
//! cutoff instant) with the most recent imported batch of sessions:
//! - Imported sessions at or before the cutoff are discarded, their time is
//!   already part of the baseline figure.
//! - Each import replaces the previous imported batch wholesale.
//! - Within a batch, one session per `occurred_at` survives (first wins).

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where a session came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOrigin {
    Baseline,
    Imported,
}

/// A single block of practice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeSession {
    pub occurred_at: DateTime<Utc>,
    pub duration_seconds: i64,
    pub origin: SessionOrigin,
}

impl PracticeSession {
    pub fn imported(occurred_at: DateTime<Utc>, duration_seconds: i64) -> Self {
        Self {
            occurred_at,
            duration_seconds,
            origin: SessionOrigin::Imported,
        }
    }

    pub fn hours(&self) -> f64 {
        self.duration_seconds as f64 / 3600.0
    }

    /// Calendar day (UTC) the session belongs to.
    pub fn day(&self) -> NaiveDate {
        self.occurred_at.date_naive()
    }
}

/// An interval record as delivered by the import boundary.
///
/// Either endpoint may be missing (e.g. all-day calendar events); such
/// records are dropped during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInterval {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl RawInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Convert to a session, or `None` when the record is malformed.
    pub fn to_session(&self) -> Option<PracticeSession> {
        let (start, end) = (self.start?, self.end?);
        let seconds = (end - start).num_seconds();
        if seconds < 0 {
            return None;
        }
        Some(PracticeSession::imported(start, seconds))
    }
}

/// Manually entered cumulative figure valid up to a cutoff date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    pub hours: u32,
    pub minutes: u32,
    pub cutoff_date: NaiveDate,
}

impl Baseline {
    pub fn new(hours: u32, minutes: u32, cutoff_date: NaiveDate) -> Self {
        Self {
            hours,
            minutes,
            cutoff_date,
        }
    }

    /// Cutoff instant: midnight UTC at the start of the cutoff date.
    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff_date.and_time(NaiveTime::MIN).and_utc()
    }

    pub fn total_seconds(&self) -> i64 {
        i64::from(self.hours) * 3600 + i64::from(self.minutes) * 60
    }

    pub fn total_hours(&self) -> f64 {
        f64::from(self.hours) + f64::from(self.minutes) / 60.0
    }

    /// The synthetic session standing for the whole baseline figure.
    pub fn session(&self) -> PracticeSession {
        PracticeSession {
            occurred_at: self.cutoff(),
            duration_seconds: self.total_seconds(),
            origin: SessionOrigin::Baseline,
        }
    }
}

/// Normalize raw interval records into sessions, dropping malformed ones.
pub fn sessions_from_intervals<I>(raw: I) -> Vec<PracticeSession>
where
    I: IntoIterator<Item = RawInterval>,
{
    let mut dropped = 0usize;
    let sessions: Vec<PracticeSession> = raw
        .into_iter()
        .filter_map(|r| {
            let session = r.to_session();
            if session.is_none() {
                dropped += 1;
            }
            session
        })
        .collect();
    if dropped > 0 {
        debug!(dropped, "dropped malformed interval records");
    }
    sessions
}

/// Imported sessions that count toward totals: strictly after the baseline
/// cutoff, one per instant, ascending by `occurred_at`.
pub fn effective_sessions(baseline: &Baseline, imported: &[PracticeSession]) -> Vec<PracticeSession> {
    let cutoff = baseline.cutoff();
    let mut by_instant: BTreeMap<DateTime<Utc>, PracticeSession> = BTreeMap::new();
    for session in imported.iter().filter(|s| s.occurred_at > cutoff) {
        by_instant
            .entry(session.occurred_at)
            .or_insert_with(|| PracticeSession::imported(session.occurred_at, session.duration_seconds));
    }
    by_instant.into_values().collect()
}

/// Counts reported when an imported batch replaces the previous one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceSummary {
    /// Sessions kept in the new imported set.
    pub kept: usize,
    /// Sessions discarded (before cutoff or duplicate instants).
    pub discarded: usize,
    /// Size of the imported set that was replaced.
    pub replaced: usize,
}

/// Baseline plus the current imported set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLedger {
    baseline: Baseline,
    imported: Vec<PracticeSession>,
}

impl SessionLedger {
    pub fn new(baseline: Baseline) -> Self {
        Self {
            baseline,
            imported: Vec::new(),
        }
    }

    /// Build a ledger with an initial imported batch.
    pub fn with_imported(baseline: Baseline, imported: &[PracticeSession]) -> Self {
        Self {
            imported: effective_sessions(&baseline, imported),
            baseline,
        }
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// Swap in a new imported batch, replacing the previous one entirely.
    pub fn replace_imported(&mut self, batch: &[PracticeSession]) -> ReplaceSummary {
        let next = effective_sessions(&self.baseline, batch);
        let summary = ReplaceSummary {
            kept: next.len(),
            discarded: batch.len() - next.len(),
            replaced: self.imported.len(),
        };
        self.imported = next;
        summary
    }

    /// Effective imported sessions, ascending by time.
    pub fn sessions(&self) -> &[PracticeSession] {
        &self.imported
    }

    /// Baseline record followed by every effective imported session.
    pub fn timeline(&self) -> Vec<PracticeSession> {
        std::iter::once(self.baseline.session())
            .chain(self.imported.iter().cloned())
            .collect()
    }

    pub fn imported_seconds(&self) -> i64 {
        self.imported.iter().map(|s| s.duration_seconds).sum()
    }

    pub fn total_seconds(&self) -> i64 {
        self.baseline.total_seconds() + self.imported_seconds()
    }

    pub fn total_hours(&self) -> f64 {
        self.total_seconds() as f64 / 3600.0
    }

    /// Seconds played per UTC day, from imported sessions only.
    pub fn daily_seconds(&self) -> BTreeMap<NaiveDate, i64> {
        let mut map = BTreeMap::new();
        for session in &self.imported {
            *map.entry(session.day()).or_insert(0) += session.duration_seconds;
        }
        map
    }

    pub fn first_session_day(&self) -> Option<NaiveDate> {
        self.imported.first().map(PracticeSession::day)
    }
}
