//! External session import.
//!
//! A [`SessionSource`] delivers raw interval records; the
//! [`ImportCoordinator`] turns them into the ledger's imported set. Only the
//! newest import attempt may commit: an attempt that finishes after a later
//! one has started is discarded, and a failed fetch leaves the current
//! imported set as it was.

pub mod file;
pub mod google;

pub use file::JsonFileSource;
pub use google::{find_calendar, CalendarEntry, GoogleCalendarSource};

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::{info, warn};

use crate::error::ImportError;
use crate::ledger::{sessions_from_intervals, Baseline, RawInterval, ReplaceSummary, SessionLedger};

/// Anything that can produce raw practice intervals since an instant.
pub trait SessionSource: Send + Sync {
    /// Short identifier used in logs (e.g. "google").
    fn name(&self) -> &str;

    fn fetch(&self, since: DateTime<Utc>) -> impl Future<Output = Result<Vec<RawInterval>, ImportError>> + Send;
}

/// Where an import starts reading: the baseline cutoff, or the journey
/// start while the cutoff still lies in the future.
pub fn sync_start(baseline: &Baseline, journey_start: NaiveDate, now: DateTime<Utc>) -> DateTime<Utc> {
    let cutoff = baseline.cutoff();
    if now < cutoff {
        journey_start.and_time(NaiveTime::MIN).and_utc()
    } else {
        cutoff
    }
}

/// Ticket for one import attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImportAttempt(u64);

impl ImportAttempt {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Hands out attempt ids and refuses stale commits.
#[derive(Debug, Default)]
pub struct ImportCoordinator {
    latest: AtomicU64,
}

impl ImportCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an attempt. Every earlier attempt becomes stale.
    pub fn begin(&self) -> ImportAttempt {
        ImportAttempt(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, attempt: ImportAttempt) -> bool {
        attempt.0 >= self.latest.load(Ordering::SeqCst)
    }

    /// Replace the ledger's imported set with `raw`, unless a newer attempt
    /// has begun.
    pub fn commit(
        &self,
        attempt: ImportAttempt,
        ledger: &mut SessionLedger,
        raw: Vec<RawInterval>,
    ) -> Result<ReplaceSummary, ImportError> {
        let latest = self.latest.load(Ordering::SeqCst);
        if attempt.0 < latest {
            warn!(attempt = attempt.0, latest, "discarding stale import");
            return Err(ImportError::Stale {
                attempt: attempt.0,
                latest,
            });
        }
        let received = raw.len();
        let sessions = sessions_from_intervals(raw);
        let summary = ledger.replace_imported(&sessions);
        info!(
            attempt = attempt.0,
            received,
            kept = summary.kept,
            discarded = summary.discarded,
            replaced = summary.replaced,
            "import committed"
        );
        Ok(summary)
    }

    /// Fetch from `source` and commit the result as one attempt.
    pub async fn run<S: SessionSource>(
        &self,
        source: &S,
        ledger: &mut SessionLedger,
        since: DateTime<Utc>,
    ) -> Result<ReplaceSummary, ImportError> {
        let attempt = self.begin();
        let raw = source.fetch(since).await.inspect_err(|e| {
            warn!(source = source.name(), error = %e, "import failed, keeping previous sessions");
        })?;
        self.commit(attempt, ledger, raw)
    }
}

/// Thin wrapper around the OS keyring for the calendar access token.
pub mod keyring_store {
    use crate::error::ImportError;

    const SERVICE: &str = "tenk";

    /// Keyring entry holding the Google Calendar bearer token.
    pub const GOOGLE_TOKEN: &str = "google_calendar_token";

    fn entry(key: &str) -> Result<keyring::Entry, ImportError> {
        keyring::Entry::new(SERVICE, key).map_err(|e| ImportError::Keyring(e.to_string()))
    }

    pub fn get(key: &str) -> Result<Option<String>, ImportError> {
        match entry(key)?.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(ImportError::Keyring(e.to_string())),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<(), ImportError> {
        entry(key)?
            .set_password(value)
            .map_err(|e| ImportError::Keyring(e.to_string()))
    }

    pub fn delete(key: &str) -> Result<(), ImportError> {
        match entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(ImportError::Keyring(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    struct FixedSource(Result<Vec<RawInterval>, String>);

    impl SessionSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch(&self, _since: DateTime<Utc>) -> Result<Vec<RawInterval>, ImportError> {
            self.0.clone().map_err(ImportError::Api)
        }
    }

    fn baseline() -> Baseline {
        Baseline::new(10, 0, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
    }

    fn interval(day: u32, minutes: i64) -> RawInterval {
        let start = Utc.with_ymd_and_hms(2026, 1, day, 9, 0, 0).unwrap();
        RawInterval::new(start, start + Duration::minutes(minutes))
    }

    #[test]
    fn stale_attempt_cannot_commit() {
        let coordinator = ImportCoordinator::new();
        let mut ledger = SessionLedger::new(baseline());

        let first = coordinator.begin();
        let second = coordinator.begin();
        assert!(!coordinator.is_current(first));

        coordinator
            .commit(second, &mut ledger, vec![interval(2, 30)])
            .unwrap();
        let err = coordinator
            .commit(first, &mut ledger, vec![interval(3, 90), interval(4, 90)])
            .unwrap_err();
        assert!(matches!(err, ImportError::Stale { attempt: 1, latest: 2 }));
        assert_eq!(ledger.imported_seconds(), 30 * 60);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_sessions() {
        let coordinator = ImportCoordinator::new();
        let mut ledger = SessionLedger::new(baseline());
        let since = baseline().cutoff();

        let ok = FixedSource(Ok(vec![interval(2, 60), interval(3, 30)]));
        let summary = coordinator.run(&ok, &mut ledger, since).await.unwrap();
        assert_eq!(summary.kept, 2);

        let failing = FixedSource(Err("quota exceeded".into()));
        assert!(coordinator.run(&failing, &mut ledger, since).await.is_err());
        assert_eq!(ledger.imported_seconds(), 90 * 60);
    }

    #[test]
    fn sync_starts_at_cutoff_unless_it_is_ahead() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let after = Utc.with_ymd_and_hms(2026, 1, 20, 0, 0, 0).unwrap();
        assert_eq!(sync_start(&baseline(), start, after), baseline().cutoff());

        let before = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(
            sync_start(&baseline(), start, before),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
        );
    }
}
