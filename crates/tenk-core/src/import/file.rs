//! Sessions from a local JSON export.
//!
//! The file holds an array of `{"start": <rfc3339>, "end": <rfc3339>}`
//! objects; either field may be null or absent.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::SessionSource;
use crate::error::ImportError;
use crate::ledger::RawInterval;

#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionSource for JsonFileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self, since: DateTime<Utc>) -> Result<Vec<RawInterval>, ImportError> {
        let raw = std::fs::read_to_string(&self.path)?;
        let records: Vec<RawInterval> = serde_json::from_str(&raw)?;
        Ok(records
            .into_iter()
            .filter(|r| r.start.map_or(true, |s| s >= since))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    #[tokio::test]
    async fn reads_records_since_instant() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"start": "2025-12-31T09:00:00Z", "end": "2025-12-31T10:00:00Z"}},
                {{"start": "2026-01-02T09:00:00Z", "end": "2026-01-02T09:30:00Z"}},
                {{"start": "2026-01-03T09:00:00Z"}}
            ]"#
        )
        .unwrap();

        let since = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let records = JsonFileSource::new(file.path()).fetch(since).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].end, None);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let since = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let err = JsonFileSource::new("/nonexistent/sessions.json")
            .fetch(since)
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Io(_)));
    }
}
