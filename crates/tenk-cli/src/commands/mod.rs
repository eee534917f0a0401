pub mod baseline;
pub mod chart;
pub mod config;
pub mod import;
pub mod milestones;
pub mod practice;
pub mod progress;
pub mod repertoire;
pub mod reps;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tenk_core::{Config, PracticeStore, Tracker};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// `--now` when given, the clock otherwise.
pub fn resolve_now(now: Option<DateTime<Utc>>) -> DateTime<Utc> {
    now.unwrap_or_else(Utc::now)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Tracker over the configured journey and the cached imported sessions.
pub fn load_tracker(config: &Config, store: &PracticeStore) -> Result<Tracker, Box<dyn std::error::Error>> {
    let baseline = store.baseline_override()?;
    let imported = store.load_imported()?;
    Ok(Tracker::from_config(config, baseline).with_imported(&imported))
}
