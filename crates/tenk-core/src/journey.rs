//! Immutable journey configuration handed to the engine at construction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::Baseline;
use crate::milestones::LegacyMilestone;

/// Default journey target in hours.
pub const DEFAULT_TARGET_HOURS: f64 = 10_000.0;

/// Fixed figures of a practice journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyConfig {
    /// Day the journey started; pace is averaged over days since then.
    pub start_date: NaiveDate,
    /// Hours the journey aims for.
    pub target_hours: f64,
    /// Manually entered figure covering everything up to its cutoff.
    pub baseline: Baseline,
    /// Read-only historical milestones.
    pub legacy_milestones: Vec<LegacyMilestone>,
}

impl JourneyConfig {
    pub fn new(start_date: NaiveDate, baseline: Baseline) -> Self {
        Self {
            start_date,
            target_hours: DEFAULT_TARGET_HOURS,
            baseline,
            legacy_milestones: Vec::new(),
        }
    }

    pub fn with_target(mut self, target_hours: f64) -> Self {
        self.target_hours = target_hours;
        self
    }

    pub fn with_legacy_milestones(mut self, legacy: Vec<LegacyMilestone>) -> Self {
        self.legacy_milestones = legacy;
        self
    }
}

impl Default for JourneyConfig {
    fn default() -> Self {
        crate::storage::Config::default().journey()
    }
}
