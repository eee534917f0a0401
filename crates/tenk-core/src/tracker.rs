//! The journey engine: one ledger plus the views computed from it.

use chrono::{DateTime, NaiveDate, Utc};

use crate::format::{years_months_since, JourneyAge};
use crate::journey::JourneyConfig;
use crate::ledger::{Baseline, PracticeSession, SessionLedger};
use crate::momentum::{ChartSeries, MomentumAggregator, WindowKind};
use crate::progress::{days_elapsed, EffortForecast, ProgressCalculator, ProgressSnapshot};
use crate::storage::Config;

/// Ledger and calculators for one journey.
#[derive(Debug, Clone)]
pub struct Tracker {
    journey: JourneyConfig,
    ledger: SessionLedger,
    progress: ProgressCalculator,
    momentum: MomentumAggregator,
}

impl Tracker {
    pub fn new(journey: JourneyConfig) -> Self {
        Self {
            ledger: SessionLedger::new(journey.baseline),
            progress: ProgressCalculator::new(journey.target_hours),
            momentum: MomentumAggregator::new(journey.start_date),
            journey,
        }
    }

    /// Tracker configured from the config file. A stored baseline override
    /// takes the place of the configured baseline.
    pub fn from_config(config: &Config, baseline_override: Option<Baseline>) -> Self {
        let mut journey = config.journey();
        if let Some(baseline) = baseline_override {
            journey.baseline = baseline;
        }
        let m = &config.momentum;
        let mut tracker = Self::new(journey);
        tracker.progress = tracker
            .progress
            .with_effort_steps(config.forecast.effort_steps_secs.clone());
        tracker.momentum = tracker
            .momentum
            .with_scaling(m.min_visible_range_secs, m.padding_ratio, m.tick_step_secs);
        tracker
    }

    pub fn with_imported(mut self, sessions: &[PracticeSession]) -> Self {
        self.ledger.replace_imported(sessions);
        self
    }

    pub fn journey(&self) -> &JourneyConfig {
        &self.journey
    }

    pub fn ledger(&self) -> &SessionLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut SessionLedger {
        &mut self.ledger
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> Option<ProgressSnapshot> {
        self.progress
            .project(self.ledger.total_hours(), self.journey.start_date, now)
    }

    pub fn forecast(&self, now: DateTime<Utc>) -> Option<EffortForecast> {
        self.progress.forecast(
            self.ledger.total_hours(),
            days_elapsed(self.journey.start_date, now),
        )
    }

    pub fn chart(&self, kind: WindowKind, range_size: usize, today: NaiveDate) -> Option<ChartSeries> {
        self.momentum.aggregate(&self.ledger, kind, range_size, today)
    }

    pub fn age(&self, today: NaiveDate) -> JourneyAge {
        years_months_since(self.journey.start_date, today)
    }
}
