//! Progress projection toward the journey target.
//!
//! Given the ledger total and the journey start, computes pace,
//! percentage, projected finish date, the next round-number milestones and
//! the marginal-effort forecast. A journey with no elapsed days or no hours
//! has no projection (`None`), which callers show as a placeholder.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::format::{format_decimal_hours, format_effort, format_remaining, format_span};
use crate::journey::DEFAULT_TARGET_HOURS;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Projected arrival at a round-number milestone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneEta {
    pub hours: u32,
    pub hours_to_go: f64,
    pub days_to_go: i64,
    /// `None` when the date lies beyond the representable calendar.
    pub eta: Option<NaiveDate>,
}

/// Point-in-time view of the journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub total_hours: f64,
    pub total_seconds: i64,
    pub days_elapsed: i64,
    /// Hours per day since the journey start.
    pub average_pace: f64,
    pub average_seconds: i64,
    pub average_display: String,
    /// Percentage of the target, capped at 100 and rounded to 2 decimals.
    pub percent_to_target: f64,
    pub days_remaining: f64,
    /// `None` when the pace is too low for the date to be representable.
    pub finish_date: Option<NaiveDate>,
    pub remaining_display: String,
    pub total_journey_display: String,
    pub next_hundred: MilestoneEta,
    pub next_thousand: MilestoneEta,
}

/// Cost of raising the average pace by `seconds` per day, paid today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffortStep {
    pub seconds: u32,
    pub cost_seconds: f64,
    pub cost: String,
}

/// Marginal-effort forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffortForecast {
    pub effort: Vec<EffortStep>,
    /// Seconds the average drops if today adds nothing, 2 decimals.
    pub drop_seconds: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Calendar date `seconds` after `now`, if chrono can represent it.
fn date_after(now: DateTime<Utc>, seconds: f64) -> Option<NaiveDate> {
    if !seconds.is_finite() || seconds > i64::MAX as f64 {
        return None;
    }
    let delta = TimeDelta::try_seconds(seconds as i64)?;
    now.checked_add_signed(delta).map(|at| at.date_naive())
}

/// Whole days from the start of `start_date` (UTC) to `now`.
pub fn days_elapsed(start_date: NaiveDate, now: DateTime<Utc>) -> i64 {
    (now - start_date.and_time(NaiveTime::MIN).and_utc()).num_days()
}

/// Projection engine.
#[derive(Debug, Clone)]
pub struct ProgressCalculator {
    target_hours: f64,
    effort_steps: Vec<u32>,
}

impl Default for ProgressCalculator {
    fn default() -> Self {
        Self {
            target_hours: DEFAULT_TARGET_HOURS,
            effort_steps: vec![1, 3, 5, 10, 20],
        }
    }
}

impl ProgressCalculator {
    pub fn new(target_hours: f64) -> Self {
        Self {
            target_hours,
            ..Self::default()
        }
    }

    pub fn with_effort_steps(mut self, steps: Vec<u32>) -> Self {
        self.effort_steps = steps;
        self
    }

    pub fn target_hours(&self) -> f64 {
        self.target_hours
    }

    /// Project the journey. Returns `None` when no days have elapsed or no
    /// hours are recorded.
    pub fn project(
        &self,
        total_hours: f64,
        start_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Option<ProgressSnapshot> {
        let days = days_elapsed(start_date, now);
        if days <= 0 || total_hours <= 0.0 {
            return None;
        }

        let pace = total_hours / days as f64;
        let percent = round2((total_hours / self.target_hours * 100.0).min(100.0));
        let days_remaining = if total_hours >= self.target_hours {
            0.0
        } else {
            (self.target_hours - total_hours) / pace
        };
        let finish_date = date_after(now, days_remaining * SECONDS_PER_DAY);

        Some(ProgressSnapshot {
            total_hours,
            total_seconds: (total_hours * 3600.0).round() as i64,
            days_elapsed: days,
            average_pace: pace,
            average_seconds: (pace * 3600.0).round() as i64,
            average_display: format_decimal_hours(pace),
            percent_to_target: percent,
            days_remaining,
            finish_date,
            remaining_display: format_remaining(days_remaining),
            total_journey_display: format_span(days as f64 + days_remaining),
            next_hundred: Self::next_round(total_hours, pace, 100, now),
            next_thousand: Self::next_round(total_hours, pace, 1000, now),
        })
    }

    fn next_round(total_hours: f64, pace: f64, step: u32, now: DateTime<Utc>) -> MilestoneEta {
        let step_f = f64::from(step);
        let hours = ((total_hours / step_f).floor() + 1.0) * step_f;
        let hours_to_go = hours - total_hours;
        let days_to_go = (hours_to_go / pace).ceil() as i64;
        MilestoneEta {
            hours: hours as u32,
            hours_to_go,
            days_to_go,
            eta: date_after(now, days_to_go as f64 * SECONDS_PER_DAY),
        }
    }

    /// How much extra play today would lift the average by each configured
    /// step, and how far the average falls if today stays empty.
    pub fn forecast(&self, total_hours: f64, days_elapsed: i64) -> Option<EffortForecast> {
        if days_elapsed <= 0 || total_hours <= 0.0 {
            return None;
        }
        let days = days_elapsed as f64;
        let effort = self
            .effort_steps
            .iter()
            .map(|&seconds| {
                let cost_seconds = f64::from(seconds) * days;
                EffortStep {
                    seconds,
                    cost_seconds,
                    cost: format_effort(cost_seconds),
                }
            })
            .collect();
        let drop_hours = total_hours / days - total_hours / (days + 1.0);
        Some(EffortForecast {
            effort,
            drop_seconds: round2(drop_hours * 3600.0),
        })
    }
}
