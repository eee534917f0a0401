//! Momentum and pace-trend charts.
//!
//! Two families of series are built from the ledger's per-day playtime:
//! - **Momentum** (trailing N days): how the ledger's own running average
//!   moved each day, accumulated into a curve anchored at 0 on the window's
//!   first day. The average counts imported sessions only, over the days since
//!   the first of them, so the baseline figure never masks a day's play. Days
//!   before the first recorded session are flat rather than counted as
//!   zero-play days.
//! - **Pace trend** (day, ISO week or 4-month "trimester" buckets): the
//!   cumulative average as of each bucket's last day, with the bucket's total
//!   playtime alongside.
//!
//! Every series carries an axis scale and plot coordinates in a fixed
//! 100x100 space. A series needs at least two points to be charted.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::ledger::SessionLedger;

/// Plot space width and height.
pub const PLOT_SIZE: f64 = 100.0;

/// Smallest visible range of an anchored axis, whatever the configuration.
const MIN_AXIS_RANGE: f64 = 1.0;

/// Kind of window to aggregate into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    /// Trailing days, cumulative change of the running average.
    Momentum,
    /// One bucket per day, ending cumulative average.
    Day,
    /// ISO-week buckets.
    Week,
    /// Fixed 4-month blocks: Jan-Apr, May-Aug, Sep-Dec.
    Trimester,
}

impl std::str::FromStr for WindowKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "momentum" => Ok(WindowKind::Momentum),
            "day" | "daily" => Ok(WindowKind::Day),
            "week" | "weekly" => Ok(WindowKind::Week),
            "trimester" => Ok(WindowKind::Trimester),
            other => Err(format!("unknown window kind: {other}")),
        }
    }
}

/// One chart point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    /// Last day covered by the point.
    pub date: NaiveDate,
    /// Seconds: cumulative momentum, or average seconds per day.
    pub value: f64,
    /// Change from the previous point (the day's delta for momentum).
    pub change: f64,
    pub raw_played_seconds: i64,
    /// Day precedes the first recorded session.
    pub pre_ledger: bool,
}

/// Point mapped into plot space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

/// Vertical axis of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisScale {
    pub min: f64,
    pub max: f64,
    pub effective_min: f64,
    pub effective_max: f64,
    pub ticks: Vec<f64>,
}

impl AxisScale {
    /// Scale anchored at zero: `[min(0, lo), max(0, hi)]` widened to
    /// `min_range` and padded by `padding` of the range on both sides.
    pub fn anchored(values: &[f64], min_range: f64, padding: f64, tick_step: f64) -> Self {
        let min = values.iter().copied().fold(0.0_f64, f64::min);
        let max = values.iter().copied().fold(0.0_f64, f64::max);
        let range = (max - min).max(min_range).max(MIN_AXIS_RANGE);
        let pad = range * padding.max(0.0);
        Self::with_bounds(min, max, min - pad, max + pad, tick_step)
    }

    /// Scale hugging the values: spread of at least `min_spread` (or 15% of
    /// the range) on both sides, never below zero.
    pub fn fitted(values: &[f64], min_spread: f64, tick_step: f64) -> Self {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let spread = min_spread.max((max - min) * 0.15);
        Self::with_bounds(min, max, (min - spread).max(0.0), max + spread, tick_step)
    }

    fn with_bounds(min: f64, max: f64, effective_min: f64, effective_max: f64, base_step: f64) -> Self {
        Self {
            min,
            max,
            effective_min,
            effective_max,
            ticks: ticks(effective_min, effective_max, base_step),
        }
    }

    pub fn range(&self) -> f64 {
        (self.effective_max - self.effective_min).max(f64::EPSILON)
    }

    /// Map a value to plot space (y grows downward).
    pub fn to_y(&self, value: f64) -> f64 {
        PLOT_SIZE - (value - self.effective_min) / self.range() * PLOT_SIZE
    }
}

/// Tick positions at multiples of a step widened (x2, x2.5, x2 ...) until at
/// most a dozen ticks cover the range.
fn ticks(lo: f64, hi: f64, base_step: f64) -> Vec<f64> {
    if base_step <= 0.0 || !lo.is_finite() || !hi.is_finite() || hi <= lo {
        return Vec::new();
    }
    let factors = [2.0, 2.5, 2.0];
    let mut step = base_step;
    let mut i = 0;
    while (hi - lo) / step > 12.0 {
        step *= factors[i % factors.len()];
        i += 1;
    }
    let first = (lo / step).floor() as i64;
    let last = (hi / step).ceil() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

/// A chartable series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub kind: WindowKind,
    pub points: Vec<ChartPoint>,
    pub axis: AxisScale,
    pub plot: Vec<PlotPoint>,
    /// Plot-space y of the zero line (momentum) or the first value (trend).
    pub baseline_y: f64,
    /// Last value minus first value.
    pub change: f64,
    /// Momentum above zero, or average not below where the window started.
    pub trend_up: bool,
}

impl ChartSeries {
    /// SVG path of the line (`M x y L x y ...`).
    pub fn svg_path(&self) -> String {
        self.plot
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{} {:.2} {:.2}", if i == 0 { 'M' } else { 'L' }, p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Builder of chart series from the ledger.
#[derive(Debug, Clone)]
pub struct MomentumAggregator {
    start_date: NaiveDate,
    min_visible_range: f64,
    padding_ratio: f64,
    tick_step: f64,
}

impl MomentumAggregator {
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            min_visible_range: 20.0,
            padding_ratio: 0.2,
            tick_step: 10.0,
        }
    }

    pub fn with_scaling(mut self, min_visible_range: f64, padding_ratio: f64, tick_step: f64) -> Self {
        self.min_visible_range = min_visible_range;
        self.padding_ratio = padding_ratio;
        self.tick_step = tick_step;
        self
    }

    /// Aggregate the ledger into a series ending on `today`.
    ///
    /// For momentum `range_size` is the number of trailing days; for bucket
    /// kinds it is the number of trailing buckets kept (0 keeps all).
    /// Returns `None` when fewer than two points result.
    pub fn aggregate(
        &self,
        ledger: &SessionLedger,
        kind: WindowKind,
        range_size: usize,
        today: NaiveDate,
    ) -> Option<ChartSeries> {
        let timeline = DailyTimeline::new(ledger, self.start_date);
        let points = match kind {
            WindowKind::Momentum => self.momentum_points(&timeline, range_size, today),
            _ => self.bucket_points(&timeline, kind, range_size, ledger, today),
        };
        if points.len() < 2 {
            return None;
        }
        Some(self.finish(kind, points))
    }

    fn momentum_points(&self, timeline: &DailyTimeline, days: usize, today: NaiveDate) -> Vec<ChartPoint> {
        // The window never reaches back before the journey start.
        let journey_days = (today - self.start_date).num_days() + 1;
        let days = days.min(usize::try_from(journey_days).unwrap_or(0));
        if days == 0 {
            return Vec::new();
        }
        let Some(first) = today.checked_sub_days(Days::new(days as u64 - 1)) else {
            return Vec::new();
        };
        let mut cumulative = 0.0;
        let mut points = Vec::with_capacity(days);
        let mut prev_average = first.pred_opt().map_or(0.0, |d| timeline.ledger_average_through(d));

        for (i, day) in first.iter_days().take(days).enumerate() {
            let pre_ledger = timeline.first_day.map_or(true, |f| day < f);
            let average = timeline.ledger_average_through(day);
            let delta = if i == 0 || pre_ledger { 0.0 } else { average - prev_average };
            prev_average = average;
            cumulative += delta;
            points.push(ChartPoint {
                label: day.format("%a").to_string(),
                date: day,
                value: cumulative,
                change: delta,
                raw_played_seconds: timeline.played(day),
                pre_ledger,
            });
        }
        points
    }

    fn bucket_points(
        &self,
        timeline: &DailyTimeline,
        kind: WindowKind,
        range_size: usize,
        ledger: &SessionLedger,
        today: NaiveDate,
    ) -> Vec<ChartPoint> {
        let start = ledger
            .first_session_day()
            .unwrap_or(ledger.baseline().cutoff_date);
        if start > today {
            return Vec::new();
        }

        let mut points: Vec<ChartPoint> = Vec::new();
        let mut current: Option<(String, i64, NaiveDate)> = None;
        for day in start.iter_days().take_while(|d| *d <= today) {
            if timeline.average_through(day).is_none() {
                continue;
            }
            let label = bucket_label(kind, day);
            let played = timeline.played(day);
            if let Some((open, total, last)) = current.as_mut() {
                if *open == label {
                    *total += played;
                    *last = day;
                    continue;
                }
            }
            if let Some(done) = current.replace((label, played, day)) {
                points.push(timeline.bucket_point(done));
            }
        }
        if let Some(done) = current {
            points.push(timeline.bucket_point(done));
        }

        if range_size > 0 && points.len() > range_size {
            points.drain(..points.len() - range_size);
        }
        let mut prev: Option<f64> = None;
        for p in &mut points {
            p.change = prev.map_or(0.0, |v| p.value - v);
            prev = Some(p.value);
        }
        points
    }

    fn finish(&self, kind: WindowKind, points: Vec<ChartPoint>) -> ChartSeries {
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let first = values[0];
        let last = values[values.len() - 1];

        let (axis, reference, trend_up) = if kind == WindowKind::Momentum {
            let axis = AxisScale::anchored(&values, self.min_visible_range, self.padding_ratio, self.tick_step);
            (axis, 0.0, last >= 0.0)
        } else {
            let axis = AxisScale::fitted(&values, 60.0, 60.0);
            (axis, first, last >= first)
        };

        let max_x = (points.len() - 1) as f64;
        let plot = values
            .iter()
            .enumerate()
            .map(|(i, v)| PlotPoint {
                x: i as f64 / max_x * PLOT_SIZE,
                y: axis.to_y(*v),
            })
            .collect();

        ChartSeries {
            kind,
            baseline_y: axis.to_y(reference),
            change: last - first,
            trend_up,
            points,
            axis,
            plot,
        }
    }
}

fn bucket_label(kind: WindowKind, day: NaiveDate) -> String {
    match kind {
        WindowKind::Week => {
            let iso = day.iso_week();
            format!("{}-W{:02}", iso.year(), iso.week())
        }
        WindowKind::Trimester => format!("{} T{}", day.year(), (day.month() - 1) / 4 + 1),
        WindowKind::Day | WindowKind::Momentum => day.format("%b %-d").to_string(),
    }
}

/// Per-day playtime with running totals.
struct DailyTimeline {
    start_date: NaiveDate,
    baseline_seconds: i64,
    daily: BTreeMap<NaiveDate, i64>,
    first_day: Option<NaiveDate>,
}

impl DailyTimeline {
    fn new(ledger: &SessionLedger, start_date: NaiveDate) -> Self {
        Self {
            start_date,
            baseline_seconds: ledger.baseline().total_seconds(),
            daily: ledger.daily_seconds(),
            first_day: ledger.first_session_day(),
        }
    }

    fn played(&self, day: NaiveDate) -> i64 {
        self.daily.get(&day).copied().unwrap_or(0)
    }

    /// Imported seconds per day through the end of `day`, counted from the
    /// first session day inclusive. Zero before that day.
    fn ledger_average_through(&self, day: NaiveDate) -> f64 {
        let Some(first) = self.first_day.filter(|f| *f <= day) else {
            return 0.0;
        };
        let days = (day - first).num_days() + 1;
        let played: i64 = self.daily.range(..=day).map(|(_, s)| *s).sum();
        played as f64 / days as f64
    }

    /// Journey average in seconds per day as of the end of `day`, baseline
    /// included.
    fn average_through(&self, day: NaiveDate) -> Option<f64> {
        let elapsed = (day - self.start_date).num_days();
        if elapsed <= 0 {
            return None;
        }
        let played: i64 = self.daily.range(..=day).map(|(_, s)| *s).sum();
        Some((self.baseline_seconds + played) as f64 / elapsed as f64)
    }

    fn bucket_point(&self, (label, played, last): (String, i64, NaiveDate)) -> ChartPoint {
        ChartPoint {
            label,
            date: last,
            value: self.average_through(last).unwrap_or(0.0),
            change: 0.0,
            raw_played_seconds: played,
            pre_ledger: self.first_day.map_or(true, |f| last < f),
        }
    }
}
