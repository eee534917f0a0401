//! Human-readable durations and elapsed-time text.
//!
//! Durations never show zero-valued leading units: `45s`, `3m 5s`,
//! `1h 24m 0s`.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Format whole seconds as `Hh Mm Ss`, dropping zero leading units.
pub fn format_hms(total_seconds: i64) -> String {
    let total_seconds = total_seconds.max(0);
    let h = total_seconds / 3600;
    let m = (total_seconds % 3600) / 60;
    let s = total_seconds % 60;

    if h == 0 {
        if m == 0 {
            return format!("{s}s");
        }
        return format!("{m}m {s}s");
    }
    format!("{h}h {m}m {s}s")
}

/// Format fractional hours (e.g. an average pace) via [`format_hms`].
pub fn format_decimal_hours(hours: f64) -> String {
    format_hms((hours * 3600.0).round() as i64)
}

/// Format an effort cost. Costs of an hour or more drop the seconds.
pub fn format_effort(total_seconds: f64) -> String {
    let total = total_seconds.max(0.0).round() as i64;
    if total < 60 {
        return format!("{total}s");
    }
    let mins = total / 60;
    let secs = total % 60;
    if mins < 60 {
        return format!("{mins}m {secs}s");
    }
    format!("{}h {}m", mins / 60, mins % 60)
}

/// Split a day count into 365-day years and 30-day months.
pub fn years_months(days: f64) -> (i64, i64) {
    let days = days.max(0.0);
    let years = (days / 365.0).floor() as i64;
    let months = ((days % 365.0) / 30.0).floor() as i64;
    (years, months)
}

/// Remaining time as `05y 03m`.
pub fn format_remaining(days: f64) -> String {
    let (years, months) = years_months(days);
    format!("{years:02}y {months:02}m")
}

/// Whole journey length as `7y 2m`.
pub fn format_span(days: f64) -> String {
    let (years, months) = years_months(days);
    format!("{years}y {months}m")
}

/// Calendar age of the journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyAge {
    pub years: i32,
    pub months: i32,
    pub text: String,
}

/// Whole years and months from `start` to `today`.
///
/// Both parts are clamped at zero, so a clock behind the start date reads as
/// `0 year 0 month`.
pub fn years_months_since(start: NaiveDate, today: NaiveDate) -> JourneyAge {
    let mut years = today.year() - start.year();
    let mut months = today.month() as i32 - start.month() as i32;
    if today.day() < start.day() {
        months -= 1;
    }
    if months < 0 {
        years -= 1;
        months += 12;
    }
    if years < 0 {
        years = 0;
        months = 0;
    }
    let months = months.max(0);
    JourneyAge {
        years,
        months,
        text: format!("{years} year {months} month"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn hms_omits_zero_leading_units() {
        assert_eq!(format_hms(45), "45s");
        assert_eq!(format_hms(185), "3m 5s");
        assert_eq!(format_hms(3600), "1h 0m 0s");
        assert_eq!(format_hms(5045), "1h 24m 5s");
        assert_eq!(format_hms(-3), "0s");
    }

    #[test]
    fn decimal_hours_rounds_to_seconds() {
        assert_eq!(format_decimal_hours(1.4), "1h 24m 0s");
        assert_eq!(format_decimal_hours(0.0125), "45s");
    }

    #[test]
    fn effort_formatting_tiers() {
        assert_eq!(format_effort(42.4), "42s");
        assert_eq!(format_effort(719.0), "11m 59s");
        assert_eq!(format_effort(14_380.0), "3h 59m");
    }

    #[test]
    fn remaining_and_span() {
        assert_eq!(format_remaining(365.0 * 5.0 + 95.0), "05y 03m");
        assert_eq!(format_span(365.0 * 12.0 + 61.0), "12y 2m");
        assert_eq!(format_remaining(-4.0), "00y 00m");
    }

    #[test]
    fn journey_age_counts_whole_months() {
        let age = years_months_since(day(2024, 2, 1), day(2026, 1, 20));
        assert_eq!((age.years, age.months), (1, 11));
        assert_eq!(age.text, "1 year 11 month");
    }

    #[test]
    fn journey_age_clamps_negative_parts() {
        let age = years_months_since(day(2024, 2, 10), day(2024, 1, 5));
        assert_eq!((age.years, age.months), (0, 0));
    }
}
