//! Integration tests for the journey engine and the scheduler.
//!
//! Each test walks one end-to-end situation through the public API:
//! projections from the configured baseline, recency-weighted picking,
//! empty red lists and the momentum chart.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use tenk_core::{
    Baseline, Config, CoreError, InsertPosition, JourneyConfig, PracticeScheduler,
    PracticeSession, PracticeState, Piece, PieceStatus, Repertoire, SchedulerError,
    SelectionMode, Tracker, WindowKind,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn noon(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap()))
}

#[test]
fn test_reference_journey_projection() {
    let journey = JourneyConfig::new(day(2024, 2, 1), Baseline::new(1015, 46, day(2026, 1, 17)));
    let tracker = Tracker::new(journey);
    let now = Utc.with_ymd_and_hms(2026, 1, 20, 12, 0, 0).unwrap();

    let snap = tracker.snapshot(now).expect("projection defined");
    assert_eq!(snap.days_elapsed, 719);
    assert!((snap.total_hours - 1015.77).abs() < 0.005);
    assert_eq!(snap.percent_to_target, 10.16);
    assert!((snap.average_pace - snap.total_hours / 719.0).abs() < 1e-12);
    assert_eq!(snap.next_hundred.hours, 1100);
    assert_eq!(snap.next_thousand.hours, 2000);
    assert!(snap.finish_date.unwrap() > day(2040, 1, 1));
}

#[test]
fn test_default_config_matches_reference_journey() {
    let tracker = Tracker::from_config(&Config::default(), None);
    let now = Utc.with_ymd_and_hms(2026, 1, 20, 12, 0, 0).unwrap();
    assert_eq!(tracker.snapshot(now).unwrap().percent_to_target, 10.16);
}

#[test]
fn test_imports_before_cutoff_do_not_double_count() {
    let journey = JourneyConfig::new(day(2024, 2, 1), Baseline::new(1015, 46, day(2026, 1, 17)));
    let before = Tracker::new(journey.clone()).ledger().total_seconds();

    let tracker = Tracker::new(journey).with_imported(&[
        PracticeSession::imported(noon(day(2026, 1, 15)), 5400),
        PracticeSession::imported(noon(day(2026, 1, 18)), 1800),
        PracticeSession::imported(noon(day(2026, 1, 18)), 9999),
    ]);
    assert_eq!(tracker.ledger().total_seconds(), before + 1800);
}

#[test]
fn test_never_played_piece_wins_over_recent_one() {
    let now = noon(day(2026, 1, 20));
    let mut wins_a = 0;
    let mut wins_b = 0;

    for seed in 0..200u64 {
        let mut a = Piece::new("A", "", day(2025, 1, 1));
        a.last_played_at = Some(now - Duration::days(10));
        let b = Piece::new("B", "", day(2025, 1, 1));

        let mut rep = Repertoire::new();
        rep.add_piece(a, &InsertPosition::End).unwrap();
        rep.add_piece(b, &InsertPosition::End).unwrap();
        let mut state = PracticeState::new(rep);

        let picked = PracticeScheduler::new(Some(seed))
            .pick_next(&mut state, SelectionMode::Normal, now)
            .unwrap();
        match picked.title.as_str() {
            "A" => wins_a += 1,
            _ => wins_b += 1,
        }
    }
    assert!(wins_b > wins_a, "B won {wins_b}, A won {wins_a}");
}

#[test]
fn test_stale_pieces_are_favoured_over_fresh_ones() {
    let now = noon(day(2026, 1, 20));
    let mut scheduler = PracticeScheduler::new(Some(99));
    let mut fresh_wins = 0;
    let mut stale_wins = 0;

    for _ in 0..500 {
        let mut fresh = Piece::new("fresh", "", day(2025, 1, 1));
        fresh.last_played_at = Some(now - Duration::days(2));
        let mut stale = Piece::new("stale", "", day(2025, 1, 1));
        stale.last_played_at = Some(now - Duration::days(3));

        match scheduler
            .choose([&fresh, &stale], SelectionMode::Normal, now)
            .unwrap()
            .title
            .as_str()
        {
            "fresh" => fresh_wins += 1,
            _ => stale_wins += 1,
        }
    }
    // Close recencies still leave room for jitter to flip the order.
    assert!(fresh_wins > 0);
    assert!(stale_wins > fresh_wins);
}

#[test]
fn test_empty_red_list_is_reported_and_changes_nothing() {
    let now = noon(day(2026, 1, 20));
    let mut rep = Repertoire::new();
    rep.add_piece(Piece::new("Etude", "Chopin", day(2025, 1, 1)), &InsertPosition::End)
        .unwrap();
    rep.add_piece(
        Piece::new("Sonata", "Haydn", day(2025, 1, 1)).with_status(PieceStatus::Mastered),
        &InsertPosition::End,
    )
    .unwrap();
    rep.add_divider("", &InsertPosition::End);
    let mut state = PracticeState::new(rep);
    let before = state.clone();

    let err = PracticeScheduler::new(Some(3))
        .pick_next(&mut state, SelectionMode::RedListOnly, now)
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Scheduler(SchedulerError::EmptyPool {
            mode: SelectionMode::RedListOnly
        })
    ));
    assert_eq!(state, before);
}

#[test]
fn test_single_session_gives_single_momentum_spike() {
    let today = day(2026, 3, 7);
    let day5 = today - Duration::days(2);
    let tracker = Tracker::from_config(&Config::default(), None)
        .with_imported(&[PracticeSession::imported(noon(day5), 3600)]);

    let series = tracker
        .chart(WindowKind::Momentum, 7, today)
        .expect("seven points");
    let changes: Vec<f64> = series.points.iter().map(|p| p.change).collect();

    let rises: Vec<usize> = changes
        .iter()
        .enumerate()
        .filter(|(_, c)| **c > 0.5)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(rises, vec![4]);
    assert!(changes[..4].iter().all(|c| *c == 0.0));
    assert!(changes[5..].iter().all(|c| *c < 0.0));
    assert_eq!(series.points[0].value, 0.0);
    assert!(series.axis.effective_max > series.points[4].value);
    assert!(series.axis.effective_max - series.axis.effective_min >= 20.0);
}

#[test]
fn test_momentum_with_oversized_range() {
    let today = day(2026, 1, 20);
    let tracker = Tracker::from_config(&Config::default(), None)
        .with_imported(&[PracticeSession::imported(noon(day(2026, 1, 18)), 1800)]);

    let series = tracker
        .chart(WindowKind::Momentum, 1_000_000_000_000, today)
        .expect("chart over the whole journey");
    assert_eq!(series.points.len(), 720);
    assert_eq!(series.points[0].date, day(2024, 2, 1));
    assert_eq!(series.points.last().unwrap().date, today);
}

#[test]
fn test_one_minute_baseline_projects_without_panicking() {
    let journey = JourneyConfig::new(day(2024, 2, 1), Baseline::new(0, 1, day(2024, 2, 2)));
    let tracker = Tracker::new(journey);
    let now = Utc.with_ymd_and_hms(2026, 1, 20, 12, 0, 0).unwrap();

    let snap = tracker.snapshot(now).expect("projection defined");
    assert_eq!(snap.total_seconds, 60);
    assert_eq!(snap.finish_date, None);
    assert_eq!(snap.percent_to_target, 0.0);
    assert!(tracker.forecast(now).is_some());
}
