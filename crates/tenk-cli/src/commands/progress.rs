use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use serde_json::json;
use tenk_core::format::format_hms;
use tenk_core::{Config, PracticeStore};

use super::{load_tracker, print_json, resolve_now, CmdResult};

fn date_or_never(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "beyond the calendar".to_string(), |d| d.to_string())
}

#[derive(Args)]
pub struct ProgressArgs {
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
    /// Evaluate at this instant (RFC 3339) instead of now
    #[arg(long)]
    now: Option<DateTime<Utc>>,
}

pub type ForecastArgs = ProgressArgs;

pub fn run(args: ProgressArgs) -> CmdResult {
    let config = Config::load()?;
    let store = PracticeStore::open()?;
    let tracker = load_tracker(&config, &store)?;
    let now = resolve_now(args.now);
    let age = tracker.age(now.date_naive());
    let snapshot = tracker.snapshot(now);

    if args.json {
        return print_json(&json!({ "snapshot": snapshot, "age": age }));
    }

    let Some(s) = snapshot else {
        println!("No practice recorded yet.");
        return Ok(());
    };
    println!("Total:     {} ({:.2} h)", format_hms(s.total_seconds), s.total_hours);
    println!(
        "Progress:  {:.2}% of {} h",
        s.percent_to_target,
        tracker.journey().target_hours
    );
    println!("Average:   {} per day over {} days", s.average_display, s.days_elapsed);
    println!("Journey:   {}", age.text);
    println!(
        "Finish:    {} ({} left, {} in total)",
        date_or_never(s.finish_date),
        s.remaining_display,
        s.total_journey_display
    );
    for eta in [&s.next_hundred, &s.next_thousand] {
        println!(
            "Next {:>5} h: {:.2} h to go, {} days ({})",
            eta.hours,
            eta.hours_to_go,
            eta.days_to_go,
            date_or_never(eta.eta)
        );
    }
    Ok(())
}

pub fn forecast(args: ForecastArgs) -> CmdResult {
    let config = Config::load()?;
    let store = PracticeStore::open()?;
    let tracker = load_tracker(&config, &store)?;
    let forecast = tracker.forecast(resolve_now(args.now));

    if args.json {
        return print_json(&forecast);
    }
    let Some(f) = forecast else {
        println!("No practice recorded yet.");
        return Ok(());
    };
    for step in &f.effort {
        println!("+{:>2}s/day average: play {} today", step.seconds, step.cost);
    }
    println!("Skipping today lowers the average by {:.2}s", f.drop_seconds);
    Ok(())
}
