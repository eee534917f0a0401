use chrono::{DateTime, Utc};
use clap::Args;
use tenk_core::format::format_hms;
use tenk_core::{Config, PracticeStore, WindowKind};

use super::{load_tracker, print_json, resolve_now, CmdResult};

#[derive(Args)]
pub struct ChartArgs {
    /// momentum, day, week or trimester
    #[arg(default_value = "momentum")]
    kind: WindowKind,
    /// Trailing days (momentum) or buckets; 0 keeps every bucket
    #[arg(long)]
    range: Option<usize>,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
    /// Evaluate at this instant (RFC 3339) instead of now
    #[arg(long)]
    now: Option<DateTime<Utc>>,
}

fn default_range(kind: WindowKind) -> usize {
    match kind {
        WindowKind::Momentum => 7,
        WindowKind::Day => 30,
        WindowKind::Week => 12,
        WindowKind::Trimester => 0,
    }
}

pub fn run(args: ChartArgs) -> CmdResult {
    let config = Config::load()?;
    let store = PracticeStore::open()?;
    let tracker = load_tracker(&config, &store)?;
    let today = resolve_now(args.now).date_naive();
    let range = args.range.unwrap_or_else(|| default_range(args.kind));
    let series = tracker.chart(args.kind, range, today);

    if args.json {
        return print_json(&series);
    }
    let Some(series) = series else {
        println!("Not enough data to chart.");
        return Ok(());
    };
    let momentum = args.kind == WindowKind::Momentum;
    for p in &series.points {
        if momentum {
            println!(
                "{} {}  {:>+9.2}s  ({:+.2}s)  played {}",
                p.label,
                p.date,
                p.value,
                p.change,
                format_hms(p.raw_played_seconds)
            );
        } else {
            println!(
                "{:<10} {}/day  played {}",
                p.label,
                format_hms(p.value.round() as i64),
                format_hms(p.raw_played_seconds)
            );
        }
    }
    let direction = if series.trend_up { "up" } else { "down" };
    println!("Trend {direction} ({:+.2}s)", series.change);
    Ok(())
}
