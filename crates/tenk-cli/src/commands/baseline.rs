use chrono::NaiveDate;
use clap::Subcommand;
use tenk_core::format::format_hms;
use tenk_core::ledger::Baseline;
use tenk_core::{Config, PracticeStore};

use super::CmdResult;

#[derive(Subcommand)]
pub enum BaselineAction {
    /// Show the baseline in effect
    Show,
    /// Override the configured baseline
    Set {
        hours: u32,
        minutes: u32,
        /// Sessions on or before this date (YYYY-MM-DD) are already counted
        cutoff: NaiveDate,
    },
    /// Drop the override and fall back to the configured baseline
    Clear,
}

pub fn run(action: BaselineAction) -> CmdResult {
    let store = PracticeStore::open()?;
    match action {
        BaselineAction::Show => {
            let (baseline, source) = match store.baseline_override()? {
                Some(b) => (b, "override"),
                None => (Config::load()?.journey().baseline, "config"),
            };
            println!(
                "{} through {} ({source})",
                format_hms(baseline.total_seconds()),
                baseline.cutoff_date
            );
        }
        BaselineAction::Set {
            hours,
            minutes,
            cutoff,
        } => {
            if minutes >= 60 {
                return Err(format!("minutes must be below 60, got {minutes}").into());
            }
            let baseline = Baseline::new(hours, minutes, cutoff);
            store.set_baseline_override(Some(&baseline))?;
            println!("baseline set");
        }
        BaselineAction::Clear => {
            store.set_baseline_override(None)?;
            println!("baseline override cleared");
        }
    }
    Ok(())
}
