use chrono::{DateTime, NaiveDate, Utc};
use clap::Subcommand;
use tenk_core::milestones::{parse_pace, MilestonePatch};
use tenk_core::{Config, PracticeStore};

use super::{print_json, resolve_now, CmdResult};

#[derive(Subcommand)]
pub enum MilestoneAction {
    /// List every milestone, highest threshold first
    List {
        #[arg(long)]
        json: bool,
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Show the next free interval threshold
    Next,
    /// Record an interval milestone
    AddInterval {
        /// Date reached (YYYY-MM-DD)
        date: NaiveDate,
        /// Average pace at that point, e.g. 1:24:05 or "1h 24m"
        pace: String,
        /// Threshold in hours; defaults to the next free one
        #[arg(long)]
        hours: Option<u32>,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Record a custom milestone
    AddCustom {
        hours: u32,
        /// Date reached (YYYY-MM-DD)
        date: NaiveDate,
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Edit a milestone (legacy ones accept only a description)
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        hours: Option<u32>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        pace: Option<String>,
    },
    /// Delete an interval or custom milestone
    Delete { id: String },
    /// Remove the note on a legacy milestone
    ClearNote { id: String },
}

pub fn run(action: MilestoneAction) -> CmdResult {
    let config = Config::load()?;
    let store = PracticeStore::open()?;
    let mut registry = store.load_milestones(config.journey().legacy_milestones)?;

    match action {
        MilestoneAction::List { json, now } => {
            let merged = registry.merged();
            if json {
                return print_json(&merged);
            }
            let now = resolve_now(now);
            for m in &merged {
                let pace = m.pace_at_achievement.as_deref().unwrap_or("-");
                println!(
                    "{:>6} h  {}  {:>4} days ago  {:<20} pace {}  [{}]",
                    m.hours_threshold,
                    m.achieved_on,
                    m.days_ago(now),
                    m.title,
                    pace,
                    m.id
                );
                if !m.description.is_empty() {
                    println!("          {}", m.description);
                }
            }
            return Ok(());
        }
        MilestoneAction::Next => {
            println!("{}", registry.next_interval_hours());
            return Ok(());
        }
        MilestoneAction::AddInterval {
            date,
            pace,
            hours,
            description,
        } => {
            let hours = hours.unwrap_or_else(|| registry.next_interval_hours());
            let id = registry.add_interval(hours, date, &parse_pace(&pace), &description)?;
            println!("Milestone added: {id}");
        }
        MilestoneAction::AddCustom {
            hours,
            date,
            title,
            description,
        } => {
            let id = registry.add_custom(hours, date, &title, &description, Utc::now())?;
            println!("Milestone added: {id}");
        }
        MilestoneAction::Edit {
            id,
            title,
            description,
            hours,
            date,
            pace,
        } => {
            registry.edit(
                &id,
                MilestonePatch {
                    title,
                    description,
                    hours,
                    achieved_on: date,
                    pace: pace.as_deref().map(parse_pace),
                },
            )?;
            println!("Milestone updated: {id}");
        }
        MilestoneAction::Delete { id } => {
            registry.delete(&id)?;
            println!("Milestone deleted: {id}");
        }
        MilestoneAction::ClearNote { id } => {
            if registry.clear_note(&id) {
                println!("Note cleared: {id}");
            } else {
                println!("No note on {id}");
            }
        }
    }

    store.save_milestones(&registry)?;
    Ok(())
}
