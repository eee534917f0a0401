use chrono::{DateTime, Local, Utc};
use clap::Subcommand;
use tenk_core::{Config, PracticeScheduler, PracticeStore, SelectionMode};

use super::{print_json, resolve_now, CmdResult};

#[derive(Subcommand)]
pub enum PracticeAction {
    /// Pick the next piece to play and record the play
    Next {
        /// Only draw from pieces marked for attention
        #[arg(long)]
        red: bool,
        /// Seed the draw for a reproducible pick
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        json: bool,
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Record a play of a specific piece
    Play {
        id: String,
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Show the play history, newest first
    History {
        /// Number of entries to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Delete a history entry and take back its play
    Delete {
        entry_id: String,
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Number of plays recorded today
    Today {
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
}

pub fn run(action: PracticeAction) -> CmdResult {
    let store = PracticeStore::open()?;
    let mut state = store.load_practice_state()?;

    match action {
        PracticeAction::Next {
            red,
            seed,
            json,
            now,
        } => {
            let config = Config::load()?;
            let mode = if red {
                SelectionMode::RedListOnly
            } else {
                SelectionMode::Normal
            };
            let mut scheduler = PracticeScheduler::new(seed)
                .with_jitter(config.scheduler.jitter_min, config.scheduler.jitter_max);
            let piece = scheduler.pick_next(&mut state, mode, resolve_now(now))?;
            store.save_practice_state(&state)?;
            if json {
                return print_json(&piece);
            }
            if piece.composer.is_empty() {
                println!("{}", piece.title);
            } else {
                println!("{} - {}", piece.title, piece.composer);
            }
            println!("Played {} times", piece.play_count);
        }
        PracticeAction::Play { id, now } => {
            let piece = state.record_play(&id, resolve_now(now))?;
            store.save_practice_state(&state)?;
            println!("{}: {} plays", piece.title, piece.play_count);
        }
        PracticeAction::History { limit, json } => {
            let entries = &state.history.entries()[..limit.min(state.history.len())];
            if json {
                return print_json(entries);
            }
            if entries.is_empty() {
                println!("No plays recorded yet.");
            }
            for e in entries {
                let local = e.occurred_at.with_timezone(&Local);
                println!("{}  {}  [{}]", local.format("%Y-%m-%d %H:%M"), e.title, e.id);
            }
        }
        PracticeAction::Delete { entry_id, now } => {
            let today = resolve_now(now).date_naive();
            let entry = state.delete_history_entry(&entry_id, today)?;
            store.save_practice_state(&state)?;
            println!("Deleted play of {}", entry.title);
        }
        PracticeAction::Today { now } => {
            let today = resolve_now(now).date_naive();
            println!("{}", state.plays_today(today));
        }
    }
    Ok(())
}
