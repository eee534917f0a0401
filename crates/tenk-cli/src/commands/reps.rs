use clap::Subcommand;
use tenk_core::PracticeStore;

use super::CmdResult;

#[derive(Subcommand)]
pub enum RepsAction {
    /// Show the counter
    Show,
    /// Count one repetition
    Tap,
    /// Start the countdown over
    Reset,
    /// Use a new target and start over
    Target { n: u32 },
}

pub fn run(action: RepsAction) -> CmdResult {
    let store = PracticeStore::open()?;
    let mut reps = store.load_rep_counter()?;
    match action {
        RepsAction::Show => {}
        RepsAction::Tap => {
            reps.tap();
        }
        RepsAction::Reset => reps.reset(),
        RepsAction::Target { n } => reps.set_target(n)?,
    }
    store.save_rep_counter(&reps)?;

    if reps.is_done() {
        println!("done ({} reps)", reps.target);
    } else {
        println!("{} of {} left", reps.remaining, reps.target);
    }
    Ok(())
}
