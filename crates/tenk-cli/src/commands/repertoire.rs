use chrono::Utc;
use clap::Subcommand;
use tenk_core::{InsertPosition, Piece, PieceStatus, PracticeStore, RepertoireItem};

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum RepertoireAction {
    /// List pieces and dividers in order
    List {
        #[arg(long)]
        json: bool,
    },
    /// Add a piece
    Add {
        title: String,
        #[arg(long, default_value = "")]
        composer: String,
        /// normal, attention or mastered
        #[arg(long, default_value = "normal")]
        status: PieceStatus,
        /// Insert right after this item id instead of at the end
        #[arg(long)]
        after: Option<String>,
    },
    /// Add a section divider
    Divider {
        #[arg(default_value = "")]
        text: String,
        #[arg(long)]
        after: Option<String>,
    },
    /// Delete a piece or divider
    Delete { id: String },
    /// Cycle a piece's status: normal -> attention -> mastered
    Cycle { id: String },
    /// Most played pieces first
    Leaderboard {
        #[arg(long)]
        json: bool,
    },
}

fn position(after: Option<String>) -> InsertPosition {
    after.map(InsertPosition::After).unwrap_or_default()
}

fn status_label(status: PieceStatus) -> &'static str {
    match status {
        PieceStatus::Normal => "normal",
        PieceStatus::Attention => "RED",
        PieceStatus::Mastered => "mastered",
    }
}

pub fn run(action: RepertoireAction) -> CmdResult {
    let store = PracticeStore::open()?;
    let mut state = store.load_practice_state()?;
    let rep = &mut state.repertoire;

    match action {
        RepertoireAction::List { json } => {
            if json {
                return print_json(rep.items());
            }
            for item in rep.items() {
                match item {
                    RepertoireItem::Piece(p) => println!(
                        "{:<9} {} - {}  ({} plays)  [{}]",
                        status_label(p.status),
                        p.title,
                        if p.composer.is_empty() { "?" } else { &p.composer },
                        p.play_count,
                        p.id
                    ),
                    RepertoireItem::Divider(d) => println!("{}  [{}]", d.label, d.id),
                }
            }
            println!("Red list: {}", rep.red_count());
            return Ok(());
        }
        RepertoireAction::Leaderboard { json } => {
            let board = rep.leaderboard();
            if json {
                return print_json(&board);
            }
            for (rank, p) in board.iter().enumerate() {
                println!("{:>3}. {}  ({} plays)", rank + 1, p.title, p.play_count);
            }
            return Ok(());
        }
        RepertoireAction::Add {
            title,
            composer,
            status,
            after,
        } => {
            let piece = Piece::new(title, composer, Utc::now().date_naive()).with_status(status);
            let id = rep.add_piece(piece, &position(after))?;
            println!("Piece added: {id}");
        }
        RepertoireAction::Divider { text, after } => {
            let id = rep.add_divider(&text, &position(after));
            println!("Divider added: {id}");
        }
        RepertoireAction::Delete { id } => {
            rep.delete(&id)?;
            println!("Deleted: {id}");
        }
        RepertoireAction::Cycle { id } => {
            let status = rep.cycle_status(&id)?;
            println!("{id}: {}", status_label(status));
        }
    }

    store.save_practice_state(&state)?;
    Ok(())
}
