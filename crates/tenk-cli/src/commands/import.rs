use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Subcommand;
use tenk_core::import::{keyring_store, sync_start};
use tenk_core::{
    Config, GoogleCalendarSource, ImportCoordinator, ImportError, JsonFileSource, PracticeStore,
    SessionSource,
};
use tracing::debug;

use super::{load_tracker, resolve_now, CmdResult};

/// Environment variable that overrides the stored calendar token.
const TOKEN_ENV: &str = "TENK_GOOGLE_TOKEN";

#[derive(Subcommand)]
pub enum ImportAction {
    /// Import sessions from the configured Google calendar
    Run {
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Import sessions from a JSON file of {start, end} records
    File {
        path: PathBuf,
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Manage the calendar access token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Show the cached import
    Status,
}

#[derive(Subcommand)]
pub enum TokenAction {
    /// Store an access token in the OS keyring
    Set { token: String },
    /// Remove the stored token
    Clear,
    /// Report whether a token is available
    Status,
}

fn access_token() -> Result<String, ImportError> {
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        if !token.trim().is_empty() {
            debug!("using token from {TOKEN_ENV}");
            return Ok(token);
        }
    }
    keyring_store::get(keyring_store::GOOGLE_TOKEN)?.ok_or_else(|| ImportError::NotAuthenticated {
        service: "google".to_string(),
    })
}

fn import_from<S: SessionSource>(source: S, now: Option<DateTime<Utc>>) -> CmdResult {
    let config = Config::load()?;
    let store = PracticeStore::open()?;
    let mut tracker = load_tracker(&config, &store)?;
    let now = resolve_now(now);
    let since = sync_start(
        tracker.ledger().baseline(),
        tracker.journey().start_date,
        now,
    );

    let coordinator = ImportCoordinator::new();
    let runtime = tokio::runtime::Runtime::new()?;
    let summary = runtime.block_on(coordinator.run(&source, tracker.ledger_mut(), since))?;
    store.save_imported(tracker.ledger().sessions(), now)?;

    println!(
        "Imported {} sessions from {} ({} skipped, {} replaced)",
        summary.kept,
        source.name(),
        summary.discarded,
        summary.replaced
    );
    println!("Total: {:.2} h", tracker.ledger().total_hours());
    Ok(())
}

pub fn run(action: ImportAction) -> CmdResult {
    match action {
        ImportAction::Run { now } => {
            let config = Config::load()?;
            let source = GoogleCalendarSource::with_base_url(
                access_token()?,
                config.import.calendar_name,
                &config.import.api_base,
            )?;
            import_from(source, now)
        }
        ImportAction::File { path, now } => import_from(JsonFileSource::new(path), now),
        ImportAction::Token { action } => {
            match action {
                TokenAction::Set { token } => {
                    keyring_store::set(keyring_store::GOOGLE_TOKEN, token.trim())?;
                    println!("token stored");
                }
                TokenAction::Clear => {
                    keyring_store::delete(keyring_store::GOOGLE_TOKEN)?;
                    println!("token cleared");
                }
                TokenAction::Status => match access_token() {
                    Ok(_) => println!("token available"),
                    Err(ImportError::NotAuthenticated { .. }) => println!("no token"),
                    Err(e) => return Err(e.into()),
                },
            }
            Ok(())
        }
        ImportAction::Status => {
            let store = PracticeStore::open()?;
            let sessions = store.load_imported()?;
            match store.last_import_at()? {
                Some(at) => println!("Last import: {}", at.to_rfc3339()),
                None => println!("Never imported"),
            }
            let seconds: i64 = sessions.iter().map(|s| s.duration_seconds).sum();
            println!(
                "{} cached sessions, {:.2} h",
                sessions.len(),
                seconds as f64 / 3600.0
            );
            Ok(())
        }
    }
}
