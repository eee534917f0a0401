use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "tenk", version, about = "10,000-hour practice tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Journey progress, pace and projections
    Progress(commands::progress::ProgressArgs),
    /// Cost of lifting the average pace today
    Forecast(commands::progress::ForecastArgs),
    /// Momentum and pace-trend charts
    Chart(commands::chart::ChartArgs),
    /// Milestone management
    Milestones {
        #[command(subcommand)]
        action: commands::milestones::MilestoneAction,
    },
    /// Repertoire management
    Repertoire {
        #[command(subcommand)]
        action: commands::repertoire::RepertoireAction,
    },
    /// Pick pieces and manage play history
    Practice {
        #[command(subcommand)]
        action: commands::practice::PracticeAction,
    },
    /// Import sessions from the calendar or a file
    Import {
        #[command(subcommand)]
        action: commands::import::ImportAction,
    },
    /// Baseline figure override
    Baseline {
        #[command(subcommand)]
        action: commands::baseline::BaselineAction,
    },
    /// Repetition counter
    Reps {
        #[command(subcommand)]
        action: commands::reps::RepsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let filter = EnvFilter::try_from_env("TENK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Progress(args) => commands::progress::run(args),
        Commands::Forecast(args) => commands::progress::forecast(args),
        Commands::Chart(args) => commands::chart::run(args),
        Commands::Milestones { action } => commands::milestones::run(action),
        Commands::Repertoire { action } => commands::repertoire::run(action),
        Commands::Practice { action } => commands::practice::run(action),
        Commands::Import { action } => commands::import::run(action),
        Commands::Baseline { action } => commands::baseline::run(action),
        Commands::Reps { action } => commands::reps::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
