use clap::Subcommand;
use tenk_core::error::ConfigError;
use tenk_core::format::format_effort;
use tenk_core::Config;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting
    Get {
        /// Dotted key (e.g. "journey.target_hours", "import.calendar_name")
        key: String,
    },
    /// Change one setting and save
    Set {
        /// Dotted key
        key: String,
        /// New value; lists take JSON (e.g. "[1, 3, 5]")
        value: String,
    },
    /// Summarize the journey, import, chart and scheduler settings
    List {
        /// Dump the whole config as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Print where the config file lives
    Path,
    /// Reset config to defaults
    Reset,
}

fn print_summary(config: &Config) {
    let j = &config.journey;
    println!("Journey");
    println!("  start:     {}", j.start_date);
    println!("  target:    {} h", j.target_hours);
    println!(
        "  baseline:  {}h {}m through {}",
        j.baseline_hours, j.baseline_minutes, j.baseline_cutoff
    );

    println!("Import");
    println!("  calendar:  {}", config.import.calendar_name);
    println!("  api:       {}", config.import.api_base);

    let m = &config.momentum;
    println!("Momentum chart");
    println!("  min range: {}s", m.min_visible_range_secs);
    println!("  padding:   {}%", m.padding_ratio * 100.0);
    println!("  tick step: {}s", m.tick_step_secs);

    let steps: Vec<String> = config
        .forecast
        .effort_steps_secs
        .iter()
        .map(|s| format_effort(f64::from(*s)))
        .collect();
    println!("Forecast steps: {}", steps.join(", "));

    println!(
        "Scheduler jitter: {} to {}",
        config.scheduler.jitter_min, config.scheduler.jitter_max
    );

    println!("Legacy milestones");
    for entry in &config.legacy_milestones {
        println!("  {:>5} h  {}  {}", entry.hours, entry.date, entry.avg);
    }
}

pub fn run(action: ConfigAction) -> CmdResult {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key).ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            println!("{key} = {}", config.get(&key).unwrap_or(value));
        }
        ConfigAction::List { json } => {
            let config = Config::load()?;
            if json {
                return print_json(&config);
            }
            print_summary(&config);
        }
        ConfigAction::Path => println!("{}", Config::path()?.display()),
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
