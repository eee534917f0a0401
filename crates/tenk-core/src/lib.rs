//! # tenk Core Library
//!
//! Core logic for tenk, a tracker for a long-horizon ("10,000 hour") practice
//! journey and the rotating repertoire practiced along the way. Everything is
//! reachable from the `tenk` CLI; this crate holds no presentation code.
//!
//! ## Architecture
//!
//! - **Ledger**: one baseline figure plus the latest imported batch of
//!   sessions, deduplicated into a single timeline
//! - **Projections**: pace, percentage, finish date and the next round-number
//!   milestones, plus the marginal-effort forecast
//! - **Milestones**: read-only legacy facts merged with user-created interval
//!   and custom milestones
//! - **Momentum**: daily running-average deltas and bucketed pace trends with
//!   chart axis scaling
//! - **Scheduler**: recency-weighted randomized pick of the next piece
//! - **Storage**: SQLite key/value persistence and TOML configuration
//! - **Import**: calendar and file session sources behind [`SessionSource`]
//!
//! ## Key Components
//!
//! - [`Tracker`]: ledger plus projection and chart views
//! - [`MilestoneRegistry`]: merged milestone view with edits
//! - [`PracticeScheduler`]: next-piece selection over [`PracticeState`]
//! - [`ImportCoordinator`]: newest-attempt-wins import commits
//! - [`PracticeStore`]: typed persistence
//! - [`Config`]: application configuration management

pub mod error;
pub mod format;
pub mod history;
pub mod import;
pub mod journey;
pub mod ledger;
pub mod milestones;
pub mod momentum;
pub mod practice;
pub mod progress;
pub mod repertoire;
pub mod reps;
pub mod scheduler;
pub mod storage;
pub mod tracker;

pub use error::{
    ConfigError, CoreError, DatabaseError, ImportError, SchedulerError, ValidationError,
};
pub use history::{DayCounter, HistoryEntry, PracticeHistory};
pub use import::{GoogleCalendarSource, ImportCoordinator, JsonFileSource, SessionSource};
pub use journey::JourneyConfig;
pub use ledger::{Baseline, PracticeSession, RawInterval, SessionLedger, SessionOrigin};
pub use milestones::{Milestone, MilestoneKind, MilestonePatch, MilestoneRegistry};
pub use momentum::{ChartPoint, ChartSeries, MomentumAggregator, WindowKind};
pub use practice::PracticeState;
pub use progress::{EffortForecast, ProgressCalculator, ProgressSnapshot};
pub use repertoire::{Divider, InsertPosition, Piece, PieceStatus, Repertoire, RepertoireItem};
pub use reps::RepCounter;
pub use scheduler::{PracticeScheduler, SelectionMode};
pub use storage::{Config, Database, PracticeStore};
pub use tracker::Tracker;
