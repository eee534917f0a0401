//! Typed persistence over the key/value table.
//!
//! Each piece of state is one JSON value under a fixed key. Reads are
//! forgiving: a missing key yields the empty value, and an unparsable one is
//! logged and treated as empty, so a corrupt entry never blocks startup.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use super::Database;
use crate::error::{CoreError, DatabaseError};
use crate::history::{DayCounter, PracticeHistory};
use crate::ledger::{Baseline, PracticeSession};
use crate::milestones::{CustomMilestone, IntervalMilestone, LegacyMilestone, MilestoneRegistry};
use crate::practice::PracticeState;
use crate::repertoire::Repertoire;
use crate::reps::RepCounter;

/// Fixed storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Repertoire,
    BaselineOverride,
    IntervalMilestones,
    CustomMilestones,
    LegacyNotes,
    History,
    ImportedSessions,
    LastImportAt,
    DayCounter,
    RepCounter,
}

impl StoreKey {
    pub const ALL: [StoreKey; 10] = [
        StoreKey::Repertoire,
        StoreKey::BaselineOverride,
        StoreKey::IntervalMilestones,
        StoreKey::CustomMilestones,
        StoreKey::LegacyNotes,
        StoreKey::History,
        StoreKey::ImportedSessions,
        StoreKey::LastImportAt,
        StoreKey::DayCounter,
        StoreKey::RepCounter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::Repertoire => "repertoire",
            StoreKey::BaselineOverride => "baseline_override",
            StoreKey::IntervalMilestones => "interval_milestones",
            StoreKey::CustomMilestones => "custom_milestones",
            StoreKey::LegacyNotes => "legacy_notes",
            StoreKey::History => "history",
            StoreKey::ImportedSessions => "imported_sessions",
            StoreKey::LastImportAt => "last_import_at",
            StoreKey::DayCounter => "day_counter",
            StoreKey::RepCounter => "rep_counter",
        }
    }
}

/// Typed view over [`Database`].
pub struct PracticeStore {
    db: Database,
}

impl PracticeStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the store in the data directory.
    pub fn open() -> Result<Self, CoreError> {
        Ok(Self::new(Database::open()?))
    }

    pub fn open_memory() -> Result<Self, DatabaseError> {
        Ok(Self::new(Database::open_memory()?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Read a value, falling back to `T::default()` when missing or corrupt.
    pub fn load<T: DeserializeOwned + Default>(&self, key: StoreKey) -> Result<T, DatabaseError> {
        let Some(raw) = self.db.kv_get(key.as_str())? else {
            return Ok(T::default());
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "unreadable stored value, using empty");
                Ok(T::default())
            }
        }
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) -> Result<(), CoreError> {
        let raw = serde_json::to_string(value)?;
        self.db.kv_set(key.as_str(), &raw)?;
        Ok(())
    }

    pub fn clear(&self, key: StoreKey) -> Result<bool, DatabaseError> {
        self.db.kv_delete(key.as_str())
    }

    pub fn load_repertoire(&self) -> Result<Repertoire, DatabaseError> {
        self.load(StoreKey::Repertoire)
    }

    pub fn load_practice_state(&self) -> Result<PracticeState, DatabaseError> {
        Ok(PracticeState {
            repertoire: self.load(StoreKey::Repertoire)?,
            history: self.load::<PracticeHistory>(StoreKey::History)?,
            day_counter: self.load::<DayCounter>(StoreKey::DayCounter)?,
        })
    }

    pub fn save_practice_state(&self, state: &PracticeState) -> Result<(), CoreError> {
        self.save(StoreKey::Repertoire, &state.repertoire)?;
        self.save(StoreKey::History, &state.history)?;
        self.save(StoreKey::DayCounter, &state.day_counter)
    }

    /// Registry built from the configured legacy table and the stored
    /// user-created milestones.
    pub fn load_milestones(&self, legacy: Vec<LegacyMilestone>) -> Result<MilestoneRegistry, DatabaseError> {
        Ok(MilestoneRegistry::from_parts(
            legacy,
            self.load::<Vec<IntervalMilestone>>(StoreKey::IntervalMilestones)?,
            self.load::<Vec<CustomMilestone>>(StoreKey::CustomMilestones)?,
            self.load::<BTreeMap<String, String>>(StoreKey::LegacyNotes)?,
        ))
    }

    pub fn save_milestones(&self, registry: &MilestoneRegistry) -> Result<(), CoreError> {
        self.save(StoreKey::IntervalMilestones, registry.interval())?;
        self.save(StoreKey::CustomMilestones, registry.custom())?;
        self.save(StoreKey::LegacyNotes, registry.legacy_notes())
    }

    pub fn load_imported(&self) -> Result<Vec<PracticeSession>, DatabaseError> {
        self.load(StoreKey::ImportedSessions)
    }

    /// Cache the committed import batch with the time it was taken.
    pub fn save_imported(&self, sessions: &[PracticeSession], at: DateTime<Utc>) -> Result<(), CoreError> {
        self.save(StoreKey::ImportedSessions, sessions)?;
        self.save(StoreKey::LastImportAt, &at)
    }

    pub fn last_import_at(&self) -> Result<Option<DateTime<Utc>>, DatabaseError> {
        self.load(StoreKey::LastImportAt)
    }

    pub fn baseline_override(&self) -> Result<Option<Baseline>, DatabaseError> {
        self.load(StoreKey::BaselineOverride)
    }

    pub fn set_baseline_override(&self, baseline: Option<&Baseline>) -> Result<(), CoreError> {
        match baseline {
            Some(b) => self.save(StoreKey::BaselineOverride, b),
            None => {
                self.clear(StoreKey::BaselineOverride)?;
                Ok(())
            }
        }
    }

    pub fn load_rep_counter(&self) -> Result<RepCounter, DatabaseError> {
        self.load(StoreKey::RepCounter)
    }

    pub fn save_rep_counter(&self, reps: &RepCounter) -> Result<(), CoreError> {
        self.save(StoreKey::RepCounter, reps)
    }
}
