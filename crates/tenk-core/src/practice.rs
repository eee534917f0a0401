//! Repertoire, history and day counter kept consistent with each other.
//!
//! Play counts only move through [`PracticeState::record_play`] and
//! [`PracticeState::delete_history_entry`], so every history entry accounts
//! for exactly one increment on its piece.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;
use crate::history::{DayCounter, HistoryEntry, PracticeHistory};
use crate::repertoire::{Piece, Repertoire};

/// Mutable practice state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PracticeState {
    pub repertoire: Repertoire,
    pub history: PracticeHistory,
    pub day_counter: DayCounter,
}

impl PracticeState {
    pub fn new(repertoire: Repertoire) -> Self {
        Self {
            repertoire,
            ..Self::default()
        }
    }

    /// Record a play of `piece_id` at `now`: bumps the play count, stamps the
    /// last-played time, appends a history entry and counts toward today.
    pub fn record_play(&mut self, piece_id: &str, now: DateTime<Utc>) -> Result<Piece, ValidationError> {
        let piece = self
            .repertoire
            .piece_mut(piece_id)
            .ok_or_else(|| ValidationError::NotFound {
                kind: "piece",
                id: piece_id.to_string(),
            })?;
        piece.record_play(now);
        let piece = piece.clone();

        self.history
            .push(HistoryEntry::new(&piece.id, &piece.title, now));
        self.day_counter.increment(now.date_naive());
        Ok(piece)
    }

    /// Delete a history entry, reversing its play-count increment. The day
    /// counter only drops when the entry was recorded `today`.
    pub fn delete_history_entry(&mut self, entry_id: &str, today: NaiveDate) -> Result<HistoryEntry, ValidationError> {
        let entry = self.history.remove(entry_id)?;
        match self.repertoire.piece_mut(&entry.piece_id) {
            Some(piece) => piece.undo_play(),
            None => debug!(piece_id = %entry.piece_id, "history entry for a removed piece"),
        }
        self.day_counter.decrement(entry.day(), today);
        Ok(entry)
    }

    pub fn plays_today(&self, today: NaiveDate) -> u32 {
        self.day_counter.count_on(today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repertoire::InsertPosition;
    use chrono::{Duration, TimeZone};

    fn state_with_piece() -> (PracticeState, String) {
        let mut rep = Repertoire::new();
        let id = rep
            .add_piece(
                Piece::new("Nocturne", "Chopin", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
                &InsertPosition::End,
            )
            .unwrap();
        (PracticeState::new(rep), id)
    }

    #[test]
    fn play_then_delete_restores_counts() {
        let (mut state, id) = state_with_piece();
        let now = Utc.with_ymd_and_hms(2026, 1, 20, 18, 0, 0).unwrap();

        let piece = state.record_play(&id, now).unwrap();
        assert_eq!(piece.play_count, 1);
        assert_eq!(piece.last_played_at, Some(now));
        assert_eq!(state.plays_today(now.date_naive()), 1);

        let entry_id = state.history.entries()[0].id.clone();
        state
            .delete_history_entry(&entry_id, now.date_naive())
            .unwrap();
        assert_eq!(state.repertoire.piece(&id).unwrap().play_count, 0);
        assert_eq!(state.plays_today(now.date_naive()), 0);
        assert!(state.history.is_empty());
    }

    #[test]
    fn deleting_an_old_entry_keeps_todays_counter() {
        let (mut state, id) = state_with_piece();
        let yesterday = Utc.with_ymd_and_hms(2026, 1, 19, 18, 0, 0).unwrap();
        let today = yesterday + Duration::days(1);

        state.record_play(&id, yesterday).unwrap();
        state.record_play(&id, today).unwrap();
        let old = state.history.entries()[1].id.clone();

        state.delete_history_entry(&old, today.date_naive()).unwrap();
        assert_eq!(state.plays_today(today.date_naive()), 1);
        assert_eq!(state.repertoire.piece(&id).unwrap().play_count, 1);
    }

    #[test]
    fn unknown_piece_is_rejected() {
        let (mut state, _) = state_with_piece();
        let now = Utc.with_ymd_and_hms(2026, 1, 20, 18, 0, 0).unwrap();
        assert!(state.record_play("missing", now).is_err());
        assert!(state.history.is_empty());
    }
}
