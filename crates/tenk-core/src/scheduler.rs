//! Next-piece selection.
//!
//! Each eligible piece scores `recency * jitter`, where recency is the time
//! since its last play and jitter is drawn per candidate per call from
//! `[jitter_min, jitter_max)`. The highest score wins. Pieces never played
//! count as played a very long time ago, so they win over anything played,
//! and the jitter decides among them.
//!
//! [`score`] and [`argmax`] are pure; randomness comes from the injected
//! generator, seedable for reproducible draws.

use chrono::{DateTime, Utc};
use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SchedulerError};
use crate::practice::PracticeState;
use crate::repertoire::{Piece, PieceStatus};

/// Recency in seconds assigned to a piece that was never played.
pub const NEVER_PLAYED_RECENCY_SECS: f64 = 1.0e12;

/// Which pieces may be drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Every piece that is not mastered.
    #[default]
    Normal,
    /// Only pieces flagged for attention.
    RedListOnly,
}

impl std::fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionMode::Normal => write!(f, "normal mode"),
            SelectionMode::RedListOnly => write!(f, "red-list mode"),
        }
    }
}

/// Whether `piece` is in the pool for `mode`.
pub fn is_eligible(piece: &Piece, mode: SelectionMode) -> bool {
    match mode {
        SelectionMode::Normal => piece.status != PieceStatus::Mastered,
        SelectionMode::RedListOnly => piece.status == PieceStatus::Attention,
    }
}

/// Seconds since the piece was last played.
pub fn recency_secs(piece: &Piece, now: DateTime<Utc>) -> f64 {
    match piece.last_played_at {
        Some(at) => (now - at).num_milliseconds().max(0) as f64 / 1000.0,
        None => NEVER_PLAYED_RECENCY_SECS,
    }
}

pub fn score(recency_secs: f64, jitter: f64) -> f64 {
    recency_secs * jitter
}

/// Index of the highest score; the first one wins a tie.
pub fn argmax(scores: &[f64]) -> Option<usize> {
    scores
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &s)| match best {
            Some((_, b)) if b >= s => best,
            _ => Some((i, s)),
        })
        .map(|(i, _)| i)
}

/// Randomized recency-weighted picker.
#[derive(Debug, Clone)]
pub struct PracticeScheduler<R = Mcg128Xsl64> {
    rng: R,
    jitter_min: f64,
    jitter_max: f64,
}

impl PracticeScheduler<Mcg128Xsl64> {
    /// Scheduler with a seeded generator, or one seeded from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self::with_rng(rng)
    }
}

impl<R: Rng> PracticeScheduler<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            jitter_min: 0.5,
            jitter_max: 1.5,
        }
    }

    pub fn with_jitter(mut self, min: f64, max: f64) -> Self {
        self.jitter_min = min;
        self.jitter_max = max;
        self
    }

    fn jitter(&mut self) -> f64 {
        if self.jitter_max > self.jitter_min {
            self.rng.gen_range(self.jitter_min..self.jitter_max)
        } else {
            self.jitter_min
        }
    }

    /// Draw the next piece from `pieces` without touching any state.
    pub fn choose<'a, I>(&mut self, pieces: I, mode: SelectionMode, now: DateTime<Utc>) -> Result<&'a Piece, SchedulerError>
    where
        I: IntoIterator<Item = &'a Piece>,
    {
        let pool: Vec<&Piece> = pieces.into_iter().filter(|p| is_eligible(p, mode)).collect();
        let scores: Vec<f64> = pool
            .iter()
            .map(|p| {
                let jitter = self.jitter();
                score(recency_secs(p, now), jitter)
            })
            .collect();
        argmax(&scores)
            .map(|i| pool[i])
            .ok_or(SchedulerError::EmptyPool { mode })
    }

    /// Pick the next piece and record the play. An empty pool leaves the
    /// state untouched.
    pub fn pick_next(&mut self, state: &mut PracticeState, mode: SelectionMode, now: DateTime<Utc>) -> Result<Piece> {
        let id = self.choose(state.repertoire.pieces(), mode, now)?.id.clone();
        let piece = state.record_play(&id, now)?;
        info!(piece = %piece.title, plays = piece.play_count, %mode, "picked next piece");
        Ok(piece)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::repertoire::{InsertPosition, Repertoire};
    use chrono::{Duration, NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 20, 12, 0, 0).unwrap()
    }

    fn piece(title: &str, status: PieceStatus, last: Option<DateTime<Utc>>) -> Piece {
        let mut p = Piece::new(title, "", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()).with_status(status);
        p.last_played_at = last;
        p
    }

    #[test]
    fn argmax_prefers_first_of_equals() {
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), Some(1));
    }

    #[test]
    fn eligibility_by_mode() {
        let normal = piece("n", PieceStatus::Normal, None);
        let red = piece("r", PieceStatus::Attention, None);
        let done = piece("m", PieceStatus::Mastered, None);
        assert!(is_eligible(&normal, SelectionMode::Normal));
        assert!(is_eligible(&red, SelectionMode::Normal));
        assert!(!is_eligible(&done, SelectionMode::Normal));
        assert!(!is_eligible(&normal, SelectionMode::RedListOnly));
        assert!(is_eligible(&red, SelectionMode::RedListOnly));
    }

    #[test]
    fn older_play_outscores_recent_play_despite_jitter() {
        let recent = piece("recent", PieceStatus::Normal, Some(now() - Duration::hours(1)));
        let stale = piece("stale", PieceStatus::Normal, Some(now() - Duration::days(30)));
        let mut scheduler = PracticeScheduler::new(Some(7));
        for _ in 0..50 {
            let chosen = scheduler
                .choose([&recent, &stale], SelectionMode::Normal, now())
                .unwrap();
            assert_eq!(chosen.title, "stale");
        }
    }

    #[test]
    fn same_seed_same_draws() {
        let pieces: Vec<Piece> = (0..5)
            .map(|i| piece(&format!("p{i}"), PieceStatus::Normal, None))
            .collect();
        let draw = |seed| {
            let mut s = PracticeScheduler::new(Some(seed));
            (0..10)
                .map(|_| s.choose(&pieces, SelectionMode::Normal, now()).unwrap().title.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(42), draw(42));
    }

    #[test]
    fn choose_borrows_the_winning_piece_unchanged() {
        let pieces = vec![
            piece("fresh", PieceStatus::Normal, None),
            piece("mastered", PieceStatus::Mastered, None),
        ];
        let chosen = PracticeScheduler::new(Some(3))
            .choose(&pieces, SelectionMode::Normal, now())
            .unwrap();
        assert!(std::ptr::eq(chosen, &pieces[0]));
        assert_eq!(chosen.play_count, 0);
        assert_eq!(chosen.last_played_at, None);
    }

    #[test]
    fn pick_next_records_the_play() {
        let mut rep = Repertoire::new();
        let id = rep
            .add_piece(piece("only", PieceStatus::Attention, None), &InsertPosition::End)
            .unwrap();
        rep.add_divider("", &InsertPosition::End);
        let mut state = PracticeState::new(rep);

        let picked = PracticeScheduler::new(Some(1))
            .pick_next(&mut state, SelectionMode::RedListOnly, now())
            .unwrap();
        assert_eq!(picked.id, id);
        assert_eq!(picked.play_count, 1);
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.plays_today(now().date_naive()), 1);
    }

    #[test]
    fn empty_pool_leaves_state_alone() {
        let mut rep = Repertoire::new();
        rep.add_piece(piece("done", PieceStatus::Mastered, None), &InsertPosition::End)
            .unwrap();
        let mut state = PracticeState::new(rep);
        let before = state.clone();

        let err = PracticeScheduler::new(Some(1))
            .pick_next(&mut state, SelectionMode::Normal, now())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Scheduler(SchedulerError::EmptyPool { mode: SelectionMode::Normal })
        ));
        assert_eq!(state, before);
    }
}
