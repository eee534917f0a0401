//! Repertoire: the ordered list of practice pieces and section dividers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Label of a divider created without text.
pub const SOLID_DIVIDER: &str = "-----------------";

/// Practice status of a piece. `Attention` pieces form the red list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceStatus {
    #[default]
    Normal,
    Attention,
    Mastered,
}

impl PieceStatus {
    /// Next status in the Normal -> Attention -> Mastered cycle.
    pub fn next(self) -> Self {
        match self {
            PieceStatus::Normal => PieceStatus::Attention,
            PieceStatus::Attention => PieceStatus::Mastered,
            PieceStatus::Mastered => PieceStatus::Normal,
        }
    }
}

impl std::str::FromStr for PieceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(PieceStatus::Normal),
            "attention" | "red" => Ok(PieceStatus::Attention),
            "mastered" => Ok(PieceStatus::Mastered),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

/// A playable repertoire piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub composer: String,
    #[serde(default)]
    pub status: PieceStatus,
    #[serde(default)]
    pub play_count: u32,
    #[serde(default)]
    pub last_played_at: Option<DateTime<Utc>>,
    pub start_date: NaiveDate,
}

impl Piece {
    pub fn new(title: impl Into<String>, composer: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            composer: composer.into(),
            status: PieceStatus::Normal,
            play_count: 0,
            last_played_at: None,
            start_date,
        }
    }

    pub fn with_status(mut self, status: PieceStatus) -> Self {
        self.status = status;
        self
    }

    pub(crate) fn record_play(&mut self, at: DateTime<Utc>) {
        self.play_count += 1;
        self.last_played_at = Some(at);
    }

    pub(crate) fn undo_play(&mut self) {
        self.play_count = self.play_count.saturating_sub(1);
    }
}

/// Non-playable ordering marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divider {
    pub id: String,
    pub label: String,
}

impl Divider {
    /// Divider for `text`: `--- text ---`, or a solid rule when blank.
    pub fn new(text: &str) -> Self {
        let text = text.trim();
        let label = if text.is_empty() {
            SOLID_DIVIDER.to_string()
        } else {
            format!("--- {text} ---")
        };
        Self {
            id: Uuid::new_v4().to_string(),
            label,
        }
    }
}

/// Entry of the repertoire list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepertoireItem {
    Piece(Piece),
    Divider(Divider),
}

impl RepertoireItem {
    pub fn id(&self) -> &str {
        match self {
            RepertoireItem::Piece(p) => &p.id,
            RepertoireItem::Divider(d) => &d.id,
        }
    }

    pub fn as_piece(&self) -> Option<&Piece> {
        match self {
            RepertoireItem::Piece(p) => Some(p),
            RepertoireItem::Divider(_) => None,
        }
    }
}

/// Where a new item goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InsertPosition {
    #[default]
    End,
    /// Right after the item with this id; falls back to the end when the id
    /// is unknown.
    After(String),
}

/// Ordered repertoire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Repertoire {
    items: Vec<RepertoireItem>,
}

impl Repertoire {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<RepertoireItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[RepertoireItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.items.iter().filter_map(RepertoireItem::as_piece)
    }

    pub fn piece(&self, id: &str) -> Option<&Piece> {
        self.pieces().find(|p| p.id == id)
    }

    pub(crate) fn piece_mut(&mut self, id: &str) -> Option<&mut Piece> {
        self.items.iter_mut().find_map(|item| match item {
            RepertoireItem::Piece(p) if p.id == id => Some(p),
            _ => None,
        })
    }

    fn insert(&mut self, item: RepertoireItem, position: &InsertPosition) {
        let index = match position {
            InsertPosition::End => None,
            InsertPosition::After(id) => self.items.iter().position(|i| i.id() == id),
        };
        match index {
            Some(i) => self.items.insert(i + 1, item),
            None => self.items.push(item),
        }
    }

    /// Add a piece, returning its id. The title is required.
    pub fn add_piece(&mut self, piece: Piece, position: &InsertPosition) -> Result<String, ValidationError> {
        if piece.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        let id = piece.id.clone();
        self.insert(RepertoireItem::Piece(piece), position);
        Ok(id)
    }

    /// Add a divider, returning its id.
    pub fn add_divider(&mut self, text: &str, position: &InsertPosition) -> String {
        let divider = Divider::new(text);
        let id = divider.id.clone();
        self.insert(RepertoireItem::Divider(divider), position);
        id
    }

    pub fn delete(&mut self, id: &str) -> Result<RepertoireItem, ValidationError> {
        let index = self
            .items
            .iter()
            .position(|i| i.id() == id)
            .ok_or_else(|| ValidationError::NotFound {
                kind: "repertoire item",
                id: id.to_string(),
            })?;
        Ok(self.items.remove(index))
    }

    /// Advance a piece's status and return the new one.
    pub fn cycle_status(&mut self, id: &str) -> Result<PieceStatus, ValidationError> {
        let piece = self.piece_mut(id).ok_or_else(|| ValidationError::NotFound {
            kind: "piece",
            id: id.to_string(),
        })?;
        piece.status = piece.status.next();
        Ok(piece.status)
    }

    /// Number of pieces on the red list.
    pub fn red_count(&self) -> usize {
        self.pieces()
            .filter(|p| p.status == PieceStatus::Attention)
            .count()
    }

    /// Pieces by play count, most played first; ties keep list order.
    pub fn leaderboard(&self) -> Vec<&Piece> {
        let mut pieces: Vec<&Piece> = self.pieces().collect();
        pieces.sort_by(|a, b| b.play_count.cmp(&a.play_count));
        pieces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    fn titles(rep: &Repertoire) -> Vec<String> {
        rep.items()
            .iter()
            .map(|i| match i {
                RepertoireItem::Piece(p) => p.title.clone(),
                RepertoireItem::Divider(d) => d.label.clone(),
            })
            .collect()
    }

    #[test]
    fn status_cycles_through_all_three() {
        assert_eq!(PieceStatus::Normal.next(), PieceStatus::Attention);
        assert_eq!(PieceStatus::Attention.next(), PieceStatus::Mastered);
        assert_eq!(PieceStatus::Mastered.next(), PieceStatus::Normal);
    }

    #[test]
    fn divider_labels() {
        assert_eq!(Divider::new("").label, SOLID_DIVIDER);
        assert_eq!(Divider::new("   ").label, SOLID_DIVIDER);
        assert_eq!(Divider::new("Baroque").label, "--- Baroque ---");
    }

    #[test]
    fn insert_after_and_fallback_to_end() {
        let mut rep = Repertoire::new();
        let a = rep
            .add_piece(Piece::new("Prelude", "Bach", start()), &InsertPosition::End)
            .unwrap();
        rep.add_piece(Piece::new("Etude", "Chopin", start()), &InsertPosition::End)
            .unwrap();
        rep.add_divider("Romantic", &InsertPosition::After(a));
        rep.add_divider("", &InsertPosition::After("missing".into()));

        assert_eq!(
            titles(&rep),
            vec!["Prelude", "--- Romantic ---", "Etude", SOLID_DIVIDER]
        );
    }

    #[test]
    fn title_is_required() {
        let mut rep = Repertoire::new();
        let err = rep
            .add_piece(Piece::new(" ", "", start()), &InsertPosition::End)
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("title"));
        assert!(rep.is_empty());
    }

    #[test]
    fn cycle_status_and_red_count() {
        let mut rep = Repertoire::new();
        let id = rep
            .add_piece(Piece::new("Sonata", "Mozart", start()), &InsertPosition::End)
            .unwrap();
        let divider = rep.add_divider("", &InsertPosition::End);

        assert_eq!(rep.red_count(), 0);
        assert_eq!(rep.cycle_status(&id), Ok(PieceStatus::Attention));
        assert_eq!(rep.red_count(), 1);
        assert!(rep.cycle_status(&divider).is_err());
    }

    #[test]
    fn delete_removes_item() {
        let mut rep = Repertoire::new();
        let id = rep.add_divider("x", &InsertPosition::End);
        assert!(rep.delete(&id).is_ok());
        assert!(matches!(
            rep.delete(&id),
            Err(ValidationError::NotFound { .. })
        ));
    }

    #[test]
    fn leaderboard_orders_by_play_count() {
        let mut rep = Repertoire::new();
        let mut a = Piece::new("A", "", start());
        a.play_count = 2;
        let mut b = Piece::new("B", "", start());
        b.play_count = 7;
        let c = Piece::new("C", "", start());
        rep.add_piece(a, &InsertPosition::End).unwrap();
        rep.add_divider("", &InsertPosition::End);
        rep.add_piece(b, &InsertPosition::End).unwrap();
        rep.add_piece(c, &InsertPosition::End).unwrap();

        let order: Vec<&str> = rep.leaderboard().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "C"]);
    }

    #[test]
    fn items_serialize_with_type_tag() {
        let mut rep = Repertoire::new();
        rep.add_divider("", &InsertPosition::End);
        let json = serde_json::to_value(&rep).unwrap();
        assert_eq!(json[0]["type"], "divider");
        let back: Repertoire = serde_json::from_value(json).unwrap();
        assert_eq!(back, rep);
    }
}
