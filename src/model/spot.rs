use std::fmt::{Display, Formatter};

use crate::common::PlayerId;

/// A single grid cell: its card label (if any), whether it is face-up, and
/// who -- if anyone -- currently holds it.
///
/// Invariants I4/I5 (see the crate's design notes) are maintained by every
/// mutator on this type, not just asserted after the fact: there is no way
/// to reach a `Spot` with `holder.is_some()` and `face_up == false`, or with
/// `card.is_none()` and `face_up == true`, through the methods below.
#[derive(Clone, Debug, Default)]
pub struct Spot {
    card: Option<String>,
    face_up: bool,
    holder: Option<PlayerId>,
}

impl Spot {
    /// A fresh spot as it exists immediately after construction: face-down,
    /// unheld, with the supplied label. An empty label is "no card" (I5)
    /// from the outset.
    pub fn new(label: String) -> Self {
        let card = if label.is_empty() { None } else { Some(label) };
        Spot {
            card,
            face_up: false,
            holder: None,
        }
    }

    pub fn card(&self) -> Option<&str> {
        self.card.as_deref()
    }

    pub fn is_face_up(&self) -> bool {
        self.face_up
    }

    pub fn holder(&self) -> Option<&PlayerId> {
        self.holder.as_ref()
    }

    pub fn is_removed(&self) -> bool {
        self.card.is_none()
    }

    pub fn is_held(&self) -> bool {
        self.holder.is_some()
    }

    pub fn is_held_by(&self, player: &PlayerId) -> bool {
        self.holder.as_ref() == Some(player)
    }

    /// Flips this spot face-up and assigns `holder`. Returns whether this
    /// was a visible change (it was previously face-down), since the
    /// watcher notification policy in `map`/`flip` keys off that.
    pub fn acquire(&mut self, holder: PlayerId) -> bool {
        debug_assert!(!self.is_removed(), "acquiring a removed spot");
        let was_face_up = self.face_up;
        self.face_up = true;
        self.holder = Some(holder);
        !was_face_up
    }

    /// Flips this spot face-up without assigning a holder (the second flip
    /// of a miss leaves the cell unheld). Returns whether this was a
    /// visible change.
    pub fn reveal(&mut self) -> bool {
        debug_assert!(!self.is_removed(), "revealing a removed spot");
        let was_face_up = self.face_up;
        self.face_up = true;
        !was_face_up
    }

    pub fn release(&mut self) {
        self.holder = None;
    }

    /// Turns a face-up, unheld spot back face-down. No-op (and reports no
    /// change) if already face-down or still held -- callers must not
    /// disturb a spot another player has since acquired.
    pub fn turn_face_down_if_unheld(&mut self) -> bool {
        if self.face_up && self.holder.is_none() {
            self.face_up = false;
            true
        } else {
            false
        }
    }

    /// Removes the card permanently. Terminal: a removed spot is never
    /// replenished.
    pub fn remove(&mut self) {
        self.card = None;
        self.face_up = false;
        self.holder = None;
    }

    pub fn relabel(&mut self, new_label: String) {
        if let Some(card) = self.card.as_mut() {
            *card = new_label;
        }
    }

    /// The rendered line for this spot as seen by `viewer`, per the board
    /// renderer format (no trailing newline).
    pub fn render_line(&self, viewer: &PlayerId) -> String {
        CellView::of(self, viewer).to_string()
    }
}

enum CellView<'a> {
    None,
    Down,
    Mine(&'a str),
    Up(&'a str),
}

impl<'a> CellView<'a> {
    fn of(spot: &'a Spot, viewer: &PlayerId) -> Self {
        match (&spot.card, spot.face_up) {
            (None, _) => CellView::None,
            (Some(_), false) => CellView::Down,
            (Some(card), true) => {
                if spot.holder.as_ref() == Some(viewer) {
                    CellView::Mine(card)
                } else {
                    CellView::Up(card)
                }
            }
        }
    }
}

impl<'a> Display for CellView<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CellView::None => write!(f, "none"),
            CellView::Down => write!(f, "down"),
            CellView::Mine(card) => write!(f, "my {card}"),
            CellView::Up(card) => write!(f, "up {card}"),
        }
    }
}
