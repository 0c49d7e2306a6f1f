use crate::common::Coordinate;

/// The four states a player's turn cycles through. See the crate's design
/// notes for the full state machine; this type only names the states.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TurnState {
    /// S0: no card flipped yet this turn.
    Idle,
    /// S1: one card flipped, held by this player, awaiting the second flip.
    FirstHeld,
    /// S2-match: both cards flipped and matched; both still held.
    PairMatched,
    /// S2-miss: both cards flipped and did not match; both face-up, unheld.
    PairMissed,
}

/// Per-player turn state: which spots it has flipped this turn, and whether
/// they matched.
#[derive(Clone, Debug, Default)]
pub struct PlayerTurn {
    pub first: Option<Coordinate>,
    pub second: Option<Coordinate>,
    pub matched: bool,
}

impl PlayerTurn {
    pub fn state(&self) -> TurnState {
        match (self.first, self.second) {
            (None, _) => TurnState::Idle,
            (Some(_), None) => TurnState::FirstHeld,
            (Some(_), Some(_)) if self.matched => TurnState::PairMatched,
            (Some(_), Some(_)) => TurnState::PairMissed,
        }
    }

    pub fn reset(&mut self) {
        *self = PlayerTurn::default();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn fresh_turn_is_idle() {
        assert_eq!(PlayerTurn::default().state(), TurnState::Idle);
    }

    #[test]
    fn first_only_is_first_held() {
        let turn = PlayerTurn {
            first: Some(Coordinate::new(0, 0)),
            second: None,
            matched: false,
        };
        assert_eq!(turn.state(), TurnState::FirstHeld);
    }

    #[test]
    fn both_set_and_matched_is_pair_matched() {
        let turn = PlayerTurn {
            first: Some(Coordinate::new(0, 0)),
            second: Some(Coordinate::new(0, 1)),
            matched: true,
        };
        assert_eq!(turn.state(), TurnState::PairMatched);
    }

    #[test]
    fn both_set_and_not_matched_is_pair_missed() {
        let turn = PlayerTurn {
            first: Some(Coordinate::new(0, 0)),
            second: Some(Coordinate::new(0, 1)),
            matched: false,
        };
        assert_eq!(turn.state(), TurnState::PairMissed);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut turn = PlayerTurn {
            first: Some(Coordinate::new(0, 0)),
            second: Some(Coordinate::new(0, 1)),
            matched: true,
        };
        turn.reset();
        assert_eq!(turn.state(), TurnState::Idle);
    }
}
