use std::future::Future;

use futures::future::try_join_all;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use tokio::sync::Mutex;

use crate::common::{Coordinate, PlayerId};
use crate::model::{BoardParseError, FlipError, MapError, PlayerTurn, Spot, TurnState};

use super::wait_queue::WaitQueues;
use super::watch_set::WatchSet;

/// The shared game-state core.
///
/// All mutable state -- the grid, every player's turn, every cell's wait
/// queue, and the watcher set -- lives behind a single [`tokio::sync::Mutex`]
/// (the "Board mutex"). Every public method acquires it for the span of its
/// own critical section and releases it before suspending (on a wait queue,
/// on the watch set, or while awaiting a caller-supplied relabel function),
/// so a blocked caller never holds the lock other callers need to make
/// progress.
pub struct Board {
    rows: usize,
    columns: usize,
    inner: Mutex<Inner>,
}

struct Inner {
    spots: Vec<Spot>,
    turns: FxHashMap<PlayerId, PlayerTurn>,
    wait_queues: WaitQueues,
    watchers: WatchSet,
}

impl Board {
    /// Builds a board from `rows x columns` labels in row-major order.
    /// Fails if the label count does not match the product (§4.5).
    pub fn new(rows: usize, columns: usize, labels: Vec<String>) -> Result<Self, BoardParseError> {
        let expected = rows.saturating_mul(columns);
        if labels.len() != expected {
            return Err(BoardParseError::LabelCountMismatch {
                expected,
                found: labels.len(),
            });
        }
        let spots = labels.into_iter().map(Spot::new).collect();
        log::info!("board constructed: {rows}x{columns}");
        Ok(Board {
            rows,
            columns,
            inner: Mutex::new(Inner {
                spots,
                turns: FxHashMap::default(),
                wait_queues: WaitQueues::new(),
                watchers: WatchSet::new(),
            }),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Returns the rendered view of the board for `player`, registering
    /// `player` if unknown. Never mutates the grid and never suspends.
    pub async fn look(&self, player: &PlayerId) -> String {
        let mut inner = self.inner.lock().await;
        register(&mut inner, player);
        #[cfg(debug_assertions)]
        self.check_invariants(&inner);
        self.render(&inner.spots, player)
    }

    /// Flips the cell at `coord` for `player`, per the turn state machine
    /// in §4.1.1. Returns the rendered board on success.
    pub async fn flip(&self, player: &PlayerId, coord: Coordinate) -> Result<String, FlipError> {
        let is_first = {
            let mut inner = self.inner.lock().await;
            register(&mut inner, player);
            if !coord.in_bounds(self.rows, self.columns) {
                return Err(FlipError::OutOfRange {
                    coordinate: coord,
                    rows: self.rows,
                    columns: self.columns,
                });
            }
            self.complete_previous_turn(&mut inner, player);
            matches!(inner.turns[player].state(), TurnState::Idle)
        };

        if is_first {
            self.first_flip(player, coord).await?;
        } else {
            let mut inner = self.inner.lock().await;
            self.second_flip(&mut inner, player, coord)?;
        }

        let inner = self.inner.lock().await;
        #[cfg(debug_assertions)]
        self.check_invariants(&inner);
        Ok(self.render(&inner.spots, player))
    }

    /// Registers `player` as a one-shot watcher and suspends until the next
    /// observable board change, then returns the rendered board.
    pub async fn watch(&self, player: &PlayerId) -> String {
        let rx = {
            let mut inner = self.inner.lock().await;
            register(&mut inner, player);
            log::debug!("{player} started watching");
            inner.watchers.register()
        };
        let _ = rx.await;
        let inner = self.inner.lock().await;
        #[cfg(debug_assertions)]
        self.check_invariants(&inner);
        self.render(&inner.spots, player)
    }

    /// Atomically relabels every distinct card currently on the grid by
    /// invoking `f` once per distinct label, per §4.3.
    pub async fn map<F, Fut, E>(&self, player: &PlayerId, f: F) -> Result<String, MapError<E>>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<String, E>>,
        E: std::error::Error + 'static,
    {
        let labels: Vec<String> = {
            let mut inner = self.inner.lock().await;
            register(&mut inner, player);
            inner
                .spots
                .iter()
                .filter_map(|spot| spot.card())
                .unique()
                .map(str::to_owned)
                .collect()
        };

        let replacements: Vec<(String, String)> = try_join_all(labels.into_iter().map(|label| {
            let f = &f;
            async move {
                let replacement = f(label.clone())
                    .await
                    .map_err(|source| MapError { label: label.clone(), source })?;
                Ok::<_, MapError<E>>((label, replacement))
            }
        }))
        .await?;

        let replacements: FxHashMap<String, String> = replacements.into_iter().collect();

        {
            let mut inner = self.inner.lock().await;
            let mut changed = false;
            for spot in &mut inner.spots {
                if let Some(current) = spot.card() {
                    if let Some(new_label) = replacements.get(current) {
                        if new_label != current {
                            spot.relabel(new_label.clone());
                            changed = true;
                        }
                    }
                }
            }
            if changed {
                inner.watchers.notify_all();
            }
        }

        let inner = self.inner.lock().await;
        #[cfg(debug_assertions)]
        self.check_invariants(&inner);
        Ok(self.render(&inner.spots, player))
    }

    fn index(&self, coord: Coordinate) -> usize {
        coord.flat_index(self.columns)
    }

    /// Step 1 of §4.1.1: finalize whatever turn state the player was left
    /// in by a previous `flip` call, before this call decides whether it is
    /// a first or second flip.
    ///
    /// The S1 ("first-held") branch is deliberately a defensive no-op in
    /// the reachable state space: the ordinary continuation of a turn (this
    /// player's second flip) also enters with the player in S1, and that is
    /// not something to "complete" -- it is exactly the state the upcoming
    /// second flip needs. Only S2-match and S2-miss represent a turn that
    /// has actually concluded and needs cleanup before a fresh first flip.
    fn complete_previous_turn(&self, inner: &mut Inner, player: &PlayerId) {
        let state = inner.turns[player].state();
        match state {
            TurnState::Idle | TurnState::FirstHeld => {}
            TurnState::PairMatched => {
                let turn = inner.turns.get(player).unwrap().clone();
                let first = turn.first.unwrap();
                let second = turn.second.unwrap();
                for coord in [first, second] {
                    inner.spots[self.index(coord)].remove();
                }
                inner.watchers.notify_all();
                inner.wait_queues.wake_next(first);
                inner.wait_queues.wake_next(second);
                inner.turns.get_mut(player).unwrap().reset();
            }
            TurnState::PairMissed => {
                let turn = inner.turns.get(player).unwrap().clone();
                let first = turn.first.unwrap();
                let second = turn.second.unwrap();
                let mut changed = false;
                for coord in [first, second] {
                    if inner.spots[self.index(coord)].turn_face_down_if_unheld() {
                        changed = true;
                    }
                }
                if changed {
                    inner.watchers.notify_all();
                }
                inner.turns.get_mut(player).unwrap().reset();
            }
        }
    }

    /// Handles a FIRST flip (§4.1.1 step 3), including suspension on a held
    /// target and the single re-check on wake.
    async fn first_flip(&self, player: &PlayerId, coord: Coordinate) -> Result<(), FlipError> {
        let rx = {
            let mut inner = self.inner.lock().await;
            match self.try_acquire_first(&mut inner, player, coord)? {
                Some(()) => return Ok(()),
                None => {
                    log::debug!("{player} suspends waiting for {coord}");
                    inner.wait_queues.enqueue(coord)
                }
            }
        };

        let _ = rx.await;
        log::debug!("{player} woken for {coord}");

        let mut inner = self.inner.lock().await;
        let spot = &inner.spots[self.index(coord)];
        if spot.is_removed() {
            // Removal is terminal (§3 Lifecycle): no future release will ever
            // wake this coordinate's queue again, so this discovery must
            // cascade to the next waiter itself rather than stopping here.
            inner.wait_queues.wake_next(coord);
            return Err(FlipError::NoCard(coord));
        }
        if spot.is_held() {
            return Err(FlipError::StillHeld(coord));
        }
        self.try_acquire_first(&mut inner, player, coord)?
            .expect("just confirmed the spot is unheld and has a card");
        Ok(())
    }

    /// Attempts the non-suspending part of a first flip: fails outright on
    /// a removed cell, returns `Ok(None)` if the cell is held by someone
    /// else (caller must enqueue), or acquires the cell and returns
    /// `Ok(Some(()))`.
    fn try_acquire_first(
        &self,
        inner: &mut Inner,
        player: &PlayerId,
        coord: Coordinate,
    ) -> Result<Option<()>, FlipError> {
        let spot = &inner.spots[self.index(coord)];
        if spot.is_removed() {
            return Err(FlipError::NoCard(coord));
        }
        if spot.is_held() {
            return Ok(None);
        }

        let changed = inner.spots[self.index(coord)].acquire(player.clone());
        inner.turns.entry(player.clone()).or_default().first = Some(coord);
        if changed {
            inner.watchers.notify_all();
        }
        inner.wait_queues.wake_next(coord);
        Ok(Some(()))
    }

    /// Handles a SECOND flip (§4.1.1 step 4). Never suspends.
    fn second_flip(
        &self,
        inner: &mut Inner,
        player: &PlayerId,
        coord: Coordinate,
    ) -> Result<(), FlipError> {
        let target_idx = self.index(coord);
        let target_blocked = inner.spots[target_idx].is_removed() || inner.spots[target_idx].is_held();

        if target_blocked {
            let err = if inner.spots[target_idx].is_removed() {
                FlipError::NoCard(coord)
            } else {
                FlipError::Held(coord)
            };
            self.release_first_and_reset(inner, player);
            return Err(err);
        }

        let was_face_up = inner.spots[target_idx].is_face_up();
        let first = inner.turns[player].first.expect("second flip requires a held first");
        let first_idx = self.index(first);
        let matched = inner.spots[first_idx].card() == inner.spots[target_idx].card();

        // A match always changes the target's holder, which is a visible
        // change even when the target was already face-up (left that way
        // by a prior miss) -- see the watcher's note on this in §4.4. A
        // miss only notifies if the target actually flips face-up now.
        let notify = if matched {
            inner.spots[target_idx].acquire(player.clone());
            true
        } else {
            let became_face_up = !was_face_up && inner.spots[target_idx].reveal();
            inner.spots[first_idx].release();
            inner.wait_queues.wake_next(first);
            became_face_up
        };
        if notify {
            inner.watchers.notify_all();
        }

        let turn = inner.turns.get_mut(player).unwrap();
        turn.second = Some(coord);
        turn.matched = matched;
        Ok(())
    }

    fn release_first_and_reset(&self, inner: &mut Inner, player: &PlayerId) {
        if let Some(first) = inner.turns[player].first {
            inner.spots[self.index(first)].release();
            inner.wait_queues.wake_next(first);
        }
        inner.turns.get_mut(player).unwrap().reset();
    }
}

fn register(inner: &mut Inner, player: &PlayerId) {
    inner.turns.entry(player.clone()).or_insert_with(PlayerTurn::default);
}

impl Board {
    fn render(&self, spots: &[Spot], viewer: &PlayerId) -> String {
        let mut out = String::with_capacity(spots.len() * 8 + 8);
        out.push_str(&self.rows.to_string());
        out.push('x');
        out.push_str(&self.columns.to_string());
        out.push('\n');
        for spot in spots {
            out.push_str(&spot.render_line(viewer));
            out.push('\n');
        }
        out
    }

    /// Checks invariants I4, I5, I2 and I6 (§3) against the locked state.
    /// Every check is a `debug_assert!`, so this compiles to nothing in a
    /// release build; it is wired into the tail of every public operation
    /// under `#[cfg(debug_assertions)]` and also callable directly from
    /// tests that want to assert on a board mid-scenario.
    fn check_invariants(&self, inner: &Inner) {
        for (idx, spot) in inner.spots.iter().enumerate() {
            let coord = Coordinate::from_flat_index(idx, self.columns);
            if spot.is_removed() {
                debug_assert!(!spot.is_face_up(), "I5 violated at {coord}: removed but face-up");
                debug_assert!(spot.holder().is_none(), "I5 violated at {coord}: removed but held");
            }
            if let Some(holder) = spot.holder() {
                debug_assert!(spot.is_face_up(), "I4 violated at {coord}: held but face-down");
                debug_assert!(spot.card().is_some(), "I4 violated at {coord}: held but cardless");
                let turn = inner
                    .turns
                    .get(holder)
                    .expect("I2: a spot's holder must be a registered player");
                debug_assert!(
                    turn.first == Some(coord) || turn.second == Some(coord),
                    "I2 violated at {coord}: {holder}'s turn does not reference this coordinate"
                );
            }
        }

        let mut held_counts: FxHashMap<&PlayerId, usize> = FxHashMap::default();
        for spot in &inner.spots {
            if let Some(holder) = spot.holder() {
                *held_counts.entry(holder).or_insert(0) += 1;
            }
        }
        for count in held_counts.values() {
            debug_assert!(*count <= 2, "I6 violated: a player holds more than two spots");
        }
    }

    /// Test/diagnostic hook: locks the board and checks invariants I2, I4,
    /// I5 and I6 against the current state. A no-op in release builds.
    pub async fn debug_assert_invariants(&self) {
        let inner = self.inner.lock().await;
        self.check_invariants(&inner);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn pid(s: &str) -> PlayerId {
        PlayerId::from(s)
    }

    fn labels(cards: &[&str]) -> Vec<String> {
        cards.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn scenario_simple_match() {
        let board = Board::new(2, 2, labels(&["A", "A", "B", "B"])).unwrap();
        let p = pid("p");

        let render = board.flip(&p, Coordinate::new(0, 0)).await.unwrap();
        assert_eq!(render, "2x2\nmy A\ndown\ndown\ndown\n");

        let render = board.flip(&p, Coordinate::new(0, 1)).await.unwrap();
        assert_eq!(render, "2x2\nmy A\nmy A\ndown\ndown\n");

        let render = board.flip(&p, Coordinate::new(1, 0)).await.unwrap();
        assert_eq!(render, "2x2\nnone\nnone\nmy B\ndown\n");
    }

    #[tokio::test]
    async fn scenario_miss_then_cleanup() {
        let board = Board::new(2, 2, labels(&["A", "B", "A", "B"])).unwrap();
        let p = pid("p");

        board.flip(&p, Coordinate::new(0, 0)).await.unwrap();
        let render = board.flip(&p, Coordinate::new(0, 1)).await.unwrap();
        assert_eq!(render, "2x2\nup A\nup B\ndown\ndown\n");

        let render = board.flip(&p, Coordinate::new(1, 0)).await.unwrap();
        assert_eq!(render, "2x2\ndown\ndown\nmy A\ndown\n");
    }

    #[tokio::test]
    async fn held_on_second_is_rejected() {
        let board = Board::new(2, 2, labels(&["A", "A", "B", "B"])).unwrap();
        let p1 = pid("p1");
        let p2 = pid("p2");

        board.flip(&p1, Coordinate::new(0, 0)).await.unwrap();
        board.flip(&p2, Coordinate::new(0, 1)).await.unwrap();

        let err = board.flip(&p2, Coordinate::new(0, 0)).await.unwrap_err();
        assert_eq!(err, FlipError::Held(Coordinate::new(0, 0)));
    }

    #[tokio::test]
    async fn first_flip_on_removed_cell_fails_without_disturbing_state() {
        let board = Board::new(1, 3, labels(&["A", "A", "C"])).unwrap();
        let p1 = pid("p1");
        let p2 = pid("p2");

        board.flip(&p1, Coordinate::new(0, 0)).await.unwrap();
        board.flip(&p1, Coordinate::new(0, 1)).await.unwrap(); // matched, still held

        // Starting a new turn completes the previous one first, removing
        // the matched pair at (0,0) and (0,1).
        board.flip(&p1, Coordinate::new(0, 2)).await.unwrap();

        let err = board.flip(&p2, Coordinate::new(0, 0)).await.unwrap_err();
        assert_eq!(err, FlipError::NoCard(Coordinate::new(0, 0)));
    }

    #[tokio::test]
    async fn out_of_range_coordinate_is_rejected() {
        let board = Board::new(2, 2, labels(&["A", "A", "B", "B"])).unwrap();
        let p = pid("p");
        let err = board.flip(&p, Coordinate::new(5, 5)).await.unwrap_err();
        assert_eq!(
            err,
            FlipError::OutOfRange { coordinate: Coordinate::new(5, 5), rows: 2, columns: 2 }
        );
    }

    #[tokio::test]
    async fn map_identity_changes_nothing_and_does_not_notify() {
        let board = Board::new(2, 2, labels(&["A", "A", "B", "B"])).unwrap();
        let p = pid("p");

        let watch_task = {
            let board = &board;
            let p = p.clone();
            async move { board.watch(&p).await }
        };

        let map_task = board.map(&p, |label| async move { Ok::<_, std::convert::Infallible>(label) });

        tokio::select! {
            _ = watch_task => panic!("identity map must not wake watchers"),
            result = map_task => { result.unwrap(); }
        }
    }

    #[tokio::test]
    async fn map_preserves_pair_consistency() {
        let board = Board::new(2, 2, labels(&["A", "A", "B", "B"])).unwrap();
        let p = pid("p");

        board
            .map(&p, |label| async move { Ok::<_, std::convert::Infallible>(format!("{label}!")) })
            .await
            .unwrap();

        board.flip(&p, Coordinate::new(0, 0)).await.unwrap();
        let render = board.flip(&p, Coordinate::new(0, 1)).await.unwrap();
        assert_eq!(render, "2x2\nmy A!\nmy A!\ndown\ndown\n");
    }

    #[tokio::test]
    async fn construction_rejects_mismatched_label_count() {
        let err = Board::new(2, 2, labels(&["A"])).unwrap_err();
        assert_eq!(err, BoardParseError::LabelCountMismatch { expected: 4, found: 1 });
    }
}
