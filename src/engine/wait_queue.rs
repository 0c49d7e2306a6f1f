use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use tokio::sync::oneshot;

use crate::common::Coordinate;

/// Per-cell FIFO queues of suspended first-flip attempts (Rule 1-D).
///
/// Entries exist only while a flip is suspended on a held cell; waking an
/// entry removes it. A cell with no queued waiters simply has no entry in
/// the map, so an idle board carries no queue overhead.
#[derive(Default)]
pub(super) struct WaitQueues {
    queues: FxHashMap<Coordinate, VecDeque<oneshot::Sender<()>>>,
}

impl WaitQueues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues the caller on `coord`'s queue and returns the receiver half
    /// it should await after releasing the Board mutex.
    pub fn enqueue(&mut self, coord: Coordinate) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.queues.entry(coord).or_default().push_back(tx);
        rx
    }

    /// Wakes the oldest waiter on `coord`, if any. A release always wakes
    /// at most one waiter per call, per the FIFO single-wake-per-release
    /// policy: the woken waiter re-checks the cell itself rather than being
    /// handed ownership directly.
    pub fn wake_next(&mut self, coord: Coordinate) {
        if let Some(queue) = self.queues.get_mut(&coord) {
            while let Some(tx) = queue.pop_front() {
                if tx.send(()).is_ok() {
                    break;
                }
                // Receiver was dropped (the waiting flip was cancelled);
                // its slot is already gone, try the next one.
            }
            if queue.is_empty() {
                self.queues.remove(&coord);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn wakes_in_fifo_order() {
        let mut queues = WaitQueues::new();
        let c = Coordinate::new(0, 0);
        let rx_a = queues.enqueue(c);
        let rx_b = queues.enqueue(c);

        queues.wake_next(c);
        assert!(rx_a.await.is_ok());

        queues.wake_next(c);
        assert!(rx_b.await.is_ok());
    }

    #[tokio::test]
    async fn wake_next_on_empty_cell_is_a_no_op() {
        let mut queues = WaitQueues::new();
        queues.wake_next(Coordinate::new(0, 0));
    }

    #[tokio::test]
    async fn dropped_waiter_does_not_block_the_next_one() {
        let mut queues = WaitQueues::new();
        let c = Coordinate::new(0, 0);
        let rx_a = queues.enqueue(c);
        let rx_b = queues.enqueue(c);
        drop(rx_a);

        queues.wake_next(c);
        assert_eq!(rx_b.await, Ok(()));
    }
}
