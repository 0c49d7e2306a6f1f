use tokio::sync::oneshot;

/// The set of suspended `watch` callers awaiting the next observable board
/// change. A single notification wakes every registered watcher exactly
/// once and empties the set.
#[derive(Default)]
pub(super) struct WatchSet {
    waiters: Vec<oneshot::Sender<()>>,
}

impl WatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the caller and returns the receiver it should await after
    /// releasing the Board mutex.
    pub fn register(&mut self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.waiters.push(tx);
        rx
    }

    /// Wakes every registered watcher and empties the set. A watcher
    /// dropped without awaiting (cancelled) simply fails its send, which is
    /// harmless.
    pub fn notify_all(&mut self) {
        for tx in self.waiters.drain(..) {
            let _ = tx.send(());
        }
    }
}
