// Trailing-edge debouncer

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Runs an action once a burst of triggers has gone quiet.
///
/// Every [`Debouncer::trigger`] restarts the quiet period; the action runs
/// once when `delay` passes with no further trigger. The background task is
/// aborted when the debouncer is dropped, so a pending run never fires after
/// its owner is gone.
pub struct Debouncer {
    tx: mpsc::UnboundedSender<()>,
    delay: Duration,
    task: JoinHandle<()>,
}

impl Debouncer {
    /// Spawn the debounce task on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn<F>(delay: Duration, mut action: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let task = tokio::spawn(async move {
            let mut pending = false;

            loop {
                if pending {
                    tokio::select! {
                        event = rx.recv() => {
                            if event.is_none() {
                                break;
                            }
                        }
                        _ = tokio::time::sleep(delay) => {
                            pending = false;
                            debug!("Debounce window of {:?} elapsed", delay);
                            action();
                        }
                    }
                } else {
                    match rx.recv().await {
                        Some(()) => pending = true,
                        None => break,
                    }
                }
            }
        });

        Self { tx, delay, task }
    }

    /// Record an event and restart the quiet period
    pub fn trigger(&self) {
        // The task only stops when dropped, so a send error means shutdown.
        let _ = self.tx.send(());
    }

    /// Length of the quiet period
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer").field("delay", &self.delay).finish()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
