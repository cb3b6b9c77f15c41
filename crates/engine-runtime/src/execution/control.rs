use engine_config::report::Interruption;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Cancellation plumbing of one run.
///
/// `stop` fires on external cancellation (it is a child of the caller's
/// token) or when the run-wide timeout elapses; work that has not started
/// yet is skipped from then on.
/// `abandon` fires `grace_period` later; queries still in flight are dropped.
#[derive(Debug, Clone)]
pub struct RunControl {
    external: CancellationToken,
    stop: CancellationToken,
    abandon: CancellationToken,
    done: CancellationToken,
    interruption: Arc<Mutex<Option<Interruption>>>,
}

impl RunControl {
    /// Spawns the watcher that turns an external token and a deadline into
    /// the two-step stop/abandon sequence.
    pub fn start(
        external: CancellationToken,
        timeout: Option<Duration>,
        grace_period: Duration,
    ) -> (Self, JoinHandle<()>) {
        let control = RunControl {
            stop: external.child_token(),
            external,
            abandon: CancellationToken::new(),
            done: CancellationToken::new(),
            interruption: Arc::new(Mutex::new(None)),
        };

        let watcher = control.clone();
        let handle = tokio::spawn(async move {
            let deadline = async {
                match timeout {
                    Some(timeout) => tokio::time::sleep(timeout).await,
                    None => std::future::pending().await,
                }
            };

            let cause = tokio::select! {
                biased;
                _ = watcher.external.cancelled() => Interruption::Cancelled,
                _ = deadline => Interruption::Timeout,
                _ = watcher.done.cancelled() => return,
            };

            warn!(?cause, ?grace_period, "Run interrupted, waiting for in-flight queries");
            watcher.interrupt(cause);

            tokio::select! {
                _ = watcher.done.cancelled() => {}
                _ = tokio::time::sleep(grace_period) => {
                    info!("Grace period elapsed, abandoning in-flight queries");
                    watcher.abandon.cancel();
                }
            }
        });

        (control, handle)
    }

    fn interrupt(&self, cause: Interruption) {
        self.record(cause);
        self.stop.cancel();
    }

    /// The first recorded cause wins.
    fn record(&self, cause: Interruption) {
        if let Ok(mut slot) = self.interruption.lock() {
            slot.get_or_insert(cause);
        }
    }

    pub fn is_stopping(&self) -> bool {
        self.stop.is_cancelled()
    }

    pub async fn stopped(&self) {
        self.stop.cancelled().await
    }

    pub fn abandon_token(&self) -> &CancellationToken {
        &self.abandon
    }

    pub fn interruption(&self) -> Option<Interruption> {
        self.interruption.lock().ok().and_then(|slot| *slot)
    }

    /// Stops the watcher once every phase has returned.
    pub fn finish(&self) {
        if self.stop.is_cancelled() {
            self.record(Interruption::Cancelled);
        }
        self.done.cancel();
    }
}
