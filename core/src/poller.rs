//! Repeating background task tied to its owner's lifetime.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Runs a blocking `tick` every `period` until stopped or dropped.
///
/// The first tick fires one full period after spawning. Ticks never overlap:
/// the next one is scheduled only after the previous has returned.
#[derive(Debug)]
pub struct HealthPoller {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl HealthPoller {
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(period: Duration, tick: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let tick = Arc::new(tick);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = interval.tick() => {
                        let tick = Arc::clone(&tick);
                        if let Err(e) = tokio::task::spawn_blocking(move || tick()).await {
                            warn!("poll tick failed: {e}");
                        }
                    }
                }
            }
            debug!("poller stopped");
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Cancel and wait for the task to exit. No tick runs after this returns.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("poller task ended abnormally: {e}");
            }
        }
    }
}

impl Drop for HealthPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
