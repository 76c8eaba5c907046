/// Auto-refresh poll loop
///
/// One task per dashboard. Each iteration sleeps the interval, then fetches
/// if auto-refresh is on and a key is bound; the decision is taken fresh at
/// every tick. The next sleep starts only after the fetch settles, and any
/// fetch started elsewhere (connect, post-mutation refresh) restarts the
/// sleep, so a tick always comes a full interval after the latest fetch.
use crate::monitor::dashboard::Dashboard;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Handle to a running poll loop. Dropping it stops the loop.
pub struct Poller {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Poller {
    /// Fetch once if a key is bound, then start polling
    pub async fn start(dashboard: Arc<Dashboard>, interval: Duration) -> Self {
        if dashboard.key().await.is_some() {
            dashboard.refresh().await;
        }
        Self::spawn(dashboard, interval)
    }

    /// Start polling; the first fetch happens one interval from now
    pub fn spawn(dashboard: Arc<Dashboard>, interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(dashboard, interval, cancel.clone()));

        info!("Polling every {:?}", interval);

        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Stop the loop. No tick fires after this returns.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop the loop and wait for the task to exit
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(dashboard: Arc<Dashboard>, interval: Duration, cancel: CancellationToken) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = dashboard.fetch_started() => {
                debug!("Fetch started, restarting poll interval");
                continue;
            }
            _ = tokio::time::sleep(interval) => {}
        }

        if !dashboard.should_poll().await {
            debug!("Poll tick skipped (auto refresh off or no key)");
            continue;
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = dashboard.refresh() => {}
        }
    }

    debug!("Poll loop stopped");
}
