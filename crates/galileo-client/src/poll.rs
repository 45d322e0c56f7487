//! Fixed-interval polling of long-running executions.

use std::future::Future;
use std::time::Duration;

use galileo_core::model::Progress;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::client::ApiClient;
use crate::error::Result;

/// Default polling period: 2 seconds.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Anything that can report the progress of an execution.
pub trait ProgressSource {
    fn progress(&self, execution_id: &str) -> impl Future<Output = Result<Progress>> + Send;
}

impl ProgressSource for ApiClient {
    fn progress(&self, execution_id: &str) -> impl Future<Output = Result<Progress>> + Send {
        self.training_progress(execution_id)
    }
}

/// One poll result for one execution.
#[derive(Debug)]
pub struct ProgressUpdate {
    pub execution_id: String,
    pub progress: Result<Progress>,
}

impl ProgressUpdate {
    /// Returns true when this update ends the watch for its execution.
    pub fn is_terminal(&self) -> bool {
        matches!(&self.progress, Ok(progress) if progress.is_terminal())
    }
}

/// How a watch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    /// Every watched execution reached a terminal state.
    Completed,
    /// The cancellation token fired.
    Cancelled,
    /// The update receiver was dropped.
    Closed,
}

/// Polls a set of executions until all of them are terminal.
///
/// The first poll happens immediately, then one per interval. Each tick
/// queries every execution still running; terminal ones drop out of the set.
/// A failed request is delivered as an error update and retried on the next
/// tick only. Cancellation is checked between ticks, so an in-flight request
/// always completes.
#[derive(Debug)]
pub struct ExecutionWatcher<S> {
    source: S,
    interval: Duration,
    cancel: CancellationToken,
}

impl<S: ProgressSource> ExecutionWatcher<S> {
    pub fn new(source: S, interval: Duration) -> Self {
        Self {
            source,
            interval,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops [`ExecutionWatcher::watch`] at the next tick boundary.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Watches `execution_ids`, sending one update per poll.
    pub async fn watch<I>(&self, execution_ids: I, updates: mpsc::Sender<ProgressUpdate>) -> WatchOutcome
    where
        I: IntoIterator<Item = String>,
    {
        let mut pending: Vec<String> = Vec::new();
        for id in execution_ids {
            if !pending.contains(&id) {
                pending.push(id);
            }
        }

        info!(executions = pending.len(), interval_ms = self.interval.as_millis() as u64; "Watching executions");
        if pending.is_empty() {
            return WatchOutcome::Completed;
        }

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!(remaining = pending.len(); "Execution watch cancelled");
                    return WatchOutcome::Cancelled;
                }
                _ = ticker.tick() => {}
            }

            let mut running = Vec::with_capacity(pending.len());
            for execution_id in pending.drain(..) {
                let progress = self.source.progress(&execution_id).await;
                let update = ProgressUpdate {
                    execution_id: execution_id.clone(),
                    progress,
                };

                match &update.progress {
                    Ok(progress) if progress.is_terminal() => {
                        debug!(execution_id = execution_id.as_str(), failed = progress.is_failed(); "Execution finished");
                    }
                    Ok(_) => running.push(execution_id),
                    Err(err) => {
                        warn!("Progress request for {execution_id} failed: {err}");
                        running.push(execution_id);
                    }
                }

                if updates.send(update).await.is_err() {
                    debug!("Progress receiver dropped, stopping watch");
                    return WatchOutcome::Closed;
                }
            }
            pending = running;

            if pending.is_empty() {
                info!("All watched executions finished");
                return WatchOutcome::Completed;
            }
        }
    }
}
