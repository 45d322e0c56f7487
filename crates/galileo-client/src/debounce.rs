//! Quiet-period coalescing of rapidly changing values.
//!
//! Used for inputs such as the pairwise-matrix column selection, where only
//! the value the user settles on should trigger a request. The `galileo`
//! binary feeds it from stdin in `datasources pairwise --follow`.

use std::time::Duration;

use log::trace;
use tokio::sync::mpsc;

/// Default quiet period: 500 milliseconds.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Creates a debounced channel with the given quiet period.
pub fn channel<T>(delay: Duration) -> (DebounceSender<T>, DebounceReceiver<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (DebounceSender { tx }, DebounceReceiver { rx, delay, pending: None })
}

/// Sending half of a debounced channel.
#[derive(Debug)]
pub struct DebounceSender<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> Clone for DebounceSender<T> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<T> DebounceSender<T> {
    /// Submits a new value, superseding any value not yet delivered.
    ///
    /// Returns false when the receiver has been dropped.
    pub fn send(&self, value: T) -> bool {
        self.tx.send(value).is_ok()
    }
}

/// Receiving half of a debounced channel.
#[derive(Debug)]
pub struct DebounceReceiver<T> {
    rx: mpsc::UnboundedReceiver<T>,
    delay: Duration,
    pending: Option<T>,
}

impl<T> DebounceReceiver<T> {
    /// Waits for a value followed by `delay` without newer values.
    ///
    /// Returns the most recent value of the burst, or `None` once every
    /// sender is gone and nothing is pending. A burst still settling when the
    /// last sender drops is delivered immediately.
    ///
    /// Cancel safe: a value received before cancellation stays pending and the
    /// next call restarts its quiet period.
    pub async fn recv(&mut self) -> Option<T> {
        if self.pending.is_none() {
            self.pending = Some(self.rx.recv().await?);
        }
        let mut superseded = 0usize;

        loop {
            match tokio::time::timeout(self.delay, self.rx.recv()).await {
                Ok(Some(value)) => {
                    self.pending = Some(value);
                    superseded += 1;
                }
                Ok(None) | Err(_) => {
                    trace!(superseded; "Debounced value settled");
                    return self.pending.take();
                }
            }
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::{Instant, sleep};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_last_value() {
        let (tx, mut rx) = channel(DEFAULT_DEBOUNCE);
        let started = Instant::now();

        let producer = tokio::spawn(async move {
            for value in 1..=3 {
                tx.send(value);
                sleep(Duration::from_millis(100)).await;
            }
            sleep(Duration::from_secs(2)).await;
            tx.send(9);
        });

        assert_eq!(rx.recv().await, Some(3));
        // Last value sent at 200ms, then 500ms of quiet.
        assert!(started.elapsed() >= Duration::from_millis(700));
        assert!(started.elapsed() < Duration::from_secs(2));

        assert_eq!(rx.recv().await, Some(9));
        producer.await.unwrap();
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_values_spaced_beyond_delay_are_all_delivered() {
        let (tx, mut rx) = channel(Duration::from_millis(50));
        let producer = tokio::spawn(async move {
            for value in ["a", "b"] {
                tx.send(value);
                sleep(Duration::from_millis(200)).await;
            }
        });

        assert_eq!(rx.recv().await, Some("a"));
        assert_eq!(rx.recv().await, Some("b"));
        producer.await.unwrap();
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_recv_keeps_the_pending_value() {
        let (tx, mut rx) = channel(DEFAULT_DEBOUNCE);
        tx.send("cols");

        let cancelled = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(cancelled.is_err());

        assert_eq!(rx.recv().await, Some("cols"));
        drop(tx);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_send_after_receiver_drop_reports_failure() {
        let (tx, rx) = channel::<u8>(DEFAULT_DEBOUNCE);
        drop(rx);
        assert!(!tx.send(1));
    }
}
