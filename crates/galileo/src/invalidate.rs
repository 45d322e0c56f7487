//! Change notifications for backend-held collections.
//!
//! Every successful mutation made through the [`Workspace`](crate::workspace::Workspace)
//! publishes an [`Invalidation`]. Views subscribe and decide for themselves
//! what to re-fetch; nothing is cached or re-fetched automatically.

use log::trace;
use tokio::sync::broadcast;

use galileo_core::identifier::NodeId;

/// Default number of undelivered notifications kept per subscriber.
const DEFAULT_CAPACITY: usize = 64;

/// What changed on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Invalidation {
    /// The set of datasources changed (created, or derived by a preprocess).
    Datasources,
    /// Snapshots or the active snapshot of one datasource changed.
    Datasource(NodeId),
    Preprocesses,
    Trainings,
    /// Executions or settings of one training changed.
    Training(NodeId),
    Deployments,
}

impl Invalidation {
    /// Returns true when the pipeline graph may have changed shape.
    pub fn affects_graph(&self) -> bool {
        matches!(
            self,
            Self::Datasources | Self::Preprocesses | Self::Trainings | Self::Deployments
        )
    }
}

/// Broadcast channel for [`Invalidation`]s.
///
/// Cloning yields another handle to the same channel. Subscribers that fall
/// more than the channel capacity behind observe a lag error and should
/// re-fetch everything.
#[derive(Debug, Clone)]
pub struct InvalidationBus {
    sender: broadcast::Sender<Invalidation>,
}

impl InvalidationBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Invalidation> {
        self.sender.subscribe()
    }

    /// Publishes an event; returns how many subscribers will see it.
    pub fn publish(&self, event: Invalidation) -> usize {
        trace!(event:?; "Publishing invalidation");
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for InvalidationBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events_in_order() {
        let bus = InvalidationBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        assert_eq!(bus.publish(Invalidation::Datasources), 2);
        assert_eq!(bus.publish(Invalidation::Training(NodeId::new("t1"))), 2);

        assert_eq!(first.recv().await.unwrap(), Invalidation::Datasources);
        assert_eq!(first.recv().await.unwrap(), Invalidation::Training(NodeId::new("t1")));
        assert_eq!(second.recv().await.unwrap(), Invalidation::Datasources);
    }

    #[test]
    fn test_publishing_without_subscribers_is_fine() {
        let bus = InvalidationBus::default();
        assert_eq!(bus.publish(Invalidation::Deployments), 0);
    }

    #[test]
    fn test_graph_relevance() {
        assert!(Invalidation::Preprocesses.affects_graph());
        assert!(!Invalidation::Datasource(NodeId::new("d")).affects_graph());
    }
}
