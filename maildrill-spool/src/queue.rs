use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;

use crate::message::QueuedMessage;

/// FIFO store-and-forward queue.
///
/// Cheaply cloneable handle; clones share the same underlying queue. Insertion
/// order is delivery order. The only removal operation is [`drain`](Self::drain),
/// which takes everything present in a single lock acquisition: a message
/// enqueued while a drained batch is still being delivered lands in the next
/// drain, never the current one.
#[derive(Debug, Clone, Default)]
pub struct MailQueue {
    inner: Arc<Mutex<VecDeque<QueuedMessage>>>,
}

impl MailQueue {
    /// Create a new empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message. O(1), never blocks beyond the queue lock.
    pub fn enqueue(&self, message: QueuedMessage) {
        tracing::debug!(id = %message.id(), "message queued");
        self.inner.lock().push_back(message);
    }

    /// Number of messages currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Remove and return every queued message, in enqueue order.
    ///
    /// Snapshot-then-clear in one lock acquisition: this is the flush's sole
    /// synchronization discipline against concurrent enqueues.
    #[must_use]
    pub fn drain(&self) -> Vec<QueuedMessage> {
        let mut queue = self.inner.lock();
        queue.drain(..).collect()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use std::time::SystemTime;

    use maildrill_common::config::MessageConfig;
    use pretty_assertions::assert_eq;

    use super::*;

    fn message(subject: &str) -> QueuedMessage {
        QueuedMessage::new(
            MessageConfig::builder().subject(subject).build(),
            SystemTime::UNIX_EPOCH,
        )
    }

    #[test]
    fn drain_preserves_enqueue_order() {
        let queue = MailQueue::new();
        queue.enqueue(message("A"));
        queue.enqueue(message("B"));
        queue.enqueue(message("C"));
        assert_eq!(queue.len(), 3);

        let drained = queue.drain();
        let subjects: Vec<_> = drained
            .iter()
            .map(|m| m.config().subject.clone())
            .collect();
        assert_eq!(subjects, vec!["A", "B", "C"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn drain_of_empty_queue_yields_nothing() {
        let queue = MailQueue::new();
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn enqueue_after_drain_lands_in_next_drain() {
        let queue = MailQueue::new();
        queue.enqueue(message("A"));

        let first = queue.drain();
        assert_eq!(first.len(), 1);

        // Simulates an enqueue arriving while the first batch is still being
        // delivered.
        queue.enqueue(message("D"));
        assert_eq!(queue.len(), 1);

        let second = queue.drain();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].config().subject, "D");
    }

    #[test]
    fn clones_share_the_same_queue() {
        let queue = MailQueue::new();
        let handle = queue.clone();
        handle.enqueue(message("A"));
        assert_eq!(queue.len(), 1);
    }
}
