use std::{fmt, time::SystemTime};

use maildrill_common::config::MessageConfig;

use crate::types::QueuedMessageId;

/// Callback invoked exactly once when a queued message is finally delivered.
pub type CompletionNotifier = Box<dyn FnOnce() + Send + Sync>;

/// A message held in the queue while its recipient is unavailable.
///
/// Owned by the [`MailQueue`](crate::MailQueue) from enqueue until the flush
/// dequeues it for delivery. The notifier is consumed by
/// [`notify_delivered`](Self::notify_delivered), so move semantics guarantee
/// it fires at most once.
pub struct QueuedMessage {
    id: QueuedMessageId,
    config: MessageConfig,
    enqueued_at: SystemTime,
    notifier: Option<CompletionNotifier>,
}

impl QueuedMessage {
    /// Wrap a config snapshot with a fresh identifier and the given enqueue
    /// timestamp.
    #[must_use]
    pub fn new(config: MessageConfig, enqueued_at: SystemTime) -> Self {
        Self {
            id: QueuedMessageId::generate(),
            config,
            enqueued_at,
            notifier: None,
        }
    }

    /// As [`new`](Self::new), with a completion notifier attached.
    #[must_use]
    pub fn with_notifier(
        config: MessageConfig,
        enqueued_at: SystemTime,
        notifier: CompletionNotifier,
    ) -> Self {
        Self {
            notifier: Some(notifier),
            ..Self::new(config, enqueued_at)
        }
    }

    #[must_use]
    pub const fn id(&self) -> QueuedMessageId {
        self.id
    }

    #[must_use]
    pub const fn config(&self) -> &MessageConfig {
        &self.config
    }

    #[must_use]
    pub const fn enqueued_at(&self) -> SystemTime {
        self.enqueued_at
    }

    /// Consume the message after simulated delivery, firing its notifier.
    pub fn notify_delivered(self) {
        if let Some(notifier) = self.notifier {
            notifier();
        }
    }
}

impl fmt::Debug for QueuedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedMessage")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("enqueued_at", &self.enqueued_at)
            .field("notifier", &self.notifier.as_ref().map(|_| "FnOnce"))
            .finish()
    }
}
