//! The engine context object.
//!
//! All shared simulator state (queue, availability, counters, observer,
//! clock, sampler, running flag) lives behind one cheaply cloneable handle.
//! There are no process-wide singletons; independent engines can run side by
//! side, each fully deterministic under an injected clock and sampler.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use maildrill_common::{
    clock::{Clock, WallClock},
    config::MessageConfig,
    observer::{LogCategory, Node, NullObserver, Observer, StatsSnapshot},
};
use maildrill_spool::{MailQueue, message::CompletionNotifier};

use crate::{
    availability::Availability,
    channel::UnreliableChannel,
    counters::Counters,
    sampler::{LossSampler, ThreadRngSampler},
    session::{Session, SessionOutcome},
};

/// Fixed per-message processing delay while flushing the queue.
pub const FLUSH_PROCESS_DELAY: Duration = Duration::from_millis(500);

pub(crate) struct EngineInner {
    pub(crate) queue: MailQueue,
    pub(crate) availability: Availability,
    pub(crate) running: AtomicBool,
    pub(crate) counters: Arc<Counters>,
    pub(crate) observer: Arc<dyn Observer>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) channel: UnreliableChannel,
}

impl fmt::Debug for EngineInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineInner")
            .field("queue_length", &self.queue.len())
            .field("available", &self.availability.is_available())
            .field("running", &self.running.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl EngineInner {
    pub(crate) fn report_stats(&self) {
        self.observer
            .on_stats(self.counters.snapshot(self.queue.len()));
    }
}

/// Releases the engine's running flag when dropped, so every session exit
/// path, including validation failure, frees the lock.
pub(crate) struct RunningGuard {
    inner: Arc<EngineInner>,
}

impl RunningGuard {
    fn try_acquire(inner: &Arc<EngineInner>) -> Option<Self> {
        inner
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
            .then(|| Self {
                inner: Arc::clone(inner),
            })
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.inner.running.store(false, Ordering::SeqCst);
    }
}

/// Handle to one simulation instance.
#[derive(Debug, Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Engine {
    /// Start configuring an engine.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Run one protocol session for `config`.
    ///
    /// A no-op returning [`SessionOutcome::AlreadyRunning`] when another
    /// session holds the running lock *and* the recipient is available.
    /// While the recipient is unavailable, overlapping submissions are
    /// permitted: the queue-only path is fast and must never be blocked by
    /// an unrelated in-flight delivery.
    pub async fn submit(&self, config: MessageConfig) -> SessionOutcome {
        self.submit_inner(config, None).await
    }

    /// As [`submit`](Self::submit), attaching a completion notifier that
    /// fires exactly once if the message is queued and later delivered.
    pub async fn submit_with_notifier(
        &self,
        config: MessageConfig,
        notifier: impl FnOnce() + Send + Sync + 'static,
    ) -> SessionOutcome {
        self.submit_inner(config, Some(Box::new(notifier))).await
    }

    async fn submit_inner(
        &self,
        config: MessageConfig,
        notifier: Option<CompletionNotifier>,
    ) -> SessionOutcome {
        let guard = RunningGuard::try_acquire(&self.inner);
        if guard.is_none() && self.inner.availability.is_available() {
            tracing::warn!(recipient = %config.recipient, "submission ignored, session in flight");
            self.inner.observer.on_log(
                "A transmission is already in progress",
                LogCategory::Warning,
            );
            return SessionOutcome::AlreadyRunning;
        }

        Session::new(Arc::clone(&self.inner), config, notifier)
            .run(guard)
            .await
    }

    /// Flip recipient availability, returning the new value.
    ///
    /// A transition to available drains the queue (a no-op when empty); a
    /// transition to unavailable leaves queued messages untouched.
    pub async fn toggle_availability(&self) -> bool {
        let available = self.inner.availability.toggle();
        self.inner.observer.on_availability_changed(available);
        if available {
            self.flush().await;
        }
        available
    }

    /// Set recipient availability; idempotent, notifying (and possibly
    /// flushing) only on an actual transition.
    pub async fn set_availability(&self, available: bool) {
        if self.inner.availability.set(available) {
            self.inner.observer.on_availability_changed(available);
            if available {
                self.flush().await;
            }
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.inner.availability.is_available()
    }

    /// Number of messages currently held in the store-and-forward queue.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.inner.queue.len()
    }

    /// Current counters and queue length.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.counters.snapshot(self.inner.queue.len())
    }

    /// Deliver everything queued at this instant, in enqueue order.
    ///
    /// The drain is a single snapshot-then-clear, so a message enqueued while
    /// this flush is delivering lands in the next flush. Deliveries run one
    /// at a time: a fixed processing delay, one forward transmission using
    /// the message's own transport parameters, then the completion notifier.
    async fn flush(&self) {
        let inner = &self.inner;
        let batch = inner.queue.drain();
        if batch.is_empty() {
            return;
        }

        tracing::debug!(count = batch.len(), "flushing store-and-forward queue");
        inner.observer.on_log(
            &format!("Recipient online; delivering {} queued message(s)", batch.len()),
            LogCategory::Info,
        );
        inner.report_stats();

        for message in batch {
            inner.clock.sleep(FLUSH_PROCESS_DELAY).await;
            inner.observer.on_node_active(Some(Node::Recipient));

            let id = message.id();
            let config = message.config().clone();
            let ack = inner
                .channel
                .transmit(
                    &format!("FORWARD {id}"),
                    "250 Delivered to mailbox",
                    config.network_delay(),
                    config.loss_percent,
                )
                .await;
            inner.observer.on_log(&ack, LogCategory::Response);
            inner.observer.on_log(
                &format!("Queued message {id} delivered to {}", config.recipient),
                LogCategory::Success,
            );

            message.notify_delivered();
            inner.report_stats();
        }

        inner.observer.on_node_active(None);
    }
}

/// Builder for [`Engine`]; every dependency has a production default.
#[derive(Debug)]
pub struct EngineBuilder {
    observer: Arc<dyn Observer>,
    clock: Arc<dyn Clock>,
    sampler: Arc<dyn LossSampler>,
    initially_available: bool,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            observer: Arc::new(NullObserver),
            clock: Arc::new(WallClock),
            sampler: Arc::new(ThreadRngSampler),
            initially_available: true,
        }
    }
}

impl EngineBuilder {
    #[must_use]
    pub fn observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    #[must_use]
    pub fn sampler(mut self, sampler: impl LossSampler + 'static) -> Self {
        self.sampler = Arc::new(sampler);
        self
    }

    #[must_use]
    pub fn initially_available(mut self, available: bool) -> Self {
        self.initially_available = available;
        self
    }

    #[must_use]
    pub fn build(self) -> Engine {
        let queue = MailQueue::new();
        let counters = Arc::new(Counters::new());
        let channel = UnreliableChannel::new(
            Arc::clone(&self.clock),
            self.sampler,
            Arc::clone(&self.observer),
            Arc::clone(&counters),
            queue.clone(),
        );

        Engine {
            inner: Arc::new(EngineInner {
                queue,
                availability: Availability::new(self.initially_available),
                running: AtomicBool::new(false),
                counters,
                observer: self.observer,
                clock: self.clock,
                channel,
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use maildrill_common::{clock::VirtualClock, observer::RecordingObserver};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sampler::SequenceSampler;

    fn quiet_config() -> MessageConfig {
        MessageConfig::builder()
            .loss_percent(0.0)
            .network_delay_ms(0)
            .server_delay_secs(0)
            .build()
    }

    fn engine(observer: RecordingObserver, available: bool) -> Engine {
        Engine::builder()
            .observer(observer)
            .clock(VirtualClock::new())
            .sampler(SequenceSampler::new([]))
            .initially_available(available)
            .build()
    }

    #[tokio::test]
    async fn empty_queue_toggle_notifies_but_delivers_nothing() {
        let observer = RecordingObserver::new();
        let engine = engine(observer.clone(), true);

        assert!(!engine.toggle_availability().await);
        assert!(engine.toggle_availability().await);

        assert_eq!(observer.availability_changes(), vec![false, true]);
        assert!(observer.logs().is_empty());
        assert!(observer.last_stats().is_none());
    }

    #[tokio::test]
    async fn set_availability_is_idempotent() {
        let observer = RecordingObserver::new();
        let engine = engine(observer.clone(), true);

        engine.set_availability(true).await;
        assert!(observer.availability_changes().is_empty());

        engine.set_availability(false).await;
        engine.set_availability(false).await;
        assert_eq!(observer.availability_changes(), vec![false]);
    }

    #[tokio::test]
    async fn queued_messages_flush_in_enqueue_order() {
        let observer = RecordingObserver::new();
        let engine = engine(observer.clone(), false);

        for subject in ["A", "B", "C"] {
            let config = MessageConfig::builder()
                .subject(subject)
                .recipient(format!("{}@example.com", subject.to_lowercase()))
                .loss_percent(0.0)
                .network_delay_ms(0)
                .server_delay_secs(0)
                .build();
            let outcome = engine.submit(config).await;
            assert!(matches!(outcome, SessionOutcome::Queued(_)));
        }
        assert_eq!(engine.queue_len(), 3);

        engine.toggle_availability().await;

        assert_eq!(engine.queue_len(), 0);
        let deliveries: Vec<_> = observer
            .logs_in(LogCategory::Success)
            .into_iter()
            .filter(|line| line.contains("delivered to"))
            .collect();
        assert_eq!(deliveries.len(), 3);
        assert!(deliveries[0].contains("a@example.com"));
        assert!(deliveries[1].contains("b@example.com"));
        assert!(deliveries[2].contains("c@example.com"));
    }

    #[tokio::test]
    async fn notifier_fires_exactly_once_per_queued_message() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let observer = RecordingObserver::new();
        let engine = engine(observer, false);

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let outcome = engine
            .submit_with_notifier(quiet_config(), move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        assert!(matches!(outcome, SessionOutcome::Queued(_)));
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        engine.toggle_availability().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // A second transition must not re-fire anything.
        engine.toggle_availability().await;
        engine.toggle_availability().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn submissions_can_run_on_a_spawned_task() {
        let engine = engine(RecordingObserver::new(), true);

        let handle = tokio::spawn({
            let engine = engine.clone();
            let counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));
            async move {
                engine
                    .submit_with_notifier(quiet_config(), move || {
                        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    })
                    .await
            }
        });

        let outcome = handle.await.expect("spawned session completes");
        assert_eq!(outcome, SessionOutcome::Delivered);
    }

    #[tokio::test]
    async fn stats_expose_queue_length() {
        let engine = engine(RecordingObserver::new(), false);
        let outcome = engine.submit(quiet_config()).await;
        assert!(matches!(outcome, SessionOutcome::Queued(_)));
        assert_eq!(engine.stats().queue_length, 1);
    }
}
