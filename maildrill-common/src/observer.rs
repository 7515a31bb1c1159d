//! The engine-to-presentation boundary.
//!
//! The simulation core never renders anything itself: every observable event
//! (log lines, progress, node highlighting, counters, availability flips) is
//! pushed through an injected [`Observer`]. Hosts plug in whatever rendering
//! they want; tests plug in a [`RecordingObserver`] and assert on the event
//! stream.

use std::{
    fmt::{self, Display},
    sync::Arc,
};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Severity/kind of a simulated log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    Info,
    Command,
    Response,
    Error,
    Warning,
    Success,
}

impl Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Command => "command",
            Self::Response => "response",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Success => "success",
        };
        f.pad(label)
    }
}

/// One of the three simulated actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Node {
    Client,
    Relay,
    Recipient,
}

impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Client => "client",
            Self::Relay => "relay",
            Self::Recipient => "recipient",
        };
        f.pad(label)
    }
}

/// Point-in-time view of the engine's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Packets sent, retries included.
    pub total_packets: u64,
    /// Attempts declared lost.
    pub lost_packets: u64,
    /// Retries triggered by losses; always equals `lost_packets`.
    pub retransmissions: u64,
    /// Messages currently held in the store-and-forward queue.
    pub queue_length: usize,
}

/// Sink for everything the engine wants the outside world to see.
///
/// Implementations must be cheap: callbacks run inline on the session task.
pub trait Observer: Send + Sync + std::fmt::Debug {
    fn on_log(&self, message: &str, category: LogCategory) {
        let _ = (message, category);
    }

    fn on_progress(&self, percent: u8, status: &str) {
        let _ = (percent, status);
    }

    fn on_node_active(&self, node: Option<Node>) {
        let _ = node;
    }

    fn on_stats(&self, stats: StatsSnapshot) {
        let _ = stats;
    }

    fn on_availability_changed(&self, is_available: bool) {
        let _ = is_available;
    }
}

/// Default observer: discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl Observer for NullObserver {}

/// Maps engine events onto the `tracing` stack, for embedding the simulator
/// in an already-traced host.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_log(&self, message: &str, category: LogCategory) {
        match category {
            LogCategory::Error => tracing::error!(%category, "{message}"),
            LogCategory::Warning => tracing::warn!(%category, "{message}"),
            LogCategory::Info | LogCategory::Success => tracing::info!(%category, "{message}"),
            LogCategory::Command | LogCategory::Response => {
                tracing::debug!(%category, "{message}");
            }
        }
    }

    fn on_progress(&self, percent: u8, status: &str) {
        tracing::debug!(percent, "{status}");
    }

    fn on_node_active(&self, node: Option<Node>) {
        match node {
            Some(node) => tracing::trace!(%node, "node active"),
            None => tracing::trace!("node cleared"),
        }
    }

    fn on_stats(&self, stats: StatsSnapshot) {
        tracing::trace!(
            total = stats.total_packets,
            lost = stats.lost_packets,
            retransmissions = stats.retransmissions,
            queued = stats.queue_length,
            "stats"
        );
    }

    fn on_availability_changed(&self, is_available: bool) {
        tracing::info!(is_available, "recipient availability changed");
    }
}

/// Everything a [`RecordingObserver`] captures.
#[derive(Debug, Clone, PartialEq)]
pub enum ObserverEvent {
    Log {
        message: String,
        category: LogCategory,
    },
    Progress {
        percent: u8,
        status: String,
    },
    NodeActive(Option<Node>),
    Stats(StatsSnapshot),
    AvailabilityChanged(bool),
}

/// Thread-safe event recorder for tests and report generation.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<ObserverEvent>>>,
}

impl RecordingObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event observed so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<ObserverEvent> {
        self.events.lock().clone()
    }

    /// All log lines, in order, as `(message, category)` pairs.
    #[must_use]
    pub fn logs(&self) -> Vec<(String, LogCategory)> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ObserverEvent::Log { message, category } => {
                    Some((message.clone(), *category))
                }
                _ => None,
            })
            .collect()
    }

    /// Log lines of one category, in order.
    #[must_use]
    pub fn logs_in(&self, category: LogCategory) -> Vec<String> {
        self.logs()
            .into_iter()
            .filter_map(|(message, c)| (c == category).then_some(message))
            .collect()
    }

    /// The most recent progress event, if any.
    #[must_use]
    pub fn last_progress(&self) -> Option<(u8, String)> {
        self.events
            .lock()
            .iter()
            .rev()
            .find_map(|event| match event {
                ObserverEvent::Progress { percent, status } => {
                    Some((*percent, status.clone()))
                }
                _ => None,
            })
    }

    /// The most recent stats snapshot, if any.
    #[must_use]
    pub fn last_stats(&self) -> Option<StatsSnapshot> {
        self.events
            .lock()
            .iter()
            .rev()
            .find_map(|event| match event {
                ObserverEvent::Stats(stats) => Some(*stats),
                _ => None,
            })
    }

    /// Every availability transition observed, in order.
    #[must_use]
    pub fn availability_changes(&self) -> Vec<bool> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ObserverEvent::AvailabilityChanged(is_available) => Some(*is_available),
                _ => None,
            })
            .collect()
    }

    /// Discard everything recorded so far.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Observer for RecordingObserver {
    fn on_log(&self, message: &str, category: LogCategory) {
        self.events.lock().push(ObserverEvent::Log {
            message: message.to_string(),
            category,
        });
    }

    fn on_progress(&self, percent: u8, status: &str) {
        self.events.lock().push(ObserverEvent::Progress {
            percent,
            status: status.to_string(),
        });
    }

    fn on_node_active(&self, node: Option<Node>) {
        self.events.lock().push(ObserverEvent::NodeActive(node));
    }

    fn on_stats(&self, stats: StatsSnapshot) {
        self.events.lock().push(ObserverEvent::Stats(stats));
    }

    fn on_availability_changed(&self, is_available: bool) {
        self.events
            .lock()
            .push(ObserverEvent::AvailabilityChanged(is_available));
    }
}
