//! Shared transmission counters.

use std::sync::atomic::{AtomicU64, Ordering};

use maildrill_common::observer::StatsSnapshot;

/// Cumulative packet counters for one engine.
///
/// Invariants: `sent >= lost >= 0`, and `retransmissions == lost` because
/// every detected loss triggers exactly one retransmission.
#[derive(Debug, Default)]
pub struct Counters {
    sent: AtomicU64,
    lost: AtomicU64,
    retransmissions: AtomicU64,
}

impl Counters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one transmitted packet (retries included).
    pub fn record_sent(&self) {
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one lost packet and the retransmission it triggers.
    pub fn record_loss(&self) {
        self.lost.fetch_add(1, Ordering::Relaxed);
        self.retransmissions.fetch_add(1, Ordering::Relaxed);
    }

    /// Zero all counters; done at the start of every session run.
    pub fn reset(&self) {
        self.sent.store(0, Ordering::Relaxed);
        self.lost.store(0, Ordering::Relaxed);
        self.retransmissions.store(0, Ordering::Relaxed);
    }

    /// Current values combined with the given queue length.
    #[must_use]
    pub fn snapshot(&self, queue_length: usize) -> StatsSnapshot {
        StatsSnapshot {
            total_packets: self.sent.load(Ordering::Relaxed),
            lost_packets: self.lost.load(Ordering::Relaxed),
            retransmissions: self.retransmissions.load(Ordering::Relaxed),
            queue_length,
        }
    }
}
