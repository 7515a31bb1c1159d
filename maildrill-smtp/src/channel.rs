//! The unreliable transport underneath every protocol step.

use std::{sync::Arc, time::Duration};

use maildrill_common::{
    clock::Clock,
    observer::{LogCategory, Observer},
};
use maildrill_spool::MailQueue;

use crate::{counters::Counters, sampler::LossSampler};

/// Multiplier applied to the loss probability after each detected loss,
/// modeling increasing transmission confidence.
pub const LOSS_DECAY: f64 = 0.3;

/// Fixed recovery interval between a detected loss and its retransmission.
pub const RECOVERY_INTERVAL: Duration = Duration::from_millis(300);

/// Upper bound on sampled attempts per transmission. The loss probability
/// decays geometrically and never reaches zero, so an unbounded retry loop
/// would only terminate probabilistically; after this many retries the
/// residual probability is below noise (100 · 0.3^16 ≈ 4e-6 %) and the final
/// attempt goes out unsampled.
pub const MAX_RETRIES: u32 = 16;

/// Simulates one logical packet transmission that may be lost and
/// retransmitted.
///
/// Transmission never fails: loss is a recoverable condition handled entirely
/// inside [`transmit`](Self::transmit) and surfaced only as warning-category
/// observations.
#[derive(Debug, Clone)]
pub struct UnreliableChannel {
    clock: Arc<dyn Clock>,
    sampler: Arc<dyn LossSampler>,
    observer: Arc<dyn Observer>,
    counters: Arc<Counters>,
    // Read only for the queue-length field of stats snapshots.
    queue: MailQueue,
}

impl UnreliableChannel {
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        sampler: Arc<dyn LossSampler>,
        observer: Arc<dyn Observer>,
        counters: Arc<Counters>,
        queue: MailQueue,
    ) -> Self {
        Self {
            clock,
            sampler,
            observer,
            counters,
            queue,
        }
    }

    /// Transmit `payload` and return `expected_ack` once it gets through.
    ///
    /// Each attempt counts as a new packet. A lost attempt increments the
    /// loss and retransmission counters, waits out [`RECOVERY_INTERVAL`],
    /// multiplies the loss probability by [`LOSS_DECAY`], and retries the
    /// same payload. Out-of-range loss percentages are clamped to `[0, 100]`.
    pub async fn transmit(
        &self,
        payload: &str,
        expected_ack: &str,
        network_delay: Duration,
        loss_percent: f64,
    ) -> String {
        let mut loss = loss_percent.clamp(0.0, 100.0);

        for _ in 0..MAX_RETRIES {
            self.counters.record_sent();
            self.report_stats();

            if self.sampler.sample() < loss {
                self.counters.record_loss();
                self.observer.on_log(
                    &format!(
                        "Packet lost carrying {payload:?} (loss probability {loss:.2}%), \
                         retransmitting"
                    ),
                    LogCategory::Warning,
                );
                self.report_stats();
                self.clock.sleep(RECOVERY_INTERVAL).await;
                loss *= LOSS_DECAY;
                continue;
            }

            self.clock.sleep(network_delay).await;
            return expected_ack.to_string();
        }

        // Retry bound reached; the residual probability has decayed below
        // noise, so the last attempt goes out unsampled.
        self.counters.record_sent();
        self.report_stats();
        self.clock.sleep(network_delay).await;
        expected_ack.to_string()
    }

    fn report_stats(&self) {
        self.observer
            .on_stats(self.counters.snapshot(self.queue.len()));
    }
}
