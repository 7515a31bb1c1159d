//! Simulated-time abstraction.
//!
//! Every suspension point in the engine (network delay, relay processing
//! delay, recovery interval, availability probe, per-message flush delay) goes
//! through a [`Clock`], so tests can swap real sleeping for a virtual clock
//! that advances instantly and records what was requested.

use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use async_trait::async_trait;
use parking_lot::Mutex;

/// A source of "now" and of cooperative sleeps.
#[async_trait]
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Suspend the caller for `duration` of simulated time.
    async fn sleep(&self, duration: Duration);

    /// The current simulated wall-clock time.
    fn now(&self) -> SystemTime;
}

/// Production clock: real sleeps via tokio, real `SystemTime`.
///
/// Under `tokio::time::pause()` the sleeps auto-advance, so even wall-clock
/// based tests need not wait.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

#[async_trait]
impl Clock for WallClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Test clock: sleeps return immediately, advancing an internal offset and
/// recording every requested duration in order.
#[derive(Debug, Clone)]
pub struct VirtualClock {
    base: SystemTime,
    state: Arc<Mutex<VirtualState>>,
}

#[derive(Debug, Default)]
struct VirtualState {
    elapsed: Duration,
    sleeps: Vec<Duration>,
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self {
            base: SystemTime::UNIX_EPOCH,
            state: Arc::new(Mutex::new(VirtualState::default())),
        }
    }
}

impl VirtualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total simulated time slept so far.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.state.lock().elapsed
    }

    /// Every sleep requested so far, in call order.
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.state.lock().sleeps.clone()
    }
}

#[async_trait]
impl Clock for VirtualClock {
    async fn sleep(&self, duration: Duration) {
        let mut state = self.state.lock();
        state.elapsed += duration;
        state.sleeps.push(duration);
    }

    fn now(&self) -> SystemTime {
        self.base + self.state.lock().elapsed
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn virtual_clock_records_sleeps_in_order() {
        let clock = VirtualClock::new();
        clock.sleep(Duration::from_millis(500)).await;
        clock.sleep(Duration::from_secs(1)).await;

        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_millis(500), Duration::from_secs(1)]
        );
        assert_eq!(clock.elapsed(), Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn virtual_clock_now_advances_with_sleeps() {
        let clock = VirtualClock::new();
        let before = clock.now();
        clock.sleep(Duration::from_secs(42)).await;
        let after = clock.now();

        assert_eq!(
            after.duration_since(before).expect("time moved forward"),
            Duration::from_secs(42)
        );
    }
}
