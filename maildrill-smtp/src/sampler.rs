//! Loss sampling for the unreliable channel.
//!
//! An attempt is declared lost when the sampled value falls *below* the
//! current loss probability, so low samples mean loss and high samples mean a
//! clean transmission.

use std::collections::VecDeque;

use parking_lot::Mutex;
use rand::Rng;

/// Source of uniform samples in `[0, 100)`.
pub trait LossSampler: Send + Sync + std::fmt::Debug {
    fn sample(&self) -> f64;
}

/// Production sampler backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSampler;

impl LossSampler for ThreadRngSampler {
    fn sample(&self) -> f64 {
        rand::rng().random_range(0.0..100.0)
    }
}

/// Scripted sampler for deterministic tests.
///
/// Returns the queued samples in order; once exhausted it returns `100.0`,
/// which no loss probability can exceed, so every further attempt succeeds.
#[derive(Debug, Default)]
pub struct SequenceSampler {
    samples: Mutex<VecDeque<f64>>,
}

impl SequenceSampler {
    #[must_use]
    pub fn new(samples: impl IntoIterator<Item = f64>) -> Self {
        Self {
            samples: Mutex::new(samples.into_iter().collect()),
        }
    }

    /// A sampler that scripts exactly `losses` consecutive lost attempts.
    #[must_use]
    pub fn losing(losses: usize) -> Self {
        Self::new(std::iter::repeat_n(0.0, losses))
    }

    /// Remaining scripted samples.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.samples.lock().len()
    }
}

impl LossSampler for SequenceSampler {
    fn sample(&self) -> f64 {
        self.samples.lock().pop_front().unwrap_or(100.0)
    }
}
