//! Recipient reachability flag.

use std::sync::atomic::{AtomicBool, Ordering};

/// Shared recipient-availability flag.
///
/// The flag itself carries no queue logic; the engine reacts to transitions
/// (a flip to available triggers a flush, a flip to unavailable leaves the
/// queue untouched).
#[derive(Debug)]
pub struct Availability {
    available: AtomicBool,
}

impl Default for Availability {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Availability {
    #[must_use]
    pub const fn new(initially_available: bool) -> Self {
        Self {
            available: AtomicBool::new(initially_available),
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Set the flag, returning `true` when this was an actual transition.
    pub fn set(&self, available: bool) -> bool {
        self.available.swap(available, Ordering::SeqCst) != available
    }

    /// Flip the flag, returning the new value.
    pub fn toggle(&self) -> bool {
        !self.available.fetch_not(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_and_reports_new_value() {
        let availability = Availability::new(true);
        assert!(!availability.toggle());
        assert!(!availability.is_available());
        assert!(availability.toggle());
        assert!(availability.is_available());
    }

    #[test]
    fn set_reports_transitions_only() {
        let availability = Availability::new(true);
        assert!(!availability.set(true));
        assert!(availability.set(false));
        assert!(!availability.set(false));
        assert!(availability.set(true));
    }
}
