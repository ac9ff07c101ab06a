use std::sync::atomic::{AtomicU16, Ordering};

use crate::ports::PortSource;

// ============================================================================
// SequentialPortSource - Deterministic source for development
// ============================================================================

/// Port source walking the port space from a starting point, wrapping and
/// skipping zero. Deterministic, so collisions across runs are expected;
/// prefer `RandomPortSource` in production.
#[derive(Debug)]
pub struct SequentialPortSource {
    next: AtomicU16,
}

impl SequentialPortSource {
    /// Start handing out ports at `start` (zero is bumped to one).
    #[must_use]
    pub fn new(start: u16) -> Self {
        Self {
            next: AtomicU16::new(start.max(1)),
        }
    }
}

impl Default for SequentialPortSource {
    fn default() -> Self {
        // Past the well-known range.
        Self::new(1024)
    }
}

impl PortSource for SequentialPortSource {
    fn next_port(&self) -> u16 {
        loop {
            let port = self.next.fetch_add(1, Ordering::Relaxed);
            if port != 0 {
                return port;
            }
        }
    }
}

// ============================================================================
// RandomPortSource - Production source (requires "network" feature)
// ============================================================================

#[cfg(feature = "network")]
mod random_source {
    use super::PortSource;
    use rand::Rng;

    /// Uniform random draws over `1..=65535`, matching the original's
    /// pseudo-random generator contract.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct RandomPortSource;

    impl RandomPortSource {
        /// Create a new random source.
        #[must_use]
        pub fn new() -> Self {
            Self
        }
    }

    impl PortSource for RandomPortSource {
        fn next_port(&self) -> u16 {
            rand::thread_rng().gen_range(1..=u16::MAX)
        }
    }
}

#[cfg(feature = "network")]
pub use random_source::RandomPortSource;
