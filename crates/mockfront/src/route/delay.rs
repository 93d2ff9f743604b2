//! Simulated response latency.

use super::types::RuleRecord;
use crate::config::DelaySpec;
use rand::Rng;
use std::time::Duration;

/// Inclusive latency bounds of a rule. `max` is never below `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl DelayRange {
    /// Build a range; an inverted range collapses to a fixed `min`.
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    pub fn fixed(delay: Duration) -> Self {
        Self::new(delay, delay)
    }

    /// Resolve the document's delay setting. No setting means no delay.
    pub fn from_spec(spec: Option<&DelaySpec>) -> Self {
        match spec {
            Some(spec) => {
                let (min_ms, max_ms) = spec.bounds_ms();
                Self::new(Duration::from_millis(min_ms), Duration::from_millis(max_ms))
            }
            None => Self::default(),
        }
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    /// Draw a delay from the calling thread's RNG.
    pub fn sample(&self) -> Duration {
        self.sample_with(&mut rand::thread_rng())
    }

    /// Draw a delay uniformly from `[min, max]` using `rng`.
    pub fn sample_with<R: Rng>(&self, rng: &mut R) -> Duration {
        if self.is_fixed() {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

/// Latency to wait before answering with `record`.
pub fn simulated_delay(record: &RuleRecord) -> Duration {
    record.delay().sample()
}
