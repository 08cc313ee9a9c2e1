//! Cooperative wall-clock budget for one proof attempt.
use instant::{Duration, Instant};

/// A point in time after which expensive operations stop early.
///
/// Nothing is preempted: merge propagation, interning and the normalizer
/// fixpoints poll [`Deadline::is_past`] between steps and return a no-op
/// result once it trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Default for Deadline {
    fn default() -> Self {
        Self::never()
    }
}

impl Deadline {
    pub fn never() -> Self {
        Deadline(None)
    }

    pub fn at(instant: Instant) -> Self {
        Deadline(Some(instant))
    }

    pub fn after(budget: Duration) -> Self {
        // an overflowing budget is as good as no budget
        Deadline(Instant::now().checked_add(budget))
    }

    /// A deadline that has already elapsed.
    pub fn expired() -> Self {
        Self::at(Instant::now())
    }

    pub fn is_past(&self) -> bool {
        match self.0 {
            Some(instant) => Instant::now() >= instant,
            None => false,
        }
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.0
            .map(|instant| instant.saturating_duration_since(Instant::now()))
    }
}
