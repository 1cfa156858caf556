use tracing::trace;

/// Cooperative countdown timer for debouncing.
///
/// The timer never reads a clock. It is decremented by the same elapsed time
/// that drives rendering, so debounce cadence stays coupled to frame cadence
/// and is deterministic under replay. Scheduling while a countdown is pending
/// replaces it, coalescing bursts into a single firing.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct DebounceTimer {
    remaining_ms: f64,
    scheduled: bool,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the timer to fire after `delay_ms`, replacing any pending countdown.
    ///
    /// A zero delay fires on the next [`DebounceTimer::tick`], whatever its
    /// elapsed time.
    pub fn schedule(&mut self, delay_ms: f64) {
        if self.scheduled {
            trace!(
                replaced_remaining_ms = self.remaining_ms,
                delay_ms, "debounce rescheduled"
            );
        }
        self.remaining_ms = delay_ms.max(0.0);
        self.scheduled = true;
    }

    pub fn cancel(&mut self) {
        self.scheduled = false;
        self.remaining_ms = 0.0;
    }

    pub fn is_pending(&self) -> bool {
        self.scheduled
    }

    pub fn remaining_ms(&self) -> f64 {
        if self.scheduled { self.remaining_ms } else { 0.0 }
    }

    /// Whether a [`DebounceTimer::tick`] by `elapsed_ms` would fire.
    pub fn fires_within(&self, elapsed_ms: f64) -> bool {
        if !self.scheduled {
            return false;
        }
        let elapsed_ms = if elapsed_ms.is_finite() { elapsed_ms } else { 0.0 };
        self.remaining_ms - elapsed_ms <= 0.0
    }

    /// Advances by `elapsed_ms`.
    ///
    /// Returns `true` exactly once per schedule, on the tick where the
    /// countdown reaches zero.
    pub fn tick(&mut self, elapsed_ms: f64) -> bool {
        if !self.scheduled {
            return false;
        }
        if elapsed_ms.is_finite() {
            self.remaining_ms = (self.remaining_ms - elapsed_ms).max(0.0);
        }
        if self.remaining_ms > 0.0 {
            return false;
        }
        self.scheduled = false;
        true
    }
}
