/// Deterministic frame metadata.
///
/// This is the primary timebase for the engine runtime. Elapsed time is
/// supplied by the caller each frame rather than read from a wall clock, so
/// rendering and every cooperative timer advance in lockstep and a recorded
/// sequence of frames replays exactly.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Engine time at the start of the frame (milliseconds).
    pub time_ms: f64,
    /// Time elapsed since the previous frame (milliseconds).
    pub elapsed_ms: f64,
}

impl Frame {
    pub fn first() -> Self {
        Self {
            index: 0,
            time_ms: 0.0,
            elapsed_ms: 0.0,
        }
    }

    /// Advances by `elapsed_ms`; negative or non-finite deltas count as zero.
    pub fn next(self, elapsed_ms: f64) -> Self {
        let elapsed_ms = if elapsed_ms.is_finite() {
            elapsed_ms.max(0.0)
        } else {
            0.0
        };
        Self {
            index: self.index + 1,
            time_ms: self.time_ms + elapsed_ms,
            elapsed_ms,
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::first()
    }
}
