//! Simulated frame clock.
//!
//! The host loop owns real time. Everything inside the runtime reads this
//! clock instead, so a frame is reproducible from its sequence of deltas.

/// Default clamp for a single frame delta (seconds).
pub const DEFAULT_MAX_DELTA: f64 = 0.1;

/// Monotonic simulated clock advanced once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    now: f64,
    delta: f64,
    frame: u64,
    max_delta: f64,
}

impl FrameClock {
    /// Creates a clock at `t = 0`.
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(0.0)
    }

    /// Creates a clock at an arbitrary start time.
    #[must_use]
    pub const fn starting_at(now: f64) -> Self {
        Self {
            now,
            delta: 0.0,
            frame: 0,
            max_delta: DEFAULT_MAX_DELTA,
        }
    }

    /// Sets the maximum delta a single `advance` may apply.
    #[must_use]
    pub fn with_max_delta(mut self, max_delta: f64) -> Self {
        self.max_delta = max_delta.max(0.0);
        self
    }

    /// Current timestamp in seconds.
    #[inline]
    #[must_use]
    pub const fn now(&self) -> f64 {
        self.now
    }

    /// Delta applied by the last advance.
    #[inline]
    #[must_use]
    pub const fn delta(&self) -> f64 {
        self.delta
    }

    /// Number of advances so far.
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Advances by `dt` seconds, clamped to `[0, max_delta]`.
    ///
    /// Returns the new timestamp.
    pub fn advance(&mut self, dt: f64) -> f64 {
        // NaN falls through both comparisons and clamps to zero.
        let dt = if dt > 0.0 { dt.min(self.max_delta) } else { 0.0 };
        self.delta = dt;
        self.now += dt;
        self.frame += 1;
        self.now
    }

    /// Jumps to `t` without clamping. Earlier timestamps are ignored.
    pub fn advance_to(&mut self, t: f64) -> f64 {
        self.delta = if t > self.now { t - self.now } else { 0.0 };
        self.now += self.delta;
        self.frame += 1;
        self.now
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_clamps_large_delta() {
        let mut clock = FrameClock::new();
        clock.advance(5.0);
        assert!((clock.now() - DEFAULT_MAX_DELTA).abs() < 1e-12);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_clock_never_goes_backwards() {
        let mut clock = FrameClock::starting_at(2.0);
        clock.advance(-1.0);
        assert!((clock.now() - 2.0).abs() < 1e-12);
        clock.advance_to(1.0);
        assert!((clock.now() - 2.0).abs() < 1e-12);
        assert!(clock.delta().abs() < 1e-12);
        clock.advance_to(3.5);
        assert!((clock.delta() - 1.5).abs() < 1e-12);
    }
}
