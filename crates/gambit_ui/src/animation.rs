//! Keyframe path engine.
//!
//! A [`Path`] is a queue of timestamped keypoints for one animated vector
//! plus the "current" vector blended from the pair that brackets `now`.
//!
//! ```text
//!   t:   0.0        1.0        2.5
//!        ●──────────●──────────●        keypoints
//!              ▲
//!             now  → current = lerp(k0, k1, (now - t0) / (t1 - t0))
//! ```
//!
//! All blending is linear. Keypoint timestamps are assumed non-decreasing;
//! callers own that ordering.

use std::sync::{Arc, Weak};

use gambit_core::TaskList;
use parking_lot::Mutex;

/// Maximum number of channels a path can carry.
pub const MAX_CHANNELS: usize = 8;

/// Named channel slots used by animated transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Channel {
    /// Position X.
    X = 0,
    /// Position Y.
    Y = 1,
    /// Scale X.
    ScaleX = 2,
    /// Scale Y.
    ScaleY = 3,
    /// Rotation (radians).
    Theta = 4,
    /// Camera blend factor.
    CameraBlend = 5,
    /// Extra X offset.
    OffsetX = 6,
    /// Extra Y offset.
    OffsetY = 7,
}

impl Channel {
    /// Slot index of this channel.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// One timestamped vector of channel values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    /// Absolute time at which the path reaches these values.
    pub timestamp: f64,
    values: [f32; MAX_CHANNELS],
    channels: usize,
}

impl Keypoint {
    /// Creates a keypoint. Missing values are zero, extra values are ignored.
    #[must_use]
    pub fn new(timestamp: f64, values: &[f32], channels: usize) -> Self {
        let channels = channels.clamp(1, MAX_CHANNELS);
        let mut slots = [0.0; MAX_CHANNELS];
        let n = values.len().min(channels);
        slots[..n].copy_from_slice(&values[..n]);
        Self {
            timestamp,
            values: slots,
            channels,
        }
    }

    /// Channel values.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values[..self.channels]
    }

    /// Mutable channel values.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values[..self.channels]
    }

    /// Value of one channel, zero if the path does not carry it.
    #[inline]
    #[must_use]
    pub fn get(&self, channel: Channel) -> f32 {
        self.values().get(channel.index()).copied().unwrap_or(0.0)
    }

    /// Sets one channel. Ignored if the path does not carry it.
    #[inline]
    pub fn set(&mut self, channel: Channel, value: f32) {
        if let Some(slot) = self.values_mut().get_mut(channel.index()) {
            *slot = value;
        }
    }
}

/// Result of a [`Path::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStatus {
    /// Single point, nothing to blend.
    Resting,
    /// Blending between two keypoints.
    Moving,
    /// Reached the final keypoint during this update.
    Arrived,
    /// Blending inside a loop.
    Looping,
}

/// Callback fired when a path reaches its final keypoint.
///
/// Runs on whichever thread performs the blend.
pub type CompletionCallback = Box<dyn FnMut() + Send>;

/// Timed queue of keypoints with a blended current vector.
///
/// Invariants:
/// - at least one keypoint is always queued
/// - with exactly one keypoint, `current` equals it
/// - loop mode requires two or more keypoints
pub struct Path {
    points: Vec<Keypoint>,
    channels: usize,
    current: [f32; MAX_CHANNELS],
    loop_period: Option<f64>,
    loop_cursor: usize,
    on_complete: Option<CompletionCallback>,
}

impl Path {
    /// Creates a resting path at `values`.
    #[must_use]
    pub fn new(channels: usize, values: &[f32], now: f64) -> Self {
        let point = Keypoint::new(now, values, channels);
        let mut points = Vec::with_capacity(4);
        points.push(point);
        Self {
            channels: point.channels,
            current: point.values,
            points,
            loop_period: None,
            loop_cursor: 0,
            on_complete: None,
        }
    }

    /// Number of channels.
    #[inline]
    #[must_use]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of queued keypoints (never zero).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; a path degenerates to a single point, never to nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns true if there is nothing left to blend.
    #[inline]
    #[must_use]
    pub fn is_resting(&self) -> bool {
        self.points.len() == 1
    }

    /// Returns true if loop mode is on.
    #[inline]
    #[must_use]
    pub fn is_looping(&self) -> bool {
        self.loop_period.is_some()
    }

    /// Loop period, if looping.
    #[must_use]
    pub fn loop_period(&self) -> Option<f64> {
        self.loop_period
    }

    /// The blended vector from the last update.
    #[inline]
    #[must_use]
    pub fn current(&self) -> &[f32] {
        &self.current[..self.channels]
    }

    /// One channel of the blended vector.
    #[inline]
    #[must_use]
    pub fn current_value(&self, channel: Channel) -> f32 {
        self.current().get(channel.index()).copied().unwrap_or(0.0)
    }

    /// Queued keypoint by index.
    #[must_use]
    pub fn keypoint(&self, index: usize) -> Option<&Keypoint> {
        self.points.get(index)
    }

    /// Final queued keypoint: where the path is heading.
    #[must_use]
    pub fn destination(&self) -> &Keypoint {
        // Non-empty by construction.
        &self.points[self.points.len() - 1]
    }

    /// Mutable access to the final queued keypoint.
    pub fn destination_mut(&mut self) -> &mut Keypoint {
        let last = self.points.len() - 1;
        &mut self.points[last]
    }

    /// Installs the completion callback.
    pub fn on_complete<F>(&mut self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
    }

    /// Removes the completion callback.
    pub fn clear_on_complete(&mut self) {
        self.on_complete = None;
    }

    /// Collapses the path to one point at `now`, dropping queued keypoints.
    pub fn set(&mut self, values: &[f32], now: f64) {
        let point = Keypoint::new(now, values, self.channels);
        self.points.clear();
        self.points.push(point);
        self.current = point.values;
        self.loop_period = None;
        self.loop_cursor = 0;
    }

    /// Appends a keypoint and returns it for the caller to stamp.
    ///
    /// The new keypoint starts with the previous keypoint's timestamp; set
    /// `timestamp` to when the path should arrive. When this is the second
    /// point, the first point is re-stamped to `now` so the transition starts
    /// when it is queued. A looping path is caught at `now` first.
    ///
    /// # Returns
    ///
    /// `None` if the keypoint buffer could not grow; the path is unchanged.
    pub fn push_keypoint(&mut self, values: &[f32], now: f64) -> Option<&mut Keypoint> {
        if self.is_looping() {
            self.interrupt(now);
        }
        if self.points.try_reserve(1).is_err() {
            tracing::warn!("keypoint buffer growth failed, animation step skipped");
            return None;
        }

        if self.points.len() == 1 {
            self.points[0].timestamp = now;
        }
        let previous = self.destination().timestamp;
        self.points.push(Keypoint::new(previous, values, self.channels));
        Some(self.destination_mut())
    }

    /// Advances the blend to `now`.
    pub fn update(&mut self, now: f64) -> PathStatus {
        if self.points.len() >= 2 && self.loop_period.is_some() {
            self.update_looping(now);
            return PathStatus::Looping;
        }

        if self.points.len() == 1 {
            self.current = self.points[0].values;
            return PathStatus::Resting;
        }

        // Drop segments wholly in the past, keeping the bracketing pair.
        let mut consumed = 0;
        while self.points.len() - consumed >= 2 && self.points[consumed + 1].timestamp <= now {
            consumed += 1;
        }
        if consumed > 0 {
            self.points.drain(..consumed);
        }

        if self.points.len() == 1 {
            self.current = self.points[0].values;
            if let Some(callback) = self.on_complete.as_mut() {
                callback();
            }
            return PathStatus::Arrived;
        }

        self.blend(0, 1, now);
        PathStatus::Moving
    }

    /// Catches an in-flight animation.
    ///
    /// Blends to `now`, then replaces the queue with a single point equal to
    /// the blended vector and leaves loop mode.
    pub fn interrupt(&mut self, now: f64) {
        self.update(now);
        let point = Keypoint {
            timestamp: now,
            values: self.current,
            channels: self.channels,
        };
        self.points.clear();
        self.points.push(point);
        self.loop_period = None;
        self.loop_cursor = 0;
    }

    /// Starts looping over the queued keypoints.
    ///
    /// The period is the keypoint span plus `offset`, the time spent
    /// travelling from the last keypoint back to the first. Keypoints are
    /// advanced by whole periods until the cursor brackets `now`.
    ///
    /// Returns false (and changes nothing) with fewer than two keypoints or
    /// a non-positive period.
    ///
    /// Re-entering a running loop keeps its keypoints and phase and only
    /// changes the offset.
    pub fn enter_loop(&mut self, offset: f64, now: f64) -> bool {
        if self.points.len() < 2 {
            return false;
        }
        let (first, last) = self.loop_span();
        let period = last - first + offset;
        if period.is_nan() || period <= 0.0 {
            return false;
        }

        self.unwind_loop();
        self.loop_period = Some(period);
        self.loop_cursor = 0;
        self.update_looping(now);
        true
    }

    /// Leaves loop mode, freezing the path where it is at `now`.
    pub fn exit_loop(&mut self, now: f64) {
        if self.is_looping() {
            self.interrupt(now);
        }
    }

    /// First and last keypoint timestamps in queue order, ignoring the
    /// whole periods a running loop has already added.
    fn loop_span(&self) -> (f64, f64) {
        match self.loop_period {
            Some(period) if self.loop_cursor > 0 => (
                self.points[0].timestamp - period,
                self.destination().timestamp,
            ),
            _ => (self.points[0].timestamp, self.destination().timestamp),
        }
    }

    /// Moves keypoints the loop cursor has passed back by one period so the
    /// queue is in timestamp order again.
    fn unwind_loop(&mut self) {
        if let Some(period) = self.loop_period {
            for point in &mut self.points[..self.loop_cursor] {
                point.timestamp -= period;
            }
        }
        self.loop_cursor = 0;
    }

    fn update_looping(&mut self, now: f64) {
        let Some(period) = self.loop_period else {
            return;
        };
        let n = self.points.len();

        // Skip whole periods in one step after a long stall.
        let behind = now - self.points[self.loop_cursor].timestamp;
        if behind >= period {
            let shift = (behind / period).floor() * period;
            for point in &mut self.points {
                point.timestamp += shift;
            }
        }

        let mut next = (self.loop_cursor + 1) % n;
        while now >= self.points[next].timestamp {
            self.points[self.loop_cursor].timestamp += period;
            self.loop_cursor = next;
            next = (next + 1) % n;
        }

        self.blend(self.loop_cursor, next, now);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn blend(&mut self, from: usize, to: usize, now: f64) {
        let a = self.points[from];
        let b = self.points[to];
        let span = b.timestamp - a.timestamp;
        let t = if span > 0.0 {
            ((now - a.timestamp) / span).clamp(0.0, 1.0) as f32
        } else {
            1.0
        };
        for c in 0..self.channels {
            self.current[c] = a.values[c] + (b.values[c] - a.values[c]) * t;
        }
    }
}

impl std::fmt::Debug for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Path")
            .field("channels", &self.channels)
            .field("points", &self.points)
            .field("current", &self.current())
            .field("loop_period", &self.loop_period)
            .finish_non_exhaustive()
    }
}

/// A path shared between its owner and the blend workers.
pub type SharedPath = Arc<Mutex<Path>>;

/// Engine-owned registry of every live path.
///
/// Holds weak references only: dropping the last [`SharedPath`] retires the
/// path, and the next prune forgets it.
#[derive(Default)]
pub struct PathRegistry {
    paths: Vec<Weak<Mutex<Path>>>,
}

impl PathRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps and tracks a path.
    pub fn register(&mut self, path: Path) -> SharedPath {
        let shared = Arc::new(Mutex::new(path));
        self.track(&shared);
        shared
    }

    /// Tracks an existing shared path (for external animation drivers).
    pub fn track(&mut self, path: &SharedPath) {
        self.paths.push(Arc::downgrade(path));
    }

    /// Forgets retired paths. Returns the live count.
    pub fn prune(&mut self) -> usize {
        self.paths.retain(|weak| weak.strong_count() > 0);
        self.paths.len()
    }

    /// Number of tracked entries, including any not yet pruned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns true if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Builds one blend task per active path.
    ///
    /// Resting paths are skipped: their current vector cannot change.
    pub fn blend_tasks(&mut self, now: f64) -> TaskList {
        self.prune();
        let mut tasks = TaskList::with_capacity(self.paths.len());
        for path in self.paths.iter().filter_map(Weak::upgrade) {
            if path.lock().is_resting() {
                continue;
            }
            tasks.push(move || {
                path.lock().update(now);
            });
        }
        tasks
    }

    /// Blends every active path on the calling thread.
    pub fn blend_all(&mut self, now: f64) {
        self.blend_tasks(now).run_inline();
    }
}

impl std::fmt::Debug for PathRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathRegistry").field("tracked", &self.paths.len()).finish()
    }
}
