//! # Timer Scheduler
//!
//! Deferred callbacks keyed by absolute timestamp.
//!
//! ## Layout
//!
//! ```text
//!   heap: [h3, h1, h7, h2, ...]        binary min-heap of handles
//!            │
//!            ▼
//!   entries: SlotPool<TimerEntry>       due, seq, heap_pos, callback
//! ```
//!
//! Each entry records its own heap position, updated on every swap, so
//! `cancel` and `reschedule` start from the node instead of scanning.
//! Ordering is `(due, seq)`: equal timestamps fire in push order.

use std::cmp::Ordering;
use std::fmt;

use crate::memory::{SlotHandle, SlotPool};

/// Callback fired by [`TimerScheduler::process`].
///
/// Receives the host context passed to `process`.
pub type TimerCallback<C> = Box<dyn FnOnce(&mut C)>;

/// Handle to a scheduled timer.
///
/// Handles are generational: once a timer fires or is cancelled, its
/// handle is permanently stale and every operation on it is a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(SlotHandle);

/// How [`TimerScheduler::reschedule`] interprets its delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Reschedule {
    /// Adds the delta to the current due timestamp.
    #[default]
    Shift,
    /// Replaces the due timestamp with `now + delta`.
    FromNow,
}

struct TimerEntry<C> {
    due: f64,
    seq: u64,
    heap_pos: usize,
    callback: TimerCallback<C>,
}

/// Min-priority queue of deferred callbacks.
///
/// `C` is the context handed to callbacks when they fire; the frame
/// pipeline uses the widget engine so timers can drive widgets.
pub struct TimerScheduler<C> {
    entries: SlotPool<TimerEntry<C>>,
    heap: Vec<SlotHandle>,
    next_seq: u64,
}

impl<C> TimerScheduler<C> {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Creates an empty scheduler with room for `capacity` timers.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: SlotPool::with_capacity(capacity),
            heap: Vec::with_capacity(capacity),
            next_seq: 0,
        }
    }

    /// Number of pending timers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if nothing is pending.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Schedules `callback` to fire at `now + delay`.
    ///
    /// # Returns
    ///
    /// The timer handle, or `None` if storage could not grow. `None` means
    /// "not scheduled".
    pub fn push<F>(&mut self, now: f64, delay: f64, callback: F) -> Option<TimerHandle>
    where
        F: FnOnce(&mut C) + 'static,
    {
        if self.heap.try_reserve(1).is_err() {
            tracing::warn!("timer heap growth failed, callback not scheduled");
            return None;
        }

        let pos = self.heap.len();
        let seq = self.next_seq;
        let Some(handle) = self.entries.allocate(TimerEntry {
            due: now + delay,
            seq,
            heap_pos: pos,
            callback: Box::new(callback),
        }) else {
            tracing::warn!("timer entry allocation failed, callback not scheduled");
            return None;
        };

        self.next_seq += 1;
        self.heap.push(handle);
        self.sift_up(pos);
        Some(TimerHandle(handle))
    }

    /// Cancels a pending timer.
    ///
    /// Returns false if the handle was unknown, fired or already cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let Some(pos) = self.entries.get(handle.0).map(|e| e.heap_pos) else {
            return false;
        };
        self.remove_at(pos);
        self.entries.free(handle.0).is_some()
    }

    /// Moves a pending timer.
    ///
    /// With [`Reschedule::Shift`] the delta is added to the current due time;
    /// with [`Reschedule::FromNow`] the new due time is `now + delta`.
    /// Returns false if the handle is stale.
    pub fn reschedule(&mut self, handle: TimerHandle, delta: f64, mode: Reschedule, now: f64) -> bool {
        let Some(entry) = self.entries.get_mut(handle.0) else {
            return false;
        };
        let old = entry.due;
        entry.due = match mode {
            Reschedule::Shift => old + delta,
            Reschedule::FromNow => now + delta,
        };
        let (pos, new) = (entry.heap_pos, entry.due);

        if new < old {
            self.sift_up(pos);
        } else {
            self.sift_down(pos);
        }
        true
    }

    /// Fires every timer whose due timestamp is strictly before `now`.
    ///
    /// Timers fire in non-decreasing due order. Each callback is removed
    /// from the heap before it runs. Returns the number fired.
    pub fn process(&mut self, now: f64, ctx: &mut C) -> usize {
        let mut fired = 0;
        while let Some(&root) = self.heap.first() {
            let due = self.entries.get(root).map_or(f64::INFINITY, |e| e.due);
            if due >= now {
                break;
            }
            self.remove_at(0);
            if let Some(entry) = self.entries.free(root) {
                (entry.callback)(ctx);
                fired += 1;
            }
        }
        if fired > 0 {
            tracing::trace!(fired, pending = self.heap.len(), "timers processed");
        }
        fired
    }

    /// Returns true if the handle refers to a pending timer.
    #[must_use]
    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.entries.contains(handle.0)
    }

    /// Due timestamp of a pending timer.
    #[must_use]
    pub fn due_of(&self, handle: TimerHandle) -> Option<f64> {
        self.entries.get(handle.0).map(|e| e.due)
    }

    /// Due timestamp of the earliest pending timer.
    #[must_use]
    pub fn next_due(&self) -> Option<f64> {
        self.heap
            .first()
            .and_then(|&h| self.entries.get(h))
            .map(|e| e.due)
    }

    /// Drops every pending timer without firing it.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.entries.clear();
    }

    fn remove_at(&mut self, pos: usize) {
        let last = self.heap.len() - 1;
        if pos != last {
            self.swap_nodes(pos, last);
        }
        self.heap.pop();
        if pos < self.heap.len() {
            self.sift_up(pos);
            self.sift_down(pos);
        }
    }

    fn key(&self, pos: usize) -> (f64, u64) {
        self.entries
            .get(self.heap[pos])
            .map_or((f64::INFINITY, u64::MAX), |e| (e.due, e.seq))
    }

    fn less(&self, a: usize, b: usize) -> bool {
        let (due_a, seq_a) = self.key(a);
        let (due_b, seq_b) = self.key(b);
        due_a.total_cmp(&due_b).then(seq_a.cmp(&seq_b)) == Ordering::Less
    }

    fn swap_nodes(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        if let Some(e) = self.entries.get_mut(self.heap[a]) {
            e.heap_pos = a;
        }
        if let Some(e) = self.entries.get_mut(self.heap[b]) {
            e.heap_pos = b;
        }
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.less(pos, parent) {
                break;
            }
            self.swap_nodes(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut smallest = pos;
            if left < len && self.less(left, smallest) {
                smallest = left;
            }
            if right < len && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == pos {
                break;
            }
            self.swap_nodes(pos, smallest);
            pos = smallest;
        }
    }

    #[cfg(test)]
    fn is_valid_heap(&self) -> bool {
        (1..self.heap.len()).all(|pos| !self.less(pos, (pos - 1) / 2))
            && self
                .heap
                .iter()
                .enumerate()
                .all(|(pos, &h)| self.entries.get(h).is_some_and(|e| e.heap_pos == pos))
    }
}

impl<C> Default for TimerScheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for TimerScheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerScheduler")
            .field("pending", &self.heap.len())
            .field("next_due", &self.next_due())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Log = Vec<(u32, f64)>;

    fn record(id: u32, due: f64) -> impl FnOnce(&mut Log) {
        move |log: &mut Log| log.push((id, due))
    }

    /// Small LCG so the interleaving test is reproducible.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            self.0 >> 33
        }
    }

    #[test]
    fn test_process_fires_in_order_and_strictly_before_now() {
        let mut timers: TimerScheduler<Log> = TimerScheduler::new();
        for (id, delay) in [(1, 0.5), (2, 0.1), (3, 0.9), (4, 0.3), (5, 1.0)] {
            timers.push(0.0, delay, record(id, delay)).unwrap();
        }

        let mut log = Log::new();
        assert_eq!(timers.process(1.0, &mut log), 4);
        let ids: Vec<u32> = log.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![2, 4, 1, 3]);

        // due == now does not fire
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.next_due(), Some(1.0));
    }

    #[test]
    fn test_equal_timestamps_fire_fifo() {
        let mut timers: TimerScheduler<Log> = TimerScheduler::new();
        for id in 0..8 {
            timers.push(0.0, 0.25, record(id, 0.25)).unwrap();
        }
        let mut log = Log::new();
        timers.process(1.0, &mut log);
        let ids: Vec<u32> = log.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_cancel_and_stale_handles() {
        let mut timers: TimerScheduler<Log> = TimerScheduler::new();
        let a = timers.push(0.0, 0.1, record(1, 0.1)).unwrap();
        let b = timers.push(0.0, 0.2, record(2, 0.2)).unwrap();

        assert!(timers.cancel(a));
        assert!(!timers.cancel(a));
        assert!(!timers.is_scheduled(a));

        let mut log = Log::new();
        timers.process(1.0, &mut log);
        assert_eq!(log, vec![(2, 0.2)]);

        // Fired handles are stale too
        assert!(!timers.cancel(b));
        assert!(!timers.reschedule(b, 1.0, Reschedule::Shift, 1.0));
    }

    #[test]
    fn test_reschedule_moves_both_directions() {
        let mut timers: TimerScheduler<Log> = TimerScheduler::new();
        let a = timers.push(0.0, 0.1, record(1, 0.0)).unwrap();
        let b = timers.push(0.0, 0.5, record(2, 0.0)).unwrap();

        assert!(timers.reschedule(a, 1.0, Reschedule::Shift, 0.0));
        assert!((timers.due_of(a).unwrap() - 1.1).abs() < 1e-12);
        assert_eq!(timers.next_due(), Some(0.5));

        assert!(timers.reschedule(a, 0.05, Reschedule::FromNow, 0.0));
        assert_eq!(timers.next_due(), Some(0.05));
        assert!(timers.is_valid_heap());

        let mut log = Log::new();
        timers.process(0.3, &mut log);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].0, 1);
        assert!(timers.is_scheduled(b));
    }

    #[test]
    fn test_heap_property_under_interleaving() {
        let mut timers: TimerScheduler<Log> = TimerScheduler::new();
        let mut live = Vec::new();
        let mut rng = Lcg(0x5eed);

        for i in 0..2_000u32 {
            match rng.next() % 4 {
                0 | 1 => {
                    let delay = f64::from((rng.next() % 1000) as u32) / 100.0;
                    live.push(timers.push(0.0, delay, record(i, delay)).unwrap());
                }
                2 if !live.is_empty() => {
                    let idx = (rng.next() as usize) % live.len();
                    let handle = live.swap_remove(idx);
                    assert!(timers.cancel(handle));
                }
                3 if !live.is_empty() => {
                    let idx = (rng.next() as usize) % live.len();
                    let delta = f64::from((rng.next() % 200) as u32) / 100.0 - 1.0;
                    assert!(timers.reschedule(live[idx], delta, Reschedule::Shift, 0.0));
                }
                _ => {}
            }
            assert!(timers.is_valid_heap());
        }

        let expected = timers.len();
        let mut log = Log::new();
        let fired = timers.process(f64::MAX, &mut log);
        assert_eq!(fired, expected);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_callbacks_fire_exactly_once_in_due_order() {
        let mut timers: TimerScheduler<Vec<f64>> = TimerScheduler::new();
        let mut rng = Lcg(42);
        for _ in 0..500 {
            let delay = f64::from((rng.next() % 10_000) as u32) / 1000.0;
            timers.push(0.0, delay, move |seen: &mut Vec<f64>| seen.push(delay));
        }

        let mut seen = Vec::new();
        timers.process(5.0, &mut seen);
        timers.process(20.0, &mut seen);
        assert_eq!(seen.len(), 500);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }
}
