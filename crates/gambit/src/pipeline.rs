//! # GAMBIT Frame Pipeline
//!
//! One frame, in order:
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. CLOCK                                                            │
//! │    └─ Advance simulated time (clamped delta)                        │
//! │                                                                     │
//! │ 2. INPUT                                                            │
//! │    └─ Drain the input queue into the widget engine                  │
//! │                                                                     │
//! │ 3. WORK (worker pool)                                               │
//! │    ├─ One blend task per active keyframe path                       │
//! │    ├─ One update task per widget with an update hook                │
//! │    └─ BARRIER: wait() until every task has finished                 │
//! │                                                                     │
//! │ 4. INTERACTION (main thread)                                        │
//! │    └─ Pick + hover/click/drag/drop/snap state machine               │
//! │                                                                     │
//! │ 5. TIMERS                                                           │
//! │    ├─ Fire every callback due strictly before now                   │
//! │    └─ Move work deferred by hooks and timers onto the heap          │
//! │                                                                     │
//! │ 6. DRAW                                                             │
//! │    └─ Record draw commands in widget list order                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::{Duration, Instant};

use gambit_core::{FrameClock, Reschedule, TimerHandle, TimerScheduler, WorkerPool};
use gambit_ui::{DeferredCall, DrawList, InputEvent, WidgetEngine};

use crate::config::EngineConfig;
use crate::error::GambitResult;
use crate::input::{InputQueue, InputSender};

/// Target frame time for 60 FPS.
pub const TARGET_FRAME_TIME: Duration = Duration::from_micros(16_666);

/// Timers whose callbacks act on the widget engine.
pub type EngineTimers = TimerScheduler<WidgetEngine>;

/// Timing and counts for one frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameStats {
    /// Frame number.
    pub frame: u64,
    /// Simulated time of the frame.
    pub now: f64,
    /// Input events handled.
    pub events: u32,
    /// Tasks dispatched to the worker pool.
    pub tasks: u32,
    /// Timers fired.
    pub timers_fired: u32,
    /// Worker phase, including the barrier, in microseconds.
    pub work_us: u64,
    /// Interaction phase in microseconds.
    pub interaction_us: u64,
    /// Timer phase in microseconds.
    pub timers_us: u64,
    /// Draw phase in microseconds.
    pub draw_us: u64,
    /// Whole frame in microseconds.
    pub total_us: u64,
}

/// The per-frame orchestrator.
///
/// Owns the clock, the worker pool, the widget engine and the timer heap,
/// and runs them in the fixed order above.
pub struct FramePipeline {
    clock: FrameClock,
    pool: WorkerPool,
    engine: WidgetEngine,
    timers: EngineTimers,
    input: InputQueue,
    draw_list: DrawList,
    stats: FrameStatsAccumulator,
}

impl FramePipeline {
    /// Builds a pipeline from a configuration.
    ///
    /// # Errors
    ///
    /// [`crate::GambitError::Config`] if the configuration is out of range,
    /// [`crate::GambitError::Core`] if the worker threads cannot be spawned.
    pub fn new(config: &EngineConfig) -> GambitResult<Self> {
        config.validate()?;
        let pool = WorkerPool::new(config.workers)?;
        tracing::info!(
            workers = pool.size(),
            pick = ?config.pick_strategy,
            "frame pipeline ready"
        );
        Ok(Self {
            clock: FrameClock::new().with_max_delta(config.max_frame_delta),
            pool,
            engine: WidgetEngine::new(config.interaction_settings()),
            timers: EngineTimers::new(),
            input: InputQueue::new(config.input_capacity),
            draw_list: DrawList::new(),
            stats: FrameStatsAccumulator::new(),
        })
    }

    /// Loads a TOML config file and builds a pipeline from it.
    ///
    /// # Errors
    ///
    /// Configuration or worker spawn failures.
    pub fn from_config_file(path: impl AsRef<std::path::Path>) -> GambitResult<Self> {
        let config = EngineConfig::load(path)?;
        Self::new(&config)
    }

    /// Current simulated time.
    #[inline]
    #[must_use]
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// The frame clock.
    #[must_use]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// The widget engine.
    #[must_use]
    pub fn engine(&self) -> &WidgetEngine {
        &self.engine
    }

    /// Mutable widget engine, for creating widgets between frames.
    pub fn engine_mut(&mut self) -> &mut WidgetEngine {
        &mut self.engine
    }

    /// The worker pool.
    #[must_use]
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Mutable timer heap.
    pub fn timers_mut(&mut self) -> &mut EngineTimers {
        &mut self.timers
    }

    /// Draw commands recorded by the last frame.
    #[must_use]
    pub fn draw_list(&self) -> &DrawList {
        &self.draw_list
    }

    /// Accumulated frame statistics.
    #[must_use]
    pub fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats
    }

    /// A sender for feeding input from another thread.
    #[must_use]
    pub fn input_sender(&self) -> InputSender {
        self.input.sender()
    }

    /// Handles one input event immediately, at the current time.
    pub fn handle_event(&mut self, event: &InputEvent) {
        self.engine.event_handler(event, self.clock.now());
    }

    /// Schedules `callback` to run `delay` seconds from now.
    ///
    /// Returns `None` if the timer heap could not grow.
    pub fn schedule<F>(&mut self, delay: f64, callback: F) -> Option<TimerHandle>
    where
        F: FnOnce(&mut WidgetEngine) + 'static,
    {
        self.timers.push(self.clock.now(), delay, callback)
    }

    /// Cancels a pending timer.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.timers.cancel(handle)
    }

    /// Moves a pending timer by `delta` seconds.
    pub fn reschedule(&mut self, handle: TimerHandle, delta: f64) -> bool {
        self.timers
            .reschedule(handle, delta, Reschedule::Shift, self.clock.now())
    }

    /// Advances the clock by `dt` (clamped) and runs one frame.
    pub fn frame(&mut self, dt: f64) -> FrameStats {
        self.clock.advance(dt);
        self.run_frame()
    }

    /// Jumps the clock to `now` (unclamped) and runs one frame.
    pub fn frame_at(&mut self, now: f64) -> FrameStats {
        self.clock.advance_to(now);
        self.run_frame()
    }

    fn run_frame(&mut self) -> FrameStats {
        let frame_start = Instant::now();
        let now = self.clock.now();

        let mut events = 0u32;
        for event in self.input.drain() {
            self.engine.event_handler(&event, now);
            events += 1;
        }

        let work_start = Instant::now();
        let tasks = self.engine.widget_work(now);
        let task_count = tasks.len();
        self.pool.submit_batch(tasks);
        self.pool.wait();
        let work_us = elapsed_us(work_start);

        let interaction_start = Instant::now();
        self.engine.update(now);
        let interaction_us = elapsed_us(interaction_start);

        let timers_start = Instant::now();
        let fired = self.timers.process(now, &mut self.engine);
        self.schedule_deferred(now);
        let timers_us = elapsed_us(timers_start);

        let draw_start = Instant::now();
        self.draw_list.clear();
        self.engine.draw(&mut self.draw_list);
        let draw_us = elapsed_us(draw_start);

        let stats = FrameStats {
            frame: self.clock.frame(),
            now,
            events,
            tasks: u32::try_from(task_count).unwrap_or(u32::MAX),
            timers_fired: u32::try_from(fired).unwrap_or(u32::MAX),
            work_us,
            interaction_us,
            timers_us,
            draw_us,
            total_us: elapsed_us(frame_start),
        };
        self.stats.record(stats);

        if stats.total_us > u64::try_from(TARGET_FRAME_TIME.as_micros()).unwrap_or(u64::MAX) {
            tracing::debug!(frame = stats.frame, total_us = stats.total_us, "frame over budget");
        }
        stats
    }

    fn schedule_deferred(&mut self, now: f64) {
        for DeferredCall { delay, callback } in self.engine.take_deferred() {
            if self.timers.push(now, delay, callback).is_none() {
                tracing::warn!(delay, "deferred call dropped");
            }
        }
    }
}

impl std::fmt::Debug for FramePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramePipeline")
            .field("clock", &self.clock)
            .field("pool", &self.pool)
            .field("engine", &self.engine)
            .field("timers", &self.timers.len())
            .finish_non_exhaustive()
    }
}

fn elapsed_us(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_micros()).unwrap_or(u64::MAX)
}

/// Accumulator for frame statistics.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Sum of total frame times.
    pub total_us_sum: u64,
    /// Sum of worker phase times.
    pub work_us_sum: u64,
    /// Sum of interaction phase times.
    pub interaction_us_sum: u64,
    /// Sum of draw phase times.
    pub draw_us_sum: u64,
    /// Tasks dispatched over all frames.
    pub tasks_sum: u64,
    /// Timers fired over all frames.
    pub timers_fired_sum: u64,
    /// Min frame time.
    pub min_frame_us: u64,
    /// Max frame time.
    pub max_frame_us: u64,
    /// Frames that exceeded budget.
    pub frames_over_budget: u64,
}

impl FrameStatsAccumulator {
    /// Creates a new accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames_recorded: 0,
            total_us_sum: 0,
            work_us_sum: 0,
            interaction_us_sum: 0,
            draw_us_sum: 0,
            tasks_sum: 0,
            timers_fired_sum: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
        }
    }

    /// Records a frame's statistics.
    pub fn record(&mut self, stats: FrameStats) {
        self.frames_recorded += 1;
        self.total_us_sum += stats.total_us;
        self.work_us_sum += stats.work_us;
        self.interaction_us_sum += stats.interaction_us;
        self.draw_us_sum += stats.draw_us;
        self.tasks_sum += u64::from(stats.tasks);
        self.timers_fired_sum += u64::from(stats.timers_fired);
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);

        if u128::from(stats.total_us) > TARGET_FRAME_TIME.as_micros() {
            self.frames_over_budget += 1;
        }
    }

    /// Returns average frame time in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_frame_ms(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Returns average FPS.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        let avg_ms = self.avg_frame_ms();
        if avg_ms <= 0.0 {
            return 0.0;
        }
        1000.0 / avg_ms
    }

    /// Returns the fraction of frames over budget.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
