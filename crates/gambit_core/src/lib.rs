//! # GAMBIT Core Kernel
//!
//! The engine-agnostic half of the frame runtime:
//! - A simulated frame clock every other system keys off
//! - An indexed min-heap of deferred callbacks
//! - A generational slot pool for stable handles
//! - A fixed worker pool with a join barrier
//!
//! ## Frame Rules
//!
//! 1. **One clock** - scheduler and paths read the same `now`
//! 2. **Barrier before interaction** - all queued tasks finish before `wait()` returns
//! 3. **No aborts** - growth failure is reported as `None`, never a crash
//!
//! ## Example
//!
//! ```rust,ignore
//! use gambit_core::{FrameClock, TimerScheduler};
//!
//! let mut clock = FrameClock::new();
//! let mut timers: TimerScheduler<u32> = TimerScheduler::new();
//! timers.push(clock.now(), 0.5, |hits| *hits += 1);
//! clock.advance(1.0);
//! let mut hits = 0;
//! timers.process(clock.now(), &mut hits);
//! ```

#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod memory;
pub mod sync;
pub mod time;
pub mod timer;

pub use error::{CoreError, CoreResult};
pub use memory::{SlotHandle, SlotPool};
pub use sync::{Task, TaskList, WorkerPool};
pub use time::FrameClock;
pub use timer::{Reschedule, TimerHandle, TimerScheduler};
