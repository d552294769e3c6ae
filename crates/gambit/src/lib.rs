//! # GAMBIT
//!
//! A real-time interactive widget runtime, ready to be driven by a host
//! window loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              GAMBIT                                     │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐    │
//! │  │   gambit_core   │     │   gambit_ui     │     │   gambit        │    │
//! │  │                 │────>│                 │────>│                 │    │
//! │  │  • Frame clock  │     │  • Keyframes    │     │  • Pipeline     │    │
//! │  │  • Timer heap   │     │  • Style        │     │  • Config       │    │
//! │  │  • Slot pool    │     │  • Picking      │     │  • Input queue  │    │
//! │  │  • Worker pool  │     │  • Interaction  │     │  • Frame stats  │    │
//! │  └─────────────────┘     └─────────────────┘     └─────────────────┘    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use gambit::{EngineConfig, FramePipeline, InputEvent};
//!
//! let mut pipeline = FramePipeline::new(&EngineConfig::default())?;
//! let sender = pipeline.input_sender();
//! sender.send(InputEvent::MouseMove { x: 10.0, y: 10.0 });
//! let stats = pipeline.frame(1.0 / 60.0);
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod pipeline;

pub use gambit_core as core;
pub use gambit_ui as ui;

pub use config::EngineConfig;
pub use error::{ConfigError, GambitError, GambitResult};
pub use input::{InputQueue, InputSender, DEFAULT_INPUT_CAPACITY};
pub use pipeline::{EngineTimers, FramePipeline, FrameStats, FrameStatsAccumulator, TARGET_FRAME_TIME};

pub use gambit_core::{FrameClock, TimerHandle, TimerScheduler, WorkerPool};
pub use gambit_ui::{
    Capabilities, HookContext, InputEvent, MouseButton, Style, UpdateContext, Widget, WidgetEngine,
    WidgetEvent, WidgetFlags, WidgetId,
};
