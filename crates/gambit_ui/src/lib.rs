//! # GAMBIT UI
//!
//! Animated, pickable widgets and the interaction protocol that drives them.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        WIDGET ENGINE                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  InputEvent → PointerState → pick() → state machine → hooks  │
//! │                                 │                             │
//! │  widget_work() → TaskList ──────┼──▶ worker pool (blend,     │
//! │                                 │    widget update)           │
//! │  draw() → DrawList              ▼                             │
//! │                      Style ── SharedPath (keyframes)          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`animation`]: keyframe paths with linear blending, looping and
//!   interruption.
//! - [`style`]: the per-widget animated transform.
//! - [`picking`]: color-mask and bounds picking.
//! - [`engine`]: the interaction state machine.

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod engine;
pub mod geometry;
pub mod input;
pub mod interaction;
pub mod picking;
pub mod render;
pub mod style;
pub mod widget;

pub use animation::{Channel, Keypoint, Path, PathRegistry, PathStatus, SharedPath, MAX_CHANNELS};
pub use engine::{DeferredCall, DeferredCallback, WidgetEngine};
pub use geometry::Rect;
pub use input::{InputEvent, MouseButton, PointerState};
pub use interaction::{Interaction, InteractionSettings, InteractionState};
pub use picking::{MaskSurface, PickColor, PickStrategy, PickTarget, SoftwarePickTarget};
pub use render::{Color, DrawList, RenderCommand};
pub use style::{Style, TransformLayout};
pub use widget::{
    Capabilities, HookContext, UpdateContext, Widget, WidgetEvent, WidgetFlags, WidgetId,
};
