//! Interaction state machine data.
//!
//! ```text
//!                 pick hit                left down
//!   ┌──────┐ ───────────────▶ ┌───────┐ ──────────▶ ┌──────────────────┐
//!   │ Idle │                  │ Hover │             │ PreDragThreshold │
//!   └──────┘ ◀─────────────── └───────┘             └──────────────────┘
//!                 pick miss                 threshold │ draggable │ not
//!                                                     ▼           ▼
//!              ┌──────┐   over snappable  ┌────────┐   ┌───────────────────┐
//!              │ Drag │ ────────────────▶ │ ToSnap │   │ PostDragThreshold │
//!              └──────┘                   └────────┘   └───────────────────┘
//!                 ▲   arrival                 │ arrival
//!              ┌────────┐   leaves target  ┌──────┐
//!              │ ToDrag │ ◀─────────────── │ Snap │
//!              └────────┘                  └──────┘
//! ```
//!
//! Releasing the left button from any state returns to `Hover` or `Idle`.

use crate::animation::Keypoint;
use crate::picking::PickStrategy;
use crate::widget::WidgetId;

/// Interaction engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    /// Nothing under the cursor.
    #[default]
    Idle,
    /// A widget is under the cursor.
    Hover,
    /// Left button held, threshold not yet reached.
    PreDragThreshold,
    /// Held past the threshold on a non-draggable widget; already clicked.
    PostDragThreshold,
    /// Dragged widget pinned to the cursor.
    Drag,
    /// Dragged widget animating back to the cursor.
    ToDrag,
    /// Dragged widget animating onto a snappable target.
    ToSnap,
    /// Dragged widget resting on a snappable target.
    Snap,
}

impl InteractionState {
    /// Returns true while a widget is being dragged.
    #[must_use]
    pub const fn is_drag_related(self) -> bool {
        matches!(self, Self::Drag | Self::ToDrag | Self::ToSnap | Self::Snap)
    }

    /// Returns true while the left button is held on a widget.
    #[must_use]
    pub const fn is_pressed(self) -> bool {
        matches!(self, Self::PreDragThreshold | Self::PostDragThreshold) || self.is_drag_related()
    }
}

/// Tunables for one engine instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionSettings {
    /// Seconds a press must be held before it becomes a drag.
    pub drag_threshold: f64,
    /// Snap and release animation speed, pixels per second.
    pub snap_speed: f32,
    /// Offset from a snap target's centre to the snapped position.
    pub snap_offset: (f32, f32),
    /// Picking method.
    pub pick_strategy: PickStrategy,
}

impl InteractionSettings {
    /// Default drag threshold in seconds.
    pub const DEFAULT_DRAG_THRESHOLD: f64 = 0.2;
    /// Default snap speed in pixels per second.
    pub const DEFAULT_SNAP_SPEED: f32 = 1000.0;
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            drag_threshold: Self::DEFAULT_DRAG_THRESHOLD,
            snap_speed: Self::DEFAULT_SNAP_SPEED,
            snap_offset: (0.0, 0.0),
            pick_strategy: PickStrategy::ColorMask,
        }
    }
}

/// Mutable interaction state owned by the engine.
///
/// While drag-related, `current_hover` is the dragged widget and
/// `current_drop` the widget underneath it. Outside drag states
/// `current_drop` is always `None`.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    /// Active state.
    pub state: InteractionState,
    /// Hovered (or dragged) widget.
    pub current_hover: Option<WidgetId>,
    /// Drop target under the dragged widget.
    pub current_drop: Option<WidgetId>,
    /// Widget that received the last left press.
    pub last_click: Option<WidgetId>,
    /// Widget position minus cursor at press time.
    pub drag_offset: (f32, f32),
    /// When the pending time-gated transition becomes eligible.
    pub transition_at: f64,
    /// Where the dragged widget returns to on release.
    pub release: Option<Keypoint>,
}

impl Interaction {
    /// Moves to `next`, logging the edge.
    pub fn transition(&mut self, next: InteractionState) {
        if self.state != next {
            tracing::trace!(from = ?self.state, to = ?next, "interaction transition");
            self.state = next;
        }
    }

    /// Drag target for the current cursor position.
    #[must_use]
    pub fn drag_target(&self, mouse: (f32, f32)) -> (f32, f32) {
        (mouse.0 + self.drag_offset.0, mouse.1 + self.drag_offset.1)
    }

    /// Forgets any reference to `id` (the widget is being destroyed).
    ///
    /// Dropping the dragged or hovered widget mid-interaction resets to
    /// `Idle`.
    pub fn forget(&mut self, id: WidgetId) {
        if self.current_hover == Some(id) {
            self.current_hover = None;
            self.current_drop = None;
            self.release = None;
            self.transition(InteractionState::Idle);
        }
        if self.current_drop == Some(id) {
            self.current_drop = None;
        }
        if self.last_click == Some(id) {
            self.last_click = None;
        }
    }
}
