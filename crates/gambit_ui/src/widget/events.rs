//! Named widget events and per-widget listener tables.
//!
//! Script bindings attach listeners by event name. Names are resolved to a
//! [`WidgetEvent`] once, when the listener is registered; dispatch is an
//! array index.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::core::{HookContext, Widget};

/// Interaction events a widget can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetEvent {
    /// Cursor entered.
    HoverStart,
    /// Cursor left.
    HoverEnd,
    /// Left click resolved.
    LeftClick,
    /// Left button released after a click.
    LeftClickEnd,
    /// Right button pressed.
    RightClick,
    /// Something else was clicked.
    ClickOff,
    /// Drag began.
    DragStart,
    /// Something was dropped onto this widget.
    DragEndDrop,
    /// This widget was released over nothing.
    DragEndNoDrop,
    /// A dragged widget moved over this one.
    DropStart,
    /// A dragged widget left this one.
    DropEnd,
    /// Raw input event while hovered.
    Event,
}

impl WidgetEvent {
    /// Number of event kinds.
    pub const COUNT: usize = 12;

    /// Every event, in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::HoverStart,
        Self::HoverEnd,
        Self::LeftClick,
        Self::LeftClickEnd,
        Self::RightClick,
        Self::ClickOff,
        Self::DragStart,
        Self::DragEndDrop,
        Self::DragEndNoDrop,
        Self::DropStart,
        Self::DropEnd,
        Self::Event,
    ];

    /// Script-facing name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::HoverStart => "hover_start",
            Self::HoverEnd => "hover_end",
            Self::LeftClick => "left_click",
            Self::LeftClickEnd => "left_click_end",
            Self::RightClick => "right_click",
            Self::ClickOff => "click_off",
            Self::DragStart => "drag_start",
            Self::DragEndDrop => "drag_end_drop",
            Self::DragEndNoDrop => "drag_end_no_drop",
            Self::DropStart => "drop_start",
            Self::DropEnd => "drop_end",
            Self::Event => "event",
        }
    }

    /// Calls the matching native hook.
    pub fn dispatch(self, widget: &mut dyn Widget, ctx: &mut HookContext<'_>) {
        match self {
            Self::HoverStart => widget.hover_start(ctx),
            Self::HoverEnd => widget.hover_end(ctx),
            Self::LeftClick => widget.left_click(ctx),
            Self::LeftClickEnd => widget.left_click_end(ctx),
            Self::RightClick => widget.right_click(ctx),
            Self::ClickOff => widget.click_off(ctx),
            Self::DragStart => widget.drag_start(ctx),
            Self::DragEndDrop => widget.drag_end_drop(ctx),
            Self::DragEndNoDrop => widget.drag_end_no_drop(ctx),
            Self::DropStart => widget.drop_start(ctx),
            Self::DropEnd => widget.drop_end(ctx),
            Self::Event => widget.on_event(ctx),
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for WidgetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognised event name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown widget event `{0}`")]
pub struct UnknownEvent(pub String);

impl FromStr for WidgetEvent {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.name() == s)
            .ok_or_else(|| UnknownEvent(s.to_owned()))
    }
}

/// A scripted listener.
pub type Listener = Box<dyn FnMut(&mut HookContext<'_>) + Send>;

/// Listeners attached to one widget, grouped by event.
#[derive(Default)]
pub struct Listeners {
    slots: [Vec<Listener>; WidgetEvent::COUNT],
}

impl Listeners {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener for `event`.
    pub fn add<F>(&mut self, event: WidgetEvent, listener: F)
    where
        F: FnMut(&mut HookContext<'_>) + Send + 'static,
    {
        self.slots[event.slot()].push(Box::new(listener));
    }

    /// Number of listeners for `event`.
    #[must_use]
    pub fn count(&self, event: WidgetEvent) -> usize {
        self.slots[event.slot()].len()
    }

    /// Runs every listener for `event` in registration order.
    pub fn run(&mut self, event: WidgetEvent, ctx: &mut HookContext<'_>) {
        for listener in &mut self.slots[event.slot()] {
            listener(&mut *ctx);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total: usize = self.slots.iter().map(Vec::len).sum();
        f.debug_struct("Listeners").field("total", &total).finish()
    }
}
