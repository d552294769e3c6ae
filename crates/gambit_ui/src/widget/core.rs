//! Core widget types and traits.

use std::fmt;

use gambit_core::SlotHandle;

use crate::animation::{Channel, Keypoint};
use crate::engine::{DeferredCall, WidgetEngine};
use crate::input::InputEvent;
use crate::picking::MaskSurface;
use crate::render::DrawList;
use crate::style::Style;

/// Opaque identifier for a live widget.
///
/// Stays unique for the widget's lifetime; a destroyed widget's id never
/// matches a later widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub(crate) SlotHandle);

impl WidgetId {
    /// The underlying slot handle.
    #[must_use]
    pub const fn handle(self) -> SlotHandle {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "widget#{}v{}", self.0.index(), self.0.generation())
    }
}

/// Interaction flags (bitfield).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidgetFlags(u32);

impl WidgetFlags {
    /// Widget can be picked up and dragged.
    pub const DRAGGABLE: u32 = 1 << 0;
    /// A dragged widget snaps onto this one when hovering it.
    pub const SNAPPABLE: u32 = 1 << 1;

    /// No flags set.
    pub const NONE: Self = Self(0);

    /// Creates flags from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns true if the flag is set.
    #[inline]
    #[must_use]
    pub const fn has(self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }

    /// Sets or clears a flag.
    #[inline]
    pub fn assign(&mut self, flag: u32, on: bool) {
        if on {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }
}

/// Which optional hooks a widget actually implements.
///
/// Hooks without a capability bit are never scheduled or called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities(u32);

impl Capabilities {
    /// Has a draw hook.
    pub const DRAW: u32 = 1 << 0;
    /// Has a mask hook; without it the widget is invisible to picking.
    pub const MASK: u32 = 1 << 1;
    /// Has a per-frame update hook, run on the worker pool.
    pub const UPDATE: u32 = 1 << 2;

    /// Creates capabilities from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns true if the capability is present.
    #[inline]
    #[must_use]
    pub const fn has(self, capability: u32) -> bool {
        (self.0 & capability) != 0
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self(Self::DRAW | Self::MASK)
    }
}

/// Context passed to interaction hooks.
pub struct HookContext<'a> {
    /// Widget receiving the hook.
    pub id: WidgetId,
    /// Frame time.
    pub now: f64,
    /// Cursor position.
    pub mouse: (f32, f32),
    /// The widget's transform.
    pub style: &'a Style,
    /// The dragged widget, for drop hooks and `drag_end_drop`.
    pub other: Option<WidgetId>,
    /// The raw event, for `on_event`.
    pub input: Option<&'a InputEvent>,
    release: Option<&'a mut Keypoint>,
    deferred: Option<&'a mut Vec<DeferredCall>>,
}

impl<'a> HookContext<'a> {
    /// Creates a context with no peer, input or release keypoint.
    #[must_use]
    pub fn new(id: WidgetId, now: f64, mouse: (f32, f32), style: &'a Style) -> Self {
        Self {
            id,
            now,
            mouse,
            style,
            other: None,
            input: None,
            release: None,
            deferred: None,
        }
    }

    /// Sets the peer widget.
    #[must_use]
    pub fn with_other(mut self, other: Option<WidgetId>) -> Self {
        self.other = other;
        self
    }

    /// Attaches the raw input event.
    #[must_use]
    pub fn with_input(mut self, input: Option<&'a InputEvent>) -> Self {
        self.input = input;
        self
    }

    /// Attaches the release keypoint a drag end can redirect.
    #[must_use]
    pub fn with_release(mut self, release: Option<&'a mut Keypoint>) -> Self {
        self.release = release;
        self
    }

    /// Attaches the engine's deferred queue.
    #[must_use]
    pub fn with_deferred(mut self, deferred: &'a mut Vec<DeferredCall>) -> Self {
        self.deferred = Some(deferred);
        self
    }

    /// Asks the host to run `callback` against the engine `delay` seconds
    /// from when it picks the request up.
    ///
    /// Returns false for a detached context with no queue.
    pub fn defer<F>(&mut self, delay: f64, callback: F) -> bool
    where
        F: FnOnce(&mut WidgetEngine) + Send + 'static,
    {
        match self.deferred.as_deref_mut() {
            Some(queue) => {
                queue.push(DeferredCall {
                    delay,
                    callback: Box::new(callback),
                });
                true
            }
            None => false,
        }
    }

    /// Where the dragged widget will animate to once the drag ends.
    #[must_use]
    pub fn release(&self) -> Option<(f32, f32)> {
        self.release
            .as_deref()
            .map(|k| (k.get(Channel::X), k.get(Channel::Y)))
    }

    /// Redirects the release animation. Only meaningful from drag-end hooks.
    ///
    /// Returns false when no release is pending.
    pub fn set_release(&mut self, x: f32, y: f32) -> bool {
        match self.release.as_deref_mut() {
            Some(keypoint) => {
                keypoint.set(Channel::X, x);
                keypoint.set(Channel::Y, y);
                true
            }
            None => false,
        }
    }
}

/// Context passed to the per-frame update hook (on a worker thread).
#[derive(Debug)]
pub struct UpdateContext<'a> {
    /// Widget being updated.
    pub id: WidgetId,
    /// Frame time.
    pub now: f64,
    /// Time since the previous frame.
    pub dt: f64,
    /// The widget's transform. Only this widget's path may be touched.
    pub style: &'a Style,
}

/// An interactive visual entity.
///
/// Every hook is optional; the defaults do nothing. Widgets are moved onto
/// worker threads for `update`, hence `Send`.
#[allow(unused_variables)]
pub trait Widget: Send {
    /// Which optional hooks this widget implements.
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// Records draw commands.
    fn draw(&self, style: &Style, list: &mut DrawList) {}

    /// Fills the widget's clickable shape. Defaults to its bounds.
    fn mask(&self, style: &Style, surface: &mut dyn MaskSurface) {
        surface.fill_rect(style.bounds());
    }

    /// Per-frame update, run concurrently with other widgets.
    fn update(&mut self, ctx: &UpdateContext<'_>) {}

    /// Cursor entered the widget.
    fn hover_start(&mut self, ctx: &mut HookContext<'_>) {}

    /// Cursor left the widget.
    fn hover_end(&mut self, ctx: &mut HookContext<'_>) {}

    /// Left click resolved (released or held past the threshold while not
    /// draggable).
    fn left_click(&mut self, ctx: &mut HookContext<'_>) {}

    /// Left button released after a click.
    fn left_click_end(&mut self, ctx: &mut HookContext<'_>) {}

    /// Right button pressed.
    fn right_click(&mut self, ctx: &mut HookContext<'_>) {}

    /// Another widget (or empty space) was clicked after this one.
    fn click_off(&mut self, ctx: &mut HookContext<'_>) {}

    /// Drag began.
    fn drag_start(&mut self, ctx: &mut HookContext<'_>) {}

    /// Called on the drop target when a widget is dropped onto it;
    /// `ctx.other` is the dragged widget.
    fn drag_end_drop(&mut self, ctx: &mut HookContext<'_>) {}

    /// Called on the dragged widget when released over nothing.
    fn drag_end_no_drop(&mut self, ctx: &mut HookContext<'_>) {}

    /// A dragged widget moved over this one.
    fn drop_start(&mut self, ctx: &mut HookContext<'_>) {}

    /// A dragged widget left this one.
    fn drop_end(&mut self, ctx: &mut HookContext<'_>) {}

    /// Generic raw event while hovered.
    fn on_event(&mut self, ctx: &mut HookContext<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::PathRegistry;
    use crate::style::TransformLayout;
    use gambit_core::SlotPool;

    #[test]
    fn test_flags_assign() {
        let mut flags = WidgetFlags::NONE;
        flags.assign(WidgetFlags::DRAGGABLE, true);
        assert!(flags.has(WidgetFlags::DRAGGABLE));
        assert!(!flags.has(WidgetFlags::SNAPPABLE));
        flags.assign(WidgetFlags::DRAGGABLE, false);
        assert_eq!(flags, WidgetFlags::NONE);
    }

    #[test]
    fn test_default_capabilities() {
        let caps = Capabilities::default();
        assert!(caps.has(Capabilities::DRAW));
        assert!(caps.has(Capabilities::MASK));
        assert!(!caps.has(Capabilities::UPDATE));
    }

    #[test]
    fn test_set_release_rewrites_keypoint() {
        let mut registry = PathRegistry::new();
        let style = Style::new(&mut registry, TransformLayout::Basic, (0.0, 0.0), (1.0, 1.0), 0.0);
        let mut pool = SlotPool::new();
        let id = WidgetId(pool.allocate(()).unwrap());

        let mut release = Keypoint::new(0.0, &[1.0, 2.0, 1.0, 1.0, 0.0], 5);
        {
            let mut ctx = HookContext::new(id, 0.0, (0.0, 0.0), &style).with_release(Some(&mut release));
            assert_eq!(ctx.release(), Some((1.0, 2.0)));
            assert!(ctx.set_release(9.0, 8.0));
        }
        assert_eq!(release.values(), &[9.0, 8.0, 1.0, 1.0, 0.0]);

        let mut ctx = HookContext::new(id, 0.0, (0.0, 0.0), &style);
        assert!(!ctx.set_release(1.0, 1.0));
    }
}
