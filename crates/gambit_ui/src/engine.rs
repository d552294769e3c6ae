//! # Widget Interaction Engine
//!
//! Owns the live widgets, resolves the pointer against them and runs the
//! hover / click / drag / drop / snap protocol.
//!
//! ## Frame contract
//!
//! ```text
//!   event_handler(..)*      raw input, any time between frames
//!   widget_work(now)   ─┐   tasks for the worker pool
//!   pool.wait()         │   barrier: every task done
//!   update(now)        ◀┘   pick + state machine, main thread only
//!   draw(list)              insertion order
//! ```
//!
//! Hooks and timer callbacks cannot reach the host's timer heap. They
//! [`defer`](WidgetEngine::defer) work instead, and the host moves it onto
//! its timers with [`take_deferred`](WidgetEngine::take_deferred).
//!
//! Worker tasks only ever lock their own path or widget body. The list,
//! the interaction state and the pick target are touched only from
//! `&mut self` methods on the main thread.

use std::sync::Arc;

use gambit_core::{SlotHandle, TaskList};
use parking_lot::Mutex;

use crate::animation::{Channel, Keypoint, PathRegistry};
use crate::input::{InputEvent, MouseButton, PointerState};
use crate::interaction::{Interaction, InteractionSettings, InteractionState};
use crate::picking::{PickColor, PickStrategy, PickTarget, SoftwarePickTarget};
use crate::render::DrawList;
use crate::style::{Style, TransformLayout};
use crate::widget::{
    Capabilities, HookContext, Listeners, UpdateContext, Widget, WidgetEvent, WidgetFlags,
    WidgetId, WidgetList,
};

type WidgetBody = Arc<Mutex<Box<dyn Widget>>>;

/// Callback deferred by a hook or timer, run later against the engine.
pub type DeferredCallback = Box<dyn FnOnce(&mut WidgetEngine) + Send>;

/// Work requested through [`WidgetEngine::defer`] or
/// [`HookContext::defer`], waiting for the host to schedule it.
pub struct DeferredCall {
    /// Seconds after the host picks it up.
    pub delay: f64,
    /// What to run.
    pub callback: DeferredCallback,
}

impl std::fmt::Debug for DeferredCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredCall")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

struct Entry {
    body: WidgetBody,
    style: Style,
    flags: WidgetFlags,
    caps: Capabilities,
    listeners: Listeners,
}

/// The widget interaction engine.
pub struct WidgetEngine {
    widgets: WidgetList<Entry>,
    paths: PathRegistry,
    interaction: Interaction,
    settings: InteractionSettings,
    pointer: PointerState,
    target: Box<dyn PickTarget>,
    /// List position → handle, rebuilt by every color-mask pass.
    pick_order: Vec<SlotHandle>,
    last_work: Option<f64>,
    deferred: Vec<DeferredCall>,
}

impl WidgetEngine {
    /// Creates an engine with a software pick target.
    #[must_use]
    pub fn new(settings: InteractionSettings) -> Self {
        Self {
            widgets: WidgetList::new(),
            paths: PathRegistry::new(),
            interaction: Interaction::default(),
            settings,
            pointer: PointerState::new(),
            target: Box::new(SoftwarePickTarget::new()),
            pick_order: Vec::new(),
            last_work: None,
            deferred: Vec::new(),
        }
    }

    /// Replaces the pick target (e.g. with a GPU-backed one).
    #[must_use]
    pub fn with_pick_target(mut self, target: Box<dyn PickTarget>) -> Self {
        self.target = target;
        self
    }

    /// Current tunables.
    #[must_use]
    pub fn settings(&self) -> &InteractionSettings {
        &self.settings
    }

    /// Mutable tunables. Changes apply from the next transition.
    pub fn settings_mut(&mut self) -> &mut InteractionSettings {
        &mut self.settings
    }

    /// Path registry, for animation drivers outside the widget set.
    pub fn paths_mut(&mut self) -> &mut PathRegistry {
        &mut self.paths
    }

    /// Queues `callback` to run `delay` seconds after the host next drains
    /// the deferred queue.
    pub fn defer<F>(&mut self, delay: f64, callback: F)
    where
        F: FnOnce(&mut WidgetEngine) + Send + 'static,
    {
        self.deferred.push(DeferredCall {
            delay,
            callback: Box::new(callback),
        });
    }

    /// Takes every deferred call, oldest first.
    pub fn take_deferred(&mut self) -> Vec<DeferredCall> {
        std::mem::take(&mut self.deferred)
    }

    /// Number of deferred calls waiting for the host.
    #[must_use]
    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }

    // ------------------------------------------------------------------
    // Widget lifecycle
    // ------------------------------------------------------------------

    /// Adds a widget at the end of the list with a basic transform.
    ///
    /// Returns `None` if the list could not grow.
    pub fn create<W>(
        &mut self,
        widget: W,
        position: (f32, f32),
        half_extents: (f32, f32),
        now: f64,
    ) -> Option<WidgetId>
    where
        W: Widget + 'static,
    {
        self.create_with_layout(widget, TransformLayout::Basic, position, half_extents, now)
    }

    /// Adds a widget with an explicit transform layout.
    pub fn create_with_layout<W>(
        &mut self,
        widget: W,
        layout: TransformLayout,
        position: (f32, f32),
        half_extents: (f32, f32),
        now: f64,
    ) -> Option<WidgetId>
    where
        W: Widget + 'static,
    {
        let caps = widget.capabilities();
        let style = Style::new(&mut self.paths, layout, position, half_extents, now);
        let entry = Entry {
            body: Arc::new(Mutex::new(Box::new(widget))),
            style,
            flags: WidgetFlags::NONE,
            caps,
            listeners: Listeners::new(),
        };
        match self.widgets.push_back(entry) {
            Some(handle) => Some(WidgetId(handle)),
            None => {
                tracing::warn!("widget list growth failed, widget not created");
                None
            }
        }
    }

    /// Unlinks and drops a widget. Returns false for unknown ids.
    ///
    /// Its path stops blending once the last clone of its style is gone.
    pub fn destroy(&mut self, id: WidgetId) -> bool {
        if self.widgets.remove(id.0).is_none() {
            return false;
        }
        self.interaction.forget(id);
        true
    }

    /// Returns true if the widget is alive.
    #[must_use]
    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains(id.0)
    }

    /// Number of live widgets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Returns true if there are no widgets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Live widget ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.widgets.iter().map(|(handle, _)| WidgetId(handle))
    }

    /// The widget's transform.
    #[must_use]
    pub fn style(&self, id: WidgetId) -> Option<&Style> {
        self.widgets.get(id.0).map(|entry| &entry.style)
    }

    /// Mutable transform, for extents changes.
    pub fn style_mut(&mut self, id: WidgetId) -> Option<&mut Style> {
        self.widgets.get_mut(id.0).map(|entry| &mut entry.style)
    }

    /// Runs `f` on the widget body.
    pub fn with_widget<R>(&self, id: WidgetId, f: impl FnOnce(&mut dyn Widget) -> R) -> Option<R> {
        let entry = self.widgets.get(id.0)?;
        let mut body = entry.body.lock();
        Some(f(body.as_mut()))
    }

    /// Interaction flags.
    #[must_use]
    pub fn flags(&self, id: WidgetId) -> Option<WidgetFlags> {
        self.widgets.get(id.0).map(|entry| entry.flags)
    }

    /// Marks the widget as draggable. Returns false for unknown ids.
    pub fn set_draggable(&mut self, id: WidgetId, draggable: bool) -> bool {
        self.assign_flag(id, WidgetFlags::DRAGGABLE, draggable)
    }

    /// Marks the widget as a snap target. Returns false for unknown ids.
    pub fn set_snappable(&mut self, id: WidgetId, snappable: bool) -> bool {
        self.assign_flag(id, WidgetFlags::SNAPPABLE, snappable)
    }

    fn assign_flag(&mut self, id: WidgetId, flag: u32, on: bool) -> bool {
        match self.widgets.get_mut(id.0) {
            Some(entry) => {
                entry.flags.assign(flag, on);
                true
            }
            None => false,
        }
    }

    /// Attaches a scripted listener, run after the native hook.
    ///
    /// ```rust,ignore
    /// let event: WidgetEvent = "drag_start".parse()?;
    /// engine.listen(id, event, |ctx| println!("{} picked up", ctx.id));
    /// ```
    pub fn listen<F>(&mut self, id: WidgetId, event: WidgetEvent, listener: F) -> bool
    where
        F: FnMut(&mut HookContext<'_>) + Send + 'static,
    {
        match self.widgets.get_mut(id.0) {
            Some(entry) => {
                entry.listeners.add(event, listener);
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Active interaction state.
    #[must_use]
    pub fn state(&self) -> InteractionState {
        self.interaction.state
    }

    /// Full interaction record.
    #[must_use]
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Hovered widget, or the dragged one while dragging.
    #[must_use]
    pub fn current_hover(&self) -> Option<WidgetId> {
        self.interaction.current_hover
    }

    /// Widget under the dragged one.
    #[must_use]
    pub fn current_drop(&self) -> Option<WidgetId> {
        self.interaction.current_drop
    }

    /// Widget that received the last left press.
    #[must_use]
    pub fn last_click(&self) -> Option<WidgetId> {
        self.interaction.last_click
    }

    /// Last known cursor position.
    #[must_use]
    pub fn mouse(&self) -> (f32, f32) {
        self.pointer.position()
    }

    /// Widget under `cursor`, topmost first.
    pub fn pick(&mut self, cursor: (f32, f32)) -> Option<WidgetId> {
        self.pick_excluding(cursor, None)
    }

    fn pick_excluding(&mut self, cursor: (f32, f32), exclude: Option<WidgetId>) -> Option<WidgetId> {
        match self.settings.pick_strategy {
            PickStrategy::ColorMask => self.pick_color_mask(cursor, exclude),
            PickStrategy::Bounds => self
                .widgets
                .iter_rev()
                .find(|(handle, entry)| {
                    exclude != Some(WidgetId(*handle))
                        && entry.caps.has(Capabilities::MASK)
                        && entry.style.bounds().contains(cursor.0, cursor.1)
                })
                .map(|(handle, _)| WidgetId(handle)),
        }
    }

    fn pick_color_mask(&mut self, cursor: (f32, f32), exclude: Option<WidgetId>) -> Option<WidgetId> {
        self.pick_order.clear();
        self.target.begin(cursor);

        for (handle, entry) in self.widgets.iter() {
            // Positions count every widget, skipped or not.
            self.pick_order.push(handle);
            if exclude == Some(WidgetId(handle)) || !entry.caps.has(Capabilities::MASK) {
                continue;
            }
            let position = u32::try_from(self.pick_order.len()).unwrap_or(u32::MAX);
            let Some(color) = PickColor::encode(position) else {
                tracing::warn!(position, "pick encoding exhausted, remaining widgets unpickable");
                break;
            };
            self.target.set_color(color);
            entry.body.lock().mask(&entry.style, self.target.surface());
        }

        let position = PickColor::from_bytes(self.target.read_pixel()).decode();
        let index = usize::try_from(position).ok()?.checked_sub(1)?;
        self.pick_order.get(index).copied().map(WidgetId)
    }

    // ------------------------------------------------------------------
    // Frame phases
    // ------------------------------------------------------------------

    /// Builds this frame's worker tasks: one blend per active path and one
    /// update per widget with an update hook.
    pub fn widget_work(&mut self, now: f64) -> TaskList {
        let dt = self.last_work.map_or(0.0, |last| (now - last).max(0.0));
        self.last_work = Some(now);

        let mut tasks = self.paths.blend_tasks(now);
        for (handle, entry) in self.widgets.iter() {
            if !entry.caps.has(Capabilities::UPDATE) {
                continue;
            }
            let id = WidgetId(handle);
            let body = Arc::clone(&entry.body);
            let style = entry.style.clone();
            tasks.push(move || {
                let ctx = UpdateContext {
                    id,
                    now,
                    dt,
                    style: &style,
                };
                body.lock().update(&ctx);
            });
        }
        tasks
    }

    /// Resolves the pointer and advances the interaction state machine.
    ///
    /// Call after the worker barrier so transforms are current.
    pub fn update(&mut self, now: f64) {
        let mouse = self.pointer.position();
        let state = self.interaction.state;

        if state.is_drag_related() {
            self.update_drop(now, mouse);
        } else if !state.is_pressed() {
            let hit = self.pick_excluding(mouse, None);
            self.set_hover(hit, now);
        }

        self.resolve_timed(now);
        self.follow_cursor(now, mouse);
    }

    /// Records draw commands for every widget in insertion order.
    pub fn draw(&self, list: &mut DrawList) {
        for (_, entry) in self.widgets.iter() {
            if entry.caps.has(Capabilities::DRAW) {
                entry.body.lock().draw(&entry.style, list);
            }
        }
    }

    /// Handles one raw input event.
    pub fn event_handler(&mut self, event: &InputEvent, now: f64) {
        self.pointer.apply(event);

        match *event {
            InputEvent::MouseDown(MouseButton::Right) => {
                if let Some(hover) = self.interaction.current_hover {
                    if !self.interaction.state.is_drag_related() {
                        self.fire(hover, WidgetEvent::RightClick, now, None, None);
                    }
                }
            }
            InputEvent::MouseDown(MouseButton::Left) => self.left_down(now),
            InputEvent::MouseUp(MouseButton::Left) => self.left_up(now),
            _ => {}
        }

        if let Some(hover) = self.interaction.current_hover {
            self.fire_with(hover, WidgetEvent::Event, now, None, None, Some(event));
        }
    }

    // ------------------------------------------------------------------
    // State machine
    // ------------------------------------------------------------------

    fn set_hover(&mut self, hit: Option<WidgetId>, now: f64) {
        if hit != self.interaction.current_hover {
            if let Some(old) = self.interaction.current_hover {
                self.fire(old, WidgetEvent::HoverEnd, now, None, None);
            }
            self.interaction.current_hover = hit;
            if let Some(new) = hit {
                self.fire(new, WidgetEvent::HoverStart, now, None, None);
            }
        }
        let next = if hit.is_some() {
            InteractionState::Hover
        } else {
            InteractionState::Idle
        };
        self.interaction.transition(next);
    }

    fn left_down(&mut self, now: f64) {
        let state = self.interaction.state;
        if state.is_pressed() {
            return;
        }

        let hit = self.pick_excluding(self.pointer.position(), None);
        self.set_hover(hit, now);

        let previous = self.interaction.last_click;
        let Some(id) = hit else {
            self.interaction.last_click = None;
            if let Some(previous) = previous {
                self.fire(previous, WidgetEvent::ClickOff, now, None, None);
            }
            return;
        };

        if let Some(entry) = self.widgets.get(id.0) {
            let (x, y) = entry.style.position();
            let mouse = self.pointer.position();
            self.interaction.drag_offset = (x - mouse.0, y - mouse.1);
            self.interaction.release = Some(*entry.style.path().lock().destination());
        }

        if let Some(previous) = previous.filter(|&p| p != id) {
            self.fire(previous, WidgetEvent::ClickOff, now, None, None);
        }
        self.interaction.last_click = Some(id);
        self.interaction.transition_at = now + self.settings.drag_threshold;
        self.interaction.transition(InteractionState::PreDragThreshold);
    }

    fn left_up(&mut self, now: f64) {
        // A threshold that elapsed between frames still counts.
        self.resolve_timed(now);

        let state = self.interaction.state;
        match state {
            InteractionState::PreDragThreshold => {
                if let Some(id) = self.interaction.current_hover {
                    self.fire(id, WidgetEvent::LeftClick, now, None, None);
                    self.fire(id, WidgetEvent::LeftClickEnd, now, None, None);
                }
            }
            InteractionState::PostDragThreshold => {
                if let Some(id) = self.interaction.current_hover {
                    self.fire(id, WidgetEvent::LeftClickEnd, now, None, None);
                }
            }
            s if s.is_drag_related() => self.end_drag(now),
            _ => return,
        }

        let hit = self.pick_excluding(self.pointer.position(), None);
        self.set_hover(hit, now);
    }

    fn end_drag(&mut self, now: f64) {
        let Some(dragged) = self.interaction.current_hover else {
            return;
        };
        let Some(style) = self.style(dragged).cloned() else {
            return;
        };

        let mut release = self
            .interaction
            .release
            .take()
            .unwrap_or_else(|| *style.path().lock().destination());

        match self.interaction.current_drop.take() {
            Some(target) => {
                self.fire(target, WidgetEvent::DragEndDrop, now, Some(dragged), Some(&mut release));
                self.fire(target, WidgetEvent::DropEnd, now, Some(dragged), None);
            }
            None => {
                self.fire(dragged, WidgetEvent::DragEndNoDrop, now, None, Some(&mut release));
            }
        }

        let arrival = style.animate_to(release.values(), self.settings.snap_speed, now);
        tracing::debug!(
            widget = %dragged,
            x = release.get(Channel::X),
            y = release.get(Channel::Y),
            ?arrival,
            "drag released"
        );
    }

    /// Drop target tracking while dragging.
    fn update_drop(&mut self, now: f64, mouse: (f32, f32)) {
        let Some(dragged) = self.interaction.current_hover else {
            self.interaction.transition(InteractionState::Idle);
            return;
        };

        let target = self.pick_excluding(mouse, Some(dragged));
        if target == self.interaction.current_drop {
            return;
        }

        if let Some(old) = self.interaction.current_drop {
            self.fire(old, WidgetEvent::DropEnd, now, Some(dragged), None);
        }
        self.interaction.current_drop = target;
        if let Some(new) = target {
            self.fire(new, WidgetEvent::DropStart, now, Some(dragged), None);
        }

        let Some(style) = self.style(dragged).cloned() else {
            return;
        };
        let snap_target = target
            .filter(|&t| self.flags(t).is_some_and(|f| f.has(WidgetFlags::SNAPPABLE)))
            .and_then(|t| self.style(t))
            .map(Style::position);

        match snap_target {
            Some((x, y)) => {
                let offset = self.settings.snap_offset;
                let arrival = style.move_to((x + offset.0, y + offset.1), self.settings.snap_speed, now);
                self.interaction.transition_at = arrival.unwrap_or(now);
                self.interaction.transition(InteractionState::ToSnap);
            }
            None => {
                if matches!(
                    self.interaction.state,
                    InteractionState::ToSnap | InteractionState::Snap
                ) {
                    let goal = self.interaction.drag_target(mouse);
                    let arrival = style.move_to(goal, self.settings.snap_speed, now);
                    self.interaction.transition_at = arrival.unwrap_or(now);
                    self.interaction.transition(InteractionState::ToDrag);
                }
            }
        }
    }

    /// Time-gated transitions.
    fn resolve_timed(&mut self, now: f64) {
        if now < self.interaction.transition_at {
            return;
        }
        match self.interaction.state {
            InteractionState::PreDragThreshold => {
                let Some(id) = self.interaction.current_hover else {
                    self.interaction.transition(InteractionState::Idle);
                    return;
                };
                let draggable = self
                    .flags(id)
                    .is_some_and(|f| f.has(WidgetFlags::DRAGGABLE));
                if draggable {
                    self.fire(id, WidgetEvent::DragStart, now, None, None);
                    if let Some(style) = self.style(id) {
                        style.path().lock().interrupt(now);
                    }
                    self.interaction.current_drop = None;
                    tracing::debug!(widget = %id, "drag started");
                    self.interaction.transition(InteractionState::Drag);
                } else {
                    self.fire(id, WidgetEvent::LeftClick, now, None, None);
                    self.interaction.transition(InteractionState::PostDragThreshold);
                }
            }
            InteractionState::ToDrag => self.interaction.transition(InteractionState::Drag),
            InteractionState::ToSnap => self.interaction.transition(InteractionState::Snap),
            _ => {}
        }
    }

    /// Keeps the dragged widget on the cursor.
    fn follow_cursor(&mut self, now: f64, mouse: (f32, f32)) {
        let state = self.interaction.state;
        if !matches!(state, InteractionState::Drag | InteractionState::ToDrag) {
            return;
        }
        let goal = self.interaction.drag_target(mouse);
        let Some(style) = self.interaction.current_hover.and_then(|id| self.style(id)) else {
            return;
        };

        if state == InteractionState::Drag {
            style.pin_position(goal.0, goal.1, now);
            return;
        }

        let mut path = style.path().lock();
        if path.is_resting() {
            drop(path);
            style.pin_position(goal.0, goal.1, now);
        } else {
            let dest = path.destination_mut();
            dest.set(Channel::X, goal.0);
            dest.set(Channel::Y, goal.1);
        }
    }

    fn fire(
        &mut self,
        id: WidgetId,
        event: WidgetEvent,
        now: f64,
        other: Option<WidgetId>,
        release: Option<&mut Keypoint>,
    ) {
        self.fire_with(id, event, now, other, release, None);
    }

    /// Native hook first, then scripted listeners.
    fn fire_with(
        &mut self,
        id: WidgetId,
        event: WidgetEvent,
        now: f64,
        other: Option<WidgetId>,
        release: Option<&mut Keypoint>,
        input: Option<&InputEvent>,
    ) {
        let mouse = self.pointer.position();
        let Some(entry) = self.widgets.get_mut(id.0) else {
            return;
        };
        tracing::trace!(widget = %id, %event, "hook");

        let mut ctx = HookContext::new(id, now, mouse, &entry.style)
            .with_other(other)
            .with_input(input)
            .with_release(release)
            .with_deferred(&mut self.deferred);
        {
            let mut body = entry.body.lock();
            event.dispatch(body.as_mut(), &mut ctx);
        }
        entry.listeners.run(event, &mut ctx);
    }
}

impl Default for WidgetEngine {
    fn default() -> Self {
        Self::new(InteractionSettings::default())
    }
}

impl std::fmt::Debug for WidgetEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetEngine")
            .field("widgets", &self.widgets.len())
            .field("paths", &self.paths)
            .field("interaction", &self.interaction)
            .field("deferred", &self.deferred.len())
            .finish_non_exhaustive()
    }
}
