//! Raw pointer events and the pointer state derived from them.

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button (scroll wheel click).
    Middle,
}

/// One raw pointer event from the host's window system.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer moved to screen coordinates.
    MouseMove {
        /// X position.
        x: f32,
        /// Y position.
        y: f32,
    },
    /// Button pressed.
    MouseDown(MouseButton),
    /// Button released.
    MouseUp(MouseButton),
    /// Wheel scrolled.
    Scroll {
        /// Horizontal delta.
        dx: f32,
        /// Vertical delta.
        dy: f32,
    },
}

/// Pointer position and held buttons, folded from [`InputEvent`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    /// Current mouse X position.
    pub x: f32,
    /// Current mouse Y position.
    pub y: f32,
    buttons_down: u8,
}

impl PointerState {
    /// Creates a pointer at the origin with no buttons held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one event into the state.
    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::MouseMove { x, y } => {
                self.x = x;
                self.y = y;
            }
            InputEvent::MouseDown(button) => self.buttons_down |= Self::button_mask(button),
            InputEvent::MouseUp(button) => self.buttons_down &= !Self::button_mask(button),
            _ => {}
        }
    }

    /// Current position.
    #[inline]
    #[must_use]
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Returns true if the button is currently held.
    #[must_use]
    pub fn is_down(&self, button: MouseButton) -> bool {
        (self.buttons_down & Self::button_mask(button)) != 0
    }

    /// Returns the bit mask for a button.
    const fn button_mask(button: MouseButton) -> u8 {
        match button {
            MouseButton::Left => 1,
            MouseButton::Right => 2,
            MouseButton::Middle => 4,
        }
    }
}
