//! Draw command recording.
//!
//! Widgets never talk to a graphics backend. They append [`RenderCommand`]s
//! to a [`DrawList`] in list order and the host rasterizes the result.

use crate::geometry::Rect;

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red component (0-1).
    pub r: f32,
    /// Green component (0-1).
    pub g: f32,
    /// Blue component (0-1).
    pub b: f32,
    /// Alpha component (0-1).
    pub a: f32,
}

impl Color {
    /// Solid black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Solid white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    /// Creates a color from RGBA values (0-1).
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// A draw command produced by a widget.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Filled rectangle.
    Rect {
        /// Bounds.
        bounds: Rect,
        /// Fill color.
        color: Color,
        /// Rotation about the centre, in radians.
        rotation: f32,
    },
    /// Rectangle outline.
    RectOutline {
        /// Bounds.
        bounds: Rect,
        /// Stroke color.
        color: Color,
        /// Line width.
        width: f32,
    },
    /// Text anchored at its top-left corner.
    Text {
        /// Text content.
        text: String,
        /// X position.
        x: f32,
        /// Y position.
        y: f32,
        /// Text color.
        color: Color,
        /// Font size.
        font_size: f32,
    },
    /// Textured quad.
    Texture {
        /// Bounds.
        bounds: Rect,
        /// Host-side texture ID.
        texture_id: u32,
        /// Tint color.
        color: Color,
        /// Rotation about the centre, in radians.
        rotation: f32,
    },
}

/// Commands recorded for one frame, in widget list order.
#[derive(Debug, Default)]
pub struct DrawList {
    commands: Vec<RenderCommand>,
}

impl DrawList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(256),
        }
    }

    /// Drops last frame's commands, keeping the allocation.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Adds a render command.
    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    /// Convenience for a filled, unrotated rectangle.
    pub fn fill_rect(&mut self, bounds: Rect, color: Color) {
        self.push(RenderCommand::Rect {
            bounds,
            color,
            rotation: 0.0,
        });
    }

    /// Recorded commands.
    #[must_use]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Number of recorded commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_list_keeps_order() {
        let mut list = DrawList::new();
        list.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::WHITE);
        list.fill_rect(Rect::new(5.0, 0.0, 1.0, 1.0), Color::BLACK);

        assert_eq!(list.len(), 2);
        match &list.commands()[1] {
            RenderCommand::Rect { bounds, .. } => assert_eq!(bounds.x, 5.0),
            other => panic!("unexpected {other:?}"),
        }

        list.clear();
        assert!(list.is_empty());
    }
}
