//! Pointer picking.
//!
//! The color-mask pass clears a tiny target centred on the cursor, lets
//! every widget fill its mask in a flat color that encodes its list
//! position, and reads back the centre pixel:
//!
//! ```text
//!   position p (1-based)  →  r = p % 200
//!                            g = (p / 200) % 200
//!                            b = p / 40000
//!   cleared pixel (0,0,0)  →  nothing under the cursor
//! ```
//!
//! Later widgets paint over earlier ones, so the topmost mask wins. Base 200
//! caps the pass at 200³ - 1 widgets; [`PickStrategy::Bounds`] has no cap.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Largest encodable list position (exclusive).
pub const PICK_LIMIT: u32 = 200 * 200 * 200;

const BASE: u32 = 200;

const GRID: usize = 3;

/// How the engine resolves the widget under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickStrategy {
    /// Render masks into a color-coded pick target.
    #[default]
    ColorMask,
    /// Test bounds in reverse insertion order.
    Bounds,
}

/// One RGBA8 pixel of a pick target.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct PickColor {
    /// Red, green, blue, alpha.
    pub rgba: [u8; 4],
}

impl PickColor {
    /// The cleared color: no widget.
    pub const CLEAR: Self = Self { rgba: [0, 0, 0, 0] };

    /// Encodes a 1-based list position.
    ///
    /// Returns `None` for position zero or positions past [`PICK_LIMIT`].
    #[must_use]
    pub fn encode(position: u32) -> Option<Self> {
        if position == 0 || position >= PICK_LIMIT {
            return None;
        }
        // Every channel is < 200 here.
        #[allow(clippy::cast_possible_truncation)]
        let rgba = [
            (position % BASE) as u8,
            ((position / BASE) % BASE) as u8,
            (position / (BASE * BASE)) as u8,
            u8::MAX,
        ];
        Some(Self { rgba })
    }

    /// Decodes back to a 1-based list position; zero means nothing.
    ///
    /// Channels outside the encoding (blended or garbage pixels) also
    /// decode to zero.
    #[must_use]
    pub fn decode(self) -> u32 {
        let [r, g, b, _] = self.rgba.map(u32::from);
        if r >= BASE || g >= BASE || b >= BASE {
            return 0;
        }
        r + g * BASE + b * BASE * BASE
    }

    /// Reinterprets raw bytes read back from a target.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        bytemuck::cast(bytes)
    }
}

/// Drawing surface handed to widget mask hooks.
///
/// Fills use whatever color the picker selected for the widget.
pub trait MaskSurface {
    /// Fills an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect);

    /// Fills a circle.
    fn fill_circle(&mut self, centre: (f32, f32), radius: f32);
}

/// Off-screen target for the color-mask pass.
///
/// A GPU backend implements this by rendering into a small texture; the
/// engine only needs the centre pixel back.
pub trait PickTarget: MaskSurface {
    /// Clears the target and centres it on `cursor`.
    fn begin(&mut self, cursor: (f32, f32));

    /// Color used by subsequent fills.
    fn set_color(&mut self, color: PickColor);

    /// Raw RGBA8 bytes of the pixel under the cursor.
    fn read_pixel(&mut self) -> [u8; 4];

    /// The target as a plain mask surface for widget hooks.
    fn surface(&mut self) -> &mut dyn MaskSurface;
}

/// CPU pick target: a 3x3 grid of one-pixel samples around the cursor.
#[derive(Debug, Clone)]
pub struct SoftwarePickTarget {
    origin: (f32, f32),
    color: PickColor,
    pixels: [PickColor; GRID * GRID],
}

impl SoftwarePickTarget {
    /// Edge length in pixels.
    pub const SIZE: usize = GRID;

    /// Creates a cleared target at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: (0.0, 0.0),
            color: PickColor::CLEAR,
            pixels: [PickColor::CLEAR; GRID * GRID],
        }
    }

    /// All pixels as raw bytes, row-major.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[allow(clippy::cast_precision_loss)]
    fn fill_where(&mut self, inside: impl Fn(f32, f32) -> bool) {
        for row in 0..Self::SIZE {
            for col in 0..Self::SIZE {
                let x = self.origin.0 + col as f32;
                let y = self.origin.1 + row as f32;
                if inside(x, y) {
                    self.pixels[row * Self::SIZE + col] = self.color;
                }
            }
        }
    }
}

impl Default for SoftwarePickTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl MaskSurface for SoftwarePickTarget {
    fn fill_rect(&mut self, rect: Rect) {
        self.fill_where(|x, y| rect.contains(x, y));
    }

    fn fill_circle(&mut self, centre: (f32, f32), radius: f32) {
        let r2 = radius * radius;
        self.fill_where(|x, y| {
            let dx = x - centre.0;
            let dy = y - centre.1;
            dx * dx + dy * dy <= r2
        });
    }
}

impl PickTarget for SoftwarePickTarget {
    fn begin(&mut self, cursor: (f32, f32)) {
        self.origin = (cursor.0 - 1.0, cursor.1 - 1.0);
        self.color = PickColor::CLEAR;
        self.pixels = [PickColor::CLEAR; GRID * GRID];
    }

    fn set_color(&mut self, color: PickColor) {
        self.color = color;
    }

    fn read_pixel(&mut self) -> [u8; 4] {
        let centre = Self::SIZE / 2;
        self.pixels[centre * Self::SIZE + centre].rgba
    }

    fn surface(&mut self) -> &mut dyn MaskSurface {
        self
    }
}
