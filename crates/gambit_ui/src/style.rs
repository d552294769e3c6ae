//! Animated transform attached to every widget.
//!
//! A [`Style`] pairs one keyframe path (position, scale, rotation and the
//! optional extra channels) with the widget's half extents. Picking,
//! drawing and the interaction engine all read geometry through it.

use crate::animation::{Channel, Path, PathRegistry, SharedPath, MAX_CHANNELS};
use crate::geometry::{distance, Rect};

/// How many channels a transform animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformLayout {
    /// x, y, scale x, scale y, rotation.
    #[default]
    Basic,
    /// Basic plus a camera blend factor.
    Camera,
    /// Camera plus an extra x/y offset.
    Full,
}

impl TransformLayout {
    /// Channel count for this layout.
    #[must_use]
    pub const fn channels(self) -> usize {
        match self {
            Self::Basic => 5,
            Self::Camera => 6,
            Self::Full => MAX_CHANNELS,
        }
    }
}

/// Widget transform: one animated path plus cached extents.
///
/// Cloning shares the underlying path.
#[derive(Debug, Clone)]
pub struct Style {
    path: SharedPath,
    layout: TransformLayout,
    half_width: f32,
    half_height: f32,
}

impl Style {
    /// Creates a transform resting at `(x, y)` with unit scale and no
    /// rotation, registering its path for per-frame blending.
    #[must_use]
    pub fn new(
        registry: &mut PathRegistry,
        layout: TransformLayout,
        position: (f32, f32),
        half_extents: (f32, f32),
        now: f64,
    ) -> Self {
        let mut values = [0.0; MAX_CHANNELS];
        values[Channel::X.index()] = position.0;
        values[Channel::Y.index()] = position.1;
        values[Channel::ScaleX.index()] = 1.0;
        values[Channel::ScaleY.index()] = 1.0;
        let path = registry.register(Path::new(layout.channels(), &values, now));
        Self {
            path,
            layout,
            half_width: half_extents.0,
            half_height: half_extents.1,
        }
    }

    /// The shared keyframe path.
    #[must_use]
    pub fn path(&self) -> &SharedPath {
        &self.path
    }

    /// Channel layout.
    #[must_use]
    pub fn layout(&self) -> TransformLayout {
        self.layout
    }

    /// Half width and half height, before scaling.
    #[must_use]
    pub fn extents(&self) -> (f32, f32) {
        (self.half_width, self.half_height)
    }

    /// Replaces the cached extents.
    pub fn set_extents(&mut self, half_width: f32, half_height: f32) {
        self.half_width = half_width;
        self.half_height = half_height;
    }

    /// Current (blended) centre.
    #[must_use]
    pub fn position(&self) -> (f32, f32) {
        let path = self.path.lock();
        (path.current_value(Channel::X), path.current_value(Channel::Y))
    }

    /// Centre the path is heading to.
    #[must_use]
    pub fn destination_position(&self) -> (f32, f32) {
        let path = self.path.lock();
        let dest = path.destination();
        (dest.get(Channel::X), dest.get(Channel::Y))
    }

    /// Current scale.
    #[must_use]
    pub fn scale(&self) -> (f32, f32) {
        let path = self.path.lock();
        (
            path.current_value(Channel::ScaleX),
            path.current_value(Channel::ScaleY),
        )
    }

    /// Current rotation in radians.
    #[must_use]
    pub fn rotation(&self) -> f32 {
        self.path.lock().current_value(Channel::Theta)
    }

    /// Axis-aligned bounds from the current centre, extents and scale.
    ///
    /// Rotation is ignored.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        let path = self.path.lock();
        let centre = (path.current_value(Channel::X), path.current_value(Channel::Y));
        Rect::from_center(
            centre,
            self.half_width * path.current_value(Channel::ScaleX),
            self.half_height * path.current_value(Channel::ScaleY),
        )
    }

    /// Snaps the centre to `(x, y)` with no animation.
    ///
    /// Other channels keep their current values; queued keypoints are
    /// dropped.
    pub fn pin_position(&self, x: f32, y: f32, now: f64) {
        let mut path = self.path.lock();
        let mut values = [0.0; MAX_CHANNELS];
        let channels = path.channels();
        values[..channels].copy_from_slice(path.current());
        values[Channel::X.index()] = x;
        values[Channel::Y.index()] = y;
        path.set(&values[..channels], now);
    }

    /// Catches the transform where it is and animates the centre to
    /// `target` at `speed` pixels per second.
    ///
    /// A non-positive speed arrives immediately.
    ///
    /// # Returns
    ///
    /// The arrival timestamp, or `None` if the keypoint could not be queued.
    pub fn move_to(&self, target: (f32, f32), speed: f32, now: f64) -> Option<f64> {
        let mut path = self.path.lock();
        path.interrupt(now);

        let mut values = [0.0; MAX_CHANNELS];
        let channels = path.channels();
        values[..channels].copy_from_slice(path.current());
        values[Channel::X.index()] = target.0;
        values[Channel::Y.index()] = target.1;
        queue_travel(&mut path, &values[..channels], speed, now)
    }

    /// Like [`Style::move_to`] but animates every channel to `values`.
    ///
    /// Travel time still comes from the centre distance.
    pub fn animate_to(&self, values: &[f32], speed: f32, now: f64) -> Option<f64> {
        let mut path = self.path.lock();
        path.interrupt(now);
        queue_travel(&mut path, values, speed, now)
    }
}

fn queue_travel(path: &mut Path, values: &[f32], speed: f32, now: f64) -> Option<f64> {
    let from = (path.current_value(Channel::X), path.current_value(Channel::Y));
    let to = (
        values.get(Channel::X.index()).copied().unwrap_or(from.0),
        values.get(Channel::Y.index()).copied().unwrap_or(from.1),
    );
    let duration = if speed > 0.0 {
        f64::from(distance(from, to) / speed)
    } else {
        0.0
    };

    let keypoint = path.push_keypoint(values, now)?;
    keypoint.timestamp = now + duration;
    Some(keypoint.timestamp)
}
