//! Engine configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty document is a
//! valid configuration:
//!
//! ```toml
//! workers = 8
//! drag_threshold = 0.2      # seconds
//! snap_speed = 1000.0       # pixels per second
//! snap_offset = [0.0, 0.0]
//! pick_strategy = "color_mask"   # or "bounds"
//! max_frame_delta = 0.1
//! input_capacity = 1024
//! ```

use std::fs;
use std::path::Path;

use gambit_core::WorkerPool;
use gambit_ui::{InteractionSettings, PickStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::input::DEFAULT_INPUT_CAPACITY;

/// Per-instance engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Worker threads for the update pass.
    pub workers: usize,
    /// Seconds a press must be held before it becomes a drag.
    pub drag_threshold: f64,
    /// Snap and release animation speed, pixels per second.
    pub snap_speed: f32,
    /// Offset from a snap target's centre to the snapped position.
    pub snap_offset: [f32; 2],
    /// Picking method.
    pub pick_strategy: PickStrategy,
    /// Upper bound on a single frame's clock advance, seconds.
    pub max_frame_delta: f64,
    /// Input events buffered between frames.
    pub input_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: WorkerPool::DEFAULT_SIZE,
            drag_threshold: InteractionSettings::DEFAULT_DRAG_THRESHOLD,
            snap_speed: InteractionSettings::DEFAULT_SNAP_SPEED,
            snap_offset: [0.0, 0.0],
            pick_strategy: PickStrategy::default(),
            max_frame_delta: gambit_core::time::DEFAULT_MAX_DELTA,
            input_capacity: DEFAULT_INPUT_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed documents or unknown keys,
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// As [`EngineConfig::from_toml_str`], plus [`ConfigError::Io`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let document = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&document)?;
        tracing::debug!(path = %path.display(), ?config, "engine config loaded");
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(invalid("workers", "must be at least 1"));
        }
        if !self.drag_threshold.is_finite() || self.drag_threshold < 0.0 {
            return Err(invalid("drag_threshold", "must be a finite, non-negative number of seconds"));
        }
        if !self.snap_speed.is_finite() || self.snap_speed <= 0.0 {
            return Err(invalid("snap_speed", "must be a finite, positive speed"));
        }
        if !self.snap_offset.iter().all(|v| v.is_finite()) {
            return Err(invalid("snap_offset", "must be finite"));
        }
        if !self.max_frame_delta.is_finite() || self.max_frame_delta <= 0.0 {
            return Err(invalid("max_frame_delta", "must be a finite, positive number of seconds"));
        }
        if self.input_capacity == 0 {
            return Err(invalid("input_capacity", "must be at least 1"));
        }
        Ok(())
    }

    /// Interaction tunables for the widget engine.
    #[must_use]
    pub fn interaction_settings(&self) -> InteractionSettings {
        InteractionSettings {
            drag_threshold: self.drag_threshold,
            snap_speed: self.snap_speed,
            snap_offset: (self.snap_offset[0], self.snap_offset[1]),
            pick_strategy: self.pick_strategy,
        }
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_owned(),
    }
}
