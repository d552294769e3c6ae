//! # Runtime Error Types
//!
//! Only construction-time failures are errors. Once a pipeline runs, every
//! per-frame operation degrades instead of failing.

use std::path::PathBuf;

use gambit_core::CoreError;
use thiserror::Error;

/// Configuration loading and validation failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid TOML for this schema.
    #[error("invalid config document: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field holds an unusable value.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Errors building a [`crate::FramePipeline`].
#[derive(Error, Debug)]
pub enum GambitError {
    /// Bad configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Kernel failure (worker threads).
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for pipeline construction.
pub type GambitResult<T> = Result<T, GambitError>;
