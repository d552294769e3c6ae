//! # Core Error Types
//!
//! Only true boundaries fail loudly. Per-frame operations report
//! failure through `Option`/`bool` sentinels instead.

use thiserror::Error;

/// Errors that can occur while standing up core services.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A worker thread could not be spawned.
    #[error("failed to spawn worker {index}: {source}")]
    WorkerSpawn {
        /// Index of the worker that failed.
        index: usize,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The worker pool has already shut down.
    #[error("worker pool is shut down")]
    PoolClosed,
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
