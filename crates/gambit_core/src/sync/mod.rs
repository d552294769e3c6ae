//! # Synchronization Primitives for the Frame Update
//!
//! ## The Problem
//!
//! ```text
//! Update pass:       blend 500 paths, run 200 widget update hooks
//! Interaction pass:  reads transforms the update pass just wrote
//!
//! Without a barrier: interaction reads half-blended state
//! Single-threaded:   the update pass eats the frame budget
//! ```
//!
//! ## The Solution: Fan Out, Then Join
//!
//! ```text
//! main ──submit_batch──> [job channel] ──> worker 0..N
//!   │                                          │
//!   └────────── wait() <── pending == 0 <──────┘
//! ```
//!
//! Tasks in one batch carry no ordering between them. The only guarantee
//! is that every task submitted before `wait()` has finished when it returns.

mod work_queue;

pub use work_queue::{Task, TaskList, WorkerPool};
