//! # Memory Management
//!
//! Stable handles over growable storage.
//!
//! ## Design Philosophy
//!
//! Handles outlive the things they point at. A freed slot bumps its
//! generation, so a stale handle resolves to `None` instead of aliasing
//! whatever moved in afterwards.

mod pool;

pub use pool::{SlotHandle, SlotPool};
