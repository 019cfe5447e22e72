//! Storage collaborators for the hearth session controller.
//!
//! The controller only needs three operations on persisted session state
//! (read, write, clear), captured by [`SessionStorage`]. This crate provides a
//! file-backed implementation for hosts and an in-memory one for tests and
//! embedders that persist elsewhere.

/// In-memory storage with scripted failures.
pub mod memory;
/// Default on-disk locations for hearth state.
pub mod paths;
/// Storage trait and file-backed implementation.
pub mod storage;

pub use memory::MemoryStorage;
pub use storage::{FileStorage, SessionStorage};
