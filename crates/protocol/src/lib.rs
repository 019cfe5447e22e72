//! Session data types for hearth.
//!
//! This crate holds the values that cross the boundary between the session
//! controller and its storage collaborator:
//!
//! * [`Session`]: the in-memory authentication state of one store epoch
//! * [`PersistedSession`]: the on-disk blob, its validation and encoding
//!
//! Types here are pure data. Lifecycle behavior lives in `hearth-rs`.

pub mod persisted;
pub mod session;

pub use persisted::*;
pub use session::*;
