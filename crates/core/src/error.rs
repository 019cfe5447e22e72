//! Error types for store lifecycle operations.
//!
//! Only conditions the caller must act on are errors. Recoverable conditions
//! (unusable persisted blob, failed clear, failing subscriber) are reported
//! through [`crate::diagnostics`] instead.

use thiserror::Error;

/// Result alias used throughout hearth.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// `setup()` was called again without a `teardown()` in between.
	#[error("store already bootstrapped; tear down the current store before calling setup again")]
	AlreadyBootstrapped,

	#[error("session storage failed: {0}")]
	Storage(#[from] std::io::Error),

	#[error("failed to encode session blob: {0}")]
	Encode(#[from] serde_json::Error),

	/// The blocking storage read could not be joined.
	#[error("session read task failed: {0}")]
	TaskJoin(String),
}

impl Error {
	/// Returns `true` for caller misuse rather than a runtime condition.
	pub fn is_programming_error(&self) -> bool {
		matches!(self, Self::AlreadyBootstrapped)
	}
}
