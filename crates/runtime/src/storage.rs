//! Session blob persistence.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Persistence collaborator for the session blob.
///
/// The payload is opaque to implementations. Calls are synchronous; callers
/// that must not block an async executor run them on the blocking pool.
pub trait SessionStorage: Send + Sync {
	/// Returns the stored blob, or `None` when nothing is stored.
	fn read(&self) -> io::Result<Option<Vec<u8>>>;

	/// Replaces the stored blob.
	fn write(&self, blob: &[u8]) -> io::Result<()>;

	/// Removes the stored blob. Clearing empty storage succeeds.
	fn clear(&self) -> io::Result<()>;
}

/// File-backed storage for a single session blob.
#[derive(Debug, Clone)]
pub struct FileStorage {
	path: PathBuf,
}

impl FileStorage {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Storage at [`crate::paths::default_session_file`].
	pub fn at_default_location() -> Self {
		Self::new(crate::paths::default_session_file())
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl SessionStorage for FileStorage {
	fn read(&self) -> io::Result<Option<Vec<u8>>> {
		match fs::read(&self.path) {
			Ok(bytes) => Ok(Some(bytes)),
			Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
			Err(err) => Err(err),
		}
	}

	fn write(&self, blob: &[u8]) -> io::Result<()> {
		if let Some(parent) = self.path.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent)?;
			}
		}
		fs::write(&self.path, blob)?;
		debug!(target = "hearth.storage", path = %self.path.display(), bytes = blob.len(), "session blob written");
		Ok(())
	}

	fn clear(&self) -> io::Result<()> {
		match fs::remove_file(&self.path) {
			Ok(()) => {
				debug!(target = "hearth.storage", path = %self.path.display(), "session blob removed");
				Ok(())
			}
			Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
			Err(err) => Err(err),
		}
	}
}
