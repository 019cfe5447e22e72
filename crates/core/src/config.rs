//! Store configuration.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use hearth_runtime::FileStorage;
use hearth_runtime::paths::default_session_file;

/// Environment variable overriding the session file location.
pub const SESSION_FILE_ENV: &str = "HEARTH_SESSION_FILE";

/// Where and how the store persists its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
	session_file: PathBuf,
}

impl Default for StoreConfig {
	fn default() -> Self {
		Self {
			session_file: default_session_file(),
		}
	}
}

impl StoreConfig {
	/// Defaults, with [`SESSION_FILE_ENV`] applied when set.
	pub fn from_env() -> Self {
		Self::from_env_value(std::env::var_os(SESSION_FILE_ENV))
	}

	fn from_env_value(value: Option<OsString>) -> Self {
		match value.filter(|v| !v.is_empty()) {
			Some(path) => Self::default().with_session_file(path),
			None => Self::default(),
		}
	}

	pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
		self.session_file = path.into();
		self
	}

	pub fn session_file(&self) -> &Path {
		&self.session_file
	}

	/// File storage rooted at the configured session file.
	pub fn storage(&self) -> FileStorage {
		FileStorage::new(&self.session_file)
	}
}
