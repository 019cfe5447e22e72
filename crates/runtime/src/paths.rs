//! State path resolution.

use std::path::PathBuf;

/// Directory name used under the platform config directory.
pub const APP_DIR: &str = "hearth";
/// File name of the persisted session blob.
pub const SESSION_FILE: &str = "session.json";

/// Returns the hearth config directory, falling back to the working directory
/// when the platform has none.
pub fn config_dir() -> PathBuf {
	dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}

/// Returns the default location of the persisted session blob.
pub fn default_session_file() -> PathBuf {
	config_dir().join(SESSION_FILE)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn session_file_lives_in_app_dir() {
		let path = default_session_file();
		assert!(path.ends_with(PathBuf::from(APP_DIR).join(SESSION_FILE)));
	}
}
