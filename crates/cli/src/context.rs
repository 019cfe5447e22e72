//! Per-invocation command context.

use std::path::PathBuf;
use std::sync::Arc;

use hearth::{ColorMode, RecordingDiagnostics, StoreBootstrapper, StoreConfig};

use crate::output::{DiagnosticEntry, OutputFormat};

/// Configuration and shared sinks for one CLI invocation.
pub struct CommandContext {
	config: StoreConfig,
	color_mode: ColorMode,
	format: OutputFormat,
	diagnostics: Arc<RecordingDiagnostics>,
}

impl CommandContext {
	/// Builds a context. `session_file` overrides the configured location.
	pub fn new(session_file: Option<PathBuf>, color_mode: ColorMode, format: OutputFormat) -> Self {
		let config = match session_file {
			Some(path) => StoreConfig::from_env().with_session_file(path),
			None => StoreConfig::from_env(),
		};
		Self {
			config,
			color_mode,
			format,
			diagnostics: Arc::new(RecordingDiagnostics::new()),
		}
	}

	pub fn config(&self) -> &StoreConfig {
		&self.config
	}

	pub fn format(&self) -> OutputFormat {
		self.format
	}

	pub fn diagnostics(&self) -> &Arc<RecordingDiagnostics> {
		&self.diagnostics
	}

	/// Drains recorded diagnostics into output entries.
	pub fn take_diagnostics(&self) -> Vec<DiagnosticEntry> {
		self.diagnostics.take().iter().map(DiagnosticEntry::from).collect()
	}

	/// Bootstrapper over the configured file storage, recording diagnostics
	/// into this context.
	pub fn bootstrapper(&self) -> StoreBootstrapper {
		StoreBootstrapper::from_config(&self.config)
			.with_diagnostics(self.diagnostics.clone())
			.with_color_mode(self.color_mode)
	}
}
