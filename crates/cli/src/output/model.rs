use serde::{Deserialize, Serialize};

/// Current schema version for command output.
pub const SCHEMA_VERSION: u32 = 1;

/// The result envelope returned by all commands.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T> {
	pub schema_version: u32,
	pub ok: bool,
	pub command: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub diagnostics: Vec<DiagnosticEntry>,
}

impl<T> CommandResult<T> {
	pub fn success(command: &str, data: T, diagnostics: Vec<DiagnosticEntry>) -> Self {
		Self {
			schema_version: SCHEMA_VERSION,
			ok: true,
			command: command.to_string(),
			data: Some(data),
			error: None,
			diagnostics,
		}
	}

	pub fn failure(command: &str, error: CommandError, diagnostics: Vec<DiagnosticEntry>) -> Self {
		Self {
			schema_version: SCHEMA_VERSION,
			ok: false,
			command: command.to_string(),
			data: None,
			error: Some(error),
			diagnostics,
		}
	}
}

/// Error information for failed commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,
	pub message: String,
}

/// Standardized error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	AlreadyBootstrapped,
	StorageError,
	InvalidInput,
	InternalError,
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ErrorCode::AlreadyBootstrapped => write!(f, "ALREADY_BOOTSTRAPPED"),
			ErrorCode::StorageError => write!(f, "STORAGE_ERROR"),
			ErrorCode::InvalidInput => write!(f, "INVALID_INPUT"),
			ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
		}
	}
}

/// Serializable form of a recovered failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticEntry {
	pub kind: String,
	pub message: String,
}

impl From<&hearth::Diagnostic> for DiagnosticEntry {
	fn from(diagnostic: &hearth::Diagnostic) -> Self {
		let (kind, message) = match diagnostic {
			hearth::Diagnostic::BootstrapWarning { reason } => ("bootstrapWarning", reason.clone()),
			hearth::Diagnostic::PersistenceClearFailure { error } => ("persistenceClearFailure", error.clone()),
			hearth::Diagnostic::SubscriberFailure { registry, token, message } => ("subscriberFailure", format!("{registry} {token}: {message}")),
		};
		Self {
			kind: kind.to_string(),
			message,
		}
	}
}

/// Payload of `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusData {
	pub authenticated: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub identity: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub handle: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub service: Option<String>,
	pub epoch: u64,
	pub color_mode: String,
	pub sub_stores: Vec<String>,
	pub session_file: String,
}

/// Payload of `login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
	pub identity: String,
	pub epoch: u64,
	pub replaced_epoch: u64,
	pub session_file: String,
}

/// Payload of `logout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutData {
	pub was_authenticated: bool,
	pub epoch: u64,
}

/// Payload of `expire`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpireData {
	pub reporters: usize,
	pub dropped: usize,
	pub redundant: usize,
	pub drop_events_delivered: usize,
	pub authenticated_after: bool,
	pub notices: Vec<String>,
	pub analytics_events: Vec<String>,
}

/// Payload of `soft-reset`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftResetData {
	pub emitted: u32,
	pub listeners: usize,
	pub resets_observed: u64,
}
