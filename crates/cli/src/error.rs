use thiserror::Error;

use crate::output::ErrorCode;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Store(#[from] hearth::Error),

	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error("task failed: {0}")]
	Task(#[from] tokio::task::JoinError),

	#[error("collaborator failed: {0}")]
	Collaborator(#[from] anyhow::Error),
}

impl CliError {
	/// Maps the error to its output envelope code.
	pub fn code(&self) -> ErrorCode {
		match self {
			CliError::Store(hearth::Error::AlreadyBootstrapped) => ErrorCode::AlreadyBootstrapped,
			CliError::Store(hearth::Error::Storage(_) | hearth::Error::Encode(_)) => ErrorCode::StorageError,
			CliError::Store(hearth::Error::TaskJoin(_)) | CliError::Task(_) | CliError::Collaborator(_) => ErrorCode::InternalError,
			CliError::InvalidInput(_) => ErrorCode::InvalidInput,
		}
	}
}
