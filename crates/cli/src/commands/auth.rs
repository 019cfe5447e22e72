//! Session start and end.

use hearth::{Credential, Identity};
use tracing::info;

use crate::context::CommandContext;
use crate::error::{CliError, Result};
use crate::output::{CommandResult, LoginData, LogoutData, print_result};

/// Persists a new session and reports the epoch it starts.
///
/// # Errors
///
/// Returns an error if the identity or credential is empty, or if the
/// session file cannot be written.
pub async fn login(ctx: &CommandContext, identity: String, credential: String, handle: Option<String>, service: Option<String>) -> Result<()> {
	if identity.trim().is_empty() {
		return Err(CliError::InvalidInput("identity must not be empty".into()));
	}
	if credential.is_empty() {
		return Err(CliError::InvalidInput("credential must not be empty".into()));
	}

	let bootstrapper = ctx.bootstrapper();
	let current = bootstrapper.setup().await?;

	let mut id = Identity::new(identity);
	if let Some(handle) = handle {
		id = id.with_handle(handle);
	}
	let account = id.account_id().to_string();
	let next = bootstrapper.login(&current, id, Credential::from(credential), service)?;
	info!(target = "hearth.host", identity = %account, epoch = next.epoch(), "session persisted");

	let data = LoginData {
		identity: account,
		epoch: next.epoch(),
		replaced_epoch: current.epoch(),
		session_file: ctx.config().session_file().display().to_string(),
	};

	bootstrapper.teardown(next);
	print_result(ctx.format(), &CommandResult::success("login", data, ctx.take_diagnostics()));
	Ok(())
}

/// Clears the persisted session.
pub async fn logout(ctx: &CommandContext) -> Result<()> {
	let bootstrapper = ctx.bootstrapper();
	let current = bootstrapper.setup().await?;
	let was_authenticated = current.is_authenticated();

	let next = bootstrapper.logout(&current);
	let data = LogoutData {
		was_authenticated,
		epoch: next.epoch(),
	};

	bootstrapper.teardown(next);
	print_result(ctx.format(), &CommandResult::success("logout", data, ctx.take_diagnostics()));
	Ok(())
}
