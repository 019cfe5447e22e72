use hearth::{SESSION_KEY, SHELL_KEY, SessionStore, ShellStore};
use tracing::debug;

use crate::context::CommandContext;
use crate::error::Result;
use crate::output::{CommandResult, StatusData, print_result};

/// Bootstraps the store and reports the hydrated session.
pub async fn run(ctx: &CommandContext) -> Result<()> {
	let bootstrapper = ctx.bootstrapper();
	let store = bootstrapper.setup().await?;
	debug!(target = "hearth.host", epoch = store.epoch(), "status resolved");

	let session = store.current_session();
	let session_store = store.sub_store::<SessionStore>(SESSION_KEY);
	let color_mode = store
		.sub_store::<ShellStore>(SHELL_KEY)
		.map(|shell| shell.color_mode().to_string())
		.unwrap_or_default();

	let data = StatusData {
		authenticated: session.is_authenticated(),
		identity: session.identity().map(|id| id.account_id().to_string()),
		handle: session
			.identity()
			.and_then(|id| id.handle().map(str::to_string))
			.or_else(|| session_store.as_ref().and_then(|s| s.handle().map(str::to_string))),
		service: session_store.as_ref().and_then(|s| s.service().map(str::to_string)),
		epoch: store.epoch(),
		color_mode,
		sub_stores: store.sub_store_keys().into_iter().map(str::to_string).collect(),
		session_file: ctx.config().session_file().display().to_string(),
	};

	bootstrapper.teardown(store);
	print_result(ctx.format(), &CommandResult::success("status", data, ctx.take_diagnostics()));
	Ok(())
}
