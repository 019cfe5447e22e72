use crate::collaborators::{Collaborator, ScreenStack};
use crate::context::CommandContext;
use crate::error::Result;
use crate::output::{CommandResult, SoftResetData, print_result};

pub async fn run(ctx: &CommandContext, times: u32) -> Result<()> {
	let bootstrapper = ctx.bootstrapper();
	let store = bootstrapper.setup().await?;

	let stack = ScreenStack::default();
	stack.init(&store).await?;

	for _ in 0..times {
		store.emit_screen_soft_reset();
	}

	let data = SoftResetData {
		emitted: times,
		listeners: store.soft_reset_handler_count(),
		resets_observed: stack.resets().last().map(|reset| reset.sequence).unwrap_or(0),
	};

	bootstrapper.teardown(store);
	print_result(ctx.format(), &CommandResult::success("soft-reset", data, ctx.take_diagnostics()));
	Ok(())
}
