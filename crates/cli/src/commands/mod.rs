mod auth;
mod expire;
mod soft_reset;
mod status;

use crate::cli::Commands;
use crate::context::CommandContext;
use crate::error::Result;

pub async fn dispatch(command: Commands, ctx: &CommandContext) -> Result<()> {
	match command {
		Commands::Status => status::run(ctx).await?,
		Commands::Login {
			identity,
			credential,
			handle,
			service,
		} => auth::login(ctx, identity, credential, handle, service).await?,
		Commands::Logout => auth::logout(ctx).await?,
		Commands::Expire { reporters } => expire::run(ctx, reporters).await?,
		Commands::SoftReset { times } => soft_reset::run(ctx, times).await?,
	}

	Ok(())
}
