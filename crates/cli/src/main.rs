use clap::Parser;
use hearth_cli::{cli::Cli, commands, context::CommandContext, logging, output};
use tracing::error;

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let ctx = CommandContext::new(cli.session_file, cli.color_mode, cli.format);
	let command = cli.command.name();

	if let Err(err) = commands::dispatch(cli.command, &ctx).await {
		error!(target = "hearth", error = %err, "command failed");
		output::print_error(ctx.format(), command, &err, &ctx.diagnostics().take());
		std::process::exit(1);
	}
}
