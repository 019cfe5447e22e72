use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hearth::{ColorMode, SESSION_FILE_ENV};

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "hearth")]
#[command(about = "Inspect and drive the hearth session lifecycle")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Persisted session file (defaults to the platform config directory)
	#[arg(long, global = true, value_name = "FILE", env = SESSION_FILE_ENV)]
	pub session_file: Option<PathBuf>,

	/// Output format
	#[arg(short = 'f', long, global = true, value_enum, default_value_t = OutputFormat::Text)]
	pub format: OutputFormat,

	/// Initial shell color mode (system, light, dark)
	#[arg(long, global = true, default_value = "system")]
	pub color_mode: ColorMode,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Bootstrap the store and show the hydrated session
	Status,

	/// Persist a session and start an authenticated epoch
	Login {
		/// Stable account id (for example a DID)
		#[arg(long)]
		identity: String,
		/// Access credential
		#[arg(long)]
		credential: String,
		/// Display handle
		#[arg(long)]
		handle: Option<String>,
		/// Service that issued the credential
		#[arg(long)]
		service: Option<String>,
	},

	/// End the current session and clear persisted state
	Logout,

	/// Simulate concurrent authorization failures against the current session
	Expire {
		/// Number of concurrent requests reporting an invalid session
		#[arg(long, default_value_t = 8)]
		reporters: usize,
	},

	/// Emit screen soft resets to registered listeners
	SoftReset {
		/// Number of resets to emit
		#[arg(long, default_value_t = 1)]
		times: u32,
	},
}

impl Commands {
	/// Stable command name used in output envelopes.
	pub fn name(&self) -> &'static str {
		match self {
			Commands::Status => "status",
			Commands::Login { .. } => "login",
			Commands::Logout => "logout",
			Commands::Expire { .. } => "expire",
			Commands::SoftReset { .. } => "soft-reset",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_global_flags_after_subcommand() {
		let cli = Cli::try_parse_from(["hearth", "expire", "--reporters", "3", "-f", "json", "-vv", "--color-mode", "dark"]).unwrap();
		assert_eq!(cli.verbose, 2);
		assert_eq!(cli.format, OutputFormat::Json);
		assert_eq!(cli.color_mode, ColorMode::Dark);
		assert!(matches!(cli.command, Commands::Expire { reporters: 3 }));
	}

	#[test]
	fn login_requires_identity_and_credential() {
		assert!(Cli::try_parse_from(["hearth", "login", "--identity", "did:x"]).is_err());
		let cli = Cli::try_parse_from(["hearth", "login", "--identity", "did:x", "--credential", "tok"]).unwrap();
		assert_eq!(cli.command.name(), "login");
	}

	#[test]
	fn rejects_unknown_color_mode() {
		assert!(Cli::try_parse_from(["hearth", "status", "--color-mode", "sepia"]).is_err());
	}
}
