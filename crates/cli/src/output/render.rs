use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

use super::format::OutputFormat;
use super::model::{CommandError, CommandResult, DiagnosticEntry};
use crate::error::CliError;

/// Prints a command result to stdout in the requested format.
pub fn print_result<T: Serialize>(format: OutputFormat, result: &CommandResult<T>) {
	match format {
		OutputFormat::Json => match serde_json::to_string_pretty(result) {
			Ok(json) => println!("{json}"),
			Err(err) => eprintln!("failed to serialize result: {err}"),
		},
		OutputFormat::Text => {
			println!("{} {}", "ok".green().bold(), result.command.bold());
			if let Some(data) = result.data.as_ref().and_then(|d| serde_json::to_value(d).ok()) {
				print_fields(&data);
			}
			print_diagnostics(&result.diagnostics);
		}
	}
}

/// Prints a failure envelope. JSON goes to stdout, text to stderr.
pub fn print_error(format: OutputFormat, command: &str, err: &CliError, diagnostics: &[hearth::Diagnostic]) {
	let entries: Vec<DiagnosticEntry> = diagnostics.iter().map(DiagnosticEntry::from).collect();
	let error = CommandError {
		code: err.code(),
		message: err.to_string(),
	};
	match format {
		OutputFormat::Json => {
			let result: CommandResult<()> = CommandResult::failure(command, error, entries);
			match serde_json::to_string_pretty(&result) {
				Ok(json) => println!("{json}"),
				Err(ser) => eprintln!("failed to serialize error: {ser}"),
			}
		}
		OutputFormat::Text => {
			eprintln!("{} {} [{}] {}", "error".red().bold(), command.bold(), error.code, error.message);
			for entry in &entries {
				eprintln!("  {} {}: {}", "warning".yellow(), entry.kind, entry.message);
			}
		}
	}
}

fn print_fields(data: &Value) {
	let Value::Object(fields) = data else {
		println!("  {data}");
		return;
	};
	for (key, value) in fields {
		let rendered = match value {
			Value::String(s) => s.clone(),
			Value::Array(items) if items.is_empty() => "-".to_string(),
			Value::Array(items) => items
				.iter()
				.map(|item| match item {
					Value::String(s) => s.clone(),
					other => other.to_string(),
				})
				.collect::<Vec<_>>()
				.join(", "),
			other => other.to_string(),
		};
		println!("  {}: {}", key.cyan(), rendered);
	}
}

fn print_diagnostics(entries: &[DiagnosticEntry]) {
	for entry in entries {
		println!("  {} {}: {}", "warning".yellow(), entry.kind, entry.message);
	}
}
