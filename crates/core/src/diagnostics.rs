//! Diagnostics sink for recovered failures.
//!
//! Bootstrap warnings, failed persistence clears and failing subscribers never
//! reach the caller as errors. They are recorded here so hosts can surface
//! them to crash reporting or inspect them in tests.

use parking_lot::Mutex;
use tracing::warn;

use crate::registry::SubscriptionToken;

/// A recovered failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
	/// Persisted session was corrupt or unreadable; bootstrap fell back to
	/// an unauthenticated session.
	BootstrapWarning { reason: String },
	/// Clearing the persisted session failed after the in-memory session was
	/// already dropped.
	PersistenceClearFailure { error: String },
	/// A subscriber returned an error or panicked during delivery.
	SubscriberFailure {
		registry: &'static str,
		token: SubscriptionToken,
		message: String,
	},
}

impl Diagnostic {
	pub fn is_bootstrap_warning(&self) -> bool {
		matches!(self, Self::BootstrapWarning { .. })
	}

	pub fn is_persistence_clear_failure(&self) -> bool {
		matches!(self, Self::PersistenceClearFailure { .. })
	}

	pub fn is_subscriber_failure(&self) -> bool {
		matches!(self, Self::SubscriberFailure { .. })
	}
}

/// Receives recovered failures.
pub trait DiagnosticsSink: Send + Sync {
	fn record(&self, diagnostic: Diagnostic);
}

/// Emits each diagnostic as a `tracing` warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
	fn record(&self, diagnostic: Diagnostic) {
		log_diagnostic(&diagnostic);
	}
}

/// Logs and keeps every diagnostic for later inspection.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
	entries: Mutex<Vec<Diagnostic>>,
}

impl RecordingDiagnostics {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a copy of everything recorded so far.
	pub fn entries(&self) -> Vec<Diagnostic> {
		self.entries.lock().clone()
	}

	/// Drains the recorded diagnostics.
	pub fn take(&self) -> Vec<Diagnostic> {
		std::mem::take(&mut *self.entries.lock())
	}

	/// Counts recorded diagnostics matching `predicate`.
	pub fn count(&self, predicate: impl Fn(&Diagnostic) -> bool) -> usize {
		self.entries.lock().iter().filter(|d| predicate(*d)).count()
	}
}

impl DiagnosticsSink for RecordingDiagnostics {
	fn record(&self, diagnostic: Diagnostic) {
		log_diagnostic(&diagnostic);
		self.entries.lock().push(diagnostic);
	}
}

fn log_diagnostic(diagnostic: &Diagnostic) {
	match diagnostic {
		Diagnostic::BootstrapWarning { reason } => {
			warn!(target = "hearth.bootstrap", %reason, "persisted session unusable; starting unauthenticated");
		}
		Diagnostic::PersistenceClearFailure { error } => {
			warn!(target = "hearth.session", %error, "failed to clear persisted session; in-memory session already dropped");
		}
		Diagnostic::SubscriberFailure { registry, token, message } => {
			warn!(target = "hearth.registry", registry, token = token.get(), %message, "subscriber failed during delivery");
		}
	}
}
