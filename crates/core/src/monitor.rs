//! Funnel for "session invalid" signals from request handlers.
//!
//! Any number of tasks may call [`SessionMonitor::report_invalid_session`]
//! concurrently. The first caller to claim the store's drop guard performs
//! the transition; every other caller returns without side effects.
//!
//! The winner:
//!
//! 1. swaps the session for [`Session::Unauthenticated`],
//! 2. clears the persisted blob if this epoch still owns it (best effort; a
//!    failure is recorded and the in-memory transition stands),
//! 3. delivers [`crate::SessionDropped`] to the store's drop handlers.
//!
//! Unauthenticated epochs start with the guard already set, so reports
//! against them return [`ReportOutcome::Redundant`] without touching state.
//! Nothing here suspends, so the guard claim is a single atomic step.

use std::sync::Arc;

use hearth_protocol::Session;
use tracing::{debug, info};

use crate::diagnostics::{Diagnostic, DiagnosticsSink};
use crate::persistence::SessionSlot;
use crate::store::RootStore;

/// What a single report did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
	/// This report dropped the session and delivered the drop event.
	Dropped,
	/// Nothing to do: the epoch already dropped, logged out, was retired or
	/// never had a session.
	Redundant,
}

#[derive(Clone)]
pub struct SessionMonitor {
	store: RootStore,
	slot: Arc<SessionSlot>,
	diagnostics: Arc<dyn DiagnosticsSink>,
}

impl SessionMonitor {
	pub(crate) fn new(store: RootStore, slot: Arc<SessionSlot>, diagnostics: Arc<dyn DiagnosticsSink>) -> Self {
		Self { store, slot, diagnostics }
	}

	/// Store this monitor guards.
	pub fn store(&self) -> &RootStore {
		&self.store
	}

	/// Reports that a request failed authorization.
	pub fn report_invalid_session(&self) -> ReportOutcome {
		if !self.store.guard().try_claim() {
			return ReportOutcome::Redundant;
		}

		let Some(identity) = self.store.current_session().identity().cloned() else {
			debug!(target = "hearth.session", epoch = self.store.epoch(), "claimed guard without a session");
			return ReportOutcome::Redundant;
		};
		self.store.replace_session(Session::Unauthenticated);
		info!(target = "hearth.session", epoch = self.store.epoch(), %identity, "session invalidated");

		if let Some(Err(err)) = self.slot.clear_for(self.store.epoch()) {
			self.diagnostics.record(Diagnostic::PersistenceClearFailure { error: err.to_string() });
		}

		self.store.trigger_session_drop(identity);
		ReportOutcome::Dropped
	}
}

impl std::fmt::Debug for SessionMonitor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SessionMonitor").field("epoch", &self.store.epoch()).finish()
	}
}
