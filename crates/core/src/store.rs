//! The root state store for one session epoch.
//!
//! A [`RootStore`] is a cheap, cloneable handle. All clones observe the same
//! session, sub-stores and subscriber registries. The store is only ever
//! handed out fully constructed by [`crate::StoreBootstrapper`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hearth_protocol::{Identity, Session};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::diagnostics::DiagnosticsSink;
use crate::guard::{DropGuard, GuardState};
use crate::registry::{SubscriptionHandle, SubscriptionRegistry};
use crate::substore::{SubStore, SubStores};

/// Delivered to session-drop handlers when an authenticated session is lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDropped {
	/// Epoch of the store that lost its session.
	pub epoch: u64,
	/// Identity that was signed in before the drop.
	pub identity: Identity,
}

/// Delivered to soft-reset listeners on every [`RootStore::emit_screen_soft_reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSoftReset {
	pub epoch: u64,
	/// Per-store counter, starting at 1.
	pub sequence: u64,
}

struct RootStoreInner {
	epoch: u64,
	session: RwLock<Arc<Session>>,
	guard: DropGuard,
	sub_stores: SubStores,
	drop_handlers: Arc<SubscriptionRegistry<SessionDropped>>,
	soft_reset_handlers: Arc<SubscriptionRegistry<ScreenSoftReset>>,
	soft_resets: AtomicU64,
}

#[derive(Clone)]
pub struct RootStore {
	inner: Arc<RootStoreInner>,
}

impl RootStore {
	pub(crate) fn new(epoch: u64, session: Session, sub_stores: SubStores, diagnostics: Arc<dyn DiagnosticsSink>) -> Self {
		let guard = if session.is_authenticated() { DropGuard::new() } else { DropGuard::retired() };
		Self {
			inner: Arc::new(RootStoreInner {
				epoch,
				session: RwLock::new(Arc::new(session)),
				guard,
				sub_stores,
				drop_handlers: Arc::new(SubscriptionRegistry::new("session-drop", Arc::clone(&diagnostics))),
				soft_reset_handlers: Arc::new(SubscriptionRegistry::new("soft-reset", diagnostics)),
				soft_resets: AtomicU64::new(0),
			}),
		}
	}

	/// Sequence number of this store among those built by its bootstrapper.
	pub fn epoch(&self) -> u64 {
		self.inner.epoch
	}

	pub fn current_session(&self) -> Arc<Session> {
		Arc::clone(&self.inner.session.read())
	}

	pub fn is_authenticated(&self) -> bool {
		self.inner.session.read().is_authenticated()
	}

	pub fn guard_state(&self) -> GuardState {
		self.inner.guard.state()
	}

	/// Returns `true` once this epoch has delivered its drop event.
	pub fn has_dropped(&self) -> bool {
		self.inner.guard.state() == GuardState::Delivered
	}

	/// Returns the sub-store under `key` if it has type `S`.
	pub fn sub_store<S: SubStore>(&self, key: &str) -> Option<Arc<S>> {
		self.inner.sub_stores.get(key)
	}

	pub fn sub_store_keys(&self) -> Vec<&'static str> {
		self.inner.sub_stores.keys().collect()
	}

	/// Registers a handler for this epoch's session drop.
	///
	/// The returned handle's `unsubscribe()` removes exactly this handler.
	pub fn register_session_drop_handler<F>(&self, handler: F) -> SubscriptionHandle<SessionDropped>
	where
		F: Fn(&SessionDropped) -> anyhow::Result<()> + Send + Sync + 'static,
	{
		self.inner.drop_handlers.subscribe(handler)
	}

	pub fn session_drop_handler_count(&self) -> usize {
		self.inner.drop_handlers.len()
	}

	/// Registers a listener for screen soft resets.
	pub fn register_soft_reset_handler<F>(&self, handler: F) -> SubscriptionHandle<ScreenSoftReset>
	where
		F: Fn(&ScreenSoftReset) -> anyhow::Result<()> + Send + Sync + 'static,
	{
		self.inner.soft_reset_handlers.subscribe(handler)
	}

	pub fn soft_reset_handler_count(&self) -> usize {
		self.inner.soft_reset_handlers.len()
	}

	/// Asks listeners to return the current screen to its top state.
	///
	/// Unguarded: every call dispatches synchronously to the listeners
	/// registered at call time.
	pub fn emit_screen_soft_reset(&self) {
		let event = ScreenSoftReset {
			epoch: self.inner.epoch,
			sequence: self.inner.soft_resets.fetch_add(1, Ordering::Relaxed) + 1,
		};
		debug!(target = "hearth.store", epoch = event.epoch, sequence = event.sequence, "screen soft reset");
		self.inner.soft_reset_handlers.notify_all(&event);
	}

	/// Delivers the session-drop event for a claimed guard.
	///
	/// No-op unless a reporter has claimed the guard and nothing has been
	/// delivered yet, so repeated calls fire at most once per epoch.
	pub(crate) fn trigger_session_drop(&self, identity: Identity) -> bool {
		if !self.inner.guard.try_deliver() {
			debug!(target = "hearth.store", epoch = self.inner.epoch, state = ?self.inner.guard.state(), "session drop already handled");
			return false;
		}

		let event = SessionDropped {
			epoch: self.inner.epoch,
			identity,
		};
		let report = self.inner.drop_handlers.notify_all(&event);
		info!(
			target = "hearth.store",
			epoch = event.epoch,
			identity = %event.identity,
			handlers = report.attempted,
			failed = report.failed,
			"session drop delivered"
		);
		true
	}

	pub(crate) fn guard(&self) -> &DropGuard {
		&self.inner.guard
	}

	/// Swaps in `session` and returns the previous value.
	pub(crate) fn replace_session(&self, session: Session) -> Arc<Session> {
		std::mem::replace(&mut *self.inner.session.write(), Arc::new(session))
	}
}

impl std::fmt::Debug for RootStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RootStore")
			.field("epoch", &self.inner.epoch)
			.field("session", &self.current_session())
			.field("guard", &self.inner.guard.state())
			.field("sub_stores", &self.sub_store_keys())
			.finish()
	}
}
