//! One-time asynchronous construction of the root store.
//!
//! [`StoreBootstrapper::setup`] reads the persisted session on the blocking
//! pool, hydrates a [`Session`] from it and returns a fully constructed
//! [`RootStore`]. A missing blob yields an unauthenticated store; a corrupt or
//! unreadable one does too, with a [`Diagnostic::BootstrapWarning`] recorded
//! instead of an error.
//!
//! The bootstrapper also owns the epoch transitions that replace a store:
//! [`login`](StoreBootstrapper::login), [`logout`](StoreBootstrapper::logout)
//! and [`teardown`](StoreBootstrapper::teardown). Each retires the outgoing
//! store's drop guard so late invalid-session reports against it are no-ops.
//! Writes and clears of the persisted blob are serialized with the epoch that
//! owns it, so a drop in flight for an old epoch never clears a newer login.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use hearth_protocol::{Credential, Identity, PersistedSession, Session};
use hearth_runtime::SessionStorage;
use tracing::{debug, error, info};

use crate::config::StoreConfig;
use crate::diagnostics::{Diagnostic, DiagnosticsSink, TracingDiagnostics};
use crate::error::{Error, Result};
use crate::monitor::SessionMonitor;
use crate::persistence::{NO_OWNER, SessionSlot};
use crate::store::RootStore;
use crate::substore::{ColorMode, SessionStore, ShellStore, SubStores};

pub struct StoreBootstrapper {
	slot: Arc<SessionSlot>,
	diagnostics: Arc<dyn DiagnosticsSink>,
	color_mode: ColorMode,
	bootstrapped: AtomicBool,
	last_epoch: AtomicU64,
}

impl StoreBootstrapper {
	/// Creates a bootstrapper that logs diagnostics through `tracing`.
	pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
		Self {
			slot: Arc::new(SessionSlot::new(storage)),
			diagnostics: Arc::new(TracingDiagnostics),
			color_mode: ColorMode::default(),
			bootstrapped: AtomicBool::new(false),
			last_epoch: AtomicU64::new(0),
		}
	}

	/// Creates a bootstrapper over the file storage named by `config`.
	pub fn from_config(config: &StoreConfig) -> Self {
		Self::new(Arc::new(config.storage()))
	}

	/// Routes diagnostics to `sink`.
	pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
		self.diagnostics = sink;
		self
	}

	/// Initial color mode for the shell sub-store of every new epoch.
	pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
		self.color_mode = mode;
		self
	}

	pub fn diagnostics(&self) -> &Arc<dyn DiagnosticsSink> {
		&self.diagnostics
	}

	/// Hydrates the root store from persisted state.
	///
	/// # Errors
	///
	/// Returns [`Error::AlreadyBootstrapped`] when a previous `setup()` has not
	/// been followed by [`teardown`](Self::teardown), and
	/// [`Error::TaskJoin`] when the blocking read task cannot be joined.
	/// Corrupt or unreadable persisted state is not an error. Dropping the
	/// returned future before it resolves leaves the bootstrapper ready for
	/// another `setup()`.
	pub async fn setup(&self) -> Result<RootStore> {
		if self.bootstrapped.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
			error!(target = "hearth.bootstrap", "setup called while a bootstrapped store is outstanding");
			return Err(Error::AlreadyBootstrapped);
		}
		let reservation = SetupReservation {
			flag: &self.bootstrapped,
			committed: false,
		};

		let storage = Arc::clone(self.slot.storage());
		let read = tokio::task::spawn_blocking(move || storage.read())
			.await
			.map_err(|err| Error::TaskJoin(err.to_string()))?;

		let (session, blob) = self.hydrate(read);
		let store = self.construct(session, blob.as_ref());
		self.slot.lock().hand_to(store.epoch());
		reservation.commit();
		info!(
			target = "hearth.bootstrap",
			epoch = store.epoch(),
			authenticated = store.is_authenticated(),
			"root store ready"
		);
		Ok(store)
	}

	fn hydrate(&self, read: io::Result<Option<Vec<u8>>>) -> (Session, Option<PersistedSession>) {
		let bytes = match read {
			Ok(Some(bytes)) => bytes,
			Ok(None) => {
				debug!(target = "hearth.bootstrap", "no persisted session");
				return (Session::Unauthenticated, None);
			}
			Err(err) => {
				self.diagnostics.record(Diagnostic::BootstrapWarning {
					reason: format!("session storage unreadable: {err}"),
				});
				return (Session::Unauthenticated, None);
			}
		};

		match PersistedSession::decode(&bytes).and_then(|blob| Ok((blob.to_session()?, blob))) {
			Ok((session, blob)) => (session, Some(blob)),
			Err(err) => {
				self.diagnostics.record(Diagnostic::BootstrapWarning { reason: err.to_string() });
				(Session::Unauthenticated, None)
			}
		}
	}

	fn construct(&self, session: Session, blob: Option<&PersistedSession>) -> RootStore {
		let epoch = self.last_epoch.fetch_add(1, Ordering::AcqRel) + 1;
		let sub_stores = SubStores::new()
			.with(ShellStore::new(self.color_mode))
			.with(SessionStore::from_persisted(blob));
		RootStore::new(epoch, session, sub_stores, Arc::clone(&self.diagnostics))
	}

	/// Returns the invalid-session funnel for `store`.
	pub fn monitor(&self, store: &RootStore) -> SessionMonitor {
		SessionMonitor::new(store.clone(), Arc::clone(&self.slot), Arc::clone(&self.diagnostics))
	}

	/// Persists a new session and starts an authenticated epoch.
	///
	/// `current` is retired without a drop event. If the blob cannot be
	/// written, `current` is left untouched and the error is returned.
	pub fn login(&self, current: &RootStore, identity: Identity, credential: Credential, service: Option<String>) -> Result<RootStore> {
		let blob = PersistedSession::new(&identity, &credential, service);
		let bytes = blob.encode()?;

		let mut lease = self.slot.lock();
		lease.storage().write(&bytes)?;
		self.retire(current, "login");
		let store = self.construct(Session::authenticated(identity, credential), Some(&blob));
		lease.hand_to(store.epoch());
		drop(lease);

		info!(target = "hearth.session", epoch = store.epoch(), "logged in");
		Ok(store)
	}

	/// Ends the session of `current` and starts an unauthenticated epoch.
	///
	/// Shares the drop guard with [`SessionMonitor`], so a report arriving
	/// after logout does nothing. Drop handlers are not notified.
	pub fn logout(&self, current: &RootStore) -> RootStore {
		self.retire(current, "logout");
		current.replace_session(Session::Unauthenticated);

		let mut lease = self.slot.lock();
		let owned = lease.owner() == current.epoch();
		if !owned {
			debug!(target = "hearth.session", epoch = current.epoch(), owner = lease.owner(), "stale logout, blob left in place");
		} else if let Err(err) = lease.storage().clear() {
			self.diagnostics.record(Diagnostic::PersistenceClearFailure { error: err.to_string() });
		}
		let store = self.construct(Session::Unauthenticated, None);
		if owned {
			lease.hand_to(store.epoch());
		}
		drop(lease);

		info!(target = "hearth.session", epoch = store.epoch(), "logged out");
		store
	}

	/// Discards `store` and allows the next [`setup`](Self::setup).
	pub fn teardown(&self, store: RootStore) {
		self.retire(&store, "teardown");
		self.slot.lock().hand_to(NO_OWNER);
		self.bootstrapped.store(false, Ordering::Release);
		debug!(target = "hearth.bootstrap", epoch = store.epoch(), "root store torn down");
	}

	fn retire(&self, store: &RootStore, reason: &'static str) {
		if !store.guard().retire() {
			debug!(target = "hearth.session", epoch = store.epoch(), reason, state = ?store.guard_state(), "epoch guard already set");
		}
	}
}

/// Releases the bootstrap flag unless `setup` produced a store, including
/// when the `setup` future is dropped mid-read.
struct SetupReservation<'a> {
	flag: &'a AtomicBool,
	committed: bool,
}

impl SetupReservation<'_> {
	fn commit(mut self) {
		self.committed = true;
	}
}

impl Drop for SetupReservation<'_> {
	fn drop(&mut self) {
		if !self.committed {
			self.flag.store(false, Ordering::Release);
			debug!(target = "hearth.bootstrap", "setup abandoned, bootstrap released");
		}
	}
}

impl std::fmt::Debug for StoreBootstrapper {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("StoreBootstrapper")
			.field("bootstrapped", &self.bootstrapped.load(Ordering::Acquire))
			.field("last_epoch", &self.last_epoch.load(Ordering::Acquire))
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use hearth_runtime::MemoryStorage;

	use super::*;
	use crate::diagnostics::RecordingDiagnostics;
	use crate::guard::GuardState;
	use crate::substore::{SESSION_KEY, SHELL_KEY};

	const SIGNED_IN: &[u8] = br#"{"identity":"did:x","credential":"tok"}"#;

	struct SlowFirstRead(AtomicBool);

	impl SessionStorage for SlowFirstRead {
		fn read(&self) -> io::Result<Option<Vec<u8>>> {
			if self.0.swap(false, Ordering::AcqRel) {
				std::thread::sleep(Duration::from_millis(200));
			}
			Ok(None)
		}

		fn write(&self, _blob: &[u8]) -> io::Result<()> {
			Ok(())
		}

		fn clear(&self) -> io::Result<()> {
			Ok(())
		}
	}

	fn bootstrapper(storage: MemoryStorage) -> (StoreBootstrapper, Arc<MemoryStorage>, Arc<RecordingDiagnostics>) {
		let storage = Arc::new(storage);
		let diagnostics = Arc::new(RecordingDiagnostics::new());
		let bootstrapper = StoreBootstrapper::new(storage.clone()).with_diagnostics(diagnostics.clone());
		(bootstrapper, storage, diagnostics)
	}

	#[tokio::test]
	async fn store_is_fully_constructed() {
		let (bootstrapper, _, _) = bootstrapper(MemoryStorage::new());
		let store = bootstrapper.with_color_mode(ColorMode::Dark).setup().await.unwrap();

		assert_eq!(store.epoch(), 1);
		assert_eq!(store.guard_state(), GuardState::Retired);
		assert_eq!(store.sub_store_keys(), [SESSION_KEY, SHELL_KEY]);
		assert_eq!(store.sub_store::<ShellStore>(SHELL_KEY).unwrap().color_mode(), ColorMode::Dark);
	}

	#[tokio::test]
	async fn unreadable_storage_is_a_warning() {
		let storage = MemoryStorage::new();
		storage.fail_reads(true);
		let (bootstrapper, _, diagnostics) = bootstrapper(storage);

		let store = bootstrapper.setup().await.unwrap();
		assert!(!store.is_authenticated());
		assert_eq!(diagnostics.count(Diagnostic::is_bootstrap_warning), 1);
	}

	#[tokio::test]
	async fn second_setup_fails_fast() {
		let (bootstrapper, storage, _) = bootstrapper(MemoryStorage::new());
		let _store = bootstrapper.setup().await.unwrap();

		let err = bootstrapper.setup().await.unwrap_err();
		assert!(matches!(err, Error::AlreadyBootstrapped));
		assert!(err.is_programming_error());
		assert_eq!(storage.read_count(), 1);
	}

	#[tokio::test]
	async fn teardown_allows_setup_again() {
		let (bootstrapper, _, _) = bootstrapper(MemoryStorage::new());
		let first = bootstrapper.setup().await.unwrap();
		bootstrapper.teardown(first.clone());
		assert_eq!(first.guard_state(), GuardState::Retired);

		let second = bootstrapper.setup().await.unwrap();
		assert_eq!(second.epoch(), 2);
	}

	#[tokio::test]
	async fn login_writes_blob_and_retires_old_epoch() {
		let (bootstrapper, storage, _) = bootstrapper(MemoryStorage::new());
		let old = bootstrapper.setup().await.unwrap();

		let identity = Identity::new("did:x").with_handle("alice.test");
		let new = bootstrapper
			.login(&old, identity.clone(), Credential::from("tok"), Some("https://example.social".into()))
			.unwrap();

		assert_eq!(old.guard_state(), GuardState::Retired);
		assert_eq!(new.current_session().identity(), Some(&identity));
		assert_eq!(new.sub_store::<SessionStore>(SESSION_KEY).unwrap().service(), Some("https://example.social"));

		let blob = PersistedSession::decode(&storage.blob().unwrap()).unwrap();
		assert_eq!(blob.identity(), identity);
	}

	#[tokio::test]
	async fn failed_login_write_leaves_current_store() {
		let storage = MemoryStorage::with_blob(SIGNED_IN.to_vec());
		storage.fail_writes(true);
		let (bootstrapper, storage, _) = bootstrapper(storage);
		let current = bootstrapper.setup().await.unwrap();

		let err = bootstrapper.login(&current, Identity::new("did:y"), Credential::from("tok"), None).unwrap_err();
		assert!(matches!(err, Error::Storage(_)));
		assert_eq!(current.guard_state(), GuardState::Armed);
		assert_eq!(storage.blob().as_deref(), Some(SIGNED_IN));

		assert_eq!(bootstrapper.monitor(&current).report_invalid_session(), crate::ReportOutcome::Dropped);
		assert_eq!(storage.blob(), None);
	}

	#[tokio::test]
	async fn abandoned_setup_releases_bootstrap() {
		let bootstrapper = StoreBootstrapper::new(Arc::new(SlowFirstRead(AtomicBool::new(true))));

		let abandoned = tokio::time::timeout(Duration::from_millis(20), bootstrapper.setup()).await;
		assert!(abandoned.is_err());

		let store = bootstrapper.setup().await.unwrap();
		assert_eq!(store.epoch(), 1);
	}

	#[tokio::test]
	async fn stale_logout_keeps_newer_blob() {
		let (bootstrapper, storage, _) = bootstrapper(MemoryStorage::with_blob(SIGNED_IN.to_vec()));
		let first = bootstrapper.setup().await.unwrap();
		let second = bootstrapper.login(&first, Identity::new("did:y"), Credential::from("tok-2"), None).unwrap();

		let _third = bootstrapper.logout(&first);
		assert!(second.is_authenticated());
		let blob = PersistedSession::decode(&storage.blob().unwrap()).unwrap();
		assert_eq!(blob.identity().account_id(), "did:y");

		assert_eq!(bootstrapper.monitor(&second).report_invalid_session(), crate::ReportOutcome::Dropped);
		assert_eq!(storage.blob(), None);
	}

	#[tokio::test]
	async fn logout_shares_guard_with_monitor() {
		let (bootstrapper, storage, diagnostics) = bootstrapper(MemoryStorage::with_blob(br#"{"identity":"did:x","credential":"tok"}"#.to_vec()));
		let store = bootstrapper.setup().await.unwrap();
		let monitor = bootstrapper.monitor(&store);

		let next = bootstrapper.logout(&store);
		assert!(!store.is_authenticated());
		assert!(!next.is_authenticated());
		assert_eq!(storage.blob(), None);

		assert_eq!(monitor.report_invalid_session(), crate::ReportOutcome::Redundant);
		assert!(diagnostics.entries().is_empty());
	}

	#[tokio::test]
	async fn logout_clear_failure_is_recorded() {
		let storage = MemoryStorage::with_blob(br#"{"identity":"did:x","credential":"tok"}"#.to_vec());
		storage.fail_clears(true);
		let (bootstrapper, _, diagnostics) = bootstrapper(storage);
		let store = bootstrapper.setup().await.unwrap();

		let next = bootstrapper.logout(&store);
		assert!(!next.is_authenticated());
		assert_eq!(diagnostics.count(Diagnostic::is_persistence_clear_failure), 1);
	}
}
