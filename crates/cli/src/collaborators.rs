//! Dependent subsystems that receive the store once it is hydrated.
//!
//! Each collaborator is initialised with the resolved store and may register
//! session-drop or soft-reset handlers. A collaborator that fails to
//! initialise is logged and skipped; the others still start.

use std::sync::Arc;

use async_trait::async_trait;
use hearth::{RootStore, ScreenSoftReset, SessionDropped, SubscriptionHandle};
use parking_lot::Mutex;
use tracing::{info, warn};

/// User-facing notice shown when the session expires.
pub const SESSION_EXPIRED_NOTICE: &str = "Sorry! Your session expired. Please log in again.";

#[async_trait]
pub trait Collaborator: Send + Sync {
	fn name(&self) -> &'static str;

	async fn init(&self, store: &RootStore) -> anyhow::Result<()>;
}

/// Initialises every collaborator in order. Returns how many succeeded.
pub async fn init_all(store: &RootStore, collaborators: &[&dyn Collaborator]) -> usize {
	let mut started = 0;
	for collaborator in collaborators {
		match collaborator.init(store).await {
			Ok(()) => started += 1,
			Err(err) => warn!(target = "hearth.host", collaborator = collaborator.name(), error = %err, "collaborator failed to start"),
		}
	}
	started
}

/// Shows the session-expired notice.
#[derive(Default)]
pub struct DropNotice {
	notices: Arc<Mutex<Vec<String>>>,
	handle: Mutex<Option<SubscriptionHandle<SessionDropped>>>,
}

impl DropNotice {
	pub fn notices(&self) -> Vec<String> {
		self.notices.lock().clone()
	}
}

#[async_trait]
impl Collaborator for DropNotice {
	fn name(&self) -> &'static str {
		"drop-notice"
	}

	async fn init(&self, store: &RootStore) -> anyhow::Result<()> {
		let notices = self.notices.clone();
		let handle = store.register_session_drop_handler(move |event| {
			warn!(target = "hearth.host", identity = %event.identity, "{SESSION_EXPIRED_NOTICE}");
			notices.lock().push(SESSION_EXPIRED_NOTICE.to_string());
			Ok(())
		});
		if let Some(previous) = self.handle.lock().replace(handle) {
			previous.unsubscribe();
		}
		Ok(())
	}
}

/// Records identify/drop events the way an analytics SDK would receive them.
#[derive(Default)]
pub struct AnalyticsCollaborator {
	events: Arc<Mutex<Vec<String>>>,
}

impl AnalyticsCollaborator {
	pub fn events(&self) -> Vec<String> {
		self.events.lock().clone()
	}
}

#[async_trait]
impl Collaborator for AnalyticsCollaborator {
	fn name(&self) -> &'static str {
		"analytics"
	}

	async fn init(&self, store: &RootStore) -> anyhow::Result<()> {
		let session = store.current_session();
		let first = match session.identity() {
			Some(identity) => format!("identify:{}", identity.account_id()),
			None => "anonymous".to_string(),
		};
		self.events.lock().push(first);

		let events = self.events.clone();
		let _ = store.register_session_drop_handler(move |event| {
			events.lock().push(format!("session_dropped:{}", event.identity.account_id()));
			Ok(())
		});
		Ok(())
	}
}

/// Tracks push registration for the signed-in account.
#[derive(Default)]
pub struct NotificationCollaborator {
	registered: Arc<Mutex<Option<String>>>,
}

impl NotificationCollaborator {
	/// Account currently registered for push, if any.
	pub fn registered_account(&self) -> Option<String> {
		self.registered.lock().clone()
	}
}

#[async_trait]
impl Collaborator for NotificationCollaborator {
	fn name(&self) -> &'static str {
		"notifications"
	}

	async fn init(&self, store: &RootStore) -> anyhow::Result<()> {
		let Some(identity) = store.current_session().identity().cloned() else {
			return Ok(());
		};
		info!(target = "hearth.host", %identity, "push registration active");
		*self.registered.lock() = Some(identity.account_id().to_string());

		let registered = self.registered.clone();
		let _ = store.register_session_drop_handler(move |_| {
			registered.lock().take();
			Ok(())
		});
		Ok(())
	}
}

/// Counts soft resets delivered to the current screen stack.
#[derive(Default)]
pub struct ScreenStack {
	resets: Arc<Mutex<Vec<ScreenSoftReset>>>,
}

impl ScreenStack {
	pub fn resets(&self) -> Vec<ScreenSoftReset> {
		self.resets.lock().clone()
	}
}

#[async_trait]
impl Collaborator for ScreenStack {
	fn name(&self) -> &'static str {
		"screen-stack"
	}

	async fn init(&self, store: &RootStore) -> anyhow::Result<()> {
		let resets = self.resets.clone();
		let _ = store.register_soft_reset_handler(move |event| {
			resets.lock().push(*event);
			Ok(())
		});
		Ok(())
	}
}
