//! Ordered callback registry with per-callback fault isolation.
//!
//! # Delivery
//!
//! [`SubscriptionRegistry::notify_all`] copies the entry list under the lock,
//! releases it, and then invokes each callback in registration order. A
//! callback may register or unregister entries (including itself) while a
//! delivery pass is running; the change applies to the next pass only.
//!
//! A callback that returns an error or panics is recorded as
//! [`Diagnostic::SubscriberFailure`] and delivery moves on to the next entry.
//! Nothing is propagated to the caller of `notify_all`.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::trace;

use crate::diagnostics::{Diagnostic, DiagnosticsSink};

/// Callback stored in a registry.
pub type Handler<E> = Arc<dyn Fn(&E) -> anyhow::Result<()> + Send + Sync>;

/// Identifies one registration. Unique for the lifetime of its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionToken(u64);

impl SubscriptionToken {
	pub fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for SubscriptionToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "sub#{}", self.0)
	}
}

/// Outcome of one delivery pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryReport {
	/// Callbacks attempted, including failed ones.
	pub attempted: usize,
	/// Callbacks that returned an error or panicked.
	pub failed: usize,
}

pub struct SubscriptionRegistry<E> {
	name: &'static str,
	next_token: AtomicU64,
	entries: Mutex<Vec<(SubscriptionToken, Handler<E>)>>,
	diagnostics: Arc<dyn DiagnosticsSink>,
}

impl<E> SubscriptionRegistry<E> {
	/// Creates an empty registry. `name` tags diagnostics and log events.
	pub fn new(name: &'static str, diagnostics: Arc<dyn DiagnosticsSink>) -> Self {
		Self {
			name,
			next_token: AtomicU64::new(1),
			entries: Mutex::new(Vec::new()),
			diagnostics,
		}
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Appends `callback` and returns its token.
	pub fn register<F>(&self, callback: F) -> SubscriptionToken
	where
		F: Fn(&E) -> anyhow::Result<()> + Send + Sync + 'static,
	{
		let token = SubscriptionToken(self.next_token.fetch_add(1, Ordering::Relaxed));
		let handler: Handler<E> = Arc::new(callback);
		self.entries.lock().push((token, handler));
		trace!(target = "hearth.registry", registry = self.name, %token, "subscriber registered");
		token
	}

	/// Removes the entry for `token`. Returns `false` when it was not present.
	pub fn unregister(&self, token: SubscriptionToken) -> bool {
		let mut entries = self.entries.lock();
		let Some(index) = entries.iter().position(|(t, _)| *t == token) else {
			return false;
		};
		entries.remove(index);
		trace!(target = "hearth.registry", registry = self.name, %token, "subscriber removed");
		true
	}

	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}

	/// Delivers `event` to every callback registered when the call starts.
	pub fn notify_all(&self, event: &E) -> DeliveryReport {
		let snapshot: Vec<(SubscriptionToken, Handler<E>)> = self.entries.lock().clone();
		let mut report = DeliveryReport::default();

		for (token, handler) in snapshot {
			report.attempted += 1;
			let message = match catch_unwind(AssertUnwindSafe(|| handler(event))) {
				Ok(Ok(())) => continue,
				Ok(Err(err)) => format!("{err:#}"),
				Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
			};
			report.failed += 1;
			self.diagnostics.record(Diagnostic::SubscriberFailure {
				registry: self.name,
				token,
				message,
			});
		}

		trace!(
			target = "hearth.registry",
			registry = self.name,
			attempted = report.attempted,
			failed = report.failed,
			"delivery pass complete"
		);
		report
	}
}

impl<E: 'static> SubscriptionRegistry<E> {
	/// Registers `callback` and returns a handle that can remove it later.
	pub fn subscribe<F>(self: &Arc<Self>, callback: F) -> SubscriptionHandle<E>
	where
		F: Fn(&E) -> anyhow::Result<()> + Send + Sync + 'static,
	{
		SubscriptionHandle {
			token: self.register(callback),
			registry: Arc::downgrade(self),
		}
	}
}

impl<E> fmt::Debug for SubscriptionRegistry<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SubscriptionRegistry")
			.field("name", &self.name)
			.field("len", &self.len())
			.finish()
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
	if let Some(message) = payload.downcast_ref::<&str>() {
		message
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message
	} else {
		"non-string panic payload"
	}
}

/// Removes one registration on request.
///
/// Dropping the handle leaves the callback registered. The handle does not
/// keep its registry alive.
pub struct SubscriptionHandle<E> {
	token: SubscriptionToken,
	registry: Weak<SubscriptionRegistry<E>>,
}

impl<E> SubscriptionHandle<E> {
	pub fn token(&self) -> SubscriptionToken {
		self.token
	}

	/// Deregisters the callback. Repeated calls are no-ops.
	pub fn unsubscribe(&self) {
		if let Some(registry) = self.registry.upgrade() {
			registry.unregister(self.token);
		}
	}
}

impl<E> fmt::Debug for SubscriptionHandle<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SubscriptionHandle").field("token", &self.token).finish()
	}
}
