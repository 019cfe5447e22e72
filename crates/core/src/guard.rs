//! Per-epoch session drop guard.
//!
//! The guard only moves forward:
//!
//! ```text
//! Armed ──claim──> Claimed ──deliver──> Delivered
//!   │
//!   └──retire──> Retired
//! ```
//!
//! Every transition is a single compare-and-swap, so concurrent reporters
//! cannot both observe `Armed`. A store that leaves `Armed` never returns to
//! it; re-authentication constructs a new store with a fresh guard.

use std::sync::atomic::{AtomicU8, Ordering};

const ARMED: u8 = 0;
const CLAIMED: u8 = 1;
const DELIVERED: u8 = 2;
const RETIRED: u8 = 3;

/// Observable guard position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
	/// No drop has happened in this epoch.
	Armed,
	/// A reporter won the race; the drop event is pending.
	Claimed,
	/// The drop event has been delivered.
	Delivered,
	/// The epoch ended through logout, login or teardown without a drop
	/// event, or started unauthenticated with nothing to drop.
	Retired,
}

#[derive(Debug)]
pub struct DropGuard(AtomicU8);

impl DropGuard {
	pub fn new() -> Self {
		Self(AtomicU8::new(ARMED))
	}

	/// A guard that can never claim, for epochs without a session to drop.
	pub fn retired() -> Self {
		Self(AtomicU8::new(RETIRED))
	}

	pub fn state(&self) -> GuardState {
		match self.0.load(Ordering::Acquire) {
			ARMED => GuardState::Armed,
			CLAIMED => GuardState::Claimed,
			DELIVERED => GuardState::Delivered,
			_ => GuardState::Retired,
		}
	}

	/// Returns `true` once the epoch can no longer produce a drop event.
	pub fn is_set(&self) -> bool {
		self.state() != GuardState::Armed
	}

	/// `Armed -> Claimed`. Exactly one caller per epoch gets `true`.
	pub(crate) fn try_claim(&self) -> bool {
		self.advance(ARMED, CLAIMED)
	}

	/// `Claimed -> Delivered`.
	pub(crate) fn try_deliver(&self) -> bool {
		self.advance(CLAIMED, DELIVERED)
	}

	/// `Armed -> Retired`.
	pub(crate) fn retire(&self) -> bool {
		self.advance(ARMED, RETIRED)
	}

	fn advance(&self, from: u8, to: u8) -> bool {
		self.0.compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire).is_ok()
	}
}

impl Default for DropGuard {
	fn default() -> Self {
		Self::new()
	}
}
