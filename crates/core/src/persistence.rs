//! Ownership of the persisted session across epochs.
//!
//! Every write or clear of the blob happens under one lock that also records
//! which epoch the blob belongs to. A drop reported against an older epoch
//! therefore cannot clear a blob written by a later login.

use std::io;
use std::sync::Arc;

use hearth_runtime::SessionStorage;
use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

/// Epoch value meaning no store owns the blob.
pub(crate) const NO_OWNER: u64 = 0;

pub(crate) struct SessionSlot {
	storage: Arc<dyn SessionStorage>,
	owner: Mutex<u64>,
}

impl SessionSlot {
	pub(crate) fn new(storage: Arc<dyn SessionStorage>) -> Self {
		Self {
			storage,
			owner: Mutex::new(NO_OWNER),
		}
	}

	/// Unlocked storage access for the bootstrap read.
	pub(crate) fn storage(&self) -> &Arc<dyn SessionStorage> {
		&self.storage
	}

	/// Takes exclusive access to the blob.
	pub(crate) fn lock(&self) -> SlotLease<'_> {
		SlotLease {
			storage: self.storage.as_ref(),
			owner: self.owner.lock(),
		}
	}

	/// Clears the blob if `epoch` still owns it.
	///
	/// Returns `None` when ownership has moved to another epoch and the blob
	/// was left alone.
	pub(crate) fn clear_for(&self, epoch: u64) -> Option<io::Result<()>> {
		let lease = self.lock();
		if lease.owner() != epoch {
			debug!(target = "hearth.storage", epoch, owner = lease.owner(), "blob owned by another epoch, clear skipped");
			return None;
		}
		Some(lease.storage().clear())
	}
}

/// Exclusive access to the blob and its owning epoch.
pub(crate) struct SlotLease<'a> {
	storage: &'a dyn SessionStorage,
	owner: MutexGuard<'a, u64>,
}

impl SlotLease<'_> {
	pub(crate) fn storage(&self) -> &dyn SessionStorage {
		self.storage
	}

	pub(crate) fn owner(&self) -> u64 {
		*self.owner
	}

	pub(crate) fn hand_to(&mut self, epoch: u64) {
		*self.owner = epoch;
	}
}

#[cfg(test)]
mod tests {
	use hearth_runtime::MemoryStorage;

	use super::*;

	#[test]
	fn clear_requires_ownership() {
		let storage = Arc::new(MemoryStorage::with_blob(b"blob".to_vec()));
		let slot = SessionSlot::new(storage.clone());
		slot.lock().hand_to(2);

		assert!(slot.clear_for(1).is_none());
		assert_eq!(storage.clear_count(), 0);
		assert!(storage.blob().is_some());

		assert!(matches!(slot.clear_for(2), Some(Ok(()))));
		assert_eq!(storage.blob(), None);
	}

	#[test]
	fn unowned_blob_is_never_cleared_by_an_epoch() {
		let storage = Arc::new(MemoryStorage::with_blob(b"blob".to_vec()));
		let slot = SessionSlot::new(storage.clone());

		assert!(slot.clear_for(1).is_none());
		assert!(storage.blob().is_some());
	}
}
