use std::io;

use parking_lot::Mutex;

use crate::storage::SessionStorage;

#[derive(Debug, Default)]
struct MemoryState {
	blob: Option<Vec<u8>>,
	fail_reads: bool,
	fail_writes: bool,
	fail_clears: bool,
	reads: usize,
	writes: usize,
	clears: usize,
}

/// Storage that keeps the blob in memory.
///
/// Each operation can be scripted to fail with an I/O error, and call counts
/// are tracked so tests can assert on collaborator traffic.
#[derive(Debug, Default)]
pub struct MemoryStorage {
	state: Mutex<MemoryState>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}

	/// Storage pre-seeded with `blob`.
	pub fn with_blob(blob: impl Into<Vec<u8>>) -> Self {
		let storage = Self::new();
		storage.state.lock().blob = Some(blob.into());
		storage
	}

	pub fn fail_reads(&self, fail: bool) {
		self.state.lock().fail_reads = fail;
	}

	pub fn fail_writes(&self, fail: bool) {
		self.state.lock().fail_writes = fail;
	}

	pub fn fail_clears(&self, fail: bool) {
		self.state.lock().fail_clears = fail;
	}

	/// Returns a copy of the stored blob.
	pub fn blob(&self) -> Option<Vec<u8>> {
		self.state.lock().blob.clone()
	}

	pub fn read_count(&self) -> usize {
		self.state.lock().reads
	}

	pub fn write_count(&self) -> usize {
		self.state.lock().writes
	}

	pub fn clear_count(&self) -> usize {
		self.state.lock().clears
	}
}

fn scripted_failure(op: &str) -> io::Error {
	io::Error::other(format!("scripted {op} failure"))
}

impl SessionStorage for MemoryStorage {
	fn read(&self) -> io::Result<Option<Vec<u8>>> {
		let mut state = self.state.lock();
		state.reads += 1;
		if state.fail_reads {
			return Err(scripted_failure("read"));
		}
		Ok(state.blob.clone())
	}

	fn write(&self, blob: &[u8]) -> io::Result<()> {
		let mut state = self.state.lock();
		state.writes += 1;
		if state.fail_writes {
			return Err(scripted_failure("write"));
		}
		state.blob = Some(blob.to_vec());
		Ok(())
	}

	fn clear(&self) -> io::Result<()> {
		let mut state = self.state.lock();
		state.clears += 1;
		if state.fail_clears {
			return Err(scripted_failure("clear"));
		}
		state.blob = None;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tracks_calls_and_contents() {
		let storage = MemoryStorage::with_blob(b"abc".to_vec());
		assert_eq!(storage.read().unwrap().as_deref(), Some(b"abc".as_slice()));

		storage.write(b"xyz").unwrap();
		storage.clear().unwrap();

		assert_eq!(storage.blob(), None);
		assert_eq!((storage.read_count(), storage.write_count(), storage.clear_count()), (1, 1, 1));
	}

	#[test]
	fn scripted_clear_failure_keeps_blob() {
		let storage = MemoryStorage::with_blob(b"abc".to_vec());
		storage.fail_clears(true);

		assert!(storage.clear().is_err());
		assert_eq!(storage.blob().as_deref(), Some(b"abc".as_slice()));
	}
}
