//! Nested domain stores owned by a [`crate::RootStore`].
//!
//! Each sub-store lives under a stable string key and is constructed together
//! with its root store. Nothing carries over between epochs: a new root store
//! gets fresh sub-stores.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use downcast_rs::{DowncastSync, impl_downcast};
use hearth_protocol::PersistedSession;
use parking_lot::RwLock;

/// Key of the [`ShellStore`].
pub const SHELL_KEY: &str = "shell";
/// Key of the [`SessionStore`].
pub const SESSION_KEY: &str = "session";

/// A nested store addressable by key and recoverable as its concrete type.
pub trait SubStore: DowncastSync + fmt::Debug {
	fn key(&self) -> &'static str;
}
impl_downcast!(sync SubStore);

/// Keyed sub-store map.
#[derive(Debug, Default, Clone)]
pub struct SubStores {
	stores: BTreeMap<&'static str, Arc<dyn SubStore>>,
}

impl SubStores {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds `store` under its own key, replacing any previous entry.
	pub fn with<S: SubStore>(mut self, store: S) -> Self {
		self.stores.insert(store.key(), Arc::new(store));
		self
	}

	/// Returns the store under `key` if it has type `S`.
	pub fn get<S: SubStore>(&self, key: &str) -> Option<Arc<S>> {
		let store = Arc::clone(self.stores.get(key)?);
		store.downcast_arc::<S>().ok()
	}

	/// Keys in stable (sorted) order.
	pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.stores.keys().copied()
	}

	pub fn len(&self) -> usize {
		self.stores.len()
	}

	pub fn is_empty(&self) -> bool {
		self.stores.is_empty()
	}
}

/// Preferred color scheme of the host shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
	#[default]
	System,
	Light,
	Dark,
}

impl fmt::Display for ColorMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::System => "system",
			Self::Light => "light",
			Self::Dark => "dark",
		})
	}
}

impl FromStr for ColorMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"system" => Ok(Self::System),
			"light" => Ok(Self::Light),
			"dark" => Ok(Self::Dark),
			other => Err(format!("unknown color mode '{other}' (expected system, light or dark)")),
		}
	}
}

#[derive(Debug, Default)]
struct ShellState {
	color_mode: ColorMode,
	minimal_shell_mode: bool,
	drawer_open: bool,
}

/// Shell chrome state read by the rendering collaborator.
#[derive(Debug, Default)]
pub struct ShellStore {
	state: RwLock<ShellState>,
}

impl ShellStore {
	pub fn new(color_mode: ColorMode) -> Self {
		Self {
			state: RwLock::new(ShellState {
				color_mode,
				..Default::default()
			}),
		}
	}

	pub fn color_mode(&self) -> ColorMode {
		self.state.read().color_mode
	}

	pub fn set_color_mode(&self, mode: ColorMode) {
		self.state.write().color_mode = mode;
	}

	pub fn is_minimal_shell_mode(&self) -> bool {
		self.state.read().minimal_shell_mode
	}

	/// Hides navigation chrome while set.
	pub fn set_minimal_shell_mode(&self, minimal: bool) {
		self.state.write().minimal_shell_mode = minimal;
	}

	pub fn is_drawer_open(&self) -> bool {
		self.state.read().drawer_open
	}

	pub fn open_drawer(&self) {
		self.state.write().drawer_open = true;
	}

	pub fn close_drawer(&self) {
		self.state.write().drawer_open = false;
	}
}

impl SubStore for ShellStore {
	fn key(&self) -> &'static str {
		SHELL_KEY
	}
}

/// Account metadata that accompanied the hydrated session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStore {
	service: Option<String>,
	handle: Option<String>,
}

impl SessionStore {
	/// Builds the store from the blob that hydrated this epoch, if any.
	pub fn from_persisted(blob: Option<&PersistedSession>) -> Self {
		match blob {
			Some(blob) => Self {
				service: blob.service.clone(),
				handle: blob.handle.clone().filter(|h| !h.is_empty()),
			},
			None => Self::default(),
		}
	}

	/// Service that issued the credential.
	pub fn service(&self) -> Option<&str> {
		self.service.as_deref()
	}

	pub fn handle(&self) -> Option<&str> {
		self.handle.as_deref()
	}
}

impl SubStore for SessionStore {
	fn key(&self) -> &'static str {
		SESSION_KEY
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn typed_lookup_by_key() {
		let stores = SubStores::new().with(ShellStore::new(ColorMode::Dark)).with(SessionStore::default());

		let shell = stores.get::<ShellStore>(SHELL_KEY).unwrap();
		assert_eq!(shell.color_mode(), ColorMode::Dark);
		assert!(stores.get::<SessionStore>(SESSION_KEY).is_some());
	}

	#[test]
	fn wrong_type_or_key_yields_none() {
		let stores = SubStores::new().with(ShellStore::default());
		assert!(stores.get::<SessionStore>(SHELL_KEY).is_none());
		assert!(stores.get::<ShellStore>("missing").is_none());
	}

	#[test]
	fn keys_are_sorted() {
		let stores = SubStores::new().with(ShellStore::default()).with(SessionStore::default());
		assert_eq!(stores.keys().collect::<Vec<_>>(), [SESSION_KEY, SHELL_KEY]);
	}

	#[test]
	fn shell_state_is_shared_through_handles() {
		let stores = SubStores::new().with(ShellStore::default());
		stores.get::<ShellStore>(SHELL_KEY).unwrap().open_drawer();
		stores.get::<ShellStore>(SHELL_KEY).unwrap().set_minimal_shell_mode(true);

		let shell = stores.get::<ShellStore>(SHELL_KEY).unwrap();
		assert!(shell.is_drawer_open());
		assert!(shell.is_minimal_shell_mode());
		shell.close_drawer();
		assert!(!shell.is_drawer_open());
	}

	#[test]
	fn color_mode_parses_case_insensitively() {
		assert_eq!("Dark".parse::<ColorMode>().unwrap(), ColorMode::Dark);
		assert!("sepia".parse::<ColorMode>().is_err());
		assert_eq!(ColorMode::Light.to_string(), "light");
	}

	#[test]
	fn session_store_reads_blob_metadata() {
		let blob = PersistedSession::decode(br#"{"identity":"did:x","handle":"alice.test","credential":"tok","service":"https://example.social"}"#).unwrap();
		let store = SessionStore::from_persisted(Some(&blob));
		assert_eq!(store.handle(), Some("alice.test"));
		assert_eq!(store.service(), Some("https://example.social"));
		assert_eq!(SessionStore::from_persisted(None), SessionStore::default());
	}
}
