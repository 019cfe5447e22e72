//! Authentication state held by a root store.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable handle for an authenticated account.
///
/// The account id is the durable key (for example a DID); the handle is a
/// display name that may change between logins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
	account_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	handle: Option<String>,
}

impl Identity {
	pub fn new(account_id: impl Into<String>) -> Self {
		Self {
			account_id: account_id.into(),
			handle: None,
		}
	}

	/// Attaches a display handle.
	pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
		self.handle = Some(handle.into());
		self
	}

	pub fn account_id(&self) -> &str {
		&self.account_id
	}

	pub fn handle(&self) -> Option<&str> {
		self.handle.as_deref()
	}
}

impl fmt::Display for Identity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.handle {
			Some(handle) => write!(f, "{} (@{})", self.account_id, handle),
			None => f.write_str(&self.account_id),
		}
	}
}

/// Opaque access credential.
///
/// The controller never inspects the bytes. `Debug` output is redacted so a
/// credential cannot leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Vec<u8>);

impl Credential {
	pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
		Self(bytes.into())
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Debug for Credential {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Credential(<redacted, {} bytes>)", self.0.len())
	}
}

impl From<&str> for Credential {
	fn from(value: &str) -> Self {
		Self(value.as_bytes().to_vec())
	}
}

impl From<String> for Credential {
	fn from(value: String) -> Self {
		Self(value.into_bytes())
	}
}

impl From<Vec<u8>> for Credential {
	fn from(value: Vec<u8>) -> Self {
		Self(value)
	}
}

/// Authentication state of one store epoch.
///
/// Values are never mutated in place; a transition replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
	Authenticated {
		identity: Identity,
		credential: Credential,
	},
	#[default]
	Unauthenticated,
}

impl Session {
	pub fn authenticated(identity: Identity, credential: impl Into<Credential>) -> Self {
		Self::Authenticated {
			identity,
			credential: credential.into(),
		}
	}

	pub fn is_authenticated(&self) -> bool {
		matches!(self, Self::Authenticated { .. })
	}

	/// Returns the identity of an authenticated session.
	pub fn identity(&self) -> Option<&Identity> {
		match self {
			Self::Authenticated { identity, .. } => Some(identity),
			Self::Unauthenticated => None,
		}
	}

	pub fn credential(&self) -> Option<&Credential> {
		match self {
			Self::Authenticated { credential, .. } => Some(credential),
			Self::Unauthenticated => None,
		}
	}
}
