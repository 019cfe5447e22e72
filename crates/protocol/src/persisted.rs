//! Persisted session blob schema.
//!
//! The blob is a JSON object written by the login path and read back during
//! bootstrap:
//!
//! ```json
//! {
//!   "schema": 1,
//!   "identity": "did:plc:abc",
//!   "handle": "alice.test",
//!   "credential": "access-token",
//!   "service": "https://example.social"
//! }
//! ```
//!
//! Credentials that are not valid UTF-8 are written as `credentialB64`
//! instead of `credential`. Exactly one of the two must be present.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::{Credential, Identity, Session};

/// Newest blob schema this crate can read and the one it writes.
pub const PERSISTED_SESSION_SCHEMA_VERSION: u32 = 1;

fn default_schema() -> u32 {
	PERSISTED_SESSION_SCHEMA_VERSION
}

/// Reasons a persisted blob cannot be turned into a session.
#[derive(Debug, Error)]
pub enum DecodeError {
	#[error("session blob is not valid JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("session blob schema {found} is newer than supported schema {supported}")]
	UnsupportedSchema { found: u32, supported: u32 },

	#[error("session blob has an empty identity")]
	MissingIdentity,

	#[error("session blob has no credential")]
	MissingCredential,

	#[error("session blob carries both credential and credentialB64")]
	AmbiguousCredential,

	#[error("session blob credentialB64 is not valid base64: {0}")]
	CredentialEncoding(#[from] base64::DecodeError),
}

/// On-disk form of an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
	#[serde(default = "default_schema")]
	pub schema: u32,
	pub identity: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub handle: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub credential: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub credential_b64: Option<String>,
	/// Service the credential was issued by.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub service: Option<String>,
}

impl PersistedSession {
	/// Builds a blob for `identity` and `credential`, choosing the credential
	/// encoding from the bytes.
	pub fn new(identity: &Identity, credential: &Credential, service: Option<String>) -> Self {
		let (credential, credential_b64) = match std::str::from_utf8(credential.as_bytes()) {
			Ok(text) => (Some(text.to_string()), None),
			Err(_) => (None, Some(STANDARD.encode(credential.as_bytes()))),
		};
		Self {
			schema: PERSISTED_SESSION_SCHEMA_VERSION,
			identity: identity.account_id().to_string(),
			handle: identity.handle().map(str::to_string),
			credential,
			credential_b64,
			service,
		}
	}

	/// Parses and validates a raw blob.
	pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
		let blob: Self = serde_json::from_slice(bytes)?;
		blob.validate()?;
		Ok(blob)
	}

	/// Serializes the blob as pretty JSON.
	pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
		serde_json::to_vec_pretty(self)
	}

	/// Checks the invariants a blob must hold before it may hydrate a session.
	pub fn validate(&self) -> Result<(), DecodeError> {
		if self.schema > PERSISTED_SESSION_SCHEMA_VERSION {
			return Err(DecodeError::UnsupportedSchema {
				found: self.schema,
				supported: PERSISTED_SESSION_SCHEMA_VERSION,
			});
		}
		if self.identity.trim().is_empty() {
			return Err(DecodeError::MissingIdentity);
		}
		self.credential().map(|_| ())
	}

	pub fn identity(&self) -> Identity {
		let identity = Identity::new(self.identity.trim());
		match &self.handle {
			Some(handle) if !handle.is_empty() => identity.with_handle(handle.clone()),
			_ => identity,
		}
	}

	/// Decodes the credential from whichever field carries it.
	pub fn credential(&self) -> Result<Credential, DecodeError> {
		let credential = match (&self.credential, &self.credential_b64) {
			(Some(_), Some(_)) => return Err(DecodeError::AmbiguousCredential),
			(Some(text), None) => Credential::from(text.as_str()),
			(None, Some(encoded)) => Credential::from(STANDARD.decode(encoded)?),
			(None, None) => return Err(DecodeError::MissingCredential),
		};
		if credential.is_empty() {
			return Err(DecodeError::MissingCredential);
		}
		Ok(credential)
	}

	/// Converts a validated blob into an authenticated session.
	pub fn to_session(&self) -> Result<Session, DecodeError> {
		Ok(Session::authenticated(self.identity(), self.credential()?))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_minimal_blob() {
		let blob = PersistedSession::decode(br#"{"identity":"did:x","credential":"tok"}"#).unwrap();
		assert_eq!(blob.schema, PERSISTED_SESSION_SCHEMA_VERSION);

		let session = blob.to_session().unwrap();
		assert_eq!(session.identity().map(Identity::account_id), Some("did:x"));
		assert_eq!(session.credential().map(Credential::as_bytes), Some(b"tok".as_slice()));
	}

	#[test]
	fn rejects_garbage() {
		assert!(matches!(PersistedSession::decode(b"\xff\xfe not json"), Err(DecodeError::Json(_))));
		assert!(matches!(PersistedSession::decode(b"[1, 2, 3]"), Err(DecodeError::Json(_))));
	}

	#[test]
	fn rejects_blank_identity() {
		let err = PersistedSession::decode(br#"{"identity":"  ","credential":"tok"}"#).unwrap_err();
		assert!(matches!(err, DecodeError::MissingIdentity));
	}

	#[test]
	fn rejects_missing_or_empty_credential() {
		let err = PersistedSession::decode(br#"{"identity":"did:x"}"#).unwrap_err();
		assert!(matches!(err, DecodeError::MissingCredential));

		let err = PersistedSession::decode(br#"{"identity":"did:x","credential":""}"#).unwrap_err();
		assert!(matches!(err, DecodeError::MissingCredential));
	}

	#[test]
	fn rejects_future_schema() {
		let err = PersistedSession::decode(br#"{"schema":99,"identity":"did:x","credential":"tok"}"#).unwrap_err();
		assert!(matches!(err, DecodeError::UnsupportedSchema { found: 99, .. }));
	}

	#[test]
	fn rejects_both_credential_fields() {
		let err = PersistedSession::decode(br#"{"identity":"did:x","credential":"tok","credentialB64":"dG9r"}"#).unwrap_err();
		assert!(matches!(err, DecodeError::AmbiguousCredential));
	}

	#[test]
	fn binary_credential_uses_base64_field() {
		let identity = Identity::new("did:x").with_handle("alice.test");
		let credential = Credential::from_bytes(vec![0xff, 0x00, 0x10]);
		let blob = PersistedSession::new(&identity, &credential, Some("https://example.social".into()));

		assert!(blob.credential.is_none());
		assert_eq!(blob.credential_b64.as_deref(), Some("/wAQ"));

		let decoded = PersistedSession::decode(&blob.encode().unwrap()).unwrap();
		assert_eq!(decoded.credential().unwrap(), credential);
		assert_eq!(decoded.identity(), identity);
		assert_eq!(decoded.service.as_deref(), Some("https://example.social"));
	}

	#[test]
	fn encode_omits_absent_fields() {
		let blob = PersistedSession::new(&Identity::new("did:x"), &Credential::from("tok"), None);
		let json: serde_json::Value = serde_json::from_slice(&blob.encode().unwrap()).unwrap();
		assert_eq!(json["identity"], "did:x");
		assert_eq!(json["credential"], "tok");
		assert!(json.get("handle").is_none());
		assert!(json.get("service").is_none());
		assert!(json.get("credentialB64").is_none());
	}
}
