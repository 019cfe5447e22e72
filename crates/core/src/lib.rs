//! Root state store and session lifecycle controller.
//!
//! hearth owns three jobs for a client application:
//!
//! * hydrate the persisted authentication session before anything else may
//!   observe application state ([`StoreBootstrapper::setup`]),
//! * turn any number of concurrent "session invalid" signals into exactly one
//!   session-drop transition per epoch ([`SessionMonitor`]),
//! * fan that transition out to subscribers so that one failing subscriber
//!   cannot block the others ([`SubscriptionRegistry`]).
//!
//! # Example
//!
//! ```ignore
//! let bootstrapper = StoreBootstrapper::from_config(&StoreConfig::from_env());
//! let store = bootstrapper.setup().await?;
//!
//! let _notice = store.register_session_drop_handler(|event| {
//!     eprintln!("session for {} expired, please log in again", event.identity);
//!     Ok(())
//! });
//!
//! // Handed to request handlers; any of them may report a 401.
//! let monitor = bootstrapper.monitor(&store);
//! monitor.report_invalid_session();
//! ```

pub mod bootstrap;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod guard;
pub mod monitor;
mod persistence;
pub mod registry;
pub mod store;
pub mod substore;

pub use bootstrap::StoreBootstrapper;
pub use config::{SESSION_FILE_ENV, StoreConfig};
pub use diagnostics::{Diagnostic, DiagnosticsSink, RecordingDiagnostics, TracingDiagnostics};
pub use error::{Error, Result};
pub use guard::GuardState;
pub use hearth_protocol::{Credential, Identity, PersistedSession, Session};
pub use monitor::{ReportOutcome, SessionMonitor};
pub use registry::{DeliveryReport, SubscriptionHandle, SubscriptionRegistry, SubscriptionToken};
pub use store::{RootStore, ScreenSoftReset, SessionDropped};
pub use substore::{ColorMode, SESSION_KEY, SHELL_KEY, SessionStore, ShellStore, SubStore, SubStores};
