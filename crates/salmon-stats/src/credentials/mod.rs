//! Credential management.
//!
//! Two independent credential sets are handled here:
//!
//! - [`CredentialStore`]: persists the Salmon Stats bearer token (`apiToken`).
//! - [`SessionState`]: in-memory game session (NSA id + `iksm_session`
//!   cookie), refreshed through a [`SessionProvider`].

mod error;
mod session;
mod store;

pub use error::CredentialError;
pub use session::{
    Account, HttpSessionProvider, SessionProvider, SessionState, StaticSessionProvider,
};
#[cfg(feature = "keyring")]
pub use store::KeyringCredentialStore;
pub use store::{CredentialStore, KeyType, MemoryCredentialStore};
