//! Credential persistence contracts and built-in store implementations.
//!
//! The issuer writes through [`CredentialStore::save`]; summarizers read through
//! [`CredentialStore::load`] on every call, so a freshly issued credential is picked up without
//! restarting anything.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::CredentialSecret};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for the single shared credential.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Replaces the stored credential. Readers must never observe a partial value.
	fn save<'a>(&'a self, value: &'a CredentialSecret) -> StoreFuture<'a, ()>;

	/// Reads the stored credential, returning `None` when nothing has been stored yet.
	fn load(&self) -> StoreFuture<'_, Option<CredentialSecret>>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StoreError {
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
