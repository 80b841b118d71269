//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::CredentialSecret,
	store::{CredentialStore, StoreFuture},
};

/// Storage backend that keeps the credential in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<Option<CredentialSecret>>>);
impl MemoryStore {
	/// Creates a store already holding `value`.
	pub fn with_value(value: impl Into<CredentialSecret>) -> Self {
		Self(Arc::new(RwLock::new(Some(value.into()))))
	}

	/// Returns the currently stored value without going through the async contract.
	pub fn snapshot(&self) -> Option<CredentialSecret> {
		self.0.read().clone()
	}
}
impl CredentialStore for MemoryStore {
	fn save<'a>(&'a self, value: &'a CredentialSecret) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			*self.0.write() = Some(value.clone());

			Ok(())
		})
	}

	fn load(&self) -> StoreFuture<'_, Option<CredentialSecret>> {
		Box::pin(async move { Ok(self.snapshot()) })
	}
}
