//! File-backed [`CredentialStore`] whose sole content is the credential value.

// std
use std::{
	fs::{self, File},
	io::{ErrorKind, Write},
	process,
};
// self
use crate::{
	_prelude::*,
	auth::CredentialSecret,
	store::{CredentialStore, StoreError, StoreFuture},
};

/// Persists the credential to a plain file, replacing it atomically on every save.
///
/// Nothing is cached in memory: every [`load`](CredentialStore::load) reads the file again.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
}
impl FileStore {
	/// Creates a store for the provided path. The file is not touched until the first call.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Path of the credential file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create credential directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn temp_path(&self) -> PathBuf {
		let file_name = self
			.path
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_else(|| "credential".into());
		let unique = format!(
			".{file_name}.{}.{}.tmp",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos()
		);

		self.path.with_file_name(unique)
	}

	fn persist(&self, value: &CredentialSecret) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let tmp_path = self.temp_path();
		let written = (|| {
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(value.expose().as_bytes()).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;

			fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
				message: format!("Failed to replace {}: {e}", self.path.display()),
			})
		})();

		if written.is_err() {
			let _ = fs::remove_file(&tmp_path);
		}

		written
	}

	fn read(&self) -> Result<Option<CredentialSecret>, StoreError> {
		match fs::read_to_string(&self.path) {
			Ok(contents) => Ok(Some(CredentialSecret::new(contents))),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
			Err(e) => Err(StoreError::Backend {
				message: format!("Failed to read {}: {e}", self.path.display()),
			}),
		}
	}
}
impl CredentialStore for FileStore {
	fn save<'a>(&'a self, value: &'a CredentialSecret) -> StoreFuture<'a, ()> {
		Box::pin(async move { self.persist(value) })
	}

	fn load(&self) -> StoreFuture<'_, Option<CredentialSecret>> {
		Box::pin(async move { self.read() })
	}
}
