//! Secret wrapper that redacts sensitive material from logs and debug output.

// crates.io
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Redacted secret wrapper keeping tokens and API keys out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSecret(String);
impl CredentialSecret {
	const FINGERPRINT_BYTES: usize = 6;

	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner secret value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when the secret holds no characters at all.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns a short, stable SHA-256 fingerprint safe to attach to log records.
	pub fn fingerprint(&self) -> String {
		let digest = Sha256::digest(self.0.as_bytes());

		digest.iter().take(Self::FINGERPRINT_BYTES).map(|byte| format!("{byte:02x}")).collect()
	}
}
impl AsRef<str> for CredentialSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl From<String> for CredentialSecret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl From<&str> for CredentialSecret {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}
impl Debug for CredentialSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("CredentialSecret").field(&"<redacted>").finish()
	}
}
impl Display for CredentialSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
