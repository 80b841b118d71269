//! The GitHub credential produced by the issuer and read back by the summarizers.

// self
use crate::{_prelude::*, auth::CredentialSecret};

/// Value persisted when no usable credential could be produced.
pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";

/// How a credential was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialMethod {
	/// Static personal access token taken verbatim from configuration.
	#[serde(rename = "personal")]
	Personal,
	/// Installation access token minted through a GitHub App JWT exchange.
	#[serde(rename = "app")]
	App,
	/// No credential; requests go out anonymously.
	#[serde(rename = "UNAUTHENTICATED")]
	Unauthenticated,
}
impl CredentialMethod {
	/// Returns the stable label used in logs and command-line output.
	pub const fn as_str(self) -> &'static str {
		match self {
			CredentialMethod::Personal => "personal",
			CredentialMethod::App => "app",
			CredentialMethod::Unauthenticated => UNAUTHENTICATED,
		}
	}
}
impl Display for CredentialMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl PartialEq<&str> for CredentialMethod {
	fn eq(&self, other: &&str) -> bool {
		self.as_str() == *other
	}
}

/// Credential issued for a single provider.
///
/// The value is never empty unless the method is [`CredentialMethod::Unauthenticated`], in which
/// case it holds the [`UNAUTHENTICATED`] sentinel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
	value: CredentialSecret,
	method: CredentialMethod,
}
impl Credential {
	/// Builds a personal-token credential; empty tokens collapse into the unauthenticated one.
	pub fn personal(value: impl Into<CredentialSecret>) -> Self {
		Self::with_method(value.into(), CredentialMethod::Personal)
	}

	/// Builds an installation-token credential; empty tokens collapse into the unauthenticated
	/// one.
	pub fn app(value: impl Into<CredentialSecret>) -> Self {
		Self::with_method(value.into(), CredentialMethod::App)
	}

	/// Builds the anonymous credential carrying the [`UNAUTHENTICATED`] sentinel.
	pub fn unauthenticated() -> Self {
		Self {
			value: CredentialSecret::new(UNAUTHENTICATED),
			method: CredentialMethod::Unauthenticated,
		}
	}

	fn with_method(value: CredentialSecret, method: CredentialMethod) -> Self {
		if value.is_empty() { Self::unauthenticated() } else { Self { value, method } }
	}

	/// Secret value written to the credential store.
	pub fn value(&self) -> &CredentialSecret {
		&self.value
	}

	/// Method that produced the credential.
	pub fn method(&self) -> CredentialMethod {
		self.method
	}
}

/// Interprets a stored credential, returning the token to send upstream.
///
/// Whitespace is trimmed; the [`UNAUTHENTICATED`] sentinel and empty values mean "no credential".
pub fn usable_token(stored: Option<&CredentialSecret>) -> Option<&str> {
	stored
		.map(|secret| secret.expose().trim())
		.filter(|token| !token.is_empty() && *token != UNAUTHENTICATED)
}
