//! GitHub App JWT claims and RS256 signing.

// crates.io
use jsonwebtoken::{Algorithm, EncodingKey, Header};
// self
use crate::{_prelude::*, error::ConfigError};

/// Lifetime GitHub accepts for an App JWT.
pub const APP_JWT_TTL: Duration = Duration::seconds(600);

/// Claim set signed with the App private key before the installation-token exchange.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppClaims {
	/// Issued-at, in seconds since the Unix epoch.
	pub iat: i64,
	/// Expiry, in seconds since the Unix epoch.
	pub exp: i64,
	/// App identifier.
	pub iss: String,
}
impl AppClaims {
	/// Builds claims valid from `now` until `now + APP_JWT_TTL`.
	pub fn new(app_id: impl Into<String>, now: OffsetDateTime) -> Self {
		Self {
			iat: now.unix_timestamp(),
			exp: (now + APP_JWT_TTL).unix_timestamp(),
			iss: app_id.into(),
		}
	}

	/// Signs the claims with an RSA private key in PEM form using RS256.
	pub fn sign(&self, private_key_pem: &[u8]) -> Result<String, ConfigError> {
		let key = EncodingKey::from_rsa_pem(private_key_pem)
			.map_err(|source| ConfigError::AppKey { source })?;

		jsonwebtoken::encode(&Header::new(Algorithm::RS256), self, &key)
			.map_err(|source| ConfigError::AppKey { source })
	}
}
