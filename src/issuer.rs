//! GitHub credential issuance.
//!
//! [`CredentialIssuer`] picks the first usable source in a fixed order (static personal token,
//! GitHub App installation token, anonymous), then writes the chosen value through a
//! [`CredentialStore`]. The App exchange never surfaces as an error: any failure is logged
//! without the signed JWT and degrades to the anonymous credential.

// std
use std::fs;
// self
use crate::{
	_prelude::*,
	auth::{AppClaims, Credential, CredentialMethod, CredentialSecret},
	config::{Config, GitHubAppConfig, GitHubConfig},
	error::{ConfigError, TransportError, UpstreamError},
	http::{self, ApiHttpClient, ApiRequest, ReqwestHttpClient},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	store::{CredentialStore, FileStore},
};

/// `Accept` header required by the installation-token endpoint.
pub const GITHUB_APP_ACCEPT: &str = "application/vnd.github.machine-man-preview+json";

#[derive(Debug, Deserialize)]
struct InstallationToken {
	#[serde(default)]
	token: Option<String>,
}

/// Produces the GitHub credential and persists it.
#[derive(Clone)]
pub struct CredentialIssuer {
	github: GitHubConfig,
	user_agent: String,
	http_client: Arc<dyn ApiHttpClient>,
}
impl CredentialIssuer {
	/// Creates an issuer backed by reqwest.
	pub fn new(config: &Config) -> Result<Self, ConfigError> {
		let http_client: Arc<dyn ApiHttpClient> = Arc::new(ReqwestHttpClient::from_config(config)?);

		Ok(Self::with_http_client(config, http_client))
	}

	/// Creates an issuer around a caller-supplied transport.
	pub fn with_http_client(config: &Config, http_client: Arc<dyn ApiHttpClient>) -> Self {
		Self { github: config.github.clone(), user_agent: config.user_agent.clone(), http_client }
	}

	/// Issues a credential and atomically writes its value to `destination`.
	///
	/// Returns how the credential was obtained. Only a failure to write the file is reported as
	/// an error.
	pub async fn issue(&self, destination: impl AsRef<Path>) -> Result<CredentialMethod> {
		let store = FileStore::new(destination.as_ref());

		self.issue_into(&store).await
	}

	/// Issues a credential and saves its value through `store`.
	pub async fn issue_into(&self, store: &dyn CredentialStore) -> Result<CredentialMethod> {
		const KIND: OperationKind = OperationKind::IssueCredential;

		let span = OperationSpan::new(KIND, "issue");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let credential = self.resolve().await;

				store.save(credential.value()).await?;

				#[cfg(feature = "tracing")]
				tracing::info!(
					method = %credential.method(),
					fingerprint = %credential.value().fingerprint(),
					"Stored GitHub credential."
				);

				Ok(credential.method())
			})
			.await;

		obs::record_operation_outcome(KIND, OperationOutcome::of(&result));

		result
	}

	/// Applies the issuance policy without persisting anything.
	pub async fn resolve(&self) -> Credential {
		if let Some(token) = &self.github.personal_token {
			return Credential::personal(token.clone());
		}

		let Some(app) = &self.github.app else {
			return Credential::unauthenticated();
		};
		let url = match access_tokens_url(&self.github.api_base, app) {
			Ok(url) => url,
			Err(e) => {
				log_degraded(self.github.api_base.as_str(), &e.into());

				return Credential::unauthenticated();
			},
		};
		let endpoint = url.to_string();

		match self.exchange_app_token(app, url).await {
			Ok(token) => Credential::app(token),
			Err(e) => {
				log_degraded(&endpoint, &e);

				Credential::unauthenticated()
			},
		}
	}

	async fn exchange_app_token(
		&self,
		app: &GitHubAppConfig,
		url: Url,
	) -> Result<CredentialSecret> {
		let pem = fs::read(&app.keyfile).map_err(TransportError::from)?;
		let jwt = AppClaims::new(app.app_id.as_str(), OffsetDateTime::now_utc()).sign(&pem)?;
		let request = ApiRequest::post(url)
			.header("Accept", GITHUB_APP_ACCEPT)
			.header("Authorization", format!("Bearer {jwt}"))
			.header("User-Agent", self.user_agent.clone());
		let endpoint = request.endpoint();
		let body: InstallationToken = http::fetch_json(self.http_client.as_ref(), request).await?;

		body.token
			.filter(|token| !token.trim().is_empty())
			.map(CredentialSecret::new)
			.ok_or_else(|| UpstreamError::MissingField { endpoint, field: "token" }.into())
	}
}
impl Debug for CredentialIssuer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialIssuer")
			.field("personal_token", &self.github.personal_token)
			.field("app", &self.github.app)
			.field("api_base", &self.github.api_base.as_str())
			.finish_non_exhaustive()
	}
}

fn access_tokens_url(base: &Url, app: &GitHubAppConfig) -> Result<Url, ConfigError> {
	http::api_url(base, ["app", "installations", app.installation_id.as_str(), "access_tokens"])
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn log_degraded(endpoint: &str, error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(
		endpoint,
		status = error.http_status(),
		error = %http::truncate_preview(&error_chain(error)),
		"GitHub App token exchange failed; falling back to unauthenticated access."
	);
}

#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
fn error_chain(error: &dyn StdError) -> String {
	let mut message = error.to_string();
	let mut source = error.source();

	while let Some(cause) = source {
		message.push_str(": ");
		message.push_str(&cause.to_string());

		source = cause.source();
	}

	message
}
