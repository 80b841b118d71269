//! Explicit configuration passed into every component.
//!
//! [`Config`] enumerates every recognized option together with its default. Build one with
//! [`Config::builder`] or load it from `THUMBSUP_*` environment variables with
//! [`Config::from_env`]; the environment loader goes through [`Config::from_lookup`] so any
//! key/value source can stand in for the process environment.

// self
use crate::{_prelude::*, auth::CredentialSecret, error::ConfigError};

/// Default GitHub REST API base URL.
pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
/// Default Stack Exchange API base URL (v2.2).
pub const DEFAULT_STACK_EXCHANGE_API_BASE: &str = "https://api.stackexchange.com/2.2";
/// Default outbound `User-Agent`.
pub const DEFAULT_USER_AGENT: &str = "thumbsup";
/// Default credential file path.
pub const DEFAULT_CREDENTIAL_PATH: &str = "thumbsup-github-token";
/// Default minimum GitHub quota required before a summary is attempted.
pub const DEFAULT_GITHUB_RATE_LIMIT_THRESHOLD: u64 = 10;
/// Default minimum Stack Exchange quota required before the accepted answer is fetched.
pub const DEFAULT_STACK_EXCHANGE_RATE_LIMIT_THRESHOLD: u64 = 100;
/// Default timeout applied to every outbound request.
pub const DEFAULT_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Environment variable names read by [`Config::from_env`].
pub mod env {
	/// Credential file path.
	pub const CREDENTIAL_FILE: &str = "THUMBSUP_CREDENTIAL_FILE";
	/// Outbound `User-Agent`.
	pub const USER_AGENT: &str = "THUMBSUP_USER_AGENT";
	/// Outbound request timeout, in whole seconds.
	pub const REQUEST_TIMEOUT_SECS: &str = "THUMBSUP_REQUEST_TIMEOUT_SECS";
	/// Static GitHub personal access token.
	pub const GITHUB_TOKEN: &str = "THUMBSUP_GITHUB_TOKEN";
	/// Path to the GitHub App private key (PEM).
	pub const GITHUB_APP_KEYFILE: &str = "THUMBSUP_GITHUB_APP_KEYFILE";
	/// GitHub App identifier.
	pub const GITHUB_APP_ID: &str = "THUMBSUP_GITHUB_APP_ID";
	/// GitHub App installation identifier.
	pub const GITHUB_APP_INSTALLATION_ID: &str = "THUMBSUP_GITHUB_APP_INSTALLATION_ID";
	/// Minimum GitHub quota.
	pub const GITHUB_RATE_LIMIT_THRESHOLD: &str = "THUMBSUP_GITHUB_RATE_LIMIT_THRESHOLD";
	/// Drop comments without reactions before ranking.
	pub const GITHUB_SKIP_UNREACTED: &str = "THUMBSUP_GITHUB_SKIP_UNREACTED";
	/// GitHub API base URL.
	pub const GITHUB_API_BASE: &str = "THUMBSUP_GITHUB_API_BASE";
	/// Stack Exchange request key.
	pub const STACK_EXCHANGE_REQUEST_KEY: &str = "THUMBSUP_STACKEXCHANGE_REQUEST_KEY";
	/// Stack Exchange access token.
	pub const STACK_EXCHANGE_ACCESS_TOKEN: &str = "THUMBSUP_STACKEXCHANGE_ACCESS_TOKEN";
	/// Minimum Stack Exchange quota.
	pub const STACK_EXCHANGE_RATE_LIMIT_THRESHOLD: &str =
		"THUMBSUP_STACKEXCHANGE_RATE_LIMIT_THRESHOLD";
	/// Stack Exchange API base URL.
	pub const STACK_EXCHANGE_API_BASE: &str = "THUMBSUP_STACKEXCHANGE_API_BASE";
}

/// Complete configuration surface.
#[derive(Clone, Debug)]
pub struct Config {
	/// File the issuer writes and the GitHub summarizer reads.
	pub credential_path: PathBuf,
	/// `User-Agent` sent on every outbound request.
	pub user_agent: String,
	/// Timeout applied to every outbound request.
	pub request_timeout: StdDuration,
	/// GitHub options.
	pub github: GitHubConfig,
	/// Stack Exchange options.
	pub stack_exchange: StackExchangeConfig,
}
impl Config {
	/// Creates a builder seeded with every default.
	pub fn builder() -> ConfigBuilder {
		ConfigBuilder::default()
	}

	/// Loads the configuration from `THUMBSUP_*` environment variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Loads the configuration from an arbitrary key/value source. Empty values count as unset.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
		let mut builder = Self::builder();

		if let Some(path) = get(env::CREDENTIAL_FILE) {
			builder = builder.credential_path(path);
		}
		if let Some(agent) = get(env::USER_AGENT) {
			builder = builder.user_agent(agent);
		}
		if let Some(raw) = get(env::REQUEST_TIMEOUT_SECS) {
			builder = builder
				.request_timeout(StdDuration::from_secs(parse_u64(env::REQUEST_TIMEOUT_SECS, &raw)?));
		}
		if let Some(token) = get(env::GITHUB_TOKEN) {
			builder = builder.github_personal_token(token);
		}
		if let (Some(keyfile), Some(app_id), Some(installation_id)) = (
			get(env::GITHUB_APP_KEYFILE),
			get(env::GITHUB_APP_ID),
			get(env::GITHUB_APP_INSTALLATION_ID),
		) {
			builder = builder.github_app(keyfile, app_id, installation_id);
		}
		if let Some(raw) = get(env::GITHUB_RATE_LIMIT_THRESHOLD) {
			builder = builder
				.github_rate_limit_threshold(parse_u64(env::GITHUB_RATE_LIMIT_THRESHOLD, &raw)?);
		}
		if let Some(raw) = get(env::GITHUB_SKIP_UNREACTED) {
			builder = builder.skip_unreacted_comments(parse_bool(env::GITHUB_SKIP_UNREACTED, &raw)?);
		}
		if let Some(raw) = get(env::GITHUB_API_BASE) {
			builder = builder.github_api_base(parse_url(env::GITHUB_API_BASE, &raw)?);
		}
		if let Some(key) = get(env::STACK_EXCHANGE_REQUEST_KEY) {
			builder = builder.stack_exchange_request_key(key);
		}
		if let Some(token) = get(env::STACK_EXCHANGE_ACCESS_TOKEN) {
			builder = builder.stack_exchange_access_token(token);
		}
		if let Some(raw) = get(env::STACK_EXCHANGE_RATE_LIMIT_THRESHOLD) {
			builder = builder.stack_exchange_rate_limit_threshold(parse_u64(
				env::STACK_EXCHANGE_RATE_LIMIT_THRESHOLD,
				&raw,
			)?);
		}
		if let Some(raw) = get(env::STACK_EXCHANGE_API_BASE) {
			builder = builder.stack_exchange_api_base(parse_url(env::STACK_EXCHANGE_API_BASE, &raw)?);
		}

		builder.build()
	}
}

/// GitHub options.
#[derive(Clone, Debug)]
pub struct GitHubConfig {
	/// Static personal access token; takes precedence over the App exchange.
	pub personal_token: Option<CredentialSecret>,
	/// GitHub App settings, present only when every App field is configured.
	pub app: Option<GitHubAppConfig>,
	/// Minimum remaining quota required before a summary is attempted.
	pub rate_limit_threshold: u64,
	/// Drops comments without any reaction before ranking.
	pub skip_unreacted_comments: bool,
	/// REST API base URL.
	pub api_base: Url,
}

/// GitHub App settings for the installation-token exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GitHubAppConfig {
	/// Path to the App private key (PEM).
	pub keyfile: PathBuf,
	/// App identifier, used as the JWT issuer.
	pub app_id: String,
	/// Installation whose access token is requested.
	pub installation_id: String,
}

/// Stack Exchange options.
#[derive(Clone, Debug)]
pub struct StackExchangeConfig {
	/// API request key.
	pub request_key: Option<CredentialSecret>,
	/// API access token.
	pub access_token: Option<CredentialSecret>,
	/// Minimum `quota_remaining` required before the accepted answer is fetched.
	pub rate_limit_threshold: u64,
	/// API base URL, including the version segment.
	pub api_base: Url,
}

/// Builder for [`Config`] values.
#[derive(Debug)]
pub struct ConfigBuilder {
	credential_path: PathBuf,
	user_agent: String,
	request_timeout: StdDuration,
	github_personal_token: Option<CredentialSecret>,
	github_app: Option<GitHubAppConfig>,
	github_rate_limit_threshold: u64,
	skip_unreacted_comments: bool,
	github_api_base: Option<Url>,
	stack_exchange_request_key: Option<CredentialSecret>,
	stack_exchange_access_token: Option<CredentialSecret>,
	stack_exchange_rate_limit_threshold: u64,
	stack_exchange_api_base: Option<Url>,
}
impl Default for ConfigBuilder {
	fn default() -> Self {
		Self {
			credential_path: PathBuf::from(DEFAULT_CREDENTIAL_PATH),
			user_agent: DEFAULT_USER_AGENT.into(),
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			github_personal_token: None,
			github_app: None,
			github_rate_limit_threshold: DEFAULT_GITHUB_RATE_LIMIT_THRESHOLD,
			skip_unreacted_comments: false,
			github_api_base: None,
			stack_exchange_request_key: None,
			stack_exchange_access_token: None,
			stack_exchange_rate_limit_threshold: DEFAULT_STACK_EXCHANGE_RATE_LIMIT_THRESHOLD,
			stack_exchange_api_base: None,
		}
	}
}
impl ConfigBuilder {
	/// Sets the credential file path.
	pub fn credential_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.credential_path = path.into();

		self
	}

	/// Sets the outbound `User-Agent`.
	pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
		self.user_agent = agent.into();

		self
	}

	/// Sets the outbound request timeout.
	pub fn request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Sets the static GitHub personal access token.
	pub fn github_personal_token(mut self, token: impl Into<CredentialSecret>) -> Self {
		self.github_personal_token = Some(token.into());

		self
	}

	/// Sets the GitHub App used for the installation-token exchange.
	pub fn github_app(
		mut self,
		keyfile: impl Into<PathBuf>,
		app_id: impl Into<String>,
		installation_id: impl Into<String>,
	) -> Self {
		self.github_app = Some(GitHubAppConfig {
			keyfile: keyfile.into(),
			app_id: app_id.into(),
			installation_id: installation_id.into(),
		});

		self
	}

	/// Overrides the minimum GitHub quota (defaults to 10).
	pub fn github_rate_limit_threshold(mut self, threshold: u64) -> Self {
		self.github_rate_limit_threshold = threshold;

		self
	}

	/// Drops comments without reactions before ranking (defaults to `false`).
	pub fn skip_unreacted_comments(mut self, skip: bool) -> Self {
		self.skip_unreacted_comments = skip;

		self
	}

	/// Overrides the GitHub API base URL.
	pub fn github_api_base(mut self, url: Url) -> Self {
		self.github_api_base = Some(url);

		self
	}

	/// Sets the Stack Exchange request key.
	pub fn stack_exchange_request_key(mut self, key: impl Into<CredentialSecret>) -> Self {
		self.stack_exchange_request_key = Some(key.into());

		self
	}

	/// Sets the Stack Exchange access token.
	pub fn stack_exchange_access_token(mut self, token: impl Into<CredentialSecret>) -> Self {
		self.stack_exchange_access_token = Some(token.into());

		self
	}

	/// Overrides the minimum Stack Exchange quota (defaults to 100).
	pub fn stack_exchange_rate_limit_threshold(mut self, threshold: u64) -> Self {
		self.stack_exchange_rate_limit_threshold = threshold;

		self
	}

	/// Overrides the Stack Exchange API base URL.
	pub fn stack_exchange_api_base(mut self, url: Url) -> Self {
		self.stack_exchange_api_base = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<Config, ConfigError> {
		let github_api_base = match self.github_api_base {
			Some(url) => url,
			None => parse_url("github_api_base", DEFAULT_GITHUB_API_BASE)?,
		};
		let stack_exchange_api_base = match self.stack_exchange_api_base {
			Some(url) => url,
			None => parse_url("stack_exchange_api_base", DEFAULT_STACK_EXCHANGE_API_BASE)?,
		};

		validate_api_base("github_api_base", &github_api_base)?;
		validate_api_base("stack_exchange_api_base", &stack_exchange_api_base)?;

		Ok(Config {
			credential_path: self.credential_path,
			user_agent: self.user_agent,
			request_timeout: self.request_timeout,
			github: GitHubConfig {
				personal_token: self.github_personal_token.filter(|token| !token.is_empty()),
				app: self.github_app,
				rate_limit_threshold: self.github_rate_limit_threshold,
				skip_unreacted_comments: self.skip_unreacted_comments,
				api_base: github_api_base,
			},
			stack_exchange: StackExchangeConfig {
				request_key: self.stack_exchange_request_key.filter(|key| !key.is_empty()),
				access_token: self.stack_exchange_access_token.filter(|token| !token.is_empty()),
				rate_limit_threshold: self.stack_exchange_rate_limit_threshold,
				api_base: stack_exchange_api_base,
			},
		})
	}
}

fn validate_api_base(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	if matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base() {
		Ok(())
	} else {
		Err(ConfigError::InvalidValue { name, value: url.to_string() })
	}
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { name, source })
}

fn parse_u64(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
	raw.trim().parse().map_err(|_| ConfigError::InvalidValue { name, value: raw.into() })
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(ConfigError::InvalidValue { name, value: raw.into() }),
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> =
			pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();

		move |key: &str| map.get(key).cloned()
	}

	#[test]
	fn defaults_cover_every_option() {
		let config = Config::builder().build().expect("Default configuration should build.");

		assert_eq!(config.credential_path, PathBuf::from(DEFAULT_CREDENTIAL_PATH));
		assert_eq!(config.user_agent, "thumbsup");
		assert_eq!(config.request_timeout, StdDuration::from_secs(30));
		assert!(config.github.personal_token.is_none());
		assert!(config.github.app.is_none());
		assert_eq!(config.github.rate_limit_threshold, 10);
		assert!(!config.github.skip_unreacted_comments);
		assert_eq!(config.github.api_base.as_str(), "https://api.github.com/");
		assert!(config.stack_exchange.request_key.is_none());
		assert!(config.stack_exchange.access_token.is_none());
		assert_eq!(config.stack_exchange.rate_limit_threshold, 100);
		assert_eq!(config.stack_exchange.api_base.as_str(), "https://api.stackexchange.com/2.2");
	}

	#[test]
	fn lookup_reads_every_variable() {
		let config = Config::from_lookup(lookup_from(&[
			(env::CREDENTIAL_FILE, "/run/thumbsup/token"),
			(env::USER_AGENT, "thumbsup-test"),
			(env::REQUEST_TIMEOUT_SECS, "5"),
			(env::GITHUB_TOKEN, "ghp_personal"),
			(env::GITHUB_APP_KEYFILE, "/etc/thumbsup/app.pem"),
			(env::GITHUB_APP_ID, "4242"),
			(env::GITHUB_APP_INSTALLATION_ID, "77"),
			(env::GITHUB_RATE_LIMIT_THRESHOLD, "25"),
			(env::GITHUB_SKIP_UNREACTED, "true"),
			(env::STACK_EXCHANGE_REQUEST_KEY, "se-key"),
			(env::STACK_EXCHANGE_ACCESS_TOKEN, "se-token"),
			(env::STACK_EXCHANGE_RATE_LIMIT_THRESHOLD, "250"),
			(env::STACK_EXCHANGE_API_BASE, "http://127.0.0.1:9000/2.2"),
		]))
		.expect("Environment configuration should parse.");

		assert_eq!(config.credential_path, PathBuf::from("/run/thumbsup/token"));
		assert_eq!(config.user_agent, "thumbsup-test");
		assert_eq!(config.request_timeout, StdDuration::from_secs(5));
		assert_eq!(
			config.github.personal_token.as_ref().map(CredentialSecret::expose),
			Some("ghp_personal")
		);
		assert_eq!(
			config.github.app,
			Some(GitHubAppConfig {
				keyfile: PathBuf::from("/etc/thumbsup/app.pem"),
				app_id: "4242".into(),
				installation_id: "77".into(),
			})
		);
		assert_eq!(config.github.rate_limit_threshold, 25);
		assert!(config.github.skip_unreacted_comments);
		assert_eq!(
			config.stack_exchange.request_key.as_ref().map(CredentialSecret::expose),
			Some("se-key")
		);
		assert_eq!(config.stack_exchange.rate_limit_threshold, 250);
		assert_eq!(config.stack_exchange.api_base.as_str(), "http://127.0.0.1:9000/2.2");
	}

	#[test]
	fn partial_app_settings_are_ignored() {
		let config = Config::from_lookup(lookup_from(&[
			(env::GITHUB_APP_KEYFILE, "/etc/thumbsup/app.pem"),
			(env::GITHUB_APP_INSTALLATION_ID, "77"),
		]))
		.expect("Partial App settings should still parse.");

		assert!(config.github.app.is_none());
	}

	#[test]
	fn empty_values_count_as_unset() {
		let config = Config::from_lookup(lookup_from(&[
			(env::GITHUB_TOKEN, ""),
			(env::STACK_EXCHANGE_REQUEST_KEY, "  "),
		]))
		.expect("Empty values should be ignored.");

		assert!(config.github.personal_token.is_none());
		assert!(config.stack_exchange.request_key.is_none());
		assert!(
			Config::builder()
				.github_personal_token("")
				.build()
				.expect("Builder should accept an empty token.")
				.github
				.personal_token
				.is_none()
		);
	}

	#[test]
	fn malformed_values_are_rejected() {
		let err = Config::from_lookup(lookup_from(&[(env::GITHUB_RATE_LIMIT_THRESHOLD, "ten")]))
			.expect_err("Non-numeric thresholds should fail.");

		assert!(matches!(
			err,
			ConfigError::InvalidValue { name, .. } if name == env::GITHUB_RATE_LIMIT_THRESHOLD
		));

		let err = Config::from_lookup(lookup_from(&[(env::GITHUB_API_BASE, "not a url")]))
			.expect_err("Unparsable base URLs should fail.");

		assert!(matches!(err, ConfigError::InvalidUrl { .. }));

		let lookup = lookup_from(&[(env::GITHUB_API_BASE, "mailto:ops@example.com")]);
		let err =
			Config::from_lookup(lookup).expect_err("Base URLs must be hierarchical HTTP URLs.");

		assert!(matches!(err, ConfigError::InvalidValue { .. }));
	}
}
